//! Build modes and the decision table deriving every mode-dependent setting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidModeError;

/// Build-time flag selecting between development and production behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  /// Fast rebuilds, source maps, injected styles and a dev server.
  Development,
  /// Hashed, extracted and minified output with an offline service worker.
  Production,
}

impl BuildMode {
  /// Every accepted mode, in declaration order.
  pub const ALL: [BuildMode; 2] = [BuildMode::Development, BuildMode::Production];

  /// The literal name of the mode, as accepted by [`BuildMode::from_str`].
  pub const fn as_str(self) -> &'static str {
    match self {
      BuildMode::Development => "development",
      BuildMode::Production => "production",
    }
  }

  /// Look up the settings derived from this mode.
  pub const fn profile(self) -> ModeProfile {
    match self {
      BuildMode::Development => ModeProfile {
        mode: self,
        source_maps: Some(SourceMapStrategy::CheapModuleSourceMap),
        style_handling: StyleHandling::Inject,
        minimize: false,
        offline_cache: false,
        env_flag: "development",
        dev_server: true,
      },
      BuildMode::Production => ModeProfile {
        mode: self,
        source_maps: None,
        style_handling: StyleHandling::Extract,
        minimize: true,
        offline_cache: true,
        env_flag: "production",
        dev_server: false,
      },
    }
  }
}

impl FromStr for BuildMode {
  type Err = InvalidModeError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim() {
      "development" => Ok(BuildMode::Development),
      "production" => Ok(BuildMode::Production),
      _ => Err(InvalidModeError::new(value)),
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Source-map generation strategy handed to the bundler's `devtool` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceMapStrategy {
  /// Line-level maps of the original sources, cheap to rebuild.
  #[serde(rename = "cheap-module-source-map")]
  CheapModuleSourceMap,
}

/// How stylesheets reach the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleHandling {
  /// Styles are injected into the page at runtime by a `<style>` tag.
  Inject,
  /// Styles are extracted into separate content-hashed files.
  Extract,
}

/// Settings derived from a [`BuildMode`].
///
/// This is the only place mode-dependent values are decided; rule, plugin and
/// minimizer construction read from it instead of branching on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
  /// Mode this profile was derived from.
  pub mode: BuildMode,
  /// Source-map strategy, present only in development.
  pub source_maps: Option<SourceMapStrategy>,
  /// Style injection or extraction.
  pub style_handling: StyleHandling,
  /// Whether the minimizer set is active.
  pub minimize: bool,
  /// Whether the offline-cache service worker is generated.
  pub offline_cache: bool,
  /// Value injected as `process.env.NODE_ENV` and the transpiler's env name.
  pub env_flag: &'static str,
  /// Whether development server options are emitted.
  pub dev_server: bool,
}
