//! Output minimizers, active only when the mode profile asks for minification.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::mode::ModeProfile;

/// Compression settings for the script minimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressOptions {
  /// Allow rewriting comparison expressions.
  pub comparisons: bool,
}

/// Identifier mangling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MangleOptions {
  /// Work around Safari 10 loop-scoping bugs.
  pub safari10: bool,
}

/// Code generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputOptions {
  /// Keep comments in the output.
  pub comments: bool,
  /// Escape non-ASCII characters.
  pub ascii_only: bool,
}

/// Script minimizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerserOptions {
  /// Compression step.
  pub compress: CompressOptions,
  /// Mangling step.
  pub mangle: MangleOptions,
  /// Code generation step.
  pub output: OutputOptions,
  /// Emit minifier warnings.
  pub warnings: bool,
}

impl Default for TerserOptions {
  fn default() -> Self {
    Self {
      compress: CompressOptions { comparisons: false },
      mangle: MangleOptions { safari10: true },
      output: OutputOptions {
        comments: false,
        ascii_only: true,
      },
      warnings: false,
    }
  }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TerserPluginOptions<'a> {
  terser_options: &'a TerserOptions,
}

/// A post-processing step shrinking emitted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Minimizer {
  /// Script minification.
  Terser(TerserOptions),
  /// Stylesheet minification.
  Css,
}

impl Minimizer {
  /// Name of the minimizer plugin as the bundler knows it.
  pub const fn name(&self) -> &'static str {
    match self {
      Minimizer::Terser(_) => "TerserWebpackPlugin",
      Minimizer::Css => "CssMinimizerPlugin",
    }
  }
}

impl Serialize for Minimizer {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("minimizer", self.name())?;
    if let Minimizer::Terser(options) = self {
      map.serialize_entry("options", &TerserPluginOptions {
        terser_options: options,
      })?;
    }
    map.end()
  }
}

/// Minimizers to run for `profile`, script first; empty unless minifying.
pub fn minimizers_for(profile: &ModeProfile) -> Vec<Minimizer> {
  if !profile.minimize {
    return Vec::new();
  }

  vec![Minimizer::Terser(TerserOptions::default()), Minimizer::Css]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mode::BuildMode;

  #[test]
  fn only_production_minimizes() {
    assert!(minimizers_for(&BuildMode::Development.profile()).is_empty());

    let names: Vec<&str> = minimizers_for(&BuildMode::Production.profile())
      .iter()
      .map(Minimizer::name)
      .collect();
    assert_eq!(names, vec!["TerserWebpackPlugin", "CssMinimizerPlugin"]);
  }

  #[test]
  fn serializes_terser_options_under_plugin_key() {
    let value = serde_json::to_value(minimizers_for(&BuildMode::Production.profile())).unwrap();
    let terser = &value[0]["options"]["terserOptions"];

    assert_eq!(terser["compress"]["comparisons"], false);
    assert_eq!(terser["mangle"]["safari10"], true);
    assert_eq!(terser["output"]["comments"], false);
    assert_eq!(terser["output"]["ascii_only"], true);
    assert_eq!(terser["warnings"], false);
    assert!(value[1].get("options").is_none());
  }
}
