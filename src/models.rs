//! Data structures describing a resolved build configuration.

use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::minimizers::Minimizer;
use crate::mode::{BuildMode, SourceMapStrategy};
use crate::plugins::{NODE_ENV_KEY, Plugin, PluginKind};
use crate::rules::{RuleSet, TransformRule};
use crate::templates::FilenameTemplate;

/// Declarative description of how the bundler should process a project.
///
/// Serializes to the JSON shape a webpack-style bundler expects: camelCase
/// keys, `devtool: false` when source maps are off, and no `devServer` key in
/// production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
  /// Mode the configuration was resolved for.
  pub mode: BuildMode,
  /// Source-map strategy, only set in development.
  #[serde(serialize_with = "serialize_devtool")]
  pub devtool: Option<SourceMapStrategy>,
  /// Entry module.
  pub entry: String,
  /// Where and how bundles are written.
  pub output: OutputSpec,
  /// Transform rules.
  pub module: ModuleSpec,
  /// Module resolution settings.
  pub resolve: ResolveSpec,
  /// Auxiliary plugins applicable to this mode.
  pub plugins: Vec<Plugin>,
  /// Minification settings.
  pub optimization: Optimization,
  /// Development server options, absent in production.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dev_server: Option<DevServerSpec>,
}

impl BuildConfiguration {
  /// Ordered transform rules.
  pub fn transform_rules(&self) -> &RuleSet {
    &self.module.rules
  }

  /// First transform rule applying to `path`.
  pub fn rule_for(&self, path: &str) -> Option<&TransformRule> {
    self.module.rules.rule_for(path)
  }

  /// Active minimizers, empty outside production.
  pub fn minimizers(&self) -> &[Minimizer] {
    &self.optimization.minimizer
  }

  /// Returns `true` when a plugin of `kind` is configured.
  pub fn has_plugin(&self, kind: PluginKind) -> bool {
    self.plugins.iter().any(|plugin| plugin.kind() == kind)
  }

  /// The environment flag injected into the bundle, without JSON quoting.
  pub fn env_flag(&self) -> Option<String> {
    self.plugins.iter().find_map(|plugin| match plugin {
      Plugin::DefineEnv(options) => options
        .definitions
        .get(NODE_ENV_KEY)
        .and_then(|literal| serde_json::from_str(literal).ok()),
      _ => None,
    })
  }

  /// Serialize as indented JSON.
  pub fn to_json_pretty(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  /// Serialize as single-line JSON.
  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string(self)
  }
}

fn serialize_devtool<S: Serializer>(
  value: &Option<SourceMapStrategy>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  match value {
    Some(strategy) => strategy.serialize(serializer),
    None => serializer.serialize_bool(false),
  }
}

/// Output location and naming of emitted bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
  /// Output directory.
  pub path: PathBuf,
  /// Filename template for script chunks.
  pub filename: FilenameTemplate,
  /// Public URL prefix of emitted assets.
  pub public_path: String,
}

/// Module processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSpec {
  /// Ordered transform rules.
  pub rules: RuleSet,
}

/// Module resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveSpec {
  /// Extensions tried, in order, for extensionless imports.
  pub extensions: Vec<String>,
}

impl Default for ResolveSpec {
  fn default() -> Self {
    Self {
      extensions: vec![".js".into(), ".jsx".into()],
    }
  }
}

/// Minification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Optimization {
  /// Whether minimizers run.
  pub minimize: bool,
  /// Minimizers in execution order.
  pub minimizer: Vec<Minimizer>,
}

/// Local development server options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerSpec {
  /// Gzip responses.
  pub compress: bool,
  /// Serve the HTML page for unknown routes.
  pub history_api_fallback: bool,
  /// Open a browser once the server starts.
  pub open: bool,
  /// Show compile errors as a full-screen overlay.
  pub overlay: bool,
}

impl Default for DevServerSpec {
  fn default() -> Self {
    Self {
      compress: true,
      history_api_fallback: true,
      open: true,
      overlay: true,
    }
  }
}
