//! Auxiliary build plugins, each gated by a predicate over the mode profile.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::mode::{ModeProfile, StyleHandling};
use crate::project::ProjectLayout;
use crate::templates::FilenameTemplate;

/// Key under which the build mode is exposed to application code.
pub const NODE_ENV_KEY: &str = "process.env.NODE_ENV";

/// Identifies a plugin independently of its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
  /// Stylesheet extraction into content-hashed files.
  CssExtract,
  /// HTML page generated from a template with the bundle injected.
  HtmlTemplate,
  /// Compile-time constant injection.
  DefineEnv,
  /// Offline-cache service worker generation.
  GenerateServiceWorker,
}

impl PluginKind {
  /// Name of the plugin as the bundler knows it.
  pub const fn name(self) -> &'static str {
    match self {
      PluginKind::CssExtract => "MiniCssExtractPlugin",
      PluginKind::HtmlTemplate => "HtmlWebpackPlugin",
      PluginKind::DefineEnv => "DefinePlugin",
      PluginKind::GenerateServiceWorker => "GenerateSW",
    }
  }
}

/// Options for stylesheet extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssExtractOptions {
  /// Filename template for entry stylesheets.
  pub filename: FilenameTemplate,
  /// Filename template for split stylesheet chunks.
  pub chunk_filename: FilenameTemplate,
}

/// Options for HTML page generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlTemplateOptions {
  /// Template the page is generated from.
  pub template: PathBuf,
  /// Inject script and style tags for the emitted assets.
  pub inject: bool,
}

/// Constants replaced at compile time, values are JSON-encoded source literals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DefineOptions {
  /// Expression to literal source replacement.
  pub definitions: BTreeMap<String, String>,
}

/// Options for the offline-cache service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceWorkerOptions {
  /// Service worker path relative to the output directory.
  pub sw_dest: String,
  /// Take control of open clients as soon as the worker activates.
  pub clients_claim: bool,
  /// Activate new workers without waiting for old clients to close.
  pub skip_waiting: bool,
}

/// A configured auxiliary plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plugin {
  /// Stylesheet extraction.
  CssExtract(CssExtractOptions),
  /// HTML page generation.
  HtmlTemplate(HtmlTemplateOptions),
  /// Environment constant injection.
  DefineEnv(DefineOptions),
  /// Offline-cache service worker.
  GenerateServiceWorker(ServiceWorkerOptions),
}

impl Plugin {
  /// Kind of this plugin.
  pub const fn kind(&self) -> PluginKind {
    match self {
      Plugin::CssExtract(_) => PluginKind::CssExtract,
      Plugin::HtmlTemplate(_) => PluginKind::HtmlTemplate,
      Plugin::DefineEnv(_) => PluginKind::DefineEnv,
      Plugin::GenerateServiceWorker(_) => PluginKind::GenerateServiceWorker,
    }
  }
}

impl Serialize for Plugin {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("plugin", self.kind().name())?;
    match self {
      Plugin::CssExtract(options) => map.serialize_entry("options", options)?,
      Plugin::HtmlTemplate(options) => map.serialize_entry("options", options)?,
      Plugin::DefineEnv(options) => map.serialize_entry("options", options)?,
      Plugin::GenerateServiceWorker(options) => map.serialize_entry("options", options)?,
    }
    map.end()
  }
}

type PluginPredicate = fn(&ModeProfile) -> bool;
type PluginFactory = fn(&ProjectLayout, &ModeProfile) -> Plugin;

/// Candidate plugins in emission order.
const PLUGIN_TABLE: [(PluginKind, PluginPredicate, PluginFactory); 4] = [
  (PluginKind::CssExtract, extracts_styles, css_extract),
  (PluginKind::HtmlTemplate, always, html_template),
  (PluginKind::DefineEnv, always, define_env),
  (
    PluginKind::GenerateServiceWorker,
    caches_offline,
    generate_service_worker,
  ),
];

/// Collect the plugins whose predicate holds for `profile`.
///
/// Plugins that do not apply are left out entirely rather than emitted as
/// placeholders, so the list only ever contains configured plugins.
pub fn plugins_for(layout: &ProjectLayout, profile: &ModeProfile) -> Vec<Plugin> {
  PLUGIN_TABLE
    .iter()
    .filter_map(|(kind, applies, build)| {
      if applies(profile) {
        Some(build(layout, profile))
      } else {
        debug!(plugin = kind.name(), mode = %profile.mode, "plugin omitted");
        None
      }
    })
    .collect()
}

fn always(_: &ModeProfile) -> bool {
  true
}

fn extracts_styles(profile: &ModeProfile) -> bool {
  profile.style_handling == StyleHandling::Extract
}

fn caches_offline(profile: &ModeProfile) -> bool {
  profile.offline_cache
}

fn css_extract(layout: &ProjectLayout, _: &ModeProfile) -> Plugin {
  Plugin::CssExtract(CssExtractOptions {
    filename: layout.style_filename.clone(),
    chunk_filename: layout.style_chunk_filename.clone(),
  })
}

fn html_template(layout: &ProjectLayout, _: &ModeProfile) -> Plugin {
  Plugin::HtmlTemplate(HtmlTemplateOptions {
    template: layout.html_template_path(),
    inject: true,
  })
}

fn define_env(_: &ProjectLayout, profile: &ModeProfile) -> Plugin {
  let mut definitions = BTreeMap::new();
  definitions.insert(
    NODE_ENV_KEY.to_string(),
    serde_json::Value::from(profile.env_flag).to_string(),
  );
  Plugin::DefineEnv(DefineOptions { definitions })
}

fn generate_service_worker(layout: &ProjectLayout, _: &ModeProfile) -> Plugin {
  Plugin::GenerateServiceWorker(ServiceWorkerOptions {
    sw_dest: layout.service_worker_dest.clone(),
    clients_claim: true,
    skip_waiting: true,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mode::BuildMode;

  fn kinds(mode: BuildMode) -> Vec<PluginKind> {
    plugins_for(&ProjectLayout::default(), &mode.profile())
      .iter()
      .map(Plugin::kind)
      .collect()
  }

  #[test]
  fn development_omits_production_only_plugins() {
    assert_eq!(kinds(BuildMode::Development), vec![
      PluginKind::HtmlTemplate,
      PluginKind::DefineEnv,
    ]);
  }

  #[test]
  fn production_includes_every_plugin_in_table_order() {
    assert_eq!(kinds(BuildMode::Production), vec![
      PluginKind::CssExtract,
      PluginKind::HtmlTemplate,
      PluginKind::DefineEnv,
      PluginKind::GenerateServiceWorker,
    ]);
  }

  #[test]
  fn define_env_injects_quoted_flag() {
    for mode in BuildMode::ALL {
      let plugins = plugins_for(&ProjectLayout::default(), &mode.profile());
      let define = plugins
        .iter()
        .find_map(|plugin| match plugin {
          Plugin::DefineEnv(options) => Some(options),
          _ => None,
        })
        .expect("define plugin is always present");
      let literal = &define.definitions[NODE_ENV_KEY];
      assert_eq!(literal, &serde_json::to_string(mode.as_str()).unwrap());
      assert_eq!(serde_json::from_str::<String>(literal).unwrap(), mode.as_str());
    }
  }

  #[test]
  fn serializes_name_and_options() {
    let plugins = plugins_for(&ProjectLayout::default(), &BuildMode::Production.profile());
    let value = serde_json::to_value(&plugins).unwrap();

    assert_eq!(value[0]["plugin"], "MiniCssExtractPlugin");
    assert_eq!(
      value[0]["options"]["chunkFilename"],
      "assets/css/[name].[contenthash:8].chunk.css"
    );
    assert_eq!(value[1]["options"]["template"], "./public/index.html");
    assert_eq!(value[1]["options"]["inject"], true);
    assert_eq!(value[2]["options"][NODE_ENV_KEY], "\"production\"");
    assert_eq!(value[3]["plugin"], "GenerateSW");
    assert_eq!(value[3]["options"]["swDest"], "service-worker.js");
    assert_eq!(value[3]["options"]["clientsClaim"], true);
    assert_eq!(value[3]["options"]["skipWaiting"], true);
  }
}
