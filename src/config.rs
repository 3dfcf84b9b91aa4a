//! Project configuration loader overriding the conventional project layout.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::project::ProjectLayout;
use crate::templates::FilenameTemplate;

/// Configuration file names searched for in the project root, in order.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
  "pipeline.config.json",
  "pipeline.config.yaml",
  "pipeline.config.yml",
];

/// Discoverable project configuration describing source and output paths.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
  /// Entry module relative to the project root.
  pub entry: String,
  /// Output directory relative to the project root.
  pub output_dir: String,
  /// Public URL prefix the bundle is served from.
  pub public_path: String,
  /// Filename template for emitted script chunks.
  pub script_filename: String,
  /// Filename template for extracted stylesheets.
  pub style_filename: String,
  /// Filename template for extracted stylesheet chunks.
  pub style_chunk_filename: String,
  /// Filename template for images and fonts.
  pub media_filename: String,
  /// Images at or below this size in bytes are inlined.
  pub inline_size_limit: u64,
  /// HTML template relative to the project root.
  pub html_template: String,
  /// Service worker path relative to the output directory.
  pub service_worker_dest: String,
  /// Directory names whose scripts are never transpiled.
  pub vendor_dirs: Vec<String>,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    let layout = ProjectLayout::default();
    Self {
      entry: layout.entry,
      output_dir: layout.output_dir,
      public_path: layout.public_path,
      script_filename: layout.script_filename.as_str().into(),
      style_filename: layout.style_filename.as_str().into(),
      style_chunk_filename: layout.style_chunk_filename.as_str().into(),
      media_filename: layout.media_filename.as_str().into(),
      inline_size_limit: layout.inline_size_limit,
      html_template: layout.html_template,
      service_worker_dest: layout.service_worker_dest,
      vendor_dirs: layout.vendor_dirs,
    }
  }
}

impl ProjectConfig {
  /// Load the first configuration file found in `root`.
  ///
  /// A project without a configuration file uses the defaults; a file that
  /// exists but cannot be read or parsed is an error.
  pub fn discover(root: &Path) -> Result<Self, ConfigError> {
    for name in CONFIG_FILE_CANDIDATES {
      let candidate = root.join(name);
      match Self::from_path(&candidate) {
        Ok(config) => {
          debug!(path = %candidate.display(), "loaded project configuration");
          return Ok(config);
        }
        Err(ConfigError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => continue,
        Err(err) => return Err(err),
      }
    }

    debug!(root = %root.display(), "no project configuration found, using defaults");
    Ok(Self::default())
  }

  /// Read configuration from a specific JSON or YAML file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    if is_yaml(path) {
      serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
      })
    } else {
      serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
      })
    }
  }

  /// Validate the configuration and convert it into a layout rooted at `root`.
  pub fn into_layout(self, root: impl Into<PathBuf>) -> Result<ProjectLayout, ConfigError> {
    if self.entry.trim().is_empty() {
      return Err(ConfigError::InvalidValue {
        field: "entry",
        hint: "provide the path of the entry module".into(),
      });
    }

    if !self.service_worker_dest.ends_with(".js") {
      return Err(ConfigError::InvalidValue {
        field: "service_worker_dest",
        hint: format!(
          "service worker must be a `.js` file, got `{}`",
          self.service_worker_dest
        ),
      });
    }

    let vendor_dirs = normalise_dirs(self.vendor_dirs);

    Ok(ProjectLayout {
      root: root.into(),
      entry: self.entry,
      output_dir: self.output_dir,
      public_path: self.public_path,
      script_filename: template("script_filename", &self.script_filename)?,
      style_filename: template("style_filename", &self.style_filename)?,
      style_chunk_filename: template("style_chunk_filename", &self.style_chunk_filename)?,
      media_filename: template("media_filename", &self.media_filename)?,
      inline_size_limit: self.inline_size_limit,
      html_template: self.html_template,
      service_worker_dest: self.service_worker_dest,
      vendor_dirs,
    })
  }
}

/// Load the layout for `root`, preferring an explicit configuration file.
///
/// `root` is made absolute against the working directory so emitted paths do
/// not depend on where the bundler is launched.
pub fn load_layout(root: &Path, explicit: Option<&Path>) -> Result<ProjectLayout, ConfigError> {
  let root = std::path::absolute(root).map_err(|source| ConfigError::Io {
    path: root.to_path_buf(),
    source,
  })?;
  let config = match explicit {
    Some(path) => ProjectConfig::from_path(path)?,
    None => ProjectConfig::discover(&root)?,
  };
  config.into_layout(root)
}

fn template(field: &'static str, value: &str) -> Result<FilenameTemplate, ConfigError> {
  FilenameTemplate::parse(value).map_err(|source| ConfigError::InvalidTemplate { field, source })
}

fn is_yaml(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Trim directory names and drop empty entries, keeping the declared order.
fn normalise_dirs(values: Vec<String>) -> Vec<String> {
  let mut dirs: Vec<String> = Vec::new();
  for value in values {
    let value = value.trim().trim_matches('/').to_string();
    if !value.is_empty() && !dirs.contains(&value) {
      dirs.push(value);
    }
  }
  dirs
}
