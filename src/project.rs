//! Fixed source and destination paths the resolver describes.

use std::path::{Path, PathBuf};

use crate::templates::FilenameTemplate;

/// Source and destination layout of a project.
///
/// Produced from [`crate::config::ProjectConfig`] once its templates have been
/// validated, or from [`ProjectLayout::default`] for the conventional layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  /// Project root that relative output and template paths are resolved against.
  pub root: PathBuf,
  /// Entry module handed to the bundler, relative to the root.
  pub entry: String,
  /// Output directory, relative to the root.
  pub output_dir: String,
  /// Public URL prefix the bundle is served from.
  pub public_path: String,
  /// Filename template for emitted script chunks.
  pub script_filename: FilenameTemplate,
  /// Filename template for extracted stylesheets.
  pub style_filename: FilenameTemplate,
  /// Filename template for extracted stylesheet chunks.
  pub style_chunk_filename: FilenameTemplate,
  /// Filename template for images and fonts copied into the output.
  pub media_filename: FilenameTemplate,
  /// Images at or below this size in bytes are inlined as data URLs.
  pub inline_size_limit: u64,
  /// HTML template relative to the root.
  pub html_template: String,
  /// Service worker path relative to the output directory.
  pub service_worker_dest: String,
  /// Directory names whose scripts are never transpiled.
  pub vendor_dirs: Vec<String>,
}

impl ProjectLayout {
  /// Absolute-or-rooted output directory.
  pub fn output_path(&self) -> PathBuf {
    join_root(&self.root, &self.output_dir)
  }

  /// Rooted path of the HTML template.
  pub fn html_template_path(&self) -> PathBuf {
    join_root(&self.root, &self.html_template)
  }
}

impl Default for ProjectLayout {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      entry: "./src/index.js".into(),
      output_dir: "dist/".into(),
      public_path: "/".into(),
      script_filename: default_template("assets/js/[name].[contenthash:8].js"),
      style_filename: default_template("assets/css/[name].[contenthash:8].css"),
      style_chunk_filename: default_template("assets/css/[name].[contenthash:8].chunk.css"),
      media_filename: default_template("static/media/[name].[hash:8].[ext]"),
      inline_size_limit: 8192,
      html_template: "public/index.html".into(),
      service_worker_dest: "service-worker.js".into(),
      vendor_dirs: vec!["node_modules".into(), "bower_components".into()],
    }
  }
}

fn default_template(template: &str) -> FilenameTemplate {
  FilenameTemplate::parse(template).expect("invalid built-in filename template")
}

fn join_root(root: &Path, relative: &str) -> PathBuf {
  let trimmed = relative.trim_start_matches("./");
  if trimmed.is_empty() {
    root.to_path_buf()
  } else {
    root.join(trimmed)
  }
}
