//! Error types surfaced by mode parsing and project configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Raised when a build mode is neither `development` nor `production`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid build mode `{value}`: expected `development` or `production`")]
pub struct InvalidModeError {
  /// The rejected input, as supplied by the caller.
  pub value: String,
}

impl InvalidModeError {
  /// Wrap the rejected mode value.
  pub fn new(value: impl Into<String>) -> Self {
    Self {
      value: value.into(),
    }
  }
}

/// Raised when a filename template cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{template}`: {reason}")]
pub struct TemplateError {
  /// The rejected template.
  pub template: String,
  /// Why the template was rejected.
  pub reason: String,
}

/// Errors that can occur while loading a project configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the configuration file from disk.
  #[error("failed to read {}: {source}", path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: std::io::Error,
  },
  /// The JSON configuration file could not be parsed.
  #[error("failed to parse {}: {source}", path.display())]
  Json {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_json::Error,
  },
  /// The YAML configuration file could not be parsed.
  #[error("failed to parse {}: {source}", path.display())]
  Yaml {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    #[source]
    source: serde_yaml::Error,
  },
  /// A filename template uses an unknown or malformed placeholder.
  #[error("invalid filename template for `{field}`: {source}")]
  InvalidTemplate {
    /// Configuration field holding the template.
    field: &'static str,
    /// Underlying template error.
    #[source]
    source: TemplateError,
  },
  /// A configuration value is present but unusable.
  #[error("invalid value for `{field}`: {hint}")]
  InvalidValue {
    /// Configuration field holding the value.
    field: &'static str,
    /// Guidance for fixing the value.
    hint: String,
  },
}
