//! Output filename templates such as `assets/js/[name].[contenthash:8].js`.

use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Serialize, Serializer};

use crate::error::TemplateError;

const MAX_HASH_LENGTH: usize = 64;

fn placeholder_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"\[([a-z]+)(?::([0-9]+))?\]").expect("invalid placeholder regex")
  })
}

/// Placeholder recognised inside a [`FilenameTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  /// `[name]`: the chunk or asset name.
  Name,
  /// `[ext]`: the source extension, without the leading dot.
  Ext,
  /// `[hash]` or `[hash:N]`: hash of the asset as emitted by a loader.
  Hash(Option<usize>),
  /// `[contenthash]` or `[contenthash:N]`: hash of the emitted content.
  ContentHash(Option<usize>),
}

/// Values substituted into a template when rendering a concrete filename.
#[derive(Debug, Clone, Copy)]
pub struct AssetName<'a> {
  /// Asset or chunk name.
  pub name: &'a str,
  /// Extension without the leading dot.
  pub ext: &'a str,
  /// Full hex digest; truncated per placeholder length.
  pub hash: &'a str,
}

/// Validated filename template with bundler-style placeholders.
///
/// Backslashes are normalised to forward slashes so templates written on
/// Windows produce the same output paths everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
  /// Parse and validate a template.
  pub fn parse(template: &str) -> Result<Self, TemplateError> {
    let normalised = template.trim().replace('\\', "/");
    let reject = |reason: String| TemplateError {
      template: template.to_string(),
      reason,
    };

    if normalised.is_empty() {
      return Err(reject("template is empty".into()));
    }

    for caps in placeholder_pattern().captures_iter(&normalised) {
      parse_placeholder(&caps).map_err(reject)?;
    }

    let leftover = placeholder_pattern().replace_all(&normalised, "");
    if leftover.contains('[') || leftover.contains(']') {
      return Err(reject("unbalanced or malformed placeholder".into()));
    }

    Ok(Self(normalised))
  }

  /// The template source.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Placeholders in order of appearance.
  pub fn placeholders(&self) -> Vec<Placeholder> {
    placeholder_pattern()
      .captures_iter(&self.0)
      .filter_map(|caps| parse_placeholder(&caps).ok())
      .collect()
  }

  /// Returns `true` when the rendered name changes with the emitted content.
  pub fn is_content_hashed(&self) -> bool {
    self
      .placeholders()
      .iter()
      .any(|placeholder| matches!(placeholder, Placeholder::ContentHash(_)))
  }

  /// Substitute the placeholders for a concrete asset.
  pub fn render(&self, asset: &AssetName<'_>) -> String {
    placeholder_pattern()
      .replace_all(&self.0, |caps: &Captures<'_>| {
        match parse_placeholder(caps) {
          Ok(Placeholder::Name) => asset.name.to_string(),
          Ok(Placeholder::Ext) => asset.ext.trim_start_matches('.').to_string(),
          Ok(Placeholder::Hash(len)) | Ok(Placeholder::ContentHash(len)) => {
            truncate_hash(asset.hash, len).to_string()
          }
          Err(_) => caps[0].to_string(),
        }
      })
      .into_owned()
  }
}

fn parse_placeholder(caps: &Captures<'_>) -> Result<Placeholder, String> {
  let name = &caps[1];
  let length = match caps.get(2) {
    Some(raw) => {
      let length: usize = raw
        .as_str()
        .parse()
        .map_err(|_| format!("hash length `{}` is not a number", raw.as_str()))?;
      if length == 0 || length > MAX_HASH_LENGTH {
        return Err(format!(
          "hash length must be between 1 and {MAX_HASH_LENGTH}, got {length}"
        ));
      }
      Some(length)
    }
    None => None,
  };

  match (name, length) {
    ("name", None) => Ok(Placeholder::Name),
    ("ext", None) => Ok(Placeholder::Ext),
    ("hash", length) => Ok(Placeholder::Hash(length)),
    ("contenthash", length) => Ok(Placeholder::ContentHash(length)),
    ("name" | "ext", Some(_)) => Err(format!("`[{name}]` does not take a length")),
    _ => Err(format!("unknown placeholder `[{name}]`")),
  }
}

fn truncate_hash(hash: &str, length: Option<usize>) -> &str {
  match length {
    Some(length) => hash.get(..length).unwrap_or(hash),
    None => hash,
  }
}

impl fmt::Display for FilenameTemplate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl Serialize for FilenameTemplate {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.0)
  }
}
