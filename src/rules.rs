//! Ordered transform rules mapping file patterns to loader chains.
//!
//! Rules are evaluated top to bottom and the first rule whose pattern matches
//! (and whose exclusion does not) owns the file. Every extension a rule declares
//! must be owned by that rule, which the tests below check for both modes.

use regex::{Regex, RegexBuilder};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::mode::{ModeProfile, StyleHandling};
use crate::project::ProjectLayout;
use crate::templates::FilenameTemplate;

/// Category of source file a rule handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
  /// Scripts run off the main thread (`*.worker.js`).
  Worker,
  /// Application scripts (`.js`, `.jsx`).
  Script,
  /// Stylesheets.
  Style,
  /// Raster images.
  Image,
  /// Vector graphics converted to components.
  VectorGraphic,
  /// Web fonts.
  Font,
}

/// Regular expression tested against a file path.
///
/// The source is kept free of inline flags so it is valid in both Rust and
/// JavaScript regex dialects; case-insensitivity travels as a separate flag.
#[derive(Debug, Clone)]
pub struct FilePattern {
  regex: Regex,
  source: String,
  case_insensitive: bool,
}

impl FilePattern {
  /// Compile a case-sensitive pattern from its regex source.
  pub fn new(source: &str) -> Result<Self, regex::Error> {
    Self::build(source, false)
  }

  /// Compile a pattern that ignores ASCII and Unicode case.
  pub fn case_insensitive(source: &str) -> Result<Self, regex::Error> {
    Self::build(source, true)
  }

  fn build(source: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
    let regex = RegexBuilder::new(source)
      .case_insensitive(case_insensitive)
      .build()?;
    Ok(Self {
      regex,
      source: source.to_string(),
      case_insensitive,
    })
  }

  fn fixed(source: &str) -> Self {
    Self::new(source).expect("invalid built-in file pattern")
  }

  fn fixed_ignore_case(source: &str) -> Self {
    Self::case_insensitive(source).expect("invalid built-in file pattern")
  }

  /// Pattern matching any path containing one of the given directory names.
  fn any_dir(dirs: &[String]) -> Option<Self> {
    if dirs.is_empty() {
      return None;
    }
    let alternatives: Vec<String> = dirs.iter().map(|dir| regex::escape(dir)).collect();
    Some(Self::fixed(&format!("({})", alternatives.join("|"))))
  }

  /// The regex source, without flags.
  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Flags in JavaScript notation: `"i"` or empty.
  pub fn flags(&self) -> &'static str {
    if self.case_insensitive { "i" } else { "" }
  }

  /// Test a path, normalising Windows separators first.
  pub fn is_match(&self, path: &str) -> bool {
    self.regex.is_match(&path.replace('\\', "/"))
  }
}

impl PartialEq for FilePattern {
  fn eq(&self, other: &Self) -> bool {
    self.source == other.source && self.case_insensitive == other.case_insensitive
  }
}

impl Eq for FilePattern {}

/// Plain patterns serialize as their source string; flagged patterns as
/// `{ "source": ..., "flags": ... }`.
impl Serialize for FilePattern {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    if !self.case_insensitive {
      return serializer.serialize_str(&self.source);
    }
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("source", &self.source)?;
    map.serialize_entry("flags", self.flags())?;
    map.end()
  }
}

/// Options passed to the script transpiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BabelOptions {
  /// Cache transpiled output between builds.
  pub cache_directory: bool,
  /// Compress cached output.
  pub cache_compression: bool,
  /// Environment name selecting the transpiler preset configuration.
  pub env_name: &'static str,
}

/// Options for inlining small images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlOptions {
  /// Size in bytes at or below which files are inlined as data URLs.
  pub limit: u64,
  /// Filename template for files above the limit.
  pub name: FilenameTemplate,
}

/// Options for copying files into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOptions {
  /// Filename template for the emitted file.
  pub name: FilenameTemplate,
}

/// A single step in a rule's loader chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loader {
  /// Bundles the matched script as a separate worker entry.
  Worker,
  /// Transpiles modern script syntax.
  Babel(BabelOptions),
  /// Injects styles into the document at runtime.
  StyleInject,
  /// Hands styles to the extraction plugin.
  StyleExtract,
  /// Resolves `@import` and `url()` inside stylesheets.
  Css,
  /// Inlines small files, otherwise emits them.
  Url(UrlOptions),
  /// Converts SVG markup into a component.
  Svgr,
  /// Emits the file unchanged.
  File(FileOptions),
}

impl Loader {
  /// Name of the loader as the bundler resolves it.
  pub const fn name(&self) -> &'static str {
    match self {
      Loader::Worker => "worker-loader",
      Loader::Babel(_) => "babel-loader",
      Loader::StyleInject => "style-loader",
      Loader::StyleExtract => "mini-css-extract-plugin/loader",
      Loader::Css => "css-loader",
      Loader::Url(_) => "url-loader",
      Loader::Svgr => "@svgr/webpack",
      Loader::File(_) => "file-loader",
    }
  }
}

impl Serialize for Loader {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("loader", self.name())?;
    match self {
      Loader::Babel(options) => map.serialize_entry("options", options)?,
      Loader::Url(options) => map.serialize_entry("options", options)?,
      Loader::File(options) => map.serialize_entry("options", options)?,
      Loader::Worker | Loader::StyleInject | Loader::StyleExtract | Loader::Css | Loader::Svgr => {}
    }
    map.end()
  }
}

/// Mapping from a file pattern to the loader chain responsible for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformRule {
  /// Category of files handled by this rule.
  #[serde(skip)]
  pub kind: RuleKind,
  /// Files this rule applies to.
  pub test: FilePattern,
  /// Files skipped even when `test` matches.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exclude: Option<FilePattern>,
  /// Loader chain, applied last to first by the bundler.
  #[serde(rename = "use")]
  pub uses: Vec<Loader>,
  /// Extensions (without leading dot) this rule is expected to own.
  #[serde(skip)]
  pub extensions: &'static [&'static str],
}

impl TransformRule {
  /// Returns `true` when this rule applies to `path`.
  pub fn matches(&self, path: &str) -> bool {
    self.test.is_match(path)
      && !self
        .exclude
        .as_ref()
        .is_some_and(|exclude| exclude.is_match(path))
  }

  /// Loader names in chain order.
  pub fn loader_names(&self) -> Vec<&'static str> {
    self.uses.iter().map(Loader::name).collect()
  }
}

/// Ordered transform rules; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
  rules: Vec<TransformRule>,
}

impl RuleSet {
  /// Build the rule table for the given layout and mode.
  pub fn for_profile(layout: &ProjectLayout, profile: &ModeProfile) -> Self {
    let babel = Loader::Babel(BabelOptions {
      cache_directory: true,
      cache_compression: false,
      env_name: profile.env_flag,
    });

    let style_loader = match profile.style_handling {
      StyleHandling::Inject => Loader::StyleInject,
      StyleHandling::Extract => Loader::StyleExtract,
    };

    let vendor = FilePattern::any_dir(&layout.vendor_dirs);
    let mut rules = vec![TransformRule {
      kind: RuleKind::Worker,
      test: FilePattern::fixed(r"\.worker\.js$"),
      exclude: vendor.clone(),
      uses: vec![Loader::Worker, babel.clone()],
      extensions: &["worker.js"],
    }];

    // Vendor workers skipped by the rule above are bundled untranspiled.
    if vendor.is_some() {
      rules.push(TransformRule {
        kind: RuleKind::Worker,
        test: FilePattern::fixed(r"\.worker\.js$"),
        exclude: None,
        uses: vec![Loader::Worker],
        extensions: &[],
      });
    }

    rules.extend([
      TransformRule {
        kind: RuleKind::Script,
        test: FilePattern::fixed(r"\.(js|jsx)$"),
        exclude: vendor,
        uses: vec![babel],
        extensions: &["js", "jsx"],
      },
      TransformRule {
        kind: RuleKind::Style,
        test: FilePattern::fixed(r"\.css$"),
        exclude: None,
        uses: vec![style_loader, Loader::Css],
        extensions: &["css"],
      },
      TransformRule {
        kind: RuleKind::Image,
        test: FilePattern::fixed_ignore_case(r"\.(png|jpg|gif)$"),
        exclude: None,
        uses: vec![Loader::Url(UrlOptions {
          limit: layout.inline_size_limit,
          name: layout.media_filename.clone(),
        })],
        extensions: &["png", "jpg", "gif"],
      },
      TransformRule {
        kind: RuleKind::VectorGraphic,
        test: FilePattern::fixed(r"\.svg$"),
        exclude: None,
        uses: vec![Loader::Svgr],
        extensions: &["svg"],
      },
      TransformRule {
        kind: RuleKind::Font,
        test: FilePattern::fixed(r"\.(eot|otf|ttf|woff|woff2)$"),
        exclude: None,
        uses: vec![Loader::File(FileOptions {
          name: layout.media_filename.clone(),
        })],
        extensions: &["eot", "otf", "ttf", "woff", "woff2"],
      },
    ]);

    Self { rules }
  }

  /// First rule that applies to `path`, if any.
  pub fn rule_for(&self, path: &str) -> Option<&TransformRule> {
    self.rules.iter().find(|rule| rule.matches(path))
  }

  /// Rule owning files with the given extension (without leading dot).
  pub fn owner_of_extension(&self, extension: &str) -> Option<&TransformRule> {
    self.rule_for(&format!("asset.{}", extension.trim_start_matches('.')))
  }

  /// Every declared extension paired with the rule kind declaring it.
  pub fn declared_extensions(&self) -> impl Iterator<Item = (&'static str, RuleKind)> + '_ {
    self
      .rules
      .iter()
      .flat_map(|rule| rule.extensions.iter().map(move |ext| (*ext, rule.kind)))
  }

  /// Rules in evaluation order.
  pub fn iter(&self) -> std::slice::Iter<'_, TransformRule> {
    self.rules.iter()
  }

  /// Number of rules.
  pub fn len(&self) -> usize {
    self.rules.len()
  }

  /// Returns `true` when there are no rules.
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }
}

impl<'a> IntoIterator for &'a RuleSet {
  type Item = &'a TransformRule;
  type IntoIter = std::slice::Iter<'a, TransformRule>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mode::BuildMode;

  fn rules(mode: BuildMode) -> RuleSet {
    RuleSet::for_profile(&ProjectLayout::default(), &mode.profile())
  }

  fn kind_for(rules: &RuleSet, path: &str) -> Option<RuleKind> {
    rules.rule_for(path).map(|rule| rule.kind)
  }

  #[test]
  fn routes_files_to_first_matching_rule() {
    let rules = rules(BuildMode::Development);

    assert_eq!(kind_for(&rules, "src/app.worker.js"), Some(RuleKind::Worker));
    assert_eq!(kind_for(&rules, "src/app.jsx"), Some(RuleKind::Script));
    assert_eq!(kind_for(&rules, "src/index.js"), Some(RuleKind::Script));
    assert_eq!(kind_for(&rules, "src/theme.css"), Some(RuleKind::Style));
    assert_eq!(kind_for(&rules, "img/logo.PNG"), Some(RuleKind::Image));
    assert_eq!(kind_for(&rules, "img/icon.svg"), Some(RuleKind::VectorGraphic));
    assert_eq!(kind_for(&rules, "fonts/inter.woff2"), Some(RuleKind::Font));
    assert_eq!(kind_for(&rules, "README.md"), None);
  }

  #[test]
  fn vendor_scripts_are_not_transpiled() {
    let rules = rules(BuildMode::Production);

    assert_eq!(kind_for(&rules, "node_modules/react/index.js"), None);
    assert_eq!(kind_for(&rules, "bower_components\\jquery\\jquery.js"), None);
    assert_eq!(kind_for(&rules, "src/components/index.js"), Some(RuleKind::Script));
  }

  #[test]
  fn empty_vendor_list_transpiles_everything() {
    let layout = ProjectLayout {
      vendor_dirs: Vec::new(),
      ..ProjectLayout::default()
    };
    let rules = RuleSet::for_profile(&layout, &BuildMode::Development.profile());

    assert_eq!(kind_for(&rules, "node_modules/react/index.js"), Some(RuleKind::Script));
  }

  #[test]
  fn every_declared_extension_has_exactly_its_owner() {
    for mode in BuildMode::ALL {
      let rules = rules(mode);
      for (extension, kind) in rules.declared_extensions() {
        let owner = rules.owner_of_extension(extension).map(|rule| rule.kind);
        assert_eq!(owner, Some(kind), "extension `{extension}` in {mode}");
      }
    }
  }

  #[test]
  fn workers_keep_transpilation_in_their_chain() {
    let rules = rules(BuildMode::Development);
    let worker = rules.rule_for("a.worker.js").unwrap();
    assert_eq!(worker.loader_names(), vec!["worker-loader", "babel-loader"]);
  }

  #[test]
  fn style_chain_follows_style_handling() {
    let dev = rules(BuildMode::Development);
    let prod = rules(BuildMode::Production);

    assert_eq!(dev.rule_for("a.css").unwrap().loader_names(), vec![
      "style-loader",
      "css-loader"
    ]);
    assert_eq!(prod.rule_for("a.css").unwrap().loader_names(), vec![
      "mini-css-extract-plugin/loader",
      "css-loader"
    ]);
  }

  #[test]
  fn babel_env_name_follows_env_flag() {
    for mode in BuildMode::ALL {
      let rules = rules(mode);
      let script = rules.rule_for("src/index.js").unwrap();
      match &script.uses[0] {
        Loader::Babel(options) => {
          assert_eq!(options.env_name, mode.as_str());
          assert!(options.cache_directory);
          assert!(!options.cache_compression);
        }
        other => panic!("unexpected loader {other:?}"),
      }
    }
  }

  #[test]
  fn serializes_in_bundler_rule_shape() {
    let rules = rules(BuildMode::Production);
    let value = serde_json::to_value(&rules).unwrap();

    assert_eq!(value[2]["test"], r"\.(js|jsx)$");
    assert_eq!(value[2]["exclude"], "(node_modules|bower_components)");
    assert_eq!(value[2]["use"][0]["loader"], "babel-loader");
    assert_eq!(value[2]["use"][0]["options"]["envName"], "production");
    assert_eq!(value[4]["use"][0]["options"]["limit"], 8192);
    assert_eq!(
      value[4]["use"][0]["options"]["name"],
      "static/media/[name].[hash:8].[ext]"
    );
    assert!(value[5]["use"][0].get("options").is_none());
    assert!(value[5].get("exclude").is_none());
  }

  #[test]
  fn serialized_patterns_are_valid_javascript_regex_sources() {
    for mode in BuildMode::ALL {
      let value = serde_json::to_value(rules(mode)).unwrap();
      for rule in value.as_array().unwrap() {
        for key in ["test", "exclude"] {
          let source = match &rule[key] {
            serde_json::Value::String(source) => source.as_str(),
            serde_json::Value::Object(pattern) => pattern["source"].as_str().unwrap(),
            _ => continue,
          };
          assert!(!source.contains("(?"), "{key} `{source}` in {mode}");
        }
      }
    }
  }

  #[test]
  fn case_insensitive_pattern_carries_its_flag() {
    let value = serde_json::to_value(rules(BuildMode::Development)).unwrap();

    assert_eq!(
      value[4]["test"],
      serde_json::json!({ "source": r"\.(png|jpg|gif)$", "flags": "i" })
    );
    assert!(value[3]["test"].is_string());
  }

  #[test]
  fn vendor_workers_are_bundled_without_transpilation() {
    let rules = rules(BuildMode::Production);

    let vendor = rules.rule_for("node_modules/pkg/heavy.worker.js").unwrap();
    assert_eq!(vendor.kind, RuleKind::Worker);
    assert_eq!(vendor.loader_names(), vec!["worker-loader"]);

    let own = rules.rule_for("src/app.worker.js").unwrap();
    assert_eq!(own.loader_names(), vec!["worker-loader", "babel-loader"]);
  }

  #[test]
  fn empty_vendor_list_keeps_a_single_worker_rule() {
    let layout = ProjectLayout {
      vendor_dirs: Vec::new(),
      ..ProjectLayout::default()
    };
    let rules = RuleSet::for_profile(&layout, &BuildMode::Development.profile());

    let workers = rules.iter().filter(|rule| rule.kind == RuleKind::Worker).count();
    assert_eq!(workers, 1);
    assert_eq!(
      rules.rule_for("node_modules/pkg/heavy.worker.js").unwrap().loader_names(),
      vec!["worker-loader", "babel-loader"]
    );
  }
}
