//! Resolve a build mode into a complete [`BuildConfiguration`].

use tracing::debug;

use crate::error::InvalidModeError;
use crate::minimizers::minimizers_for;
use crate::mode::BuildMode;
use crate::models::{
  BuildConfiguration, DevServerSpec, ModuleSpec, Optimization, OutputSpec, ResolveSpec,
};
use crate::plugins::plugins_for;
use crate::project::ProjectLayout;
use crate::rules::RuleSet;

/// Resolve `mode` against the conventional project layout.
pub fn resolve(mode: &str) -> Result<BuildConfiguration, InvalidModeError> {
  let layout = ProjectLayout::default();
  ConfigResolver::new(&layout).resolve_str(mode)
}

/// Resolver for a fixed project layout.
///
/// Resolution is pure: it reads nothing from disk and every call builds a new
/// configuration, so equal inputs always produce equal outputs.
#[derive(Debug, Clone, Copy)]
pub struct ConfigResolver<'a> {
  layout: &'a ProjectLayout,
}

impl<'a> ConfigResolver<'a> {
  /// Create a resolver for the provided layout.
  pub fn new(layout: &'a ProjectLayout) -> Self {
    Self { layout }
  }

  /// Parse `mode` and resolve it, failing before any configuration is built.
  pub fn resolve_str(&self, mode: &str) -> Result<BuildConfiguration, InvalidModeError> {
    let mode: BuildMode = mode.parse()?;
    Ok(self.resolve(mode))
  }

  /// Resolve the configuration for `mode`.
  pub fn resolve(&self, mode: BuildMode) -> BuildConfiguration {
    let profile = mode.profile();
    let layout = self.layout;
    debug!(%mode, root = %layout.root.display(), "resolving build configuration");

    let rules = RuleSet::for_profile(layout, &profile);
    let plugins = plugins_for(layout, &profile);
    let minimizer = minimizers_for(&profile);
    debug!(
      rules = rules.len(),
      plugins = plugins.len(),
      minimizers = minimizer.len(),
      "resolved build configuration"
    );

    BuildConfiguration {
      mode,
      devtool: profile.source_maps,
      entry: layout.entry.clone(),
      output: OutputSpec {
        path: layout.output_path(),
        filename: layout.script_filename.clone(),
        public_path: layout.public_path.clone(),
      },
      module: ModuleSpec { rules },
      resolve: ResolveSpec::default(),
      plugins,
      optimization: Optimization {
        minimize: profile.minimize,
        minimizer,
      },
      dev_server: profile.dev_server.then(DevServerSpec::default),
    }
  }
}
