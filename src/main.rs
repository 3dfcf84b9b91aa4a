use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pipeline_config::logger::init_logger;
use pipeline_config::{BuildMode, ConfigResolver, load_layout};

/// Print the bundler configuration for a build mode as JSON.
#[derive(Debug, Parser)]
#[command(name = "pipeline-config", version, about)]
struct Cli {
  /// Build mode: `development` or `production`.
  #[arg(long)]
  mode: String,

  /// Project root that output and template paths are resolved against.
  #[arg(long, default_value = ".")]
  root: PathBuf,

  /// Explicit project configuration file instead of discovery in the root.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Write the configuration to this file instead of stdout.
  #[arg(long)]
  out: Option<PathBuf>,

  /// Emit single-line JSON.
  #[arg(long)]
  compact: bool,

  /// Enable debug logging.
  #[arg(short, long)]
  verbose: bool,

  /// Only log errors.
  #[arg(short, long)]
  quiet: bool,

  /// Disable colored log output.
  #[arg(long)]
  no_color: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logger(cli.verbose, cli.quiet, cli.no_color);

  let mode: BuildMode = cli.mode.parse()?;
  let layout = load_layout(&cli.root, cli.config.as_deref())
    .with_context(|| format!("failed to load project layout from {}", cli.root.display()))?;
  let configuration = ConfigResolver::new(&layout).resolve(mode);

  let serialized = if cli.compact {
    configuration.to_json()
  } else {
    configuration.to_json_pretty()
  };
  let json = serialized.context("failed to serialize build configuration")?;

  match cli.out {
    Some(path) => {
      if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {}", parent.display()))?;
      }
      fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
      info!(mode = %configuration.mode, path = %path.display(), "wrote build configuration");
    }
    None => println!("{json}"),
  }

  Ok(())
}
