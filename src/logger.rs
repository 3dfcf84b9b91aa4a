//! Logging setup for the `pipeline-config` binary using the `tracing` ecosystem.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "pipeline_config=debug";
const QUIET_FILTER: &str = "pipeline_config=error";
const DEFAULT_FILTER: &str = "pipeline_config=info";

/// Build the filter for the requested verbosity.
///
/// `verbose` wins over `quiet`; with neither set, `RUST_LOG` is honoured and
/// falls back to info level for this crate.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
  if verbose {
    EnvFilter::new(VERBOSE_FILTER)
  } else if quiet {
    EnvFilter::new(QUIET_FILTER)
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
  }
}

/// Install the global subscriber. Logs go to stderr so JSON on stdout stays clean.
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
  let fmt_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_level(true)
    .with_ansi(!no_color)
    .compact();

  tracing_subscriber::registry()
    .with(filter_for(verbose, quiet))
    .with(fmt_layer)
    .init();
}

#[cfg(test)]
mod tests {
  use tracing_subscriber::filter::LevelFilter;

  use super::*;

  #[test]
  fn verbose_overrides_quiet() {
    assert_eq!(filter_for(true, true).max_level_hint(), Some(LevelFilter::DEBUG));
  }

  #[test]
  fn quiet_limits_to_errors() {
    assert_eq!(filter_for(false, true).max_level_hint(), Some(LevelFilter::ERROR));
  }
}
