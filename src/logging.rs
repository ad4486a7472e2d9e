//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `BAKE_LOG` environment variable (an `EnvFilter` directive, e.g. "bake=debug")
//! 3. derived from the output verbosity

use crate::runner::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for a log filter
pub const LOG_ENV: &str = "BAKE_LOG";

/// Initialise the global logging subscriber.
///
/// Calling it more than once keeps the first subscriber.
pub fn init_logging(cli_level: Option<&str>, verbosity: Verbosity) {
    let filter = match cli_level.and_then(parse_level_str) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity))),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn level_for_verbosity(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Silent => "off",
        Verbosity::Quiet => "error",
        Verbosity::Normal => "info",
        Verbosity::Verbose => "debug",
    }
}

/// Normalise a level name; `None` for anything unrecognised
pub fn parse_level_str(s: &str) -> Option<&'static str> {
    match s.trim().to_lowercase().as_str() {
        "off" => Some("off"),
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}
