//! Structured logging setup.
//!
//! Library consumers usually install their own subscriber; `init_logging`
//! is for binaries and tests that want the crate's spans on stderr with one
//! call. The filter comes from `FRAMEXL_LOG` and defaults to `info`.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// JSON structured logging.
    Json,
}

const FILTER_ENV: &str = "FRAMEXL_LOG";

/// Install a global subscriber. Safe to call more than once; later calls
/// are no-ops.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // a subscriber installed earlier in the process is fine
    let _ = installed;
    Ok(())
}
