//! Logging setup

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a filter directive, e.g. `folio_core=debug`.
pub const LOG_ENV: &str = "FOLIO_LOG";

/// Default filter for the given `-v` count and `-q` flag.
pub fn default_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "off";
    }
    // Diagnostics are reported once at the end, so warnings wait for -v.
    match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr.
///
/// `FOLIO_LOG` takes precedence over the verbosity flags.
pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose, quiet)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose > 1);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
