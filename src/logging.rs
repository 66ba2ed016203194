//! Diagnostic logging
//!
//! Log output goes to stderr so command output on stdout stays clean.

use std::env;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a tracing filter directive, e.g. `gamesave=debug`
pub const LOG_ENV: &str = "GAMESAVE_LOG";

/// Filter used when `GAMESAVE_LOG` is unset, raised by each `-v`
fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(verbosity: u8) {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| default_filter(verbosity).to_string());
    let filter_layer = EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter_layer)
        .try_init();
}
