//! Tracing setup shared by `caffplan` and the library tests.
//!
//! Everything is written to stderr; stdout carries only predictions,
//! curves and schedules.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber used by the CLI. Only warnings show unless
/// `RUST_LOG` asks for more.
pub fn init() {
    init_with_level("warn")
}

/// Install the subscriber with `default_level` (`--verbose` passes "debug").
/// A `RUST_LOG` directive still wins.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route debug output of model and search tests through the test harness.
/// Safe to call from every test.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
