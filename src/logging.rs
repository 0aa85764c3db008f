//! logging
//!
//! `tracing` subscriber setup for drivers and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`,
/// e.g. `RUST_LOG=inlist_grid=debug`.
///
/// # Example
///
/// ```no_run
/// inlist_grid::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Install a `debug` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
