//! Logger for tests.
//!
//! Installs a `tracing` subscriber that writes through the test harness, so output is only shown for
//! failing tests. The filter is read from `RUST_LOG` and defaults to `debug`.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static LOGGER_INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    // Another subscriber may already be installed by the test binary, which is fine.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
});

/// Installs the test subscriber, once per process.
pub fn init() {
    Lazy::force(&LOGGER_INIT);
}
