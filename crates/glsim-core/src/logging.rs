//! `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "glsim=debug,glsim_core=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global fmt subscriber.
///
/// Panics if a global subscriber has already been installed; use
/// [`try_init`] from tests.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(filter()).init();
}

/// Install a global fmt subscriber unless one is already present.
///
/// Output goes through the test writer so it is captured per test.
pub fn try_init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init();
}
