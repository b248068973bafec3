// Logging setup
// Installs a tracing subscriber; RUST_LOG overrides the level passed in

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging with a specific level (trace, debug, info, warn, error)
/// Output goes to stderr so it never mixes with query results
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging for tests
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
