//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the environment
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with an explicit filter string
///
/// The filter uses `env_logger` syntax (e.g. `"info"` or `"scene2d=debug"`);
/// the `RUST_LOG` environment variable still takes precedence.
pub fn init_with_filter(filter: &str) {
    env_logger::Builder::from_default_env()
        .parse_filters(filter)
        .init();
}
