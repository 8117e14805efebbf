//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    // A second initialisation (tests, embedding apps) is not an error
    let _ = env_logger::try_init();
}

/// Initialize the logging system with a default filter such as `"info"` or
/// `"scene_renderer=debug"`. `RUST_LOG` still takes precedence when set.
pub fn init_with_level(filter: &str) {
    let env = env_logger::Env::default().default_filter_or(filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
