// ABOUTME: Logging setup for the emojipost binary
// ABOUTME: Installs a tracing-subscriber fmt layer filtered by RUST_LOG

use emojipost_config::constants;
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

pub fn init_logging() {
    let filter = EnvFilter::try_from_env(constants::RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
