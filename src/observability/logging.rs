//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per binary
//! - Honour `RUST_LOG`, falling back to the configured level
//! - Write to stderr so CLI output on stdout stays parseable

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Default filter directive for a log level.
pub fn default_filter(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("devfetch={level},devfetch_server={level},tower_http={level}")
}

/// Install the global subscriber. Calling twice is harmless.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config.log_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
