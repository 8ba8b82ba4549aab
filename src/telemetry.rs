//! Telemetry and observability setup
//!
//! Configures structured logging with tracing and tracing-subscriber.
//! Logs go to stderr; stdout carries only the response.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Build the filter used when `RUST_LOG` is not set
pub fn default_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("azprompt={}", default_level))
        .unwrap_or_else(|_| EnvFilter::new("azprompt=warn"))
}

/// Initialize tracing subscriber for structured logging
///
/// This can only be called once per process. Subsequent calls are silently ignored.
///
/// Reads log level from RUST_LOG environment variable, defaulting to the
/// level specified in config (or "warn" if not set).
///
/// # Examples
///
/// ```no_run
/// azprompt::telemetry::init("info");
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(default_level));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    });
}
