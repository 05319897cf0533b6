//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem
//! - Configure log level via `RUST_LOG`-style environment filter
//!
//! Initialization happens after the daemonization fork, on the side that
//! keeps running; while startup diagnostics still go to the attached
//! stderr, after readiness they belong to whatever collector the
//! operator points the process at.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatewayd=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
