// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is up to the embedding application. [`init_logging`] is a convenience
//! for binaries and demos that drive the engine directly:
//! 1. `TOPODAG_LOG` environment variable (a level name or any `EnvFilter`
//!    directive)
//! 2. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for application
//! output.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise a global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_env("TOPODAG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
