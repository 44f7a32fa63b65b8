//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or `RUST_LOG` directive could not be parsed.
    #[error("Invalid log filter {filter:?}: {message}")]
    InvalidFilter {
        /// The directive that failed.
        filter: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
