//! Structured logging for Pressbox.
//!
//! Every crate logs through `tracing` macros; this crate installs the
//! process-wide subscriber once at startup from a [`LogConfig`].
//!
//! # Field Conventions
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `request_id` | UUID v7 assigned when the request is accepted |
//! | `ip` | Peer address, `-` if unknown |
//! | `proto` | HTTP version |
//! | `method` / `uri` | Request line |
//! | `status` | Response status code |
//! | `duration_ms` | Time from accept to response |
//! | `user_id` | Authenticated user |
//! | `page` | Template page name |
//! | `error` | Display form of an error |

#![doc(html_root_url = "https://docs.rs/pressbox-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
