//! Error types for Pressbox.
//!
//! [`PressError`] is the error type handlers and application code return.
//! Every variant belongs to an [`ErrorCategory`] which decides the HTTP
//! status of the response and whether the detail may be shown to the client.
//!
//! | Category | Status | Exposed to client |
//! |---|---|---|
//! | `ClientInput` | 400 | generic status text |
//! | `NotFound` | 404 | generic status text |
//! | `Authentication` | 303 / 400 | handled by middleware |
//! | `Configuration` | n/a | fatal at startup |
//! | `Internal` | 500 | never |

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`PressError`].
pub type PressResult<T> = Result<T, PressError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or invalid client input.
    ClientInput,
    /// The addressed resource does not exist.
    NotFound,
    /// Missing identity or failed anti-forgery check.
    Authentication,
    /// Invalid startup configuration (routes, templates, config files).
    Configuration,
    /// Anything else. Details are logged, never returned.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::ClientInput | Self::Authentication => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether errors of this category indicate a server-side fault.
    #[must_use]
    pub const fn is_server_fault(&self) -> bool {
        matches!(self, Self::Configuration | Self::Internal)
    }
}

/// Standard error type for Pressbox request handling.
///
/// # Example
///
/// ```
/// use pressbox_core::{ErrorCategory, PressError};
///
/// fn parse_id(raw: &str) -> Result<i64, PressError> {
///     match raw.parse::<i64>() {
///         Ok(id) if id >= 1 => Ok(id),
///         _ => Err(PressError::not_found(format!("no item with id {raw:?}"))),
///     }
/// }
///
/// assert_eq!(parse_id("0").unwrap_err().category(), ErrorCategory::NotFound);
/// ```
#[derive(Error, Debug)]
pub enum PressError {
    /// The request could not be understood.
    #[error("Client error: {message}")]
    ClientInput {
        /// Human-readable error message.
        message: String,
        /// Status to answer with (400 unless overridden).
        status: StatusCode,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// Identity missing or request forged.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
    },

    /// Startup configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl PressError {
    /// Creates a `400 Bad Request` client error.
    #[must_use]
    pub fn client(message: impl Into<String>) -> Self {
        Self::ClientInput {
            message: message.into(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    /// Creates a client error answered with a specific 4xx status.
    #[must_use]
    pub fn client_with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::ClientInput {
            message: message.into(),
            status,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ClientInput { .. } => ErrorCategory::ClientInput,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Authentication { .. } => ErrorCategory::Authentication,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ClientInput { status, .. } => *status,
            _ => self.category().default_status_code(),
        }
    }

    /// The text sent to the client: the canonical reason phrase only.
    #[must_use]
    pub fn public_message(&self) -> &'static str {
        self.status_code()
            .canonical_reason()
            .unwrap_or("Unknown Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error() {
        let error = PressError::client("bad form body");
        assert_eq!(error.category(), ErrorCategory::ClientInput);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(error.to_string().contains("bad form body"));
    }

    #[test]
    fn test_client_error_with_status() {
        let error = PressError::client_with_status(StatusCode::UNPROCESSABLE_ENTITY, "invalid");
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.public_message(), "Unprocessable Entity");
    }

    #[test]
    fn test_not_found() {
        let error = PressError::not_found("item 42");
        assert_eq!(error.category(), ErrorCategory::NotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_hides_detail() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = PressError::internal_with_source("store failed", source);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.public_message(), "Internal Server Error");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_server_fault_categories() {
        assert!(ErrorCategory::Internal.is_server_fault());
        assert!(ErrorCategory::Configuration.is_server_fault());
        assert!(!ErrorCategory::NotFound.is_server_fault());
        assert!(!ErrorCategory::ClientInput.is_server_fault());
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::ClientInput).unwrap();
        assert_eq!(json, "\"client_input\"");
    }
}
