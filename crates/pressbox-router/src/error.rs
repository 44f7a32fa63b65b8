//! Route registration errors.

use http::Method;
use thiserror::Error;

/// Errors raised while building a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method and pattern pair is already registered.
    #[error("duplicate route: {method} {pattern}")]
    Duplicate {
        /// Method of the conflicting registration.
        method: Method,
        /// Pattern of the conflicting registration.
        pattern: String,
    },

    /// The pattern cannot be represented in the tree.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl RouteError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
