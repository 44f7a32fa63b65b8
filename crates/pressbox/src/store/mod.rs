//! Domain stores.
//!
//! Handlers reach persistence only through the [`ItemStore`] and
//! [`UserStore`] traits. Both return [`BoxFuture`]s so a database backend can
//! replace the in-memory reference implementations without touching the
//! handlers.
//!
//! [`BoxFuture`]: pressbox_middleware::BoxFuture

mod items;
mod users;

pub use items::{Item, ItemStore, MemoryItemStore, LATEST_LIMIT};
pub use users::{MemoryUserStore, User, UserStore};

use http::StatusCode;
use pressbox_core::PressError;
use thiserror::Error;

/// Errors returned by the stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matches, or the record has expired.
    #[error("no matching record found")]
    NotFound,

    /// A user with this email address already exists.
    #[error("email address is already in use")]
    DuplicateEmail,

    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backing storage failed.
    #[error("store backend failure: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<StoreError> for PressError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => PressError::not_found("no matching record"),
            StoreError::DuplicateEmail => PressError::client_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                "email address is already in use",
            ),
            StoreError::InvalidCredentials => PressError::authentication("invalid credentials"),
            StoreError::Backend(source) => PressError::internal_with_source("store failure", source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressbox_core::ErrorCategory;

    #[test]
    fn test_conversion_to_press_error() {
        assert_eq!(
            PressError::from(StoreError::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PressError::from(StoreError::DuplicateEmail).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PressError::from(StoreError::InvalidCredentials).category(),
            ErrorCategory::Authentication
        );

        let backend = PressError::from(StoreError::Backend(anyhow::anyhow!("disk full")));
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!backend.public_message().contains("disk"));
    }
}
