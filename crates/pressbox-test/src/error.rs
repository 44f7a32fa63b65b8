//! Test error types.

use thiserror::Error;

/// Errors raised while building or sending a test request.
#[derive(Debug, Error)]
pub enum TestError {
    /// The URI or another request part is malformed.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A form body could not be encoded.
    #[error("form encoding error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// The response body could not be read as text.
    #[error("body read error: {0}")]
    BodyRead(String),
}
