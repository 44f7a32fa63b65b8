//! Template errors.

use pressbox_core::PressError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the cache or rendering a page.
///
/// Build errors (`Io`, `Parse`, `DuplicatePage`, `Inventory`) are fatal at
/// startup. Render-time errors (`PageNotFound`, `Context`, `Render`) are
/// server faults answered with a generic 500.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A template file could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A template set failed to compile (syntax or inheritance).
    #[error("failed to compile page {page}: {message}")]
    Parse {
        /// Page whose set failed.
        page: String,
        /// Engine message including its causes.
        message: String,
    },

    /// Two page files share the same name.
    #[error("duplicate page {name}: {} and {}", first.display(), second.display())]
    DuplicatePage {
        /// The shared page name.
        name: String,
        /// File registered first.
        first: PathBuf,
        /// File that collided with it.
        second: PathBuf,
    },

    /// The inventory is incomplete or names an unusable file.
    #[error("invalid template inventory: {0}")]
    Inventory(String),

    /// No page with this name was built.
    #[error("page {0} is not in the template cache")]
    PageNotFound(String),

    /// Render data could not be serialized.
    #[error("invalid render data for {key}: {message}")]
    Context {
        /// Envelope key being inserted.
        key: String,
        /// Serialization error message.
        message: String,
    },

    /// Execution of a page failed.
    #[error("failed to render page {page}: {message}")]
    Render {
        /// The page being rendered.
        page: String,
        /// Engine message including its causes.
        message: String,
    },
}

impl TemplateError {
    /// Whether this error can only happen while building the cache.
    #[must_use]
    pub const fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Parse { .. } | Self::DuplicatePage { .. } | Self::Inventory(_)
        )
    }
}

impl From<TemplateError> for PressError {
    fn from(error: TemplateError) -> Self {
        if error.is_build_error() {
            PressError::configuration(error.to_string())
        } else {
            PressError::internal_with_source("template rendering failed", error)
        }
    }
}

/// Flattens a tera error and its causes into one line.
///
/// Tera reports the interesting part (line, column, missing variable) in the
/// source chain, not the top-level message.
pub(crate) fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
