//! # Pressbox Core
//!
//! Foundational types shared by every Pressbox crate:
//!
//! - [`PressError`] - The request-level error taxonomy and its HTTP mapping
//! - [`ErrorCategory`] - Classification used to pick status codes and log levels
//! - [`RequestId`] - UUID v7 request identifier
//! - [`UserId`] / [`Identity`] - Who is making the request

#![doc(html_root_url = "https://docs.rs/pressbox-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod identity;
mod request_id;

pub use error::{ErrorCategory, PressError, PressResult};
pub use identity::{Identity, UserId};
pub use request_id::RequestId;
