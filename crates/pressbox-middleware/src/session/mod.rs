//! Server-side sessions.
//!
//! A session is identified by a random token in an `HttpOnly` cookie; the
//! data lives in a [`SessionStore`]. [`SessionManager`] owns the cookie
//! policy, and the session middleware uses it to load a [`Session`] before
//! the rest of the chain runs and to commit it afterwards.

mod data;
mod manager;
mod store;

pub use data::{Session, SessionData, SessionStatus};
pub use manager::{cookie_value, generate_token, SessionManager, DEFAULT_COOKIE_NAME, DEFAULT_LIFETIME};
pub use store::{MemorySessionStore, SessionError, SessionStore};
