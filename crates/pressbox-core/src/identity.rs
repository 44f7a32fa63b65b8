//! Caller identity.
//!
//! An [`Identity`] is either anonymous or an authenticated [`UserId`]. The
//! authentication middleware resolves it from the session once per request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw user id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The identity a request is made under.
///
/// # Example
///
/// ```
/// use pressbox_core::{Identity, UserId};
///
/// let identity = Identity::User(UserId::new(7));
/// assert!(identity.is_authenticated());
/// assert_eq!(identity.log_id(), "user:7");
/// assert!(!Identity::Anonymous.is_authenticated());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Identity {
    /// No authenticated user.
    #[default]
    Anonymous,
    /// A verified, still-existing user.
    User(UserId),
}

impl Identity {
    /// Returns `true` for [`Identity::User`].
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    /// Returns the user id, if authenticated.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Anonymous => None,
        }
    }

    /// A string suitable for log fields.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}
