//! The per-request session object.

use pressbox_core::UserId;
use serde::{Deserialize, Serialize};

/// Values persisted between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// The logged-in user, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// A one-shot message shown on the next rendered page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    /// Anti-forgery token bound to this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

/// What the session middleware must do with a session after the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing changed; no write, no cookie.
    Unmodified,
    /// Data changed; save and (re)issue the cookie.
    Modified,
    /// Delete from the store and expire the cookie.
    Destroyed,
}

/// A session loaded for one request.
///
/// Every mutation marks the session [`SessionStatus::Modified`] so the
/// session middleware knows to write it back.
///
/// ```
/// use pressbox_core::UserId;
/// use pressbox_middleware::session::{Session, SessionStatus};
///
/// let mut session = Session::new();
/// assert_eq!(session.status(), SessionStatus::Unmodified);
///
/// session.set_user_id(UserId::new(1));
/// assert_eq!(session.status(), SessionStatus::Modified);
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<String>,
    data: SessionData,
    status: SessionStatus,
    renew: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session with no token yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: None,
            data: SessionData::default(),
            status: SessionStatus::Unmodified,
            renew: false,
        }
    }

    /// A session found in the store under `token`.
    #[must_use]
    pub fn loaded(token: String, data: SessionData) -> Self {
        Self {
            token: Some(token),
            data,
            status: SessionStatus::Unmodified,
            renew: false,
        }
    }

    /// The token the client presented, if the session existed.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Current write-back status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Whether a new token must be issued on commit.
    #[must_use]
    pub fn needs_new_token(&self) -> bool {
        self.renew || self.token.is_none()
    }

    /// The stored values.
    #[must_use]
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// The authenticated user id stored at login.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.data.user_id
    }

    /// Stores the authenticated user id.
    pub fn set_user_id(&mut self, id: UserId) {
        self.data.user_id = Some(id);
        self.touch();
    }

    /// Removes the authenticated user id.
    pub fn remove_user_id(&mut self) -> Option<UserId> {
        let removed = self.data.user_id.take();
        self.touch();
        removed
    }

    /// Stores a flash message for the next page view.
    pub fn put_flash(&mut self, message: impl Into<String>) {
        self.data.flash = Some(message.into());
        self.touch();
    }

    /// The flash message, left in place.
    #[must_use]
    pub fn flash(&self) -> Option<&str> {
        self.data.flash.as_deref()
    }

    /// Removes and returns the flash message.
    pub fn pop_flash(&mut self) -> Option<String> {
        let flash = self.data.flash.take();
        if flash.is_some() {
            self.touch();
        }
        flash
    }

    /// The anti-forgery token, once issued.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.data.csrf_token.as_deref()
    }

    /// Binds an anti-forgery token to the session.
    pub fn set_csrf_token(&mut self, token: String) {
        self.data.csrf_token = Some(token);
        self.touch();
    }

    /// Requests a new session token on commit, keeping the data.
    ///
    /// Call on privilege changes (login, logout) to prevent session fixation.
    pub fn renew_token(&mut self) {
        self.renew = true;
        self.touch();
    }

    /// Clears all data and removes the session from the store on commit.
    pub fn destroy(&mut self) {
        self.data = SessionData::default();
        self.status = SessionStatus::Destroyed;
    }

    fn touch(&mut self) {
        if self.status == SessionStatus::Destroyed {
            self.renew = true;
        }
        self.status = SessionStatus::Modified;
    }
}
