//! Per-request context.
//!
//! [`MiddlewareContext`] carries everything the chain learns about a request
//! through typed accessors: the request id, the peer address, the loaded
//! session, the resolved identity and the matched path parameters. It also
//! holds the default response headers so that a response built outside the
//! unit that chose them (a recovered panic) still carries them.

use crate::session::Session;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use pressbox_core::{Identity, RequestId};
use pressbox_router::Params;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Why the server could not read a request body.
///
/// The server still runs the chain for such requests, with an empty body, so
/// logging and headers apply; the route table answers with
/// [`status`](Self::status) instead of dispatching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// The body exceeded the configured limit.
    TooLarge,
    /// The body could not be read.
    Unreadable,
}

impl BodyError {
    /// Status the request is answered with.
    #[must_use]
    pub fn status(self) -> http::StatusCode {
        match self {
            Self::TooLarge => http::StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unreadable => http::StatusCode::BAD_REQUEST,
        }
    }
}

/// Context that flows through the middleware chain.
///
/// # Example
///
/// ```
/// use pressbox_core::{Identity, UserId};
/// use pressbox_middleware::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// assert!(!ctx.is_authenticated());
///
/// ctx.set_identity(Identity::User(UserId::new(3)));
/// assert!(ctx.is_authenticated());
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    remote_addr: Option<SocketAddr>,
    started_at: Instant,
    identity: Identity,
    session: Option<Session>,
    params: Params,
    default_headers: HeaderMap,
    body_error: Option<BodyError>,
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            remote_addr: None,
            started_at: Instant::now(),
            identity: Identity::Anonymous,
            session: None,
            params: Params::new(),
            default_headers: HeaderMap::new(),
            body_error: None,
        }
    }

    /// Creates a context for a request received from `addr`.
    #[must_use]
    pub fn with_remote_addr(addr: SocketAddr) -> Self {
        Self {
            remote_addr: Some(addr),
            ..Self::new()
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the peer address, when known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Returns the caller identity.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Sets the caller identity.
    ///
    /// Only the authentication middleware should call this.
    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    /// Whether the request carries a verified user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_authenticated()
    }

    /// The session attached by the session middleware.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Mutable access to the attached session.
    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    /// Attaches a session.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Detaches the session, leaving none.
    pub fn take_session(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// The anti-forgery token of the current session, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<&str> {
        self.session.as_ref().and_then(Session::csrf_token)
    }

    /// The one-shot flash message, without consuming it.
    #[must_use]
    pub fn flash(&self) -> Option<&str> {
        self.session.as_ref().and_then(Session::flash)
    }

    /// Removes and returns the one-shot flash message.
    pub fn pop_flash(&mut self) -> Option<String> {
        self.session.as_mut().and_then(Session::pop_flash)
    }

    /// Matched path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Sets the matched path parameters.
    ///
    /// Called by the route table before the route chain runs.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// The body read failure recorded by the server, if any.
    #[must_use]
    pub fn body_error(&self) -> Option<BodyError> {
        self.body_error
    }

    /// Records that the request body could not be read.
    pub fn set_body_error(&mut self, error: BodyError) {
        self.body_error = Some(error);
    }

    /// Records a header every response to this request should carry.
    pub fn insert_default_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.default_headers.insert(name, value);
    }

    /// Headers recorded with [`insert_default_header`](Self::insert_default_header).
    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Copies the default headers into `headers`, keeping values already set.
    pub fn apply_default_headers(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.default_headers {
            headers.entry(name).or_insert_with(|| value.clone());
        }
    }
}
