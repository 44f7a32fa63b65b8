//! Session cookie policy and load/commit logic.

use super::data::{Session, SessionStatus};
use super::store::SessionStore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;
use std::time::Duration;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Default session lifetime (12 hours).
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// Generates a 256-bit random token, URL-safe base64 encoded.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Loads sessions from request cookies and commits them to a store.
///
/// Shared by every request; holds no per-request state.
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use pressbox_middleware::session::{MemorySessionStore, SessionManager};
///
/// let manager = SessionManager::new(Arc::new(MemorySessionStore::new()))
///     .cookie_name("pressbox_session")
///     .lifetime(Duration::from_secs(3600))
///     .secure(false);
/// assert_eq!(manager.cookie_name_str(), "pressbox_session");
/// ```
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cookie_name: String,
    lifetime: Duration,
    secure: bool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie_name", &self.cookie_name)
            .field("lifetime", &self.lifetime)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager with default cookie settings over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            lifetime: DEFAULT_LIFETIME,
            secure: true,
        }
    }

    /// Sets the cookie name.
    pub fn cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Sets how long an idle session stays valid.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Whether the cookie carries the `Secure` attribute.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// The configured cookie name.
    #[must_use]
    pub fn cookie_name_str(&self) -> &str {
        &self.cookie_name
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Loads the session named by the request cookie.
    ///
    /// Unknown, expired or unreadable sessions yield a fresh one.
    pub async fn load(&self, headers: &HeaderMap) -> Session {
        let Some(token) = cookie_value(headers, &self.cookie_name) else {
            return Session::new();
        };

        match self.store.find(token).await {
            Ok(Some(data)) => Session::loaded(token.to_string(), data),
            Ok(None) => Session::new(),
            Err(error) => {
                tracing::error!(error = %error, "failed to load session; starting a new one");
                Session::new()
            }
        }
    }

    /// Persists `session` and writes the matching `Set-Cookie` header.
    ///
    /// Store failures are logged; the response has already been produced.
    pub async fn commit(&self, session: &Session, headers: &mut HeaderMap) {
        match session.status() {
            SessionStatus::Unmodified => {}
            SessionStatus::Destroyed => {
                if let Some(token) = session.token() {
                    if let Err(error) = self.store.delete(token).await {
                        tracing::error!(error = %error, "failed to delete session");
                    }
                }
                self.set_cookie(headers, &self.expired_cookie());
            }
            SessionStatus::Modified => {
                let token = if session.needs_new_token() {
                    generate_token()
                } else {
                    session.token().unwrap_or_default().to_string()
                };
                let expiry = Utc::now()
                    + chrono::Duration::from_std(self.lifetime)
                        .unwrap_or_else(|_| chrono::Duration::hours(12));

                if let Err(error) = self.store.commit(&token, session.data(), expiry).await {
                    tracing::error!(error = %error, "failed to save session");
                    return;
                }

                if let Some(old) = session.token().filter(|old| *old != token) {
                    if let Err(error) = self.store.delete(old).await {
                        tracing::warn!(error = %error, "failed to delete superseded session");
                    }
                }

                self.set_cookie(headers, &self.session_cookie(&token));
            }
        }
    }

    fn session_cookie(&self, token: &str) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.cookie_name,
            token,
            self.lifetime.as_secs()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn expired_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax",
            self.cookie_name
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn set_cookie(&self, headers: &mut HeaderMap, cookie: &str) {
        match HeaderValue::try_from(cookie) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
            }
            Err(_) => tracing::error!(cookie = %self.cookie_name, "session cookie is not a valid header value"),
        }
    }
}

/// Finds the value of cookie `name` across all `Cookie` headers.
#[must_use]
pub fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, SessionData};
    use pressbox_core::UserId;

    fn manager() -> (Arc<MemorySessionStore>, SessionManager) {
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(store.clone()).secure(false);
        (store, manager)
    }

    fn cookie_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    fn issued_token(headers: &HeaderMap) -> String {
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        let (pair, _) = cookie.split_once(';').unwrap();
        pair.split_once('=').unwrap().1.to_string()
    }

    #[test]
    fn test_generate_token_is_unique_and_urlsafe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_cookie_value_parsing() {
        let headers = cookie_headers("theme=dark; session=abc123; other=1");
        assert_eq!(cookie_value(&headers, "session"), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);

        let headers = cookie_headers("session=");
        assert_eq!(cookie_value(&headers, "session"), None);
    }

    #[tokio::test]
    async fn test_load_without_cookie_is_fresh() {
        let (_, manager) = manager();
        let session = manager.load(&HeaderMap::new()).await;
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_unmodified_session_writes_nothing() {
        let (store, manager) = manager();
        let mut headers = HeaderMap::new();
        manager.commit(&Session::new(), &mut headers).await;
        assert!(headers.get(SET_COOKIE).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_modified_session_round_trips_through_cookie() {
        let (_, manager) = manager();
        let mut session = Session::new();
        session.set_user_id(UserId::new(4));

        let mut response_headers = HeaderMap::new();
        manager.commit(&session, &mut response_headers).await;
        let cookie = response_headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let token = issued_token(&response_headers);
        let loaded = manager
            .load(&cookie_headers(&format!("session={token}")))
            .await;
        assert_eq!(loaded.user_id(), Some(UserId::new(4)));
        assert_eq!(loaded.token(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_renewal_replaces_token() {
        let (store, manager) = manager();
        store
            .commit(
                "old-token",
                &SessionData::default(),
                Utc::now() + chrono::Duration::hours(1),
            )
            .await
            .unwrap();

        let mut session = manager.load(&cookie_headers("session=old-token")).await;
        session.renew_token();
        session.set_user_id(UserId::new(1));

        let mut headers = HeaderMap::new();
        manager.commit(&session, &mut headers).await;
        let token = issued_token(&headers);

        assert_ne!(token, "old-token");
        assert!(store.find("old-token").await.unwrap().is_none());
        assert!(store.find(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_destroy_expires_cookie() {
        let (store, manager) = manager();
        store
            .commit("t", &SessionData::default(), Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        let mut session = manager.load(&cookie_headers("session=t")).await;
        session.destroy();

        let mut headers = HeaderMap::new();
        manager.commit(&session, &mut headers).await;
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_secure_attribute() {
        let manager = SessionManager::new(Arc::new(MemorySessionStore::new()));
        assert!(manager.session_cookie("x").ends_with("; Secure"));
    }
}
