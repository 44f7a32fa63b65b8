//! Session persistence.
//!
//! [`SessionStore`] is the seam to a real backend. [`MemorySessionStore`]
//! keeps sessions in a concurrent map and is what the binary and tests use.

use super::data::SessionData;
use crate::middleware::BoxFuture;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use thiserror::Error;

/// Errors reported by a session backend.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend could not be reached or failed the operation.
    #[error("session backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

/// Storage for session data keyed by token.
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the data stored under `token`, unless absent or expired.
    fn find<'a>(&'a self, token: &'a str)
        -> BoxFuture<'a, Result<Option<SessionData>, SessionError>>;

    /// Inserts or replaces the data under `token` until `expiry`.
    fn commit<'a>(
        &'a self,
        token: &'a str,
        data: &'a SessionData,
        expiry: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<(), SessionError>>;

    /// Removes `token`. Deleting an unknown token is not an error.
    fn delete<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), SessionError>>;
}

#[derive(Debug, Clone)]
struct Entry {
    data: SessionData,
    expiry: DateTime<Utc>,
}

/// In-process session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Entry>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired session and returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expiry > now);
        before - self.sessions.len()
    }

    /// Number of stored sessions, including expired ones not yet cleaned up.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn find<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Option<SessionData>, SessionError>> {
        Box::pin(async move {
            let now = Utc::now();
            let found = self.sessions.get(token).map(|e| (e.data.clone(), e.expiry));
            match found {
                Some((data, expiry)) if expiry > now => Ok(Some(data)),
                Some(_) => {
                    self.sessions.remove(token);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn commit<'a>(
        &'a self,
        token: &'a str,
        data: &'a SessionData,
        expiry: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.sessions.insert(
                token.to_string(),
                Entry {
                    data: data.clone(),
                    expiry,
                },
            );
            Ok(())
        })
    }

    fn delete<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            self.sessions.remove(token);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn data_with_flash(flash: &str) -> SessionData {
        SessionData {
            flash: Some(flash.to_string()),
            ..SessionData::default()
        }
    }

    #[tokio::test]
    async fn test_commit_then_find() {
        let store = MemorySessionStore::new();
        let data = data_with_flash("hi");
        store
            .commit("tok", &data, Utc::now() + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.find("tok").await.unwrap(), Some(data));
        assert_eq!(store.find("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_not_found() {
        let store = MemorySessionStore::new();
        store
            .commit("old", &SessionData::default(), Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        assert_eq!(store.find("old").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_cleanup() {
        let store = MemorySessionStore::new();
        let live = Utc::now() + Duration::hours(1);
        let dead = Utc::now() - Duration::hours(1);
        store.commit("a", &SessionData::default(), live).await.unwrap();
        store.commit("b", &SessionData::default(), dead).await.unwrap();
        store.commit("c", &SessionData::default(), dead).await.unwrap();

        store.delete("a").await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.cleanup(), 2);
        assert!(store.is_empty());
    }
}
