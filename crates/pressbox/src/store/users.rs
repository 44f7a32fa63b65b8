//! Registered users and password checks.

use super::StoreError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pressbox_core::UserId;
use pressbox_middleware::stages::UserDirectory;
use pressbox_middleware::BoxFuture;
use serde::Serialize;

/// A registered user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email address.
    pub email: String,
    /// PHC-formatted Argon2id hash.
    #[serde(skip)]
    pub password_hash: String,
    /// Registration time.
    pub created: DateTime<Utc>,
}

/// Access to registered users.
///
/// Stores also implement [`UserDirectory`] so the authentication middleware
/// can confirm that a session's user still exists.
pub trait UserStore: Send + Sync + 'static {
    /// Registers a user and returns the new id.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    fn insert<'a>(
        &'a self,
        name: &'a str,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<UserId, StoreError>>;

    /// Checks a login and returns the user's id.
    ///
    /// Fails with [`StoreError::InvalidCredentials`] for an unknown email or a
    /// wrong password.
    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<UserId, StoreError>>;

    /// Whether a user with this id exists.
    fn exists(&self, id: UserId) -> BoxFuture<'_, Result<bool, StoreError>>;
}

/// In-memory [`UserStore`] with Argon2id password hashes.
///
/// Hashing and verification run on the blocking pool.
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
    hasher: Argon2<'static>,
}

impl std::fmt::Debug for MemoryUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUserStore")
            .field("users", &self.len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    /// Creates an empty store using the default Argon2id cost.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Creates an empty store with explicit Argon2id cost parameters.
    ///
    /// Tests use a low memory cost to keep hashing fast.
    #[must_use]
    pub fn with_params(params: Params) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    /// Whether no user has registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users.read().iter().any(|user| user.email == email)
    }
}

impl UserStore for MemoryUserStore {
    fn insert<'a>(
        &'a self,
        name: &'a str,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<UserId, StoreError>> {
        Box::pin(async move {
            if self.email_taken(email) {
                return Err(StoreError::DuplicateEmail);
            }

            let password_hash = hash_password(self.hasher.clone(), password.to_string()).await?;

            let mut users = self.users.write();
            // Another signup may have claimed the address while hashing.
            if users.iter().any(|user| user.email == email) {
                return Err(StoreError::DuplicateEmail);
            }
            let id = UserId::new(i64::try_from(users.len()).unwrap_or(i64::MAX - 1) + 1);
            users.push(User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
                created: Utc::now(),
            });
            drop(users);

            tracing::debug!(user_id = %id, "user registered");
            Ok(id)
        })
    }

    fn authenticate<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<UserId, StoreError>> {
        Box::pin(async move {
            let found = self
                .users
                .read()
                .iter()
                .find(|user| user.email == email)
                .map(|user| (user.id, user.password_hash.clone()));
            let Some((id, password_hash)) = found else {
                return Err(StoreError::InvalidCredentials);
            };

            if verify_password(self.hasher.clone(), password.to_string(), password_hash).await? {
                Ok(id)
            } else {
                Err(StoreError::InvalidCredentials)
            }
        })
    }

    fn exists(&self, id: UserId) -> BoxFuture<'_, Result<bool, StoreError>> {
        Box::pin(async move { Ok(self.users.read().iter().any(|user| user.id == id)) })
    }
}

impl UserDirectory for MemoryUserStore {
    fn exists<'a>(&'a self, id: UserId) -> BoxFuture<'a, Result<bool, anyhow::Error>> {
        Box::pin(async move { UserStore::exists(self, id).await.map_err(anyhow::Error::from) })
    }
}

async fn hash_password(hasher: Argon2<'static>, password: String) -> Result<String, StoreError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| StoreError::Backend(e.into()))?
}

async fn verify_password(
    hasher: Argon2<'static>,
    password: String,
    password_hash: String,
) -> Result<bool, StoreError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("stored hash is malformed: {e}")))?;
        match hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(StoreError::Backend(anyhow::anyhow!(
                "password verification failed: {e}"
            ))),
        }
    })
    .await
    .map_err(|e| StoreError::Backend(e.into()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryUserStore {
        MemoryUserStore::with_params(Params::new(8, 1, 1, None).unwrap())
    }

    #[tokio::test]
    async fn test_register_and_authenticate() {
        let users = store();
        let id = UserStore::insert(&users, "Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();
        assert_eq!(id, UserId::new(1));

        let logged_in = users.authenticate("alice@example.com", "pa55word!").await.unwrap();
        assert_eq!(logged_in, id);
        assert!(UserStore::exists(&users, id).await.unwrap());
        assert!(!UserStore::exists(&users, UserId::new(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_hash_is_not_the_password() {
        let users = store();
        UserStore::insert(&users, "Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();
        let hash = users.users.read()[0].password_hash.clone();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pa55word!"));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let users = store();
        UserStore::insert(&users, "Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();
        let second = UserStore::insert(&users, "Mallory", "alice@example.com", "other-pass").await;
        assert!(matches!(second, Err(StoreError::DuplicateEmail)));
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let users = store();
        UserStore::insert(&users, "Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();

        let wrong_password = users.authenticate("alice@example.com", "guess").await;
        assert!(matches!(wrong_password, Err(StoreError::InvalidCredentials)));

        let unknown = users.authenticate("bob@example.com", "pa55word!").await;
        assert!(matches!(unknown, Err(StoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_directory_view() {
        let users = store();
        let id = UserStore::insert(&users, "Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();
        assert!(UserDirectory::exists(&users, id).await.unwrap());
    }
}
