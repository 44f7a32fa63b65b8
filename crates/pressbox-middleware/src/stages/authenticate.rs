//! Authentication context middleware.
//!
//! Resolves the user id stored in the session into an [`Identity`] on the
//! context. The id is only trusted after the [`UserDirectory`] confirms the
//! account still exists.
//!
//! # Chain Position
//!
//! ```text
//! ... → Session → Csrf → [Authenticate] → RequireAuthentication → Handler
//! ```
//!
//! # Failure Policy
//!
//! A directory error does not fail the request. The caller continues as
//! anonymous and the error is logged separately from the "user gone" case,
//! so protected routes still redirect to login.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response},
};
use pressbox_core::{Identity, UserId};
use std::sync::Arc;

/// Answers whether a user account exists.
pub trait UserDirectory: Send + Sync + 'static {
    /// Returns `Ok(true)` if `id` names a live account.
    fn exists<'a>(&'a self, id: UserId) -> BoxFuture<'a, Result<bool, anyhow::Error>>;
}

/// Sets [`MiddlewareContext::identity`] from the session.
#[derive(Clone)]
pub struct AuthenticateMiddleware {
    directory: Arc<dyn UserDirectory>,
}

impl std::fmt::Debug for AuthenticateMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateMiddleware").finish_non_exhaustive()
    }
}

impl AuthenticateMiddleware {
    /// Creates the middleware over a user directory.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    async fn resolve(&self, ctx: &MiddlewareContext, id: UserId) -> Identity {
        match self.directory.exists(id).await {
            Ok(true) => Identity::User(id),
            Ok(false) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    user_id = %id,
                    "session user no longer exists"
                );
                Identity::Anonymous
            }
            Err(error) => {
                tracing::error!(
                    request_id = %ctx.request_id(),
                    user_id = %id,
                    error = %error,
                    "identity lookup failed; continuing as anonymous"
                );
                Identity::Anonymous
            }
        }
    }
}

impl Middleware for AuthenticateMiddleware {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let identity = match ctx.session().and_then(|session| session.user_id()) {
                Some(id) => self.resolve(ctx, id).await,
                None => Identity::Anonymous,
            };
            ctx.set_identity(identity);

            next.run(ctx, request).await
        })
    }
}
