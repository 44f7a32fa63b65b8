//! Authorization gate for protected routes.
//!
//! Anonymous callers are redirected to the login page with `303 See Other`
//! and the terminal handler never runs. Authenticated responses are marked
//! `Cache-Control: no-store` so pages behind the gate are not kept by
//! shared caches.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use http::header::{HeaderValue, CACHE_CONTROL};
use http::StatusCode;

/// Default login path anonymous callers are sent to.
pub const DEFAULT_LOGIN_PATH: &str = "/user/login";

/// Requires an authenticated identity on the context.
#[derive(Debug, Clone)]
pub struct RequireAuthenticationMiddleware {
    login_path: String,
}

impl Default for RequireAuthenticationMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl RequireAuthenticationMiddleware {
    /// Redirects to [`DEFAULT_LOGIN_PATH`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_login_path(DEFAULT_LOGIN_PATH)
    }

    /// Redirects to `path` instead of the default login page.
    #[must_use]
    pub fn with_login_path(path: impl Into<String>) -> Self {
        Self {
            login_path: path.into(),
        }
    }

    /// The redirect target.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

impl Middleware for RequireAuthenticationMiddleware {
    fn name(&self) -> &'static str {
        "require_authentication"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if !ctx.is_authenticated() {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    uri = %request.uri(),
                    "anonymous request to protected route"
                );
                return Response::redirect(StatusCode::SEE_OTHER, &self.login_path);
            }

            let mut response = next.run(ctx, request).await;
            response
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
            response
        })
    }
}
