//! Anti-forgery (CSRF) middleware.
//!
//! Binds a random token to the session and requires state-changing requests
//! to echo it back, either as the `csrf_token` field of a urlencoded form
//! body or in the `X-CSRF-Token` header. Pages embed the token from
//! [`MiddlewareContext::csrf_token`] in a hidden form field.
//!
//! # Chain Position
//!
//! Must run inside the session middleware:
//!
//! ```text
//! ... → Session → [Csrf] → Authenticate → ... → Handler
//! ```
//!
//! A missing or mismatched token answers `400 Bad Request` before any
//! handler logic runs.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    session::generate_token,
    types::{Request, Response, ResponseExt},
};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderName, Method, StatusCode};
use http_body_util::{BodyExt, Full};

/// Form field carrying the token.
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// Header carrying the token for non-form requests.
pub static CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrf-token");

/// Rejects unsafe requests without a valid anti-forgery token.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsrfMiddleware;

impl CsrfMiddleware {
    /// Creates a new CSRF middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Methods that change server state and therefore need a token.
fn requires_token(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

/// Compares two tokens without short-circuiting on the first difference.
fn tokens_match(expected: &str, submitted: &str) -> bool {
    let (a, b) = (expected.as_bytes(), submitted.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"))
}

/// Pulls the submitted token from the header or the form body.
///
/// Returns the request rebuilt around the buffered body.
async fn submitted_token(request: Request) -> (Request, Option<String>) {
    if let Some(token) = request
        .headers()
        .get(&CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        let token = token.to_string();
        return (request, Some(token));
    }

    if !is_form(&request) {
        return (request, None);
    }

    let (parts, body) = request.into_parts();
    let bytes: Bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };
    let token = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
        .ok()
        .and_then(|pairs| {
            pairs
                .into_iter()
                .find(|(key, _)| key == CSRF_FORM_FIELD)
                .map(|(_, value)| value)
        });

    (Request::from_parts(parts, Full::new(bytes)), token)
}

impl Middleware for CsrfMiddleware {
    fn name(&self) -> &'static str {
        "csrf"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let Some(session) = ctx.session_mut() else {
                tracing::error!("csrf middleware requires the session middleware to run first");
                return Response::error(StatusCode::INTERNAL_SERVER_ERROR);
            };

            let expected = if let Some(token) = session.csrf_token() {
                token.to_string()
            } else {
                let token = generate_token();
                session.set_csrf_token(token.clone());
                token
            };

            let request = if requires_token(request.method()) {
                let (request, submitted) = submitted_token(request).await;
                let valid = submitted
                    .as_deref()
                    .is_some_and(|submitted| tokens_match(&expected, submitted));
                if !valid {
                    tracing::warn!(
                        request_id = %ctx.request_id(),
                        method = %request.method(),
                        uri = %request.uri(),
                        token_present = submitted.is_some(),
                        "rejected request with invalid csrf token"
                    );
                    return Response::error(StatusCode::BAD_REQUEST);
                }
                request
            } else {
                request
            };

            next.run(ctx, request).await
        })
    }
}
