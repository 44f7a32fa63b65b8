//! Security and server headers applied to every response.
//!
//! # Chain Position
//!
//! ```text
//! Request → Recovery → RequestLog → [CommonHeaders] → route chain → Handler
//! ```
//!
//! # Headers
//!
//! | Header | Value |
//! |---|---|
//! | `Content-Security-Policy` | `default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com` |
//! | `Referrer-Policy` | `origin-when-cross-origin` |
//! | `X-Content-Type-Options` | `nosniff` |
//! | `X-Frame-Options` | `deny` |
//! | `X-XSS-Protection` | `0` |
//! | `Server` | configured server name |
//!
//! A value already set by the handler is kept. The headers are recorded on
//! the [`MiddlewareContext`] before the rest of the chain runs, so the
//! recovery unit adds them to the 500 it builds after a panic.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response},
};
use http::header::{
    HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, REFERRER_POLICY, SERVER,
    X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};

/// Content security policy sent with every response.
pub const CONTENT_SECURITY_POLICY_VALUE: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// Adds the standard security headers.
#[derive(Debug, Clone)]
pub struct CommonHeadersMiddleware {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl CommonHeadersMiddleware {
    /// Creates the middleware announcing `server_name` in the `Server` header.
    ///
    /// A name that is not a valid header value falls back to `pressbox`.
    #[must_use]
    pub fn new(server_name: &str) -> Self {
        let server = HeaderValue::from_str(server_name)
            .unwrap_or_else(|_| HeaderValue::from_static("pressbox"));
        Self {
            headers: vec![
                (
                    CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
                ),
                (
                    REFERRER_POLICY,
                    HeaderValue::from_static("origin-when-cross-origin"),
                ),
                (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
                (X_FRAME_OPTIONS, HeaderValue::from_static("deny")),
                (X_XSS_PROTECTION, HeaderValue::from_static("0")),
                (SERVER, server),
            ],
        }
    }
}

impl Middleware for CommonHeadersMiddleware {
    fn name(&self) -> &'static str {
        "common_headers"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            for (name, value) in &self.headers {
                ctx.insert_default_header(name.clone(), value.clone());
            }
            let mut response = next.run(ctx, request).await;
            ctx.apply_default_headers(response.headers_mut());
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Handler;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;

    struct FramedHandler;

    impl Handler for FramedHandler {
        fn call<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async {
                let mut response = Response::text(StatusCode::OK, "ok");
                response
                    .headers_mut()
                    .insert(X_FRAME_OPTIONS, HeaderValue::from_static("sameorigin"));
                response
            })
        }
    }

    struct NotFound;

    impl Handler for NotFound {
        fn call<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { Response::error(StatusCode::NOT_FOUND) })
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_sets_all_headers_even_on_errors() {
        let middleware = CommonHeadersMiddleware::new("pressbox");
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(), Next::handler(&NotFound))
            .await;

        let headers = response.headers();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            headers.get(CONTENT_SECURITY_POLICY).unwrap(),
            CONTENT_SECURITY_POLICY_VALUE
        );
        assert_eq!(headers.get(REFERRER_POLICY).unwrap(), "origin-when-cross-origin");
        assert_eq!(headers.get(X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "deny");
        assert_eq!(headers.get(X_XSS_PROTECTION).unwrap(), "0");
        assert_eq!(headers.get(SERVER).unwrap(), "pressbox");
    }

    #[tokio::test]
    async fn test_handler_value_wins() {
        let middleware = CommonHeadersMiddleware::new("pressbox");
        let mut ctx = MiddlewareContext::new();

        let response = middleware
            .process(&mut ctx, request(), Next::handler(&FramedHandler))
            .await;

        assert_eq!(response.headers().get(X_FRAME_OPTIONS).unwrap(), "sameorigin");
    }

    #[tokio::test]
    async fn test_headers_recorded_before_next() {
        let middleware = CommonHeadersMiddleware::new("pressbox");
        let mut ctx = MiddlewareContext::new();

        middleware
            .process(&mut ctx, request(), Next::handler(&NotFound))
            .await;

        assert_eq!(ctx.default_headers().get(X_FRAME_OPTIONS).unwrap(), "deny");
        assert_eq!(ctx.default_headers().get(SERVER).unwrap(), "pressbox");
    }

    #[test]
    fn test_invalid_server_name_falls_back() {
        let middleware = CommonHeadersMiddleware::new("bad\nname");
        assert!(middleware
            .headers
            .iter()
            .any(|(name, value)| name == SERVER && value == "pressbox"));
    }
}
