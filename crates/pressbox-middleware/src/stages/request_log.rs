//! Request logging middleware.
//!
//! Emits one structured `info` event when a request arrives and one when
//! its response is ready.
//!
//! # Chain Position
//!
//! Directly inside recovery, so it logs everything including static assets
//! and 404s:
//!
//! ```text
//! Request → Recovery → [RequestLog] → CommonHeaders → ... → Handler
//! ```
//!
//! # Fields
//!
//! - `request_id` - Unique request identifier
//! - `ip` - Peer IP address, `-` when unknown
//! - `proto` - HTTP version, e.g. `HTTP/1.1`
//! - `method` / `uri` - Request line
//! - `status` / `duration_ms` - On completion only

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response},
};

/// Logs each request and its outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    /// Creates a new request log middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let ip = ctx
                .remote_addr()
                .map_or_else(|| "-".to_string(), |addr| addr.ip().to_string());
            let proto = format!("{:?}", request.version());
            let method = request.method().clone();
            let uri = request.uri().clone();
            let request_id = ctx.request_id();

            tracing::info!(
                request_id = %request_id,
                ip = %ip,
                proto = %proto,
                method = %method,
                uri = %uri,
                "received request"
            );

            let response = next.run(ctx, request).await;

            tracing::info!(
                request_id = %request_id,
                method = %method,
                uri = %uri,
                status = response.status().as_u16(),
                duration_ms = ctx.elapsed().as_secs_f64() * 1000.0,
                "request completed"
            );

            response
        })
    }
}
