//! Panic recovery middleware.
//!
//! Catches panics raised anywhere further down the chain, logs them and
//! answers with a bare `500 Internal Server Error`. Whatever the panicking
//! handler had produced so far is discarded.
//!
//! # Chain Position
//!
//! Recovery must be the outermost unit so that it also covers panics raised
//! by other middleware:
//!
//! ```text
//! Request → [Recovery] → RequestLog → CommonHeaders → ... → Handler
//! ```
//!
//! The response carries `Connection: close`; the server drops the connection
//! after writing it. It also carries the default headers recorded on the
//! context by the units the panic unwound through.
//!
//! # Stack Context
//!
//! [`install_panic_hook`] (run once by [`RecoveryMiddleware::new`]) wraps the
//! process panic hook. On every panic it captures the location and a
//! backtrace into a thread-local slot before delegating to the previous hook.
//! Recovery takes that report on the same thread and logs it with the
//! request id.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    types::{Request, Response, ResponseExt},
};
use futures_util::FutureExt;
use http::header::{HeaderValue, CONNECTION};
use http::StatusCode;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::sync::Once;

/// Location and backtrace of the last panic raised on this thread.
#[derive(Debug, Clone)]
pub struct PanicReport {
    /// `file:line:column` of the panic, when known.
    pub location: Option<String>,
    /// Rendered backtrace.
    pub backtrace: String,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

/// Installs the panic hook that records [`PanicReport`]s.
///
/// Idempotent. The previous hook still runs after the report is recorded.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let report = PanicReport {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture().to_string(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(report));
            previous(info);
        }));
    });
}

/// Takes the report of the last panic on this thread, if one was recorded.
pub fn take_panic_report() -> Option<PanicReport> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

/// Converts panics into generic 500 responses.
#[derive(Debug, Clone, Copy)]
pub struct RecoveryMiddleware;

impl Default for RecoveryMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryMiddleware {
    /// Creates a new recovery middleware and installs the panic hook.
    #[must_use]
    pub fn new() -> Self {
        install_panic_hook();
        Self
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Middleware for RecoveryMiddleware {
    fn name(&self) -> &'static str {
        "recovery"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let method = request.method().clone();
            let uri = request.uri().clone();

            take_panic_report();
            let outcome = AssertUnwindSafe(next.run(ctx, request)).catch_unwind().await;
            match outcome {
                Ok(response) => response,
                Err(payload) => {
                    let report = take_panic_report();
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        method = %method,
                        uri = %uri,
                        panic = panic_message(payload.as_ref()),
                        location = report.as_ref().and_then(|r| r.location.as_deref()),
                        backtrace = report.as_ref().map(|r| r.backtrace.as_str()),
                        "recovered from panic while handling request"
                    );
                    let mut response = Response::error(StatusCode::INTERNAL_SERVER_ERROR);
                    ctx.apply_default_headers(response.headers_mut());
                    response
                        .headers_mut()
                        .insert(CONNECTION, HeaderValue::from_static("close"));
                    response
                }
            }
        })
    }
}
