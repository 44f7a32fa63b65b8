//! Core middleware and handler traits.
//!
//! A [`Middleware`] wraps the rest of the chain: it receives the request
//! together with a [`Next`] continuation and decides whether (and how) to
//! call it. A [`Handler`] is the terminal unit that produces the response.
//!
//! # Example
//!
//! ```
//! use pressbox_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request, Response};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(ctx, request).await;
//!             tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "done");
//!             response
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of cross-cutting request processing.
///
/// Middleware holds no per-request state; anything a later unit needs goes
/// into the [`MiddlewareContext`]. Not calling `next.run()` short-circuits
/// the rest of the chain, including the terminal handler.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and chain listings.
    fn name(&self) -> &'static str;

    /// Process the request through this middleware.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// The terminal request handler at the end of a chain.
pub trait Handler: Send + Sync + 'static {
    /// Produces the response for `request`.
    fn call<'a>(&'a self, ctx: &'a mut MiddlewareContext, request: Request)
        -> BoxFuture<'a, Response>;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        (**self).call(ctx, request)
    }
}

/// Continuation to the rest of the chain.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the handler
    Handler(&'a dyn Handler),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that runs `middleware` before `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub fn handler(handler: &'a dyn Handler) -> Self {
        Self {
            inner: NextInner::Handler(handler),
        }
    }

    /// Invokes the next middleware or the handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler.call(ctx, request).await,
        }
    }
}

/// Signature of a stateful endpoint function usable with [`handler_fn`].
pub type Endpoint<S> =
    for<'a> fn(&'a S, &'a mut MiddlewareContext, Request) -> BoxFuture<'a, Response>;

/// A [`Handler`] built from shared state and a plain function.
///
/// Created by [`handler_fn`].
pub struct StateHandler<S> {
    state: Arc<S>,
    endpoint: Endpoint<S>,
}

/// Turns `endpoint` into a [`Handler`] that receives `state` on every call.
///
/// ```
/// use std::sync::Arc;
/// use http::StatusCode;
/// use pressbox_middleware::{handler_fn, BoxFuture, MiddlewareContext, Request, Response, ResponseExt};
///
/// struct Greeting(&'static str);
///
/// fn greet<'a>(
///     state: &'a Greeting,
///     _ctx: &'a mut MiddlewareContext,
///     _request: Request,
/// ) -> BoxFuture<'a, Response> {
///     Box::pin(async move { Response::text(StatusCode::OK, state.0) })
/// }
///
/// let handler = handler_fn(Arc::new(Greeting("hello")), greet);
/// # let _ = handler;
/// ```
pub fn handler_fn<S: Send + Sync + 'static>(state: Arc<S>, endpoint: Endpoint<S>) -> StateHandler<S> {
    StateHandler { state, endpoint }
}

impl<S: Send + Sync + 'static> Handler for StateHandler<S> {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        (self.endpoint)(&self.state, ctx, request)
    }
}
