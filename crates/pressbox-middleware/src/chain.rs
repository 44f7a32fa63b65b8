//! Middleware chains.
//!
//! A [`Chain`] is an ordered, immutable list of middleware. The first unit is
//! the outermost: it sees the request first and the response last.
//!
//! ```text
//! chain [A, B, C].then(H)
//!
//! Request → A → B → C → H
//!                        ↓
//! Response ← A ← B ← C ←─┘
//! ```
//!
//! Chains are values. [`Chain::append`] and [`Chain::concat`] return new
//! chains and leave the receiver untouched, so a base chain can be shared
//! between route groups:
//!
//! ```
//! use pressbox_middleware::Chain;
//! use pressbox_middleware::stages::{CommonHeadersMiddleware, RecoveryMiddleware, RequireAuthenticationMiddleware};
//!
//! let standard = Chain::new()
//!     .with(RecoveryMiddleware::new())
//!     .with(CommonHeadersMiddleware::new("pressbox"));
//! let protected = standard.append(RequireAuthenticationMiddleware::new());
//!
//! assert_eq!(standard.names(), vec!["recovery", "common_headers"]);
//! assert_eq!(protected.names(), vec!["recovery", "common_headers", "require_authentication"]);
//! ```

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Handler, Middleware, Next};
use crate::types::{Request, Response};
use std::sync::Arc;

/// A type-erased middleware that can be shared between chains.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An ordered, immutable sequence of middleware.
#[derive(Clone, Default)]
pub struct Chain {
    units: Vec<BoxedMiddleware>,
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("units", &self.names()).finish()
    }
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append that consumes `self`.
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.units.push(Arc::new(middleware));
        self
    }

    /// Returns a new chain with `middleware` added innermost.
    pub fn append<M: Middleware>(&self, middleware: M) -> Self {
        self.append_shared(Arc::new(middleware))
    }

    /// Returns a new chain with an already shared unit added innermost.
    pub fn append_shared(&self, middleware: BoxedMiddleware) -> Self {
        let mut units = self.units.clone();
        units.push(middleware);
        Self { units }
    }

    /// Returns a new chain running `self`'s units, then `other`'s.
    pub fn concat(&self, other: &Chain) -> Self {
        let mut units = Vec::with_capacity(self.units.len() + other.units.len());
        units.extend(self.units.iter().cloned());
        units.extend(other.units.iter().cloned());
        Self { units }
    }

    /// Wraps `handler` with every unit of the chain.
    ///
    /// The chain is copied into the result; later changes to other chains
    /// built from `self` do not affect it.
    pub fn then<H: Handler>(&self, handler: H) -> ChainedHandler {
        ChainedHandler {
            units: self.units.clone().into(),
            handler: Arc::new(handler),
        }
    }

    /// Names of the units, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.units.iter().map(|unit| unit.name()).collect()
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` for a chain with no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// A chain composed with its terminal handler.
pub struct ChainedHandler {
    units: Arc<[BoxedMiddleware]>,
    handler: Arc<dyn Handler>,
}

impl ChainedHandler {
    /// Names of the wrapping units, outermost first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.units.iter().map(|unit| unit.name()).collect()
    }

    fn build_next(&self) -> Next<'_> {
        let mut next = Next::handler(self.handler.as_ref());
        for middleware in self.units.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }
}

impl Handler for ChainedHandler {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { self.build_next().run(ctx, request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseExt;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records entry and exit around `next`.
    struct OrderTrackingMiddleware {
        name: &'static str,
        log: Log,
    }

    impl Middleware for OrderTrackingMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}:in", self.name));
                let response = next.run(ctx, request).await;
                self.log.lock().unwrap().push(format!("{}:out", self.name));
                response
            })
        }
    }

    struct Gate;

    impl Middleware for Gate {
        fn name(&self) -> &'static str {
            "gate"
        }

        fn process<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
            _next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async { Response::redirect(StatusCode::SEE_OTHER, "/user/login") })
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        log: Log,
    }

    impl Handler for CountingHandler {
        fn call<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            _request: Request,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.log.lock().unwrap().push("handler".to_string());
                Response::text(StatusCode::OK, "OK")
            })
        }
    }

    fn tracker(name: &'static str, log: &Log) -> OrderTrackingMiddleware {
        OrderTrackingMiddleware {
            name,
            log: log.clone(),
        }
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_units_wrap_outer_to_inner() {
        let log: Log = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Chain::new()
            .with(tracker("a", &log))
            .with(tracker("b", &log))
            .with(tracker("c", &log));

        let handler = chain.then(CountingHandler {
            calls: calls.clone(),
            log: log.clone(),
        });
        let mut ctx = MiddlewareContext::new();
        let response = handler.call(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:in", "b:in", "c:in", "handler", "c:out", "b:out", "a:out"]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_short_circuit_never_reaches_handler() {
        let log: Log = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = Chain::new().with(tracker("outer", &log)).with(Gate).with(tracker("inner", &log));

        let handler = chain.then(CountingHandler {
            calls: calls.clone(),
            log: log.clone(),
        });
        let mut ctx = MiddlewareContext::new();
        let response = handler.call(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(*log.lock().unwrap(), vec!["outer:in", "outer:out"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_append_leaves_source_untouched() {
        let log: Log = Arc::default();
        let base = Chain::new().with(tracker("base", &log));
        let extended = base.append(Gate);

        assert_eq!(base.names(), vec!["base"]);
        assert_eq!(extended.names(), vec!["base", "gate"]);

        let calls = Arc::new(AtomicUsize::new(0));
        let handler = base.then(CountingHandler {
            calls: calls.clone(),
            log: log.clone(),
        });
        let mut ctx = MiddlewareContext::new();
        let response = handler.call(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concat_orders_units() {
        let log: Log = Arc::default();
        let first = Chain::new().with(tracker("one", &log)).with(tracker("two", &log));
        let second = Chain::new().with(tracker("three", &log));

        let joined = first.concat(&second);
        assert_eq!(joined.names(), vec!["one", "two", "three"]);
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_calls_handler_directly() {
        let log: Log = Arc::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = Chain::new().then(CountingHandler {
            calls: calls.clone(),
            log,
        });
        assert!(handler.names().is_empty());

        let mut ctx = MiddlewareContext::new();
        handler.call(&mut ctx, request()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
