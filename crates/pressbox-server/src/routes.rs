//! The route table.
//!
//! [`Routes`] collects `(method, pattern)` entries, each closed over its own
//! route chain, and [`Routes::build`] wraps the finished table in the
//! standard chain so that 404 and 405 responses pass through it as well.
//! Requests whose body the server could not read are answered here too, with
//! the status of their [`BodyError`](pressbox_middleware::BodyError).
//!
//! ```
//! use std::sync::Arc;
//! use http::{Method, StatusCode};
//! use pressbox_middleware::stages::RecoveryMiddleware;
//! use pressbox_middleware::{handler_fn, BoxFuture, Chain, MiddlewareContext, Request, Response, ResponseExt};
//! use pressbox_server::Routes;
//!
//! fn ping<'a>(_: &'a (), _: &'a mut MiddlewareContext, _: Request) -> BoxFuture<'a, Response> {
//!     Box::pin(async { Response::text(StatusCode::OK, "OK") })
//! }
//!
//! let standard = Chain::new().with(RecoveryMiddleware::new());
//! let mut routes = Routes::new();
//! routes.handle(Method::GET, "/ping", &Chain::new(), handler_fn(Arc::new(()), ping)).unwrap();
//!
//! let site = routes.build(&standard);
//! # let _ = site;
//! ```

use std::sync::Arc;

use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use pressbox_middleware::{
    BoxFuture, Chain, ChainedHandler, Handler, MiddlewareContext, Request, Response, ResponseExt,
};
use pressbox_router::{Lookup, RouteError, Router};

/// Registration table mapping method and pattern to a composed handler.
#[derive(Default)]
pub struct Routes {
    router: Router<ChainedHandler>,
}

impl Routes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` behind `chain` for `method` and `pattern`.
    ///
    /// Registering the same method and pattern twice fails with
    /// [`RouteError::Duplicate`].
    pub fn handle<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        chain: &Chain,
        handler: H,
    ) -> Result<&mut Self, RouteError> {
        let composed = chain.then(handler);
        tracing::debug!(
            method = %method,
            pattern,
            chain = ?composed.names(),
            "route registered"
        );
        self.router.insert(method, pattern, composed)?;
        Ok(self)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Freezes the table and wraps it in `standard`.
    #[must_use]
    pub fn build(self, standard: &Chain) -> Arc<dyn Handler> {
        Arc::new(standard.then(RouteTable {
            router: self.router,
        }))
    }
}

struct RouteTable {
    router: Router<ChainedHandler>,
}

impl Handler for RouteTable {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if let Some(error) = ctx.body_error() {
                return Response::error(error.status());
            }
            match self.router.lookup(request.method(), request.uri().path()) {
                Lookup::Found(found) => {
                    ctx.set_params(found.params);
                    found.value.call(ctx, request).await
                }
                Lookup::MethodNotAllowed(allowed) => method_not_allowed(&allowed),
                Lookup::NotFound => Response::error(StatusCode::NOT_FOUND),
            }
        })
    }
}

fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = Response::error(StatusCode::METHOD_NOT_ALLOWED);
    let list = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&list) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}
