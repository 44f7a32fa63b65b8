//! Session load-and-save middleware.
//!
//! Loads the session named by the request cookie into the context before
//! the rest of the chain runs, and commits it once the response exists.
//!
//! # Chain Position
//!
//! ```text
//! ... → CommonHeaders → [Session] → Csrf → Authenticate → ... → Handler
//! ```
//!
//! The session is committed on every exit path. If a unit further in
//! panics, the session is saved first and the panic is then resumed so the
//! recovery middleware still answers with a 500.

use crate::{
    context::MiddlewareContext,
    middleware::{BoxFuture, Middleware, Next},
    session::SessionManager,
    types::{Request, Response},
};
use futures_util::FutureExt;
use http::HeaderMap;
use std::panic::AssertUnwindSafe;

/// Attaches a [`Session`](crate::session::Session) to every request.
#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    manager: SessionManager,
}

impl SessionMiddleware {
    /// Creates the middleware over a shared session manager.
    #[must_use]
    pub fn new(manager: SessionManager) -> Self {
        Self { manager }
    }
}

impl Middleware for SessionMiddleware {
    fn name(&self) -> &'static str {
        "session"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let session = self.manager.load(request.headers()).await;
            ctx.set_session(session);

            let outcome = AssertUnwindSafe(next.run(ctx, request)).catch_unwind().await;
            let session = ctx.take_session();

            match outcome {
                Ok(mut response) => {
                    if let Some(session) = session {
                        self.manager.commit(&session, response.headers_mut()).await;
                    }
                    response
                }
                Err(payload) => {
                    if let Some(session) = session {
                        // The cookie cannot reach the client; the 500 is built upstream.
                        let mut discarded = HeaderMap::new();
                        self.manager.commit(&session, &mut discarded).await;
                    }
                    std::panic::resume_unwind(payload)
                }
            }
        })
    }
}
