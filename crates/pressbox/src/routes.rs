//! Route table assembly.
//!
//! Three chains are built once:
//!
//! ```text
//! standard  = recovery → request_log → common_headers        (wraps every route)
//! dynamic   = session → csrf → authenticate                  (page routes)
//! protected = dynamic → require_authentication               (logged-in only)
//! ```
//!
//! Static assets and `/ping` run on the standard chain alone.

use crate::app::AppContext;
use crate::handlers;
use http::Method;
use pressbox_middleware::stages::{
    AuthenticateMiddleware, CommonHeadersMiddleware, CsrfMiddleware, RecoveryMiddleware,
    RequestLogMiddleware, RequireAuthenticationMiddleware, SessionMiddleware,
};
use pressbox_middleware::{handler_fn, Chain, Endpoint, Handler};
use pressbox_router::RouteError;
use pressbox_server::{Routes, StaticFiles};
use std::sync::Arc;

/// The chain that wraps every route, including the 404 and 405 answers.
#[must_use]
pub fn standard_chain(app: &AppContext) -> Chain {
    Chain::new()
        .with(RecoveryMiddleware::new())
        .with(RequestLogMiddleware::new())
        .with(CommonHeadersMiddleware::new(&app.config().server.server_name))
}

/// The chain for pages that use the session.
#[must_use]
pub fn dynamic_chain(app: &AppContext) -> Chain {
    Chain::new()
        .with(SessionMiddleware::new(app.sessions().clone()))
        .with(CsrfMiddleware::new())
        .with(AuthenticateMiddleware::new(app.directory()))
}

/// Builds the site handler.
///
/// Fails if a (method, pattern) pair is registered twice.
pub fn routes(app: &Arc<AppContext>) -> Result<Arc<dyn Handler>, RouteError> {
    let none = Chain::new();
    let dynamic = dynamic_chain(app);
    let protected = dynamic.append(RequireAuthenticationMiddleware::new());

    let page = |endpoint: Endpoint<AppContext>| handler_fn(Arc::clone(app), endpoint);

    let mut table = Routes::new();
    table
        .handle(Method::GET, "/static/*path", &none, StaticFiles::new(&app.config().assets.dir))?
        .handle(Method::GET, "/ping", &none, page(handlers::ping))?
        .handle(Method::GET, "/", &dynamic, page(handlers::home))?
        .handle(Method::GET, "/item/view/{id}", &dynamic, page(handlers::item_view))?
        .handle(Method::GET, "/user/signup", &dynamic, page(handlers::user_signup))?
        .handle(Method::POST, "/user/signup", &dynamic, page(handlers::user_signup_post))?
        .handle(Method::GET, "/user/login", &dynamic, page(handlers::user_login))?
        .handle(Method::POST, "/user/login", &dynamic, page(handlers::user_login_post))?
        .handle(Method::GET, "/item/create", &protected, page(handlers::item_create))?
        .handle(Method::POST, "/item/create", &protected, page(handlers::item_create_post))?
        .handle(Method::POST, "/user/logout", &protected, page(handlers::user_logout_post))?;

    tracing::info!(routes = table.len(), "routes registered");
    Ok(table.build(&standard_chain(app)))
}
