//! Terminal request handlers.
//!
//! Every handler has the [`Endpoint`](pressbox_middleware::Endpoint) shape so
//! it can be wrapped with [`handler_fn`](pressbox_middleware::handler_fn)
//! around the shared [`AppContext`].

mod items;
mod users;

pub use items::{item_create, item_create_post, item_view};
pub use users::{user_login, user_login_post, user_logout_post, user_signup, user_signup_post};

use crate::app::{AppContext, RequestLine};
use http::StatusCode;
use pressbox_middleware::{BoxFuture, MiddlewareContext, Request, Response, ResponseExt};

/// `GET /ping`: liveness check.
pub fn ping<'a>(
    _app: &'a AppContext,
    _ctx: &'a mut MiddlewareContext,
    _request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async { Response::text(StatusCode::OK, "OK") })
}

/// `GET /`: the latest items.
pub fn home<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let items = match app.items().latest().await {
            Ok(items) => items,
            Err(e) => return app.error_response(ctx, &line, e.into()),
        };

        match app.new_envelope(ctx).with_payload("items", &items) {
            Ok(envelope) => app.render(ctx, &line, StatusCode::OK, "home.html", &envelope),
            Err(e) => app.error_response(ctx, &line, e.into()),
        }
    })
}

/// A `303 See Other` to `location`.
fn see_other(location: &str) -> Response {
    Response::redirect(StatusCode::SEE_OTHER, location)
}
