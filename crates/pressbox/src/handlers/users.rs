use super::see_other;
use crate::app::{AppContext, RequestLine};
use crate::forms::{decode_form, UserLoginForm, UserSignupForm};
use crate::store::StoreError;
use http::StatusCode;
use pressbox_core::PressError;
use pressbox_middleware::stages::DEFAULT_LOGIN_PATH;
use pressbox_middleware::{BoxFuture, MiddlewareContext, Request, Response};
use serde::Serialize;

/// Where a successful login lands.
const AFTER_LOGIN_PATH: &str = "/item/create";

/// `GET /user/signup`.
pub fn user_signup<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        render_form(app, ctx, &line, StatusCode::OK, "signup.html", &UserSignupForm::default())
    })
}

/// `POST /user/signup`.
pub fn user_signup_post<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let mut form: UserSignupForm = match decode_form(request).await {
            Ok(form) => form,
            Err(e) => return app.error_response(ctx, &line, e),
        };

        if !form.validate() {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_form(app, ctx, &line, status, "signup.html", &form);
        }

        match app.users().insert(&form.name, &form.email, &form.password).await {
            Ok(id) => {
                tracing::info!(request_id = %ctx.request_id(), user_id = %id, "user signed up");
            }
            Err(StoreError::DuplicateEmail) => {
                form.validator.add_field_error("email", "Email address is already in use");
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                return render_form(app, ctx, &line, status, "signup.html", &form);
            }
            Err(e) => return app.error_response(ctx, &line, e.into()),
        }

        if let Some(session) = ctx.session_mut() {
            session.put_flash("Your signup was successful. Please log in.");
        }
        see_other(DEFAULT_LOGIN_PATH)
    })
}

/// `GET /user/login`.
pub fn user_login<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        render_form(app, ctx, &line, StatusCode::OK, "login.html", &UserLoginForm::default())
    })
}

/// `POST /user/login`.
///
/// Renews the session token before storing the user id.
pub fn user_login_post<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let mut form: UserLoginForm = match decode_form(request).await {
            Ok(form) => form,
            Err(e) => return app.error_response(ctx, &line, e),
        };

        if !form.validate() {
            let status = StatusCode::UNPROCESSABLE_ENTITY;
            return render_form(app, ctx, &line, status, "login.html", &form);
        }

        let id = match app.users().authenticate(&form.email, &form.password).await {
            Ok(id) => id,
            Err(StoreError::InvalidCredentials) => {
                form.validator.add_non_field_error("Email or password is incorrect");
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                return render_form(app, ctx, &line, status, "login.html", &form);
            }
            Err(e) => return app.error_response(ctx, &line, e.into()),
        };

        let Some(session) = ctx.session_mut() else {
            return app.error_response(ctx, &line, missing_session());
        };
        session.renew_token();
        session.set_user_id(id);

        tracing::info!(request_id = %ctx.request_id(), user_id = %id, "user logged in");
        see_other(AFTER_LOGIN_PATH)
    })
}

/// `POST /user/logout`.
pub fn user_logout_post<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let Some(session) = ctx.session_mut() else {
            return app.error_response(ctx, &line, missing_session());
        };
        session.renew_token();
        let user_id = session.remove_user_id();
        session.put_flash("You've been logged out successfully!");

        tracing::info!(
            request_id = %ctx.request_id(),
            user_id = user_id.map(|id| id.get()),
            "user logged out"
        );
        see_other("/")
    })
}

fn render_form<T: Serialize>(
    app: &AppContext,
    ctx: &mut MiddlewareContext,
    line: &RequestLine,
    status: StatusCode,
    page: &str,
    form: &T,
) -> Response {
    match app.new_envelope(ctx).with_form(form) {
        Ok(envelope) => app.render(ctx, line, status, page, &envelope),
        Err(e) => app.error_response(ctx, line, e.into()),
    }
}

fn missing_session() -> PressError {
    PressError::configuration("route has no session middleware")
}
