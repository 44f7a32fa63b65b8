use super::see_other;
use crate::app::{AppContext, RequestLine};
use crate::forms::{decode_form, ItemCreateForm};
use crate::store::StoreError;
use http::StatusCode;
use pressbox_middleware::{BoxFuture, MiddlewareContext, Request, Response, ResponseExt};

/// `GET /item/view/{id}`.
///
/// A missing, non-numeric or non-positive id is a 404, as is an unknown or
/// expired item.
pub fn item_view<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let Some(id) = ctx
            .params()
            .get("id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|id| *id >= 1)
        else {
            return Response::error(StatusCode::NOT_FOUND);
        };

        let item = match app.items().get(id).await {
            Ok(item) => item,
            Err(StoreError::NotFound) => return Response::error(StatusCode::NOT_FOUND),
            Err(e) => return app.error_response(ctx, &line, e.into()),
        };

        match app.new_envelope(ctx).with_payload("item", &item) {
            Ok(envelope) => app.render(ctx, &line, StatusCode::OK, "view.html", &envelope),
            Err(e) => app.error_response(ctx, &line, e.into()),
        }
    })
}

/// `GET /item/create`: the empty form, expiry preset to one year.
pub fn item_create<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        render_form(app, ctx, &line, StatusCode::OK, &ItemCreateForm::default())
    })
}

/// `POST /item/create`.
pub fn item_create_post<'a>(
    app: &'a AppContext,
    ctx: &'a mut MiddlewareContext,
    request: Request,
) -> BoxFuture<'a, Response> {
    Box::pin(async move {
        let line = RequestLine::of(&request);
        let mut form: ItemCreateForm = match decode_form(request).await {
            Ok(form) => form,
            Err(e) => return app.error_response(ctx, &line, e),
        };

        if !form.validate() {
            return render_form(app, ctx, &line, StatusCode::UNPROCESSABLE_ENTITY, &form);
        }

        let id = match app.items().insert(&form.title, &form.content, form.expires).await {
            Ok(id) => id,
            Err(e) => return app.error_response(ctx, &line, e.into()),
        };

        tracing::info!(
            request_id = %ctx.request_id(),
            user_id = %ctx.identity().log_id(),
            item_id = id,
            "item created"
        );
        if let Some(session) = ctx.session_mut() {
            session.put_flash("Item successfully created!");
        }
        see_other(&format!("/item/view/{id}"))
    })
}

fn render_form(
    app: &AppContext,
    ctx: &mut MiddlewareContext,
    line: &RequestLine,
    status: StatusCode,
    form: &ItemCreateForm,
) -> Response {
    match app.new_envelope(ctx).with_form(form) {
        Ok(envelope) => app.render(ctx, line, status, "create.html", &envelope),
        Err(e) => app.error_response(ctx, line, e.into()),
    }
}
