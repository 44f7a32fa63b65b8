//! Common types used throughout the middleware chain.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use http::StatusCode;
use http_body_util::Full;

/// The HTTP request type used in the middleware chain.
///
/// Bodies are fully buffered by the server before dispatch.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware chain.
pub type Response = http::Response<Full<Bytes>>;

/// Extension trait for building common responses.
pub trait ResponseExt {
    /// A `text/plain` response.
    fn text(status: StatusCode, body: impl Into<Bytes>) -> Response;

    /// A `text/html` response.
    fn html(status: StatusCode, body: impl Into<Bytes>) -> Response;

    /// A plain-text error response carrying the canonical reason phrase.
    fn error(status: StatusCode) -> Response;

    /// A redirect to `location` with the given 3xx status.
    ///
    /// Falls back to a 500 if `location` is not a valid header value.
    fn redirect(status: StatusCode, location: &str) -> Response;
}

impl ResponseExt for Response {
    fn text(status: StatusCode, body: impl Into<Bytes>) -> Response {
        with_body(status, "text/plain; charset=utf-8", body.into())
    }

    fn html(status: StatusCode, body: impl Into<Bytes>) -> Response {
        with_body(status, "text/html; charset=utf-8", body.into())
    }

    fn error(status: StatusCode) -> Response {
        let reason = status.canonical_reason().unwrap_or("Error");
        Self::text(status, Bytes::from(reason))
    }

    fn redirect(status: StatusCode, location: &str) -> Response {
        match HeaderValue::try_from(location) {
            Ok(value) => {
                let mut response = with_body(status, "text/plain; charset=utf-8", Bytes::new());
                response.headers_mut().insert(LOCATION, value);
                response
            }
            Err(_) => Self::error(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
