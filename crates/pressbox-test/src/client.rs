//! Test client for in-memory HTTP testing.

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;
use http::header::{self, HeaderValue};
use http::Method;
use parking_lot::Mutex;
use pressbox_middleware::{Handler, MiddlewareContext, Request};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

/// Drives a site handler in memory, like a browser with cookies enabled.
///
/// Every `Set-Cookie` in a response is stored and sent back on later
/// requests. A cookie with `Max-Age=0` is removed.
///
/// ```ignore
/// let client = TestClient::new(site);
///
/// let form = client.get("/user/login").send().await;
/// let token = form.csrf_token().unwrap();
///
/// client
///     .post("/user/login")
///     .form(&[("email", "alice@example.com"), ("password", "secret99"), ("csrf_token", &token)])
///     .send()
///     .await
///     .assert_redirect("/item/create");
/// ```
#[must_use]
pub struct TestClient {
    handler: Arc<dyn Handler>,
    remote_addr: SocketAddr,
    cookies: Mutex<BTreeMap<String, String>>,
}

impl TestClient {
    /// Creates a client for `handler`.
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            remote_addr: SocketAddr::from(([127, 0, 0, 1], 52_000)),
            cookies: Mutex::new(BTreeMap::new()),
        }
    }

    /// Sets the peer address reported to the site.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = addr;
        self
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest {
            client: self,
            request: TestRequest::new(method, uri),
        }
    }

    /// The stored value of cookie `name`.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.lock().get(name).cloned()
    }

    /// Forgets every stored cookie.
    pub fn clear_cookies(&self) {
        self.cookies.lock().clear();
    }

    /// Sends an already built request, with stored cookies attached.
    pub async fn send_request(&self, mut request: Request) -> TestResponse {
        if let Some(value) = self.cookie_header() {
            request.headers_mut().insert(header::COOKIE, value);
        }

        let mut ctx = MiddlewareContext::with_remote_addr(self.remote_addr);
        let response = TestResponse::from_response(self.handler.call(&mut ctx, request).await).await;

        self.store_cookies(&response);
        response
    }

    fn cookie_header(&self) -> Option<HeaderValue> {
        let cookies = self.cookies.lock();
        if cookies.is_empty() {
            return None;
        }
        let joined = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }

    fn store_cookies(&self, response: &TestResponse) {
        let mut cookies = self.cookies.lock();
        for set_cookie in response.set_cookies() {
            let Some((name, value, expired)) = parse_set_cookie(set_cookie) else {
                continue;
            };
            if expired {
                cookies.remove(name);
            } else {
                cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

/// Splits a `Set-Cookie` value into name, value and whether it expires the
/// cookie.
fn parse_set_cookie(set_cookie: &str) -> Option<(&str, &str, bool)> {
    let mut parts = set_cookie.split(';').map(str::trim);
    let (name, value) = parts.next()?.split_once('=')?;
    let expired = value.is_empty()
        || parts.any(|attribute| attribute.eq_ignore_ascii_case("max-age=0"));
    Some((name, value, expired))
}

/// A request bound to a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets a form body.
    pub fn form<T: Serialize + ?Sized>(mut self, fields: &T) -> Self {
        self.request = self.request.form(fields);
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request is malformed; use [`try_send`](Self::try_send)
    /// to get the error instead.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("invalid test request: {e}"),
        }
    }

    /// Sends the request, reporting a malformed request as an error.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self.request.build()?;
        Ok(self.client.send_request(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use pressbox_middleware::{BoxFuture, Response, ResponseExt};

    /// Echoes the Cookie header and sets cookies named by the path.
    struct CookieEcho;

    impl Handler for CookieEcho {
        fn call<'a>(
            &'a self,
            _ctx: &'a mut MiddlewareContext,
            request: Request,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                let sent = request
                    .headers()
                    .get(header::COOKIE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                let mut response = Response::text(StatusCode::OK, sent);
                let set = match request.uri().path() {
                    "/login" => Some("session=abc; Path=/; HttpOnly"),
                    "/logout" => Some("session=; Path=/; Max-Age=0"),
                    _ => None,
                };
                if let Some(set) = set {
                    response
                        .headers_mut()
                        .append(header::SET_COOKIE, HeaderValue::from_static(set));
                }
                response
            })
        }
    }

    #[tokio::test]
    async fn test_cookie_round_trip() {
        let client = TestClient::new(Arc::new(CookieEcho));

        let first = client.get("/login").send().await;
        assert_eq!(first.text().unwrap(), "");
        assert_eq!(client.cookie("session").as_deref(), Some("abc"));

        let second = client.get("/").send().await;
        assert_eq!(second.text().unwrap(), "session=abc");

        client.get("/logout").send().await;
        assert_eq!(client.cookie("session"), None);
        assert_eq!(client.get("/").send().await.text().unwrap(), "");
    }

    #[tokio::test]
    async fn test_malformed_request_is_an_error() {
        let client = TestClient::new(Arc::new(CookieEcho));
        let result = client.get("/").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[test]
    fn test_parse_set_cookie() {
        assert_eq!(
            parse_set_cookie("session=abc; Path=/; Max-Age=43200"),
            Some(("session", "abc", false))
        );
        assert_eq!(
            parse_set_cookie("session=; Path=/; Max-Age=0"),
            Some(("session", "", true))
        );
        assert_eq!(parse_set_cookie("garbage"), None);
    }
}
