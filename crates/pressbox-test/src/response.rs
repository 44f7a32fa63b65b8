//! Test response wrapper.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::BodyExt;
use pressbox_middleware::Response;
use regex::Regex;
use std::sync::OnceLock;

/// A buffered response with assertion helpers.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Buffers a handler response.
    pub async fn from_response(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value by name.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name).and_then(|v| v.to_str().ok())
    }

    /// The `Location` header of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.header_str(header::LOCATION.as_str())
    }

    /// All `Set-Cookie` values.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Returns the raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as a string.
    pub fn text(&self) -> Result<String, TestError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| TestError::BodyRead(format!("invalid UTF-8: {e}")))
    }

    /// Extracts the anti-forgery token from a rendered form.
    ///
    /// Looks for the first `<input name="csrf_token" value="...">`.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        static FIELD: OnceLock<Regex> = OnceLock::new();
        let field = FIELD.get_or_init(|| {
            Regex::new(r#"name=['"]csrf_token['"][^>]*?value=['"]([^'"]+)['"]"#)
                .unwrap_or_else(|e| panic!("csrf token pattern: {e}"))
        });
        let body = std::str::from_utf8(&self.body).ok()?;
        field
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|value| value.as_str().to_string())
    }

    // Assertions

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code differs.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "expected status {expected}, got {}; body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Asserts a `303 See Other` to `location`.
    ///
    /// # Panics
    ///
    /// Panics on any other status or location.
    pub fn assert_redirect(&self, location: &str) -> &Self {
        self.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(self.location(), Some(location), "redirect location");
        self
    }

    /// Asserts that a header has the expected value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        let actual = self
            .header_str(name)
            .unwrap_or_else(|| panic!("header '{name}' not found"));
        assert_eq!(actual, expected.as_ref(), "header '{name}'");
        self
    }

    /// Asserts that the body contains `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the body is not UTF-8 or lacks the substring.
    pub fn assert_body_contains(&self, expected: impl AsRef<str>) -> &Self {
        let expected = expected.as_ref();
        let body = String::from_utf8_lossy(&self.body);
        assert!(
            body.contains(expected),
            "body should contain '{expected}', got: {body}"
        );
        self
    }

    /// Asserts that the body does not contain `unexpected`.
    ///
    /// # Panics
    ///
    /// Panics if the substring is present.
    pub fn assert_body_lacks(&self, unexpected: impl AsRef<str>) -> &Self {
        let unexpected = unexpected.as_ref();
        let body = String::from_utf8_lossy(&self.body);
        assert!(
            !body.contains(unexpected),
            "body should not contain '{unexpected}', got: {body}"
        );
        self
    }
}
