//! Test request building.

use crate::error::TestError;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use pressbox_middleware::Request;
use serde::Serialize;

/// Builder for a request sent through a [`TestClient`](crate::TestClient) or
/// straight into a handler.
///
/// Invalid parts are remembered and reported by [`TestRequest::build`], so
/// the builder methods can be chained without `?`.
///
/// ```
/// use pressbox_test::TestRequest;
///
/// let request = TestRequest::post("/item/create")
///     .form(&[("title", "O snail"), ("expires", "7")])
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     request.headers()["content-type"],
///     "application/x-www-form-urlencoded"
/// );
/// ```
#[must_use]
#[derive(Debug)]
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest {
    /// Starts a request with any method.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    /// Starts a GET request.
    pub fn get(uri: impl AsRef<str>) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(uri: impl AsRef<str>) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Starts a HEAD request.
    pub fn head(uri: impl AsRef<str>) -> Self {
        Self::new(Method::HEAD, uri)
    }

    /// The request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Sets a header, replacing any earlier value.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name_str = name.as_ref();
        match (
            HeaderName::try_from(name_str),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => self.fail(TestError::InvalidHeader(name_str.to_string())),
        }
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets an `application/x-www-form-urlencoded` body.
    pub fn form<T: Serialize + ?Sized>(mut self, fields: &T) -> Self {
        match serde_urlencoded::to_string(fields) {
            Ok(encoded) => {
                self.body = Bytes::from(encoded);
                self.content_type("application/x-www-form-urlencoded")
            }
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Whether a header is already set.
    #[must_use]
    pub fn has_header(&self, name: &HeaderName) -> bool {
        self.headers.contains_key(name)
    }

    /// Builds the request, reporting the first invalid part.
    pub fn build(self) -> Result<Request, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e| TestError::RequestBuild(format!("invalid URI {:?}: {e}", self.uri)))?;

        let mut request = http::Request::new(Full::new(self.body));
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }

    fn fail(&mut self, error: TestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
