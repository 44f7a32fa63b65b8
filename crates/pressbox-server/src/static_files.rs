//! Static asset serving.
//!
//! [`StaticFiles`] is a [`Handler`] meant for a wildcard route such as
//! `GET /static/*path`. It reads the `path` parameter, refuses anything that
//! could leave the root directory or reveal hidden files, and answers with
//! the file contents and a content type chosen by extension.
//!
//! Every refusal is a plain 404 so the response does not reveal which rule
//! rejected the path.

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use http::header::{HeaderValue, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, StatusCode};
use http_body_util::Full;
use pressbox_middleware::{
    BoxFuture, Handler, MiddlewareContext, Request, Response, ResponseExt,
};
use thiserror::Error;

/// Default `Cache-Control` for assets.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3600";

/// Route parameter holding the requested file path.
pub const PATH_PARAM: &str = "path";

/// Reasons an asset cannot be served.
#[derive(Debug, Error)]
pub enum StaticFileError {
    /// Missing, hidden, outside the root or not a regular file.
    #[error("not found: {0}")]
    NotFound(String),

    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl StaticFileError {
    /// Status code to answer with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serves files below a root directory.
///
/// ```
/// use pressbox_server::StaticFiles;
///
/// let assets = StaticFiles::new("./ui/static").cache_control("no-cache");
/// assert_eq!(assets.root().to_str(), Some("./ui/static"));
/// ```
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    cache_control: HeaderValue,
}

impl StaticFiles {
    /// Serves files from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache_control: HeaderValue::from_static(DEFAULT_CACHE_CONTROL),
        }
    }

    /// Overrides the `Cache-Control` header. Invalid values are ignored.
    #[must_use]
    pub fn cache_control(mut self, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(value) => self.cache_control = value,
            Err(_) => tracing::warn!(value, "ignoring invalid cache-control value"),
        }
        self
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the file named by `request_path`, relative to the root.
    pub async fn load(&self, request_path: &str) -> Result<Bytes, StaticFileError> {
        let relative = sanitize(request_path)
            .ok_or_else(|| StaticFileError::NotFound(request_path.to_string()))?;
        let full = self.root.join(relative);

        let not_found = || StaticFileError::NotFound(request_path.to_string());
        let canonical = tokio::fs::canonicalize(&full).await.map_err(|_| not_found())?;
        let root = tokio::fs::canonicalize(&self.root).await.map_err(|_| not_found())?;
        if !canonical.starts_with(&root) {
            return Err(not_found());
        }

        let metadata = tokio::fs::metadata(&canonical).await.map_err(|_| not_found())?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        tokio::fs::read(&canonical)
            .await
            .map(Bytes::from)
            .map_err(|source| StaticFileError::Io {
                path: canonical,
                source,
            })
    }

    async fn serve(&self, ctx: &MiddlewareContext, request: &Request) -> Response {
        let requested = ctx.params().get(PATH_PARAM).unwrap_or_default();

        let contents = match self.load(requested).await {
            Ok(contents) => contents,
            Err(e) => {
                if let StaticFileError::Io { .. } = e {
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        error = %e,
                        "failed to read static file"
                    );
                } else {
                    tracing::debug!(path = requested, "static file not found");
                }
                return Response::error(e.status_code());
            }
        };

        let length = contents.len();
        let body = if request.method() == Method::HEAD {
            Bytes::new()
        } else {
            contents
        };

        let mut response = http::Response::new(Full::new(body));
        let headers = response.headers_mut();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(content_type(Path::new(requested))),
        );
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(CACHE_CONTROL, self.cache_control.clone());
        response
    }
}

impl Handler for StaticFiles {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move { self.serve(ctx, &request).await })
    }
}

/// Turns a request path into a safe relative path.
///
/// Returns `None` for empty paths, parent or root components and hidden
/// segments.
fn sanitize(request_path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => {
                let segment_str = segment.to_str()?;
                if segment_str.starts_with('.') {
                    return None;
                }
                relative.push(segment_str);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
