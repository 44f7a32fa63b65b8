//! The HTTP accept loop.
//!
//! One tokio task per accepted connection, HTTP/1.1 via hyper. Each request
//! body is buffered up to the configured limit, a fresh
//! [`MiddlewareContext`] is created with the peer address, and the request is
//! handed to the site handler (normally the result of
//! [`Routes::build`](crate::Routes::build)).
//!
//! A body over the limit, or one that cannot be read, is recorded on the
//! context as a [`BodyError`] and the request goes through the site handler
//! with an empty body. The route table answers it with 413 or 400, so the
//! standard chain still logs it and sets its headers.
//!
//! # Example
//!
//! ```rust,ignore
//! use pressbox_server::Server;
//!
//! let server = Server::builder()
//!     .http_addr("127.0.0.1:4000".parse()?)
//!     .max_body_bytes(64 * 1024)
//!     .build(site);
//!
//! server.run().await?;
//! ```

use std::convert::Infallible;
use std::error::Error as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use pressbox_middleware::{BodyError, Handler, MiddlewareContext, Response};
use tokio::net::{TcpListener, TcpStream};

use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Default listen address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:4000";

/// Default request body limit.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default grace period for in-flight connections.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// The Pressbox HTTP server.
pub struct Server {
    http_addr: SocketAddr,
    max_body_bytes: usize,
    shutdown_timeout: Duration,
    handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("http_addr", &self.http_addr)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Starts building a server.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The configured listen address.
    #[must_use]
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    /// Binds and serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds and serves until `shutdown` is triggered.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.http_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.http_addr,
                source,
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;
        tracing::info!(addr = %local_addr, "listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();
        let stop = shutdown.recv();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            server.serve_connection(stream, remote_addr, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to accept connection"),
                },
                () = &mut stop => break,
            }
        }

        drop(listener);
        tracing::info!(
            active = tracker.active_connections(),
            timeout_secs = server.shutdown_timeout.as_secs(),
            "shutting down; waiting for connections"
        );

        if tokio::time::timeout(server.shutdown_timeout, tracker.wait_until_drained())
            .await
            .is_err()
        {
            tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) {
        let server = Arc::clone(&self);
        let service = service_fn(move |request: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.dispatch(request, remote_addr).await) }
        });

        let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::pin!(connection);

        let result = tokio::select! {
            result = connection.as_mut() => result,
            () = shutdown.recv() => {
                connection.as_mut().graceful_shutdown();
                connection.await
            }
        };

        if let Err(e) = result {
            if !e.is_incomplete_message() {
                tracing::debug!(ip = %remote_addr, error = %e, "connection error");
            }
        }
    }

    async fn dispatch(&self, request: http::Request<Incoming>, remote_addr: SocketAddr) -> Response {
        let (parts, body) = request.into_parts();
        let mut ctx = MiddlewareContext::with_remote_addr(remote_addr);

        let body = match Limited::new(body, self.max_body_bytes).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                tracing::warn!(
                    ip = %remote_addr,
                    method = %parts.method,
                    uri = %parts.uri,
                    limit = self.max_body_bytes,
                    "request body too large"
                );
                ctx.set_body_error(BodyError::TooLarge);
                Bytes::new()
            }
            Err(e) => {
                tracing::debug!(
                    ip = %remote_addr,
                    error = %e,
                    source = ?e.source(),
                    "failed to read request body"
                );
                ctx.set_body_error(BodyError::Unreadable);
                Bytes::new()
            }
        };

        let request = http::Request::from_parts(parts, Full::new(body));
        self.handler.call(&mut ctx, request).await
    }
}

/// Builder for [`Server`].
#[derive(Debug, Clone)]
pub struct ServerBuilder {
    http_addr: SocketAddr,
    max_body_bytes: usize,
    shutdown_timeout: Duration,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Sets the listen address.
    #[must_use]
    pub fn http_addr(mut self, addr: SocketAddr) -> Self {
        self.http_addr = addr;
        self
    }

    /// Sets the request body limit in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Sets the shutdown grace period.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Finishes the server around `handler`.
    #[must_use]
    pub fn build(self, handler: Arc<dyn Handler>) -> Server {
        Server {
            http_addr: self.http_addr,
            max_body_bytes: self.max_body_bytes,
            shutdown_timeout: self.shutdown_timeout,
            handler,
        }
    }
}
