//! Drives a real listener over TCP.

use std::sync::Arc;
use std::time::Duration;

use http::{Method, StatusCode};
use http_body_util::BodyExt;
use pressbox_middleware::stages::{CommonHeadersMiddleware, RecoveryMiddleware};
use pressbox_middleware::{BoxFuture, Chain, Handler, MiddlewareContext, Request, Response, ResponseExt};
use pressbox_server::{Routes, Server, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Echoes the request body and the peer address it was told about.
struct Echo;

impl Handler for Echo {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let body = request.into_body().collect().await.unwrap().to_bytes();
            let peer = ctx.remote_addr().map(|a| a.ip().to_string()).unwrap_or_default();
            Response::text(
                StatusCode::OK,
                format!("{peer} {}", String::from_utf8_lossy(&body)),
            )
        })
    }
}

async fn start(max_body_bytes: usize) -> (std::net::SocketAddr, ShutdownSignal, JoinHandle<()>) {
    let standard = Chain::new()
        .with(RecoveryMiddleware::new())
        .with(CommonHeadersMiddleware::new("pressbox-test"));
    let mut routes = Routes::new();
    routes.handle(Method::POST, "/echo", &Chain::new(), Echo).unwrap();
    let site = routes.build(&standard);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let server = Server::builder()
        .max_body_bytes(max_body_bytes)
        .shutdown_timeout(Duration::from_secs(1))
        .build(site);

    let handle = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { server.serve(listener, shutdown).await.unwrap() })
    };
    (addr, shutdown, handle)
}

async fn raw(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn post(body: &str) -> String {
    format!(
        "POST /echo HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn test_serves_through_standard_chain() {
    let (addr, shutdown, handle) = start(1024).await;

    let response = raw(addr, &post("hello")).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.to_ascii_lowercase().contains("server: pressbox-test"));
    assert!(response.ends_with("127.0.0.1 hello"));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let (addr, shutdown, handle) = start(1024).await;

    let response = raw(
        addr,
        "GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let (addr, shutdown, handle) = start(8).await;

    let response = raw(addr, &post("far more than eight bytes")).await;
    assert!(response.starts_with("HTTP/1.1 413"), "{response}");
    assert!(response.contains("x-frame-options: deny"), "{response}");
    assert!(response.contains("server: pressbox-test"), "{response}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::builder()
        .http_addr(taken.local_addr().unwrap())
        .build(Routes::new().build(&Chain::new()));

    let result = server.run_with_shutdown(ShutdownSignal::new()).await;
    assert!(matches!(result, Err(pressbox_server::ServerError::Bind { .. })));
}
