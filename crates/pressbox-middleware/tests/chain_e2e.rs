//! End-to-end chain integration tests.
//!
//! These tests assemble the three chains a Pressbox site uses and drive
//! requests through them:
//!
//! 1. standard - recovery, request log, common headers
//! 2. dynamic - standard + session, csrf, authenticate
//! 3. protected - dynamic + require authentication

use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE, X_FRAME_OPTIONS};
use http::{Method, Request as HttpRequest, StatusCode};
use http_body_util::{BodyExt, Full};
use pressbox_core::UserId;
use pressbox_middleware::session::{MemorySessionStore, SessionManager};
use pressbox_middleware::stages::{
    AuthenticateMiddleware, CommonHeadersMiddleware, CsrfMiddleware, RecoveryMiddleware,
    RequestLogMiddleware, RequireAuthenticationMiddleware, SessionMiddleware, UserDirectory,
    CONTENT_SECURITY_POLICY_VALUE,
};
use pressbox_middleware::{
    BoxFuture, Chain, Handler, MiddlewareContext, Request, Response, ResponseExt,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Every user id below 100 exists.
struct SmallIds;

impl UserDirectory for SmallIds {
    fn exists<'a>(&'a self, id: UserId) -> BoxFuture<'a, Result<bool, anyhow::Error>> {
        Box::pin(async move { Ok(id.get() < 100) })
    }
}

struct Chains {
    standard: Chain,
    dynamic: Chain,
    protected: Chain,
}

fn chains() -> Chains {
    let manager = SessionManager::new(Arc::new(MemorySessionStore::new())).secure(false);
    let standard = Chain::new()
        .with(RecoveryMiddleware::new())
        .with(RequestLogMiddleware::new())
        .with(CommonHeadersMiddleware::new("pressbox"));
    let dynamic = standard
        .append(SessionMiddleware::new(manager))
        .append(CsrfMiddleware::new())
        .append(AuthenticateMiddleware::new(Arc::new(SmallIds)));
    let protected = dynamic.append(RequireAuthenticationMiddleware::new());
    Chains {
        standard,
        dynamic,
        protected,
    }
}

/// Logs user 7 in and echoes the csrf token.
struct Login;

impl Handler for Login {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        _request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if let Some(session) = ctx.session_mut() {
                session.renew_token();
                session.set_user_id(UserId::new(7));
            }
            let token = ctx.csrf_token().unwrap_or_default().to_string();
            Response::text(StatusCode::OK, token)
        })
    }
}

struct Counting(Arc<AtomicUsize>);

impl Handler for Counting {
    fn call<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        _request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            self.0.fetch_add(1, Ordering::SeqCst);
            Response::text(StatusCode::OK, ctx.identity().log_id())
        })
    }
}

struct Boom;

fn explode() -> Response {
    panic!("terminal handler failed")
}

impl Handler for Boom {
    fn call<'a>(
        &'a self,
        _ctx: &'a mut MiddlewareContext,
        _request: Request,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async { explode() })
    }
}

fn get(path: &str, cookie: Option<&str>) -> Request {
    let mut builder = HttpRequest::builder().method(Method::GET).uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn post_form(path: &str, cookie: &str, body: &str) -> Request {
    HttpRequest::builder()
        .method(Method::POST)
        .uri(path)
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Extracts `name=value` from the first `Set-Cookie` header.
fn session_cookie(response: &Response) -> String {
    let header = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    header.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_chain_names_reflect_assembly() {
    let chains = chains();
    assert_eq!(
        chains.standard.names(),
        vec!["recovery", "request_log", "common_headers"]
    );
    assert_eq!(
        chains.protected.names(),
        vec![
            "recovery",
            "request_log",
            "common_headers",
            "session",
            "csrf",
            "authenticate",
            "require_authentication",
        ]
    );
    assert_eq!(chains.dynamic.len(), 6);
}

#[tokio::test]
async fn test_protected_route_redirects_anonymous() {
    let chains = chains();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = chains.protected.then(Counting(calls.clone()));

    let mut ctx = MiddlewareContext::new();
    let response = handler.call(&mut ctx, get("/item/create", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/user/login");
    assert_eq!(response.headers().get(X_FRAME_OPTIONS).unwrap(), "deny");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_login_then_protected_route() {
    let chains = chains();
    let login = chains.dynamic.then(Login);
    let calls = Arc::new(AtomicUsize::new(0));
    let create = chains.protected.then(Counting(calls.clone()));

    let mut ctx = MiddlewareContext::new();
    let response = login.call(&mut ctx, get("/user/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let csrf = body_text(response).await;
    assert!(!csrf.is_empty());

    let mut ctx = MiddlewareContext::new();
    let response = create
        .call(
            &mut ctx,
            post_form("/item/create", &cookie, &format!("csrf_token={csrf}&title=a")),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(body_text(response).await, "user:7");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_post_without_csrf_token_is_rejected() {
    let chains = chains();
    let login = chains.dynamic.then(Login);
    let calls = Arc::new(AtomicUsize::new(0));
    let create = chains.protected.then(Counting(calls.clone()));

    let mut ctx = MiddlewareContext::new();
    let response = login.call(&mut ctx, get("/user/login", None)).await;
    let cookie = session_cookie(&response);

    let mut ctx = MiddlewareContext::new();
    let response = create
        .call(&mut ctx, post_form("/item/create", &cookie, "title=a"))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_panic_yields_single_500() {
    let chains = chains();
    let handler = chains.dynamic.then(Boom);

    let mut ctx = MiddlewareContext::new();
    let response = handler.call(&mut ctx, get("/", None)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers().get("connection").unwrap(), "close");
    assert_eq!(body_text(response).await, "Internal Server Error");
}

#[tokio::test]
async fn test_recovered_500_carries_security_headers() {
    let chains = chains();
    let handler = chains.standard.then(Boom);

    let mut ctx = MiddlewareContext::new();
    let response = handler.call(&mut ctx, get("/", None)).await;

    let headers = response.headers();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        headers.get("content-security-policy").unwrap(),
        CONTENT_SECURITY_POLICY_VALUE
    );
    assert_eq!(headers.get(X_FRAME_OPTIONS).unwrap(), "deny");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("referrer-policy").unwrap(), "origin-when-cross-origin");
    assert_eq!(headers.get("server").unwrap(), "pressbox");
    assert_eq!(headers.get("connection").unwrap(), "close");
}

#[tokio::test]
async fn test_extending_does_not_change_source_chain() {
    let chains = chains();
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = chains.dynamic.then(Counting(calls.clone()));

    let mut ctx = MiddlewareContext::new();
    let response = handler.call(&mut ctx, get("/", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "anonymous");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
