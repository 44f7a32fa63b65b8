//! Application context shared by every handler.
//!
//! [`AppContext`] is built once at startup and handed to the handlers and
//! middleware constructors behind an `Arc`. It owns the stores, the
//! template cache, the session manager and the loaded configuration.

use crate::store::{ItemStore, MemoryItemStore, MemoryUserStore, UserStore};
use chrono::{Datelike, Utc};
use http::{Method, StatusCode, Uri};
use pressbox_config::PressboxConfig;
use pressbox_core::PressError;
use pressbox_middleware::session::{MemorySessionStore, SessionManager, SessionStore};
use pressbox_middleware::stages::UserDirectory;
use pressbox_middleware::{MiddlewareContext, Request, Response, ResponseExt};
use pressbox_templates::{PageInventory, RenderEnvelope, TemplateCache, TemplateError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often expired sessions are purged from the in-memory store.
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Method and URI of a request, kept for error logs after the body has been
/// consumed.
#[derive(Debug, Clone)]
pub struct RequestLine {
    /// Request method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
}

impl RequestLine {
    /// Captures the request line of `request`.
    #[must_use]
    pub fn of(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
        }
    }
}

/// Shared application state.
pub struct AppContext {
    config: PressboxConfig,
    templates: TemplateCache,
    items: Arc<dyn ItemStore>,
    users: Arc<dyn UserStore>,
    directory: Arc<dyn UserDirectory>,
    sessions: SessionManager,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("pages", &self.templates.page_names())
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Assembles a context from already built parts.
    ///
    /// `users` serves both as the account store for the signup and login
    /// handlers and as the directory the authentication middleware checks.
    pub fn new<U>(
        config: PressboxConfig,
        templates: TemplateCache,
        items: Arc<dyn ItemStore>,
        users: Arc<U>,
        sessions: SessionManager,
    ) -> Self
    where
        U: UserStore + UserDirectory,
    {
        let directory: Arc<dyn UserDirectory> = users.clone();
        Self {
            config,
            templates,
            items,
            users,
            directory,
            sessions,
        }
    }

    /// Builds the context the binary runs with: templates compiled from
    /// `config.templates.dir`, in-memory item and user stores, and a session
    /// manager over `session_store` configured from `config.session`.
    pub fn from_config(
        config: PressboxConfig,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self, TemplateError> {
        let templates = TemplateCache::build(&PageInventory::from_dir(&config.templates.dir)?)?;

        let sessions = SessionManager::new(session_store)
            .cookie_name(config.session.cookie_name.clone())
            .lifetime(config.session.lifetime())
            .secure(config.session.secure);

        Ok(Self::new(
            config,
            templates,
            Arc::new(MemoryItemStore::new()),
            Arc::new(MemoryUserStore::new()),
            sessions,
        ))
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &PressboxConfig {
        &self.config
    }

    /// The compiled templates.
    #[must_use]
    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// The item store.
    #[must_use]
    pub fn items(&self) -> &dyn ItemStore {
        self.items.as_ref()
    }

    /// The user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// The user directory consulted by the authentication middleware.
    #[must_use]
    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        Arc::clone(&self.directory)
    }

    /// The session manager.
    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// An envelope with the common fields filled from the request.
    ///
    /// The flash message is copied, not consumed; [`render`](Self::render)
    /// removes it once the page has rendered.
    pub fn new_envelope(&self, ctx: &MiddlewareContext) -> RenderEnvelope {
        RenderEnvelope::new(Utc::now().year())
            .with_flash(ctx.flash().map(str::to_string))
            .with_authenticated(ctx.is_authenticated())
            .with_csrf_token(ctx.csrf_token().map(str::to_string))
    }

    /// Renders `page` into an HTML response with `status`.
    ///
    /// A failed render is logged and answered with a plain 500, and a flash
    /// message carried by `envelope` stays in the session for the next page.
    pub fn render(
        &self,
        ctx: &mut MiddlewareContext,
        line: &RequestLine,
        status: StatusCode,
        page: &str,
        envelope: &RenderEnvelope,
    ) -> Response {
        match self.templates.render(page, envelope) {
            Ok(body) => {
                if envelope.flash().is_some() {
                    ctx.pop_flash();
                }
                Response::html(status, body)
            }
            Err(e) => self.error_response(ctx, line, PressError::from(e)),
        }
    }

    /// Answers with the generic response for `error`.
    ///
    /// Server faults are logged with the request line and error source. The
    /// body is only ever the status reason phrase.
    pub fn error_response(
        &self,
        ctx: &MiddlewareContext,
        line: &RequestLine,
        error: PressError,
    ) -> Response {
        let status = error.status_code();
        if error.category().is_server_fault() {
            tracing::error!(
                request_id = %ctx.request_id(),
                method = %line.method,
                uri = %line.uri,
                error = %error,
                source = ?std::error::Error::source(&error),
                "request failed"
            );
        } else {
            tracing::debug!(
                request_id = %ctx.request_id(),
                method = %line.method,
                uri = %line.uri,
                status = status.as_u16(),
                error = %error,
                "request rejected"
            );
        }
        Response::error(status)
    }
}

/// Periodically drops expired sessions from `store`.
pub fn spawn_session_cleanup(store: Arc<MemorySessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = store.cleanup();
            if removed > 0 {
                tracing::debug!(removed, "expired sessions removed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use pressbox_middleware::session::{Session, SessionData};
    use std::fs;
    use tempfile::TempDir;

    fn app_with_pages(pages: &[(&str, &str)]) -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("base.html"),
            "<title>{% block title %}{% endblock title %}</title>{% block main %}{% endblock main %}",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        for (name, body) in pages {
            fs::write(dir.path().join("pages").join(name), body).unwrap();
        }
        let templates = TemplateCache::build(&PageInventory::from_dir(dir.path()).unwrap()).unwrap();
        let app = AppContext::new(
            PressboxConfig::development(),
            templates,
            Arc::new(MemoryItemStore::new()),
            Arc::new(MemoryUserStore::new()),
            SessionManager::new(Arc::new(MemorySessionStore::new())),
        );
        (dir, app)
    }

    fn line() -> RequestLine {
        RequestLine {
            method: Method::GET,
            uri: Uri::from_static("/"),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_render_success() {
        let (_dir, app) = app_with_pages(&[(
            "home.html",
            r#"{% extends "base.html" %}{% block main %}year {{ current_year }}{% endblock main %}"#,
        )]);
        let mut ctx = MiddlewareContext::new();
        let envelope = app.new_envelope(&ctx);

        let response = app.render(&mut ctx, &line(), StatusCode::OK, "home.html", &envelope);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(&format!("year {}", Utc::now().year())));
    }

    #[tokio::test]
    async fn test_unknown_page_is_server_error() {
        let (_dir, app) = app_with_pages(&[(
            "home.html",
            r#"{% extends "base.html" %}{% block main %}hi{% endblock main %}"#,
        )]);
        let mut ctx = MiddlewareContext::new();
        let envelope = RenderEnvelope::new(2024);

        let response = app.render(&mut ctx, &line(), StatusCode::OK, "missing.html", &envelope);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_failed_render_has_no_partial_body() {
        let (_dir, app) = app_with_pages(&[(
            "broken.html",
            r#"{% extends "base.html" %}{% block main %}before {{ item.title }}{% endblock main %}"#,
        )]);
        let mut ctx = MiddlewareContext::new();
        let envelope = RenderEnvelope::new(2024);

        let response = app.render(&mut ctx, &line(), StatusCode::OK, "broken.html", &envelope);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(response).await.contains("before"));
    }

    #[tokio::test]
    async fn test_flash_survives_failed_render() {
        let (_dir, app) = app_with_pages(&[
            (
                "broken.html",
                r#"{% extends "base.html" %}{% block main %}{{ item.title }}{% endblock main %}"#,
            ),
            (
                "home.html",
                r#"{% extends "base.html" %}{% block main %}{{ flash }}{% endblock main %}"#,
            ),
        ]);
        let mut ctx = MiddlewareContext::new();
        let data = SessionData {
            flash: Some("Item successfully created!".to_string()),
            ..SessionData::default()
        };
        ctx.set_session(Session::loaded("token".to_string(), data));

        let envelope = app.new_envelope(&ctx);
        let response = app.render(&mut ctx, &line(), StatusCode::OK, "broken.html", &envelope);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ctx.flash(), Some("Item successfully created!"));

        let envelope = app.new_envelope(&ctx);
        let response = app.render(&mut ctx, &line(), StatusCode::OK, "home.html", &envelope);
        assert!(body_text(response).await.contains("Item successfully created!"));
        assert!(ctx.flash().is_none());
    }

    #[tokio::test]
    async fn test_error_response_hides_detail() {
        let (_dir, app) = app_with_pages(&[]);
        let ctx = MiddlewareContext::new();
        let error = PressError::internal_with_source("db", anyhow::anyhow!("password=hunter2"));

        let response = app.error_response(&ctx, &line(), error);
        assert_eq!(body_text(response).await, "Internal Server Error");

        let response = app.error_response(&ctx, &line(), PressError::not_found("item 3"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
