//! # Pressbox
//!
//! A small site for sharing short text snippets, assembled from the
//! Pressbox building blocks:
//!
//! - [`core`]: error taxonomy and identifiers
//! - [`router`]: method and path matching
//! - [`middleware`]: chains, sessions and the built-in stages
//! - [`templates`]: the precompiled page cache
//! - [`server`]: the HTTP host
//!
//! The application itself lives in [`app`] (shared state), [`store`]
//! (items and users), [`forms`] and [`validator`] (form rules),
//! [`handlers`] and [`routes`].
//!
//! ## Request flow
//!
//! ```text
//! Request → Recovery → RequestLog → CommonHeaders → route table
//!         → Session → Csrf → Authenticate [→ RequireAuthentication] → handler
//!         → TemplateCache::render → Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pressbox::{routes, AppContext};
//! use pressbox_middleware::session::MemorySessionStore;
//! use std::sync::Arc;
//!
//! let config = pressbox_config::ConfigLoader::new().with_defaults().load()?;
//! let app = Arc::new(AppContext::from_config(config, Arc::new(MemorySessionStore::new()))?);
//! let site = routes(&app)?;
//!
//! pressbox_server::Server::builder().build(site).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/pressbox/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod store;
pub mod validator;

pub use app::{spawn_session_cleanup, AppContext, RequestLine, SESSION_CLEANUP_INTERVAL};
pub use routes::routes;

// Re-export the building blocks
pub use pressbox_config as config;
pub use pressbox_core as core;
pub use pressbox_middleware as middleware;
pub use pressbox_router as router;
pub use pressbox_server as server;
pub use pressbox_templates as templates;
