//! # Pressbox Server
//!
//! HTTP hosting for a Pressbox site:
//!
//! - [`Routes`]: the registration table that closes route chains over their
//!   handlers and answers 404 / 405 inside the standard chain
//! - [`Server`]: the hyper accept loop with body limits and graceful shutdown
//! - [`StaticFiles`]: a wildcard-route handler for assets
//!
//! ## Example
//!
//! ```rust,ignore
//! use pressbox_server::{Routes, Server, StaticFiles};
//!
//! let mut routes = Routes::new();
//! routes.handle(Method::GET, "/static/*path", &Chain::new(), StaticFiles::new("./ui/static"))?;
//! let site = routes.build(&standard);
//!
//! Server::builder().http_addr(addr).build(site).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/pressbox-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod routes;
mod server;
mod shutdown;
pub mod static_files;

pub use error::ServerError;
pub use routes::Routes;
pub use server::{
    Server, ServerBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
pub use static_files::{StaticFileError, StaticFiles};
