//! # Pressbox Middleware
//!
//! Composable middleware chains for Pressbox.
//!
//! Cross-cutting request processing is written as independent
//! [`Middleware`] units and assembled into named [`Chain`]s. A chain closed
//! over a terminal [`Handler`] with [`Chain::then`] is itself a handler, so
//! a whole site is a standard chain wrapping a route table whose entries are
//! route chains wrapping page handlers.
//!
//! ```text
//! Request → Recovery → RequestLog → CommonHeaders → route table
//!                                                      ↓
//!                     Session → Csrf → Authenticate → [RequireAuthentication] → Handler
//! ```
//!
//! ## Example
//!
//! ```
//! use pressbox_middleware::Chain;
//! use pressbox_middleware::stages::{
//!     CommonHeadersMiddleware, RecoveryMiddleware, RequestLogMiddleware,
//!     RequireAuthenticationMiddleware,
//! };
//!
//! let standard = Chain::new()
//!     .with(RecoveryMiddleware::new())
//!     .with(RequestLogMiddleware::new())
//!     .with(CommonHeadersMiddleware::new("pressbox"));
//! let gated = Chain::new().with(RequireAuthenticationMiddleware::new());
//!
//! let everything = standard.concat(&gated);
//! assert_eq!(everything.len(), 4);
//! assert_eq!(standard.len(), 3);
//! ```

#![doc(html_root_url = "https://docs.rs/pressbox-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod context;
pub mod middleware;
pub mod session;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use chain::{BoxedMiddleware, Chain, ChainedHandler};
pub use context::{BodyError, MiddlewareContext};
pub use middleware::{handler_fn, BoxFuture, Endpoint, Handler, Middleware, Next, StateHandler};
pub use types::{Request, Response, ResponseExt};
