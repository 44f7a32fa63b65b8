//! Radix tree router for Pressbox.
//!
//! Maps `(method, pattern)` pairs to values of any type `T` (Pressbox stores
//! composed handlers) and matches incoming paths in O(k) over the number of
//! path segments.
//!
//! # Patterns
//!
//! - `/` matches only the root path
//! - `/item/view/{id}` captures one segment as the `id` parameter
//! - `/static/*path` captures the rest of the path and must be the last segment
//!
//! Registering the same method and pattern twice is an error rather than an
//! override, so a typo in the route table fails at startup.
//!
//! # Example
//!
//! ```rust
//! use pressbox_router::{Lookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(Method::GET, "/item/view/{id}", "view").unwrap();
//! router.insert(Method::POST, "/item/create", "create").unwrap();
//!
//! match router.lookup(&Method::GET, "/item/view/12") {
//!     Lookup::Found(m) => {
//!         assert_eq!(*m.value, "view");
//!         assert_eq!(m.params.get("id"), Some("12"));
//!     }
//!     other => panic!("unexpected lookup result: {other:?}"),
//! }
//!
//! assert!(router.insert(Method::POST, "/item/create", "again").is_err());
//! ```

mod error;
mod method_router;
mod node;
mod params;
mod router;

pub use error::RouteError;
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::{Lookup, RouteMatch, Router};
