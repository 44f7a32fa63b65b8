//! # Pressbox Config
//!
//! Typed configuration for a Pressbox server.
//!
//! Configuration is layered by [`ConfigLoader`]: built-in defaults, then an
//! optional TOML or JSON file, then `PRESSBOX__SECTION__KEY` environment
//! variables. Unknown keys are rejected at every layer.
//!
//! ## Example file
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:4000"
//! server_name = "pressbox"
//!
//! [session]
//! lifetime_secs = 43200
//! secure = true
//!
//! [templates]
//! dir = "./ui/html"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

#![doc(html_root_url = "https://docs.rs/pressbox-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PressboxConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use pressbox_telemetry::LogFormat;
pub use schema::{AssetsConfig, LoggingConfig, ServerConfig, SessionConfig, TemplatesConfig};
