//! # Pressbox Templates
//!
//! Page templates compiled once at startup.
//!
//! A site's HTML is split into one base layout, shared partials, and one
//! fragment per page. [`TemplateCache::build`] combines the layout and
//! partials with every page into a separate [`TemplateSet`], compiles it
//! with [Tera](https://keats.github.io/tera/), and fails startup on the
//! first missing file, syntax error or broken `{% extends %}`. Requests then
//! render by page name with [`TemplateCache::render`].
//!
//! Page fragments extend the layout:
//!
//! ```text
//! {% extends "base.html" %}
//! {% block title %}Home{% endblock %}
//! {% block main %}...{% endblock %}
//! ```
//!
//! Partials are included by their prefixed name, e.g.
//! `{% include "partials/nav.html" %}`.

#![doc(html_root_url = "https://docs.rs/pressbox-templates/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod envelope;
mod error;
pub mod filters;
mod inventory;

pub use cache::{TemplateCache, TemplateSet};
pub use envelope::RenderEnvelope;
pub use error::TemplateError;
pub use inventory::{PageInventory, BASE_TEMPLATE, PARTIALS_PREFIX};
