//! # Pressbox Test
//!
//! In-memory HTTP testing for Pressbox sites. Requests go through the
//! complete handler, standard chain and route chains included, without
//! binding a port.
//!
//! - [`TestClient`] keeps cookies between requests, so sessions, login and
//!   anti-forgery tokens behave as in a browser
//! - [`TestRequest`] builds requests with form bodies
//! - [`TestResponse`] buffers the response and offers assertions, plus
//!   [`TestResponse::csrf_token`] to lift the token out of a rendered form
//!
//! ## Example
//!
//! ```ignore
//! use pressbox_test::TestClient;
//!
//! #[tokio::test]
//! async fn create_requires_login() {
//!     let client = TestClient::new(site());
//!     client.get("/item/create").send().await.assert_redirect("/user/login");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/pressbox-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
