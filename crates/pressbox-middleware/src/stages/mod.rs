//! Built-in middleware.
//!
//! | Unit | Name | Short-circuits |
//! |---|---|---|
//! | [`RecoveryMiddleware`] | `recovery` | on panic, with 500 |
//! | [`RequestLogMiddleware`] | `request_log` | never |
//! | [`CommonHeadersMiddleware`] | `common_headers` | never |
//! | [`SessionMiddleware`] | `session` | never |
//! | [`CsrfMiddleware`] | `csrf` | bad token, with 400 |
//! | [`AuthenticateMiddleware`] | `authenticate` | never |
//! | [`RequireAuthenticationMiddleware`] | `require_authentication` | anonymous, with 303 |
//!
//! The usual assembly is a *standard* chain of the first three wrapping
//! every route, a *dynamic* chain of session, csrf and authenticate for
//! pages, and a *protected* chain that adds the authorization gate.

mod authenticate;
mod common_headers;
mod csrf;
mod recovery;
mod request_log;
mod require_authentication;
mod session;

pub use authenticate::{AuthenticateMiddleware, UserDirectory};
pub use common_headers::{CommonHeadersMiddleware, CONTENT_SECURITY_POLICY_VALUE};
pub use csrf::{CsrfMiddleware, CSRF_FORM_FIELD, CSRF_HEADER};
pub use recovery::{install_panic_hook, take_panic_report, PanicReport, RecoveryMiddleware};
pub use request_log::RequestLogMiddleware;
pub use require_authentication::{RequireAuthenticationMiddleware, DEFAULT_LOGIN_PATH};
pub use session::SessionMiddleware;
