//! Configuration sections.
//!
//! Every section fills omitted fields from its [`Default`] and rejects
//! unknown fields, so a typo in a config file fails loudly.

use pressbox_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server settings.
///
/// # Example
///
/// ```
/// use pressbox_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "0.0.0.0:4000");
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:4000`.
    pub http_addr: String,

    /// How long in-flight connections get to finish on shutdown.
    pub shutdown_timeout_secs: u64,

    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,

    /// Value of the `Server` response header.
    pub server_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:4000".to_string(),
            shutdown_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
            server_name: "pressbox".to_string(),
        }
    }
}

impl ServerConfig {
    /// The shutdown grace period.
    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie name.
    pub cookie_name: String,

    /// Idle lifetime in seconds.
    pub lifetime_secs: u64,

    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            lifetime_secs: 12 * 60 * 60,
            secure: true,
        }
    }
}

impl SessionConfig {
    /// The idle lifetime.
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.lifetime_secs)
    }
}

/// Template directory settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory holding `base.html`, `partials/` and `pages/`.
    pub dir: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./ui/html"),
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Directory served under `/static/`.
    pub dir: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./ui/static"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber at startup.
    pub enabled: bool,

    /// Filter directive, e.g. `info` or `pressbox=debug`.
    pub level: String,

    /// Line format.
    pub format: LogFormat,

    /// Include source file and line.
    pub file_line_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            file_line_info: false,
        }
    }
}

impl LoggingConfig {
    /// Converts to the subscriber settings for `service_name`.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        let preset = if self.format == LogFormat::Json {
            LogConfig::production()
        } else {
            LogConfig::development()
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            file_line_info: self.file_line_info,
            service_name: service_name.to_string(),
            ..preset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let session = SessionConfig::default();
        assert_eq!(session.cookie_name, "session");
        assert_eq!(session.lifetime(), Duration::from_secs(43_200));
        assert!(session.secure);

        assert_eq!(TemplatesConfig::default().dir, PathBuf::from("./ui/html"));
        assert_eq!(AssetsConfig::default().dir, PathBuf::from("./ui/static"));
        assert_eq!(ServerConfig::default().shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let server: ServerConfig = toml::from_str(r#"http_addr = "127.0.0.1:9000""#).unwrap();
        assert_eq!(server.http_addr, "127.0.0.1:9000");
        assert_eq!(server.server_name, "pressbox");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<SessionConfig, _> = toml::from_str("cookie = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_to_log_config() {
        let logging = LoggingConfig {
            format: LogFormat::Pretty,
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        let config = logging.to_log_config("pressbox-test");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "debug");
        assert_eq!(config.service_name, "pressbox-test");
        assert!(config.span_events);
    }
}
