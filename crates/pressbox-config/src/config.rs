//! The root configuration type.

use crate::{
    AssetsConfig, ConfigError, LoggingConfig, ServerConfig, SessionConfig, TemplatesConfig,
};
use pressbox_telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Complete Pressbox configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// # Example
///
/// ```
/// use pressbox_config::PressboxConfig;
///
/// let config = PressboxConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:4000");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PressboxConfig {
    /// HTTP server.
    pub server: ServerConfig,

    /// Session cookies.
    pub session: SessionConfig,

    /// Page templates.
    pub templates: TemplatesConfig,

    /// Static assets.
    pub assets: AssetsConfig,

    /// Logging.
    pub logging: LoggingConfig,
}

impl PressboxConfig {
    /// Settings for running locally over plain HTTP.
    ///
    /// Binds to loopback, drops the `Secure` cookie flag and logs debug
    /// output in human-readable form.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:4000".to_string();
        config.session.secure = false;
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.file_line_info = true;
        config
    }

    /// The parsed listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Checks values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.server.server_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "server.server_name",
                "must not be empty",
            ));
        }

        if self.session.lifetime_secs == 0 {
            return Err(ConfigError::invalid_value(
                "session.lifetime_secs",
                "must be greater than zero",
            ));
        }

        let cookie = &self.session.cookie_name;
        if cookie.is_empty() {
            return Err(ConfigError::invalid_value(
                "session.cookie_name",
                "must not be empty",
            ));
        }
        if !cookie
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(ConfigError::invalid_value(
                "session.cookie_name",
                format!("{cookie:?} contains characters not allowed in a cookie name"),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }
}
