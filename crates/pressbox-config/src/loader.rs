//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use pressbox_telemetry::LogFormat;
use toml::{Table, Value};

use crate::{ConfigError, PressboxConfig};

/// Builds a [`PressboxConfig`] from layers, later layers winning:
///
/// 1. Defaults (or the development preset)
/// 2. Configuration files and strings (TOML or JSON), merged key by key
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use pressbox_config::ConfigLoader;
///
/// # fn main() -> Result<(), pressbox_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("pressbox.toml")?
///     .with_dotenv()
///     .with_env_prefix("PRESSBOX")
///     .load()?;
/// # let _ = config;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: PressboxConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to the default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = PressboxConfig::default();
        self
    }

    /// Resets to the development preset.
    ///
    /// ```
    /// use pressbox_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(!config.session.secure);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PressboxConfig::development();
        self
    }

    /// Merges a TOML or JSON file, chosen by extension.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.with_string(&content, format)
    }

    /// Merges a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Merges configuration text in `format` (`toml` or `json`).
    ///
    /// Keys absent from `content` keep their current value.
    ///
    /// ```
    /// use pressbox_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .with_string("[server]\nserver_name = \"press\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.server_name, "press");
    /// assert_eq!(config.server.http_addr, "127.0.0.1:4000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let overlay: Table = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let mut merged: Table = toml::from_str(&toml::to_string(&self.config)?)?;
        merge(&mut merged, overlay);
        self.config = Value::Table(merged).try_into()?;
        Ok(self)
    }

    /// Reads a `.env` file into the process environment, if there is one.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // No .env file is the common case.
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies `PREFIX__SECTION__KEY` variables when loading.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<PressboxConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&format!("{prefix}__")))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without applying or validating anything.
    #[must_use]
    pub fn load_unvalidated(self) -> PressboxConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let path = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;
        let parts: Vec<&str> = path.split("__").collect();

        let config = &mut self.config;
        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => config.server.max_body_bytes = parse_number(key, value)?,
            ["SERVER", "SERVER_NAME"] => config.server.server_name = value.to_string(),

            ["SESSION", "COOKIE_NAME"] => config.session.cookie_name = value.to_string(),
            ["SESSION", "LIFETIME_SECS"] => config.session.lifetime_secs = parse_number(key, value)?,
            ["SESSION", "SECURE"] => config.session.secure = parse_flag(key, value)?,

            ["TEMPLATES", "DIR"] => config.templates.dir = value.into(),
            ["ASSETS", "DIR"] => config.assets.dir = value.into(),

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FILE_LINE_INFO"] => config.logging.file_line_info = parse_flag(key, value)?,
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'pretty' or 'compact'",
                        ))
                    }
                };
            }

            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }
        Ok(())
    }
}

/// Recursively overlays `overlay` onto `base`; tables merge, values replace.
fn merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let Value::Table(incoming) = value {
            if let Some(Value::Table(existing)) = base.get_mut(&key) {
                merge(existing, incoming);
                continue;
            }
            base.insert(key, Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected a non-negative integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse_error(key, "expected boolean")),
    }
}
