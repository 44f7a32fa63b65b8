//! Command-line arguments.
//!
//! ```text
//! pressbox [--config <path>] [--addr <host:port>] [--dev]
//! ```

use pressbox_config::{ConfigError, ConfigLoader, PressboxConfig};
use std::path::PathBuf;
use thiserror::Error;

/// Config file read when `--config` is not given. It may be absent.
pub const DEFAULT_CONFIG_PATH: &str = "pressbox.toml";

/// Prefix of environment overrides, e.g. `PRESSBOX__SERVER__HTTP_ADDR`.
pub const ENV_PREFIX: &str = "PRESSBOX";

/// Usage line printed for `--help`.
pub const USAGE: &str = "usage: pressbox [--config <path>] [--addr <host:port>] [--dev]";

/// Argument errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    /// A flag that takes a value was last on the line.
    #[error("{0} needs a value")]
    MissingValue(String),

    /// An argument that is not recognized.
    #[error("unexpected argument '{0}'\n{USAGE}")]
    Unexpected(String),
}

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Explicit config file. Unlike the default path, it must exist.
    pub config: Option<PathBuf>,
    /// Listen address override.
    pub addr: Option<String>,
    /// Start from the development preset instead of the production defaults.
    pub dev: bool,
    /// Print usage and exit.
    pub help: bool,
}

impl Args {
    /// Parses arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    (flag.to_string(), Some(value.to_string()))
                }
                _ => (arg.clone(), None),
            };
            let mut value = |flag: &str| {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
            };
            match flag.as_str() {
                "--config" | "-c" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--addr" | "-a" => parsed.addr = Some(value("--addr")?),
                "--dev" => parsed.dev = true,
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ArgsError::Unexpected(arg)),
            }
        }
        Ok(parsed)
    }

    /// Loads the configuration these arguments describe.
    ///
    /// Layers, lowest first: defaults (or the development preset), the config
    /// file, `.env`, `PRESSBOX__*` environment variables, then `--addr`.
    pub fn load_config(&self) -> Result<PressboxConfig, ConfigError> {
        let loader = if self.dev {
            ConfigLoader::new().with_development()
        } else {
            ConfigLoader::new().with_defaults()
        };
        let loader = match &self.config {
            Some(path) => loader.with_file(path)?,
            None => loader.with_optional_file(DEFAULT_CONFIG_PATH)?,
        };
        let mut config = loader.with_dotenv().with_env_prefix(ENV_PREFIX).load()?;

        if let Some(addr) = &self.addr {
            config.server.http_addr = addr.clone();
            config.validate()?;
        }
        Ok(config)
    }
}
