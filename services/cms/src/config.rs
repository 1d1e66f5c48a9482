//! services/cms/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Selects which document directory and users file the server works with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Production,
    Test,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "development" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!("'{}' is not one of production, test", other)),
        }
    }
}

impl Mode {
    /// Directory holding the documents, relative to `root`.
    pub fn data_dir(self, root: &Path) -> PathBuf {
        match self {
            Self::Production => root.join("data"),
            Self::Test => root.join("test").join("data"),
        }
    }

    /// The username/password-hash file, relative to `root`.
    pub fn users_file(self, root: &Path) -> PathBuf {
        match self {
            Self::Production => root.join("users.yml"),
            Self::Test => root.join("test").join("users.yml"),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub mode: Mode,
    pub data_dir: PathBuf,
    pub users_file: PathBuf,
    /// Key used to sign session cookies. `None` means one is generated per process.
    pub session_secret: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:4567".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Storage Settings ---
        let mode = match std::env::var("CMS_ENV") {
            Ok(value) => value
                .parse::<Mode>()
                .map_err(|e| ConfigError::InvalidValue("CMS_ENV".to_string(), e))?,
            Err(_) => Mode::Production,
        };
        let root = std::env::var("CMS_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let session_secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if secret.is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_SECRET".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Ok(secret) => Some(secret),
            Err(_) => None,
        };

        Ok(Self {
            bind_address,
            log_level,
            mode,
            data_dir: mode.data_dir(&root),
            users_file: mode.users_file(&root),
            session_secret,
        })
    }

    /// Builds a test-mode configuration over explicit paths.
    pub fn for_paths(data_dir: PathBuf, users_file: PathBuf, session_secret: &str) -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            log_level: Level::INFO,
            mode: Mode::Test,
            data_dir,
            users_file,
            session_secret: Some(session_secret.to_string()),
        }
    }
}
