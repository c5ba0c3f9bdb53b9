//! services/operator_app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use spio_core::Credentials;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Where the durable key-value store keeps the persisted session.
    pub storage_path: PathBuf,
    pub log_level: Level,
    /// Simulated latency of a login round trip.
    pub login_delay: Duration,
    /// Simulated latency of a logout round trip.
    pub logout_delay: Duration,
    /// Lifetime of the tokens issued by the demo provider.
    pub session_ttl: chrono::Duration,
    /// Credentials to sign in with when no stored session exists.
    pub login: Option<Credentials>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./spio_session.json"),
            log_level: Level::INFO,
            login_delay: Duration::from_millis(800),
            logout_delay: Duration::from_millis(500),
            session_ttl: chrono::Duration::hours(24),
            login: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        // --- Storage and Logging ---
        let storage_path = std::env::var("SPIO_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Simulated Backend Settings ---
        let login_delay = millis_var("SPIO_LOGIN_DELAY_MS")?.unwrap_or(defaults.login_delay);
        let logout_delay = millis_var("SPIO_LOGOUT_DELAY_MS")?.unwrap_or(defaults.logout_delay);

        let session_ttl = match std::env::var("SPIO_SESSION_TTL_HOURS") {
            Ok(raw) => {
                let hours = raw.parse::<i64>().ok().filter(|h| *h > 0).ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "SPIO_SESSION_TTL_HOURS".to_string(),
                        format!("'{}' is not a positive number of hours", raw),
                    )
                })?;
                chrono::Duration::hours(hours)
            }
            Err(_) => defaults.session_ttl,
        };

        // --- Optional Sign-in ---
        let login = match (std::env::var("SPIO_USERNAME"), std::env::var("SPIO_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(Credentials::new(username, password)),
            (Ok(_), Err(_)) => return Err(ConfigError::MissingVar("SPIO_PASSWORD".to_string())),
            _ => None,
        };

        Ok(Self {
            storage_path,
            log_level,
            login_delay,
            logout_delay,
            session_ttl,
            login,
        })
    }
}

fn millis_var(name: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}
