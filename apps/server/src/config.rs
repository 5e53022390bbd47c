//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults.

use std::env;
use std::path::PathBuf;

use turnstile_core::DEFAULT_HOLD_DURATION_MS;

/// Turnstile server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// How long a checkout hold lives, in milliseconds
    pub hold_duration_ms: i64,

    /// Seconds between expiry sweeper runs
    pub sweep_interval_secs: u64,

    /// Bearer token gating the admin block endpoints. When unset, the
    /// admin surface returns 401 for every request.
    pub admin_token: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("TURNSTILE_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TURNSTILE_PORT".to_string()))?,

            database_path: env::var("TURNSTILE_DATABASE_PATH")
                .unwrap_or_else(|_| "./turnstile.db".to_string())
                .into(),

            hold_duration_ms: env::var("TURNSTILE_HOLD_DURATION_MS")
                .unwrap_or_else(|_| DEFAULT_HOLD_DURATION_MS.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TURNSTILE_HOLD_DURATION_MS".to_string()))?,

            sweep_interval_secs: env::var("TURNSTILE_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("TURNSTILE_SWEEP_INTERVAL_SECS".to_string())
                })?,

            admin_token: env::var("TURNSTILE_ADMIN_TOKEN").ok(),
        };

        if config.hold_duration_ms <= 0 {
            return Err(ConfigError::InvalidValue(
                "TURNSTILE_HOLD_DURATION_MS".to_string(),
            ));
        }

        Ok(config)
    }

    /// The hold duration as a chrono span.
    pub fn hold_duration(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.hold_duration_ms)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Only read defaults; avoid touching process env in tests.
        let config = ServerConfig {
            port: 8080,
            database_path: "./turnstile.db".into(),
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            sweep_interval_secs: 60,
            admin_token: None,
        };
        assert_eq!(config.hold_duration(), chrono::Duration::minutes(5));
    }
}
