use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;
use vakt_core::ConsentValue;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Consent value the process starts with.
    pub consent: ConsentValue,
}

impl Config {
    /// Load configuration from environment variables.
    /// VAKT_DB_PATH defaults to "./vakt.redb", VAKT_CONSENT to "pending".
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = std::env::var("VAKT_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid("VAKT_LISTEN_ADDR", "must be a valid socket address")
            })?;

        let db_path = std::env::var("VAKT_DB_PATH")
            .unwrap_or_else(|_| "./vakt.redb".to_string())
            .into();

        let consent = std::env::var("VAKT_CONSENT")
            .unwrap_or_else(|_| "pending".to_string())
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(
                    "VAKT_CONSENT",
                    "must be one of pending, granted, not_granted",
                )
            })?;

        Ok(Config {
            listen_addr,
            db_path,
            consent,
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
