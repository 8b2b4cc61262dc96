//! Server configuration resolved from environment variables.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - Set but unparsable values are errors, never silently defaulted.

use notebook_core::default_log_level;
use notebook_core::lookup::wikipedia::DEFAULT_ENDPOINT;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_FILE: &str = "NOTEBOOK_FILE";
pub const ENV_BIND_ADDR: &str = "NOTEBOOK_BIND_ADDR";
pub const ENV_WORKERS: &str = "NOTEBOOK_WORKERS";
pub const ENV_LOG_LEVEL: &str = "NOTEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEBOOK_LOG_DIR";
pub const ENV_LOOKUP_ENDPOINT: &str = "NOTEBOOK_LOOKUP_ENDPOINT";
pub const ENV_LOOKUP_TIMEOUT_SECS: &str = "NOTEBOOK_LOOKUP_TIMEOUT_SECS";

const DEFAULT_FILE: &str = "notebook.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_WORKERS: usize = 4;
const MAX_WORKERS: usize = 64;
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}=`{}`: {}", self.key, self.value, self.reason)
    }
}

impl Error for ConfigError {}

/// Runtime settings for `notebook_server`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub notebook_file: PathBuf,
    pub bind_addr: SocketAddr,
    pub workers: usize,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    pub lookup_endpoint: String,
    pub lookup_timeout: Duration,
}

impl ServerConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `get`, which maps a variable name to its value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_raw = read(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|err| ConfigError {
            key: ENV_BIND_ADDR,
            value: bind_raw.clone(),
            reason: err.to_string(),
        })?;

        let workers = match read(ENV_WORKERS) {
            None => DEFAULT_WORKERS,
            Some(raw) => match raw.parse::<usize>() {
                Ok(count) if (1..=MAX_WORKERS).contains(&count) => count,
                Ok(_) => {
                    return Err(ConfigError {
                        key: ENV_WORKERS,
                        value: raw,
                        reason: format!("expected 1..={MAX_WORKERS}"),
                    })
                }
                Err(err) => {
                    return Err(ConfigError {
                        key: ENV_WORKERS,
                        value: raw,
                        reason: err.to_string(),
                    })
                }
            },
        };

        let lookup_timeout = match read(ENV_LOOKUP_TIMEOUT_SECS) {
            None => Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                Ok(_) => {
                    return Err(ConfigError {
                        key: ENV_LOOKUP_TIMEOUT_SECS,
                        value: raw,
                        reason: "timeout must be positive".to_string(),
                    })
                }
                Err(err) => {
                    return Err(ConfigError {
                        key: ENV_LOOKUP_TIMEOUT_SECS,
                        value: raw,
                        reason: err.to_string(),
                    })
                }
            },
        };

        Ok(Self {
            notebook_file: PathBuf::from(
                read(ENV_FILE).unwrap_or_else(|| DEFAULT_FILE.to_string()),
            ),
            bind_addr,
            workers,
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR),
            lookup_endpoint: read(ENV_LOOKUP_ENDPOINT)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            lookup_timeout,
        })
    }
}
