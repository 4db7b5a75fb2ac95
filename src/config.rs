use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::models::ReadFailurePolicy;

/// Application-level constants
pub const APP_NAME: &str = "HearMeOut";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen address for the scheduling API.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

pub const ENV_BIND: &str = "HEARMEOUT_BIND";
pub const ENV_DB: &str = "HEARMEOUT_DB";
pub const ENV_READ_FAILURE_POLICY: &str = "HEARMEOUT_READ_FAILURE_POLICY";

/// Get the application data directory
/// ~/HearMeOut/ on all platforms, current directory when home is unknown
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default SQLite file for templates and appointments
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("scheduling.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,hearmeout_lib=debug"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime settings for the server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub read_failure_policy: ReadFailurePolicy,
}

impl ServerConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset or blank variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_raw = get(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: ENV_BIND,
            value: bind_raw.clone(),
        })?;

        let db_path = get(ENV_DB).map(PathBuf::from).unwrap_or_else(default_db_path);

        let read_failure_policy = match get(ENV_READ_FAILURE_POLICY) {
            Some(raw) => ReadFailurePolicy::from_str(raw.trim()).map_err(|_| ConfigError::Invalid {
                var: ENV_READ_FAILURE_POLICY,
                value: raw,
            })?,
            None => ReadFailurePolicy::default(),
        };

        Ok(Self {
            bind,
            db_path,
            read_failure_policy,
        })
    }
}
