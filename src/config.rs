// SPDX-License-Identifier: Apache-2.0

//! Console configuration, read from `DBCONSOLE_*` environment variables

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Sensitive;

const DEFAULT_LOG_FILTER: &str = "dbconsole=info";
const DEFAULT_LOG_RETENTION_DAYS: u64 = 14;
const DEFAULT_POOL_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// `EnvFilter` directives: `DBCONSOLE_LOG`, else `RUST_LOG`
    pub log_filter: String,
    pub log_dir: PathBuf,
    pub log_retention_days: u64,
    /// Postgres-wire URL of the source SQL runs against
    pub database_url: Option<Sensitive<String>>,
    pub pool_max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub statement_timeout_secs: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: default_log_dir(),
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
            database_url: None,
            pool_max_connections: DEFAULT_POOL_MAX_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            log_filter: get("DBCONSOLE_LOG")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
            log_dir: get("DBCONSOLE_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_retention_days: parse_number(
                "DBCONSOLE_LOG_RETENTION_DAYS",
                get("DBCONSOLE_LOG_RETENTION_DAYS"),
                defaults.log_retention_days,
            )?,
            database_url: get("DBCONSOLE_DATABASE_URL").map(Sensitive::new),
            pool_max_connections: parse_number(
                "DBCONSOLE_POOL_MAX_CONNECTIONS",
                get("DBCONSOLE_POOL_MAX_CONNECTIONS"),
                defaults.pool_max_connections,
            )?,
            acquire_timeout_secs: parse_number(
                "DBCONSOLE_ACQUIRE_TIMEOUT_SECS",
                get("DBCONSOLE_ACQUIRE_TIMEOUT_SECS"),
                defaults.acquire_timeout_secs,
            )?,
            statement_timeout_secs: parse_number(
                "DBCONSOLE_STATEMENT_TIMEOUT_SECS",
                get("DBCONSOLE_STATEMENT_TIMEOUT_SECS"),
                defaults.statement_timeout_secs,
            )?,
        })
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> ConfigResult<T> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw,
        }),
    }
}

fn default_log_dir() -> PathBuf {
    if cfg!(windows) {
        let appdata = std::env::var_os("APPDATA")
            .unwrap_or_else(|| std::env::var_os("USERPROFILE").unwrap_or_default());
        let mut path = PathBuf::from(appdata);
        path.push("dbconsole");
        path.push("logs");
        path
    } else {
        let home = std::env::var_os("HOME").unwrap_or_default();
        let mut path = PathBuf::from(home);
        path.push(".dbconsole");
        path.push("logs");
        path
    }
}
