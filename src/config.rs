// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup; command-line flags override it.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the vault database and exported reports | `./finguard-data` |
//! | `VAULT_API_URL` | Base URL of the remote document API | Unset (remote sync disabled) |
//! | `VAULT_API_TIMEOUT_SECS` | Timeout for every remote request, in seconds | `10` |
//! | `VAULT_OWNER` | Owner key (`walletAddress`) for saved documents | `local-user` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use crate::logging::LogFormat;
use crate::models::WalletAddress;
use crate::storage::paths::DATA_ROOT;

/// Environment variable name for the vault data directory.
///
/// Holds `vault.redb` and the `reports/` export directory.
///
/// # Default
/// `./finguard-data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the remote document API base URL.
pub const API_URL_ENV: &str = "VAULT_API_URL";

/// Environment variable name for the remote request timeout (whole seconds).
pub const API_TIMEOUT_ENV: &str = "VAULT_API_TIMEOUT_SECS";

pub const OWNER_ENV: &str = "VAULT_OWNER";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default remote request timeout in seconds.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Fully resolved vault configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    pub data_dir: PathBuf,
    /// `None` disables remote mirroring and the remote verification fallback.
    pub api_url: Option<String>,
    pub api_timeout: Duration,
    pub owner: WalletAddress,
    pub log_format: LogFormat,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_ROOT),
            api_url: None,
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            owner: WalletAddress::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl VaultConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = get(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config.api_url = get(API_URL_ENV);

        if let Some(raw) = get(API_TIMEOUT_ENV) {
            let secs: u64 = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    var: API_TIMEOUT_ENV,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    var: API_TIMEOUT_ENV,
                    value: raw,
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.api_timeout = Duration::from_secs(secs);
        }

        if let Some(owner) = get(OWNER_ENV) {
            config.owner = WalletAddress::from(owner);
        }
        if let Some(format) = get(LOG_FORMAT_ENV) {
            config.log_format = format.parse()?;
        }

        Ok(config)
    }
}
