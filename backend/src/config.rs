//! Runtime configuration.
//!
//! Values come from the process environment, after an optional `.env` file
//! is read with `dotenvy`. Command-line flags override them.
//!
//! | Variable                      | Default                  |
//! |-------------------------------|--------------------------|
//! | `TITANIC_DATA_SOURCE`         | [`DEFAULT_DATA_URL`]     |
//! | `TITANIC_FETCH_TIMEOUT_SECS`  | `30`                     |

use std::env;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Canonical location of the passenger dataset.
pub const DEFAULT_DATA_URL: &str =
    "https://raw.githubusercontent.com/leontoddjohnson/datasets/main/data/titanic.csv";

/// HTTP timeout for a single fetch attempt.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

pub const DATA_SOURCE_VAR: &str = "TITANIC_DATA_SOURCE";
pub const FETCH_TIMEOUT_VAR: &str = "TITANIC_FETCH_TIMEOUT_SECS";

/// Loader configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// URL or file path of the dataset.
    pub data_source: String,
    /// Upper bound on the HTTP fetch.
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(source) = lookup(DATA_SOURCE_VAR) {
            let source = source.trim();
            if source.is_empty() {
                return Err(ConfigError::Empty(DATA_SOURCE_VAR));
            }
            config.data_source = source.to_string();
        }

        if let Some(raw) = lookup(FETCH_TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: FETCH_TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Override the data source.
    pub fn with_data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = source.into();
        self
    }

    /// Override the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
