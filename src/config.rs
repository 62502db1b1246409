//! Bridge configuration, read from the environment.

use log::LevelFilter;
use std::{env, str::FromStr};

/// The C ABI version implemented by this library.
pub const ABI_VERSION: u32 = 1;

/// Environment variable holding the maximum log level.
pub const LOG_ENV: &str = "FLATBRIDGE_LOG";

/// Runtime configuration of the bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum level of records passed to the logger.
    pub log_level: LevelFilter,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_log_value(env::var(LOG_ENV).ok().as_deref())
    }

    fn from_log_value(value: Option<&str>) -> Self {
        let log_level = value
            .and_then(|value| LevelFilter::from_str(value.trim()).ok())
            .unwrap_or(Self::default().log_level);
        Self { log_level }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Warn,
        }
    }
}
