//! Engine configuration
//!
//! Read from `ENGINE_*` environment variables, after a `.env` file if one is
//! present. Unset variables keep their defaults.

use serde::Deserialize;
use std::path::PathBuf;

use core_kernel::{Currency, Timezone};
use domain_numbering::DEFAULT_MAX_RETRIES;

use crate::error::EngineError;

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// IANA timezone that decides "today" for number masks and resets
    pub timezone: String,
    /// Compare-and-swap attempts per issued number
    pub number_cas_max_retries: u32,
    /// Currency of products that do not name one
    pub default_currency: String,
    /// Directory of product definition files
    pub products_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            timezone: "Europe/Moscow".to_string(),
            number_cas_max_retries: DEFAULT_MAX_RETRIES,
            default_currency: "RUB".to_string(),
            products_dir: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, EngineError> {
        dotenvy::dotenv().ok();
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ENGINE").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn timezone(&self) -> Result<Timezone, EngineError> {
        self.timezone
            .parse()
            .map_err(|_| EngineError::invalid_setting("timezone", &self.timezone))
    }

    pub fn currency(&self) -> Result<Currency, EngineError> {
        self.default_currency
            .parse()
            .map_err(|_| EngineError::invalid_setting("default_currency", &self.default_currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.timezone().unwrap(), Timezone::default());
        assert_eq!(config.currency().unwrap(), Currency::RUB);
        assert_eq!(config.number_cas_max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_invalid_settings() {
        let config = EngineConfig {
            timezone: "Mars/Olympus".to_string(),
            default_currency: "XXX".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(config.timezone(), Err(EngineError::InvalidSetting { .. })));
        assert!(matches!(config.currency(), Err(EngineError::InvalidSetting { .. })));
    }
}
