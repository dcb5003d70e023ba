//! Application settings
//!
//! Ambient settings for the provisioner, loaded from environment variables
//! (and an optional `.env` file) with sensible defaults. Connection details
//! come from the command line instead; see [`super::ConnectionConfig`].

use anyhow::Result;
use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Default `x-ms-version` sent with every Cosmos request
pub const DEFAULT_API_VERSION: &str = "2018-12-31";

/// Readiness wait configuration
///
/// With `retries == 0` the first connection attempt is final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    pub retries: u32,
    pub interval_seconds: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            retries: 0,
            interval_seconds: 10,
        }
    }
}

impl WaitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

/// Main application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub log_level: String,

    /// Cosmos REST API version header
    pub api_version: String,

    /// Readiness wait before provisioning
    pub wait: WaitConfig,
}

impl Settings {
    /// Load settings from environment variables with defaults
    ///
    /// `overrides` (command-line values) take precedence over the
    /// environment and are applied before validation.
    pub fn load<O>(overrides: O) -> Result<Self>
    where
        O: Fn(&str) -> Option<String>,
    {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let settings = Self::from_layered(overrides, |key| env::var(key).ok())?;
        Ok(settings)
    }

    /// Build settings from `overrides`, falling back to `fallback` per key
    pub fn from_layered<O, F>(overrides: O, fallback: F) -> Result<Self, ConfigError>
    where
        O: Fn(&str) -> Option<String>,
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| overrides(key).or_else(|| fallback(key)))
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let retries = get("COSMOS_WAIT_RETRIES", "0");
        let interval = get("COSMOS_WAIT_INTERVAL_SECONDS", "10");

        let settings = Self {
            app_name: get("APP_NAME", "loderunner-provisioner"),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: get("LOG_LEVEL", "warn"),
            api_version: get("COSMOS_API_VERSION", DEFAULT_API_VERSION),
            wait: WaitConfig {
                retries: retries.trim().parse().map_err(|_| ConfigError::InvalidSetting {
                    name: "COSMOS_WAIT_RETRIES",
                    value: retries.clone(),
                })?,
                interval_seconds: interval.trim().parse().map_err(|_| {
                    ConfigError::InvalidSetting {
                        name: "COSMOS_WAIT_INTERVAL_SECONDS",
                        value: interval.clone(),
                    }
                })?,
            },
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wait.interval_seconds == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "COSMOS_WAIT_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "COSMOS_API_VERSION",
                value: self.api_version.clone(),
            });
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "loderunner-provisioner".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "warn".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            wait: WaitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "loderunner-provisioner");
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.api_version, "2018-12-31");
        assert_eq!(settings.wait.retries, 0);
    }

    #[test]
    fn test_from_empty_environment_matches_defaults() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        let defaults = Settings::default();
        assert_eq!(settings.log_level, defaults.log_level);
        assert_eq!(settings.api_version, defaults.api_version);
        assert_eq!(settings.wait, defaults.wait);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("LOG_LEVEL", "debug"),
            ("COSMOS_API_VERSION", "2020-07-15"),
            ("COSMOS_WAIT_RETRIES", "3"),
            ("COSMOS_WAIT_INTERVAL_SECONDS", "40"),
        ]))
        .unwrap();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.api_version, "2020-07-15");
        assert_eq!(settings.wait.retries, 3);
        assert_eq!(settings.wait.interval(), Duration::from_secs(40));
    }

    #[test]
    fn test_invalid_retries_rejected() {
        let err = Settings::from_lookup(lookup(&[("COSMOS_WAIT_RETRIES", "many")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSetting {
                name: "COSMOS_WAIT_RETRIES",
                value: "many".to_string()
            }
        );
    }

    #[test]
    fn test_overrides_replace_environment_before_validation() {
        let settings = Settings::from_layered(
            lookup(&[("COSMOS_WAIT_RETRIES", "3"), ("LOG_LEVEL", "info")]),
            lookup(&[("COSMOS_WAIT_RETRIES", "many"), ("LOG_LEVEL", "trace")]),
        )
        .unwrap();

        assert_eq!(settings.wait.retries, 3);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_environment_used_when_no_override() {
        let settings = Settings::from_layered(
            lookup(&[]),
            lookup(&[("COSMOS_WAIT_INTERVAL_SECONDS", "40")]),
        )
        .unwrap();
        assert_eq!(settings.wait.interval_seconds, 40);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err =
            Settings::from_lookup(lookup(&[("COSMOS_WAIT_INTERVAL_SECONDS", "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "COSMOS_WAIT_INTERVAL_SECONDS",
                ..
            }
        ));
    }
}
