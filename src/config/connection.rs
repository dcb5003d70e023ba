//! Connection configuration
//!
//! Endpoint, master key and TLS verification flag for the single client a
//! provisioning run uses. Built once from CLI input and never mutated.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Url;
use std::fmt;

use crate::error::ConfigError;

/// Shortest key accepted; real account and emulator keys are 88 characters.
pub const MIN_KEY_LENGTH: usize = 64;

/// Validated connection settings for a database service
#[derive(Clone)]
pub struct ConnectionConfig {
    endpoint: Url,
    key: String,
    verify_tls: bool,
}

impl ConnectionConfig {
    /// Create a validated connection config
    ///
    /// # Arguments
    /// * `url` - Account endpoint, e.g. `https://localhost:8081/`
    /// * `key` - Base64 master key
    /// * `verify_tls` - Whether server certificates are verified
    pub fn new(url: &str, key: &str, verify_tls: bool) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(url)?;
        let key = validate_key(key)?;

        if verify_tls && endpoint.scheme() != "https" {
            tracing::debug!(
                endpoint = %endpoint,
                "Endpoint is not https; traffic to the database service is unencrypted"
            );
        }

        Ok(Self {
            endpoint,
            key,
            verify_tls,
        })
    }

    /// Config for a hosted account (certificates verified)
    pub fn production(url: &str, key: &str) -> Result<Self, ConfigError> {
        Self::new(url, key, true)
    }

    /// Config for the local emulator (certificate verification disabled)
    pub fn emulator(url: &str, key: &str) -> Result<Self, ConfigError> {
        Self::new(url, key, false)
    }

    /// Account endpoint, always ending in `/`
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

fn parse_endpoint(url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid("endpoint cannot be empty"));
    }

    let mut endpoint = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if endpoint.host_str().is_none() {
        return Err(invalid("endpoint has no host"));
    }
    if endpoint.query().is_some() || endpoint.fragment().is_some() {
        return Err(invalid("endpoint cannot carry a query or fragment"));
    }

    // Resource paths are joined onto the endpoint
    if !endpoint.path().ends_with('/') {
        let path = format!("{}/", endpoint.path());
        endpoint.set_path(&path);
    }

    Ok(endpoint)
}

fn validate_key(key: &str) -> Result<String, ConfigError> {
    let key = key.trim();

    if key.is_empty() {
        return Err(ConfigError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() < MIN_KEY_LENGTH {
        return Err(ConfigError::InvalidKey(format!(
            "expected at least {} characters, got {}",
            MIN_KEY_LENGTH,
            key.len()
        )));
    }
    if STANDARD.decode(key).is_err() {
        return Err(ConfigError::InvalidKey("key is not valid base64".to_string()));
    }

    Ok(key.to_string())
}
