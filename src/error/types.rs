//! Provisioning error types

use thiserror::Error;

/// Errors returned by a database service for a single call.
///
/// `AlreadyExists` is the one expected failure: the provisioner treats it as
/// an outcome rather than an error.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Service error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid master key: {0}")]
    InvalidKey(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ServiceError {
    /// Whether this is the "resource already exists" signal
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ServiceError::AlreadyExists(_))
    }

    /// Whether the failure happened before the service answered
    pub fn is_connection(&self) -> bool {
        matches!(self, ServiceError::Connection(_))
    }
}

/// A fatal provisioning failure, naming the resource that could not be created.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Failed to create database {database}: {source}")]
    Database {
        database: String,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to create container {database}/{container}: {source}")]
    Container {
        database: String,
        container: String,
        #[source]
        source: ServiceError,
    },
}

impl ProvisionError {
    /// The underlying service error
    pub fn service_error(&self) -> &ServiceError {
        match self {
            ProvisionError::Database { source, .. } | ProvisionError::Container { source, .. } => {
                source
            }
        }
    }
}

/// Invalid connection or application configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid endpoint URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Key is invalid: {0}")]
    InvalidKey(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Duplicate database name in provisioning spec: {0}")]
    DuplicateDatabase(String),
}
