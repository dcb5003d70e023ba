//! Error types for configuration, service calls and provisioning

mod types;

pub use types::{ConfigError, ProvisionError, ServiceError};
