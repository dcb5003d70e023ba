//! LodeRunner database provisioner library

// Public modules
pub mod config;
pub mod cosmos;
pub mod error;
pub mod logging;
pub mod provisioner;
pub mod report;

// Re-export commonly used types
pub use config::{ConnectionConfig, Settings};
pub use cosmos::CosmosClient;
pub use error::{ConfigError, ProvisionError, ServiceError};
pub use provisioner::{provision, provision_with, DatabaseService, ProvisioningSpec};
