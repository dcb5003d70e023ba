//! Cosmos DB module
//!
//! Contains the REST client, request signing and the readiness wait.

pub mod auth;
pub mod client;
pub mod models;
pub mod readiness;

pub use auth::MasterKey;
pub use client::CosmosClient;
pub use readiness::{wait_for_service, ReadinessPolicy};
