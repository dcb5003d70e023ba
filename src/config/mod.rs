//! Configuration management module
//!
//! This module handles loading and validating application settings from
//! environment variables and .env files, and the connection details given
//! on the command line.

pub mod connection;
pub mod settings;

pub use connection::ConnectionConfig;
pub use settings::{Settings, WaitConfig, DEFAULT_API_VERSION};
