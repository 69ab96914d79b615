//! Vault Monitor - Core Library
//!
//! Command execution, backup and log inspection, path containment and status
//! aggregation behind the Vault Monitor dashboard.

pub mod auth;
pub mod config;
pub mod error;
pub mod inspector;
pub mod paths;
pub mod runner;
pub mod status;
pub mod types;

pub use auth::{Authenticator, PasswordAuthenticator};
pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use runner::{CommandRunner, ProcessRunner};
pub use status::StatusAggregator;
pub use types::*;
