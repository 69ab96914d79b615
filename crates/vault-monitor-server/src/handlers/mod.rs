//! HTTP handlers

pub mod backups;
pub mod dashboard;
pub mod health;
pub mod logs;
pub mod status;

pub use health::health;
