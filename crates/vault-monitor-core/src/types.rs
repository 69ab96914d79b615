//! Core type definitions for Vault Monitor

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::MonitorError;

/// External scripts driven by the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Script {
    Backup,
    Restore,
    Verify,
}

impl Script {
    /// Get all known scripts
    pub fn all() -> &'static [Script] {
        &[Script::Backup, Script::Restore, Script::Verify]
    }

    /// File name inside the scripts directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Script::Backup => "backup-vault.sh",
            Script::Restore => "restore-vault.sh",
            Script::Verify => "verify-backup.sh",
        }
    }

    /// Name used in user-facing messages
    pub fn label(&self) -> &'static str {
        match self {
            Script::Backup => "Backup",
            Script::Restore => "Restore",
            Script::Verify => "Verification",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Kinds of log directories exposed by the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogKind {
    Restore,
    Verification,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Restore => "restore",
            LogKind::Verification => "verification",
        }
    }
}

impl FromStr for LogKind {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restore" => Ok(LogKind::Restore),
            "verification" => Ok(LogKind::Verification),
            _ => Err(MonitorError::Validation("Invalid log type".to_string())),
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a file's metadata, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    /// Size in bytes
    pub size: u64,
    pub size_human: String,
    pub modified: DateTime<Local>,
    pub modified_ago: String,
    /// Three-digit octal permission bits, e.g. "644"
    pub permissions: String,
}

/// A log file with the first few lines of its content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFileInfo {
    #[serde(flatten)]
    pub file: FileInfo,
    pub preview: String,
}

/// Outcome of a single external command invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub returncode: i32,
}

impl CommandResult {
    /// Sentinel exit code for timeouts and launch failures
    pub const FAILED_TO_RUN: i32 = -1;

    pub fn from_exit(code: Option<i32>, stdout: String, stderr: String) -> Self {
        let returncode = code.unwrap_or(Self::FAILED_TO_RUN);
        Self {
            success: code == Some(0),
            stdout,
            stderr,
            returncode,
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
            returncode: Self::FAILED_TO_RUN,
        }
    }
}

/// Aggregate dashboard status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub timestamp: DateTime<Local>,
    pub backup_dir_exists: bool,
    pub backup_count: usize,
    pub total_backup_size: u64,
    pub total_backup_size_human: String,
    pub latest_backup: Option<FileInfo>,
    pub oldest_backup: Option<FileInfo>,
    pub railway_cli_installed: bool,
    pub psql_installed: bool,
    /// Script file name -> exists and is executable
    pub scripts_exist: BTreeMap<String, bool>,
}
