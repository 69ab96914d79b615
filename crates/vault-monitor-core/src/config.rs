//! Configuration for Vault Monitor
//!
//! The configuration is built once at startup and shared read-only with every
//! component.

use crate::error::Result;
use crate::types::{LogKind, Script};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default directories, relative to the working directory of the process
pub const DEFAULT_BACKUP_DIR: &str = "../backups";
pub const DEFAULT_RESTORE_LOG_DIR: &str = "../restore-logs";
pub const DEFAULT_VERIFICATION_LOG_DIR: &str = "../verification-logs";
pub const DEFAULT_SCRIPTS_DIR: &str = "../scripts";

/// Directory layout consumed by the monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub backup_dir: PathBuf,
    pub restore_log_dir: PathBuf,
    pub verification_log_dir: PathBuf,
    pub scripts_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            restore_log_dir: PathBuf::from(DEFAULT_RESTORE_LOG_DIR),
            verification_log_dir: PathBuf::from(DEFAULT_VERIFICATION_LOG_DIR),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
        }
    }
}

impl MonitorConfig {
    /// Create the backup and log directories if needed and return a copy with
    /// every directory in canonical absolute form.
    ///
    /// The scripts directory is not created; a missing scripts directory is
    /// reported through the status endpoint instead.
    pub fn prepare(&self) -> Result<Self> {
        for dir in [
            &self.backup_dir,
            &self.restore_log_dir,
            &self.verification_log_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }

        let prepared = Self {
            backup_dir: self.backup_dir.canonicalize()?,
            restore_log_dir: self.restore_log_dir.canonicalize()?,
            verification_log_dir: self.verification_log_dir.canonicalize()?,
            scripts_dir: absolute(&self.scripts_dir)?,
        };

        info!("Backup directory: {}", prepared.backup_dir.display());
        info!("Restore log directory: {}", prepared.restore_log_dir.display());
        info!(
            "Verification log directory: {}",
            prepared.verification_log_dir.display()
        );
        info!("Scripts directory: {}", prepared.scripts_dir.display());

        Ok(prepared)
    }

    /// Directory holding logs of the given kind
    pub fn log_dir(&self, kind: LogKind) -> &Path {
        match kind {
            LogKind::Restore => &self.restore_log_dir,
            LogKind::Verification => &self.verification_log_dir,
        }
    }

    /// Full path of an external script
    pub fn script_path(&self, script: Script) -> PathBuf {
        self.scripts_dir.join(script.file_name())
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    Ok(crate::paths::normalize(&std::env::current_dir()?.join(path)))
}
