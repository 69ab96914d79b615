//! System status aggregation

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::inspector;
use crate::runner::CommandRunner;
use crate::types::{Script, SystemStatus};
use chrono::Local;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Timeout for each tool-availability probe
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub const RAILWAY_CLI: &str = "railway";
pub const PSQL: &str = "psql";

/// Builds [`SystemStatus`] snapshots from the filesystem and tool probes
pub struct StatusAggregator {
    config: Arc<MonitorConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl StatusAggregator {
    pub fn new(config: Arc<MonitorConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub async fn get_status(&self) -> Result<SystemStatus> {
        let backup_dir = &self.config.backup_dir;
        let (backup_count, total_backup_size) = inspector::backup_totals(backup_dir)?;
        let backups = inspector::list_backups(backup_dir)?;

        let (railway_cli_installed, psql_installed) =
            tokio::join!(self.probe_tool(RAILWAY_CLI), self.probe_tool(PSQL));

        let scripts_exist = Script::all()
            .iter()
            .map(|script| {
                (
                    script.file_name().to_string(),
                    is_executable(&self.config.script_path(*script)),
                )
            })
            .collect::<BTreeMap<_, _>>();

        Ok(SystemStatus {
            timestamp: Local::now(),
            backup_dir_exists: backup_dir.exists(),
            backup_count,
            total_backup_size,
            total_backup_size_human: inspector::format_bytes(total_backup_size),
            latest_backup: backups.first().cloned(),
            oldest_backup: backups.last().cloned(),
            railway_cli_installed,
            psql_installed,
            scripts_exist,
        })
    }

    /// Best-effort `which <tool>` check
    async fn probe_tool(&self, tool: &str) -> bool {
        self.runner
            .run(Path::new("which"), &[tool.to_string()], PROBE_TIMEOUT)
            .await
            .success
    }
}

/// Whether `path` exists and carries an executable permission bit
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        metadata.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandResult;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Reports only `psql` as installed and records every probe
    struct FakeRunner {
        calls: Mutex<Vec<(PathBuf, Vec<String>, Duration)>>,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, program: &Path, args: &[String], timeout: Duration) -> CommandResult {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec(), timeout));
            if args.first().map(String::as_str) == Some(PSQL) {
                CommandResult::from_exit(Some(0), "/usr/bin/psql\n".into(), String::new())
            } else {
                CommandResult::from_exit(Some(1), String::new(), String::new())
            }
        }
    }

    fn config_in(root: &Path) -> Result<MonitorConfig> {
        MonitorConfig {
            backup_dir: root.join("backups"),
            restore_log_dir: root.join("restore-logs"),
            verification_log_dir: root.join("verification-logs"),
            scripts_dir: root.join("scripts"),
        }
        .prepare()
    }

    #[tokio::test]
    async fn test_status_snapshot() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = config_in(temp_dir.path())?;
        std::fs::create_dir_all(&config.scripts_dir)?;
        std::fs::write(config.backup_dir.join("one.sql"), vec![0u8; 1024])?;
        std::fs::write(config.backup_dir.join("two.sql.gz"), vec![0u8; 512])?;
        std::fs::write(config.script_path(Script::Backup), "#!/bin/sh\n")?;
        std::fs::write(config.script_path(Script::Verify), "#!/bin/sh\n")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(
                config.script_path(Script::Backup),
                std::fs::Permissions::from_mode(0o755),
            )?;
            std::fs::set_permissions(
                config.script_path(Script::Verify),
                std::fs::Permissions::from_mode(0o644),
            )?;
        }

        let runner = Arc::new(FakeRunner {
            calls: Mutex::new(Vec::new()),
        });
        let aggregator = StatusAggregator::new(Arc::new(config), runner.clone());
        let status = aggregator.get_status().await?;

        assert!(status.backup_dir_exists);
        assert_eq!(status.backup_count, 2);
        assert_eq!(status.total_backup_size, 1536);
        assert_eq!(status.total_backup_size_human, "1.50 KB");
        assert!(status.latest_backup.is_some());
        assert!(status.oldest_backup.is_some());
        assert!(!status.railway_cli_installed);
        assert!(status.psql_installed);

        assert_eq!(status.scripts_exist.get("restore-vault.sh"), Some(&false));
        #[cfg(unix)]
        {
            assert_eq!(status.scripts_exist.get("backup-vault.sh"), Some(&true));
            assert_eq!(status.scripts_exist.get("verify-backup.sh"), Some(&false));
        }

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|(program, _, timeout)| program == Path::new("which")
                && *timeout == PROBE_TIMEOUT));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_backup_dir() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = config_in(temp_dir.path())?;
        let runner = Arc::new(FakeRunner {
            calls: Mutex::new(Vec::new()),
        });

        let status = StatusAggregator::new(Arc::new(config), runner)
            .get_status()
            .await?;

        assert_eq!(status.backup_count, 0);
        assert_eq!(status.total_backup_size_human, "0.00 B");
        assert!(status.latest_backup.is_none());
        assert!(status.oldest_backup.is_none());
        assert_eq!(status.scripts_exist.len(), 3);
        assert!(status.scripts_exist.values().all(|exists| !exists));

        Ok(())
    }
}
