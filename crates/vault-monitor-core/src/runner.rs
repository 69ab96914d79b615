//! External command execution with a bounded timeout

use crate::types::CommandResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Executes external programs on behalf of the dashboard
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and wait at most `timeout` for it to exit.
    ///
    /// Never fails: launch errors and timeouts are reported through the
    /// returned [`CommandResult`].
    async fn run(&self, program: &Path, args: &[String], timeout: Duration) -> CommandResult;
}

/// Runs commands as child processes inside a fixed working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    working_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[String], timeout: Duration) -> CommandResult {
        debug!(
            "Running {} {:?} in {} (timeout {}s)",
            program.display(),
            args,
            self.working_dir.display(),
            timeout.as_secs()
        );

        let child = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to launch {}: {}", program.display(), e);
                return CommandResult::failed(e.to_string());
            }
        };

        // Dropping the wait future on timeout kills the child.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => CommandResult::from_exit(
                output.status.code(),
                String::from_utf8_lossy(&output.stdout).into_owned(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ),
            Ok(Err(e)) => {
                warn!("Failed waiting for {}: {}", program.display(), e);
                CommandResult::failed(e.to_string())
            }
            Err(_) => {
                warn!(
                    "{} timed out after {} seconds",
                    program.display(),
                    timeout.as_secs()
                );
                CommandResult::failed(format!(
                    "Command timed out after {} seconds",
                    timeout.as_secs()
                ))
            }
        }
    }
}
