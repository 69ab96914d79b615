//! Backup creation, verification and restore handlers

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};
use vault_monitor_core::{paths, CommandResult, MonitorError, Script};

pub const BACKUP_TIMEOUT: Duration = Duration::from_secs(300);
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(60);
pub const RESTORE_TIMEOUT: Duration = Duration::from_secs(600);

pub const SKIP_BACKUP_FLAG: &str = "--skip-backup";
pub const FORCE_FLAG: &str = "--force";

#[derive(Debug, Deserialize)]
pub struct CreateBackupRequest {
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBackupRequest {
    #[serde(default)]
    backup_path: String,
}

#[derive(Debug, Deserialize)]
pub struct RestoreBackupRequest {
    #[serde(default)]
    backup_path: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    skip_backup: bool,
    #[serde(default)]
    force: bool,
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateBackupRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(req) = body?;
    require_password(&state, &req.password).await?;

    let script = existing_script(&state, Script::Backup)?;

    info!("Starting manual backup...");
    let result = state.runner.run(&script, &[], BACKUP_TIMEOUT).await;

    if result.success {
        info!("Backup created successfully");
        Ok(Json(ApiResponse::completed(
            "Backup created successfully",
            result.stdout,
        )))
    } else {
        error!("Backup failed: {}", result.stderr);
        Err(execution_failure("Backup failed", result, false))
    }
}

pub async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyBackupRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(req) = body?;
    let backup = contained_backup(&state, &req.backup_path)?;
    let script = existing_script(&state, Script::Verify)?;

    info!("Verifying backup: {}", backup.display());
    let args = [backup.to_string_lossy().into_owned()];
    let result = state.runner.run(&script, &args, VERIFY_TIMEOUT).await;

    if result.success {
        info!("Backup verified: {}", backup.display());
        Ok(Json(ApiResponse::completed(
            "Verification completed successfully",
            result.stdout,
        )))
    } else {
        warn!("Verification failed for {}: {}", backup.display(), result.stderr);
        Err(execution_failure("Verification failed", result, true))
    }
}

pub async fn restore(
    State(state): State<AppState>,
    body: Result<Json<RestoreBackupRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(req) = body?;
    require_password(&state, &req.password).await?;

    let backup = contained_backup(&state, &req.backup_path)?;
    let script = existing_script(&state, Script::Restore)?;
    let args = restore_args(&backup, req.skip_backup, req.force);

    info!("Starting restore from: {}", backup.display());
    let result = state.runner.run(&script, &args, RESTORE_TIMEOUT).await;

    if result.success {
        info!("Restore completed successfully");
        Ok(Json(ApiResponse::completed(
            "Restore completed successfully",
            result.stdout,
        )))
    } else {
        error!("Restore failed: {}", result.stderr);
        Err(execution_failure("Restore failed", result, false))
    }
}

/// Arguments for the restore script: the backup path, then the optional flags
/// in a fixed order.
pub fn restore_args(backup: &Path, skip_backup: bool, force: bool) -> Vec<String> {
    let mut args = vec![backup.to_string_lossy().into_owned()];
    if skip_backup {
        args.push(SKIP_BACKUP_FLAG.to_string());
    }
    if force {
        args.push(FORCE_FLAG.to_string());
    }
    args
}

/// Argon2 verification is CPU bound, so it runs on the blocking pool.
async fn require_password(state: &AppState, password: &str) -> Result<(), MonitorError> {
    let auth = state.auth.clone();
    let password = password.to_owned();
    let valid = tokio::task::spawn_blocking(move || auth.verify(&password))
        .await
        .map_err(|e| MonitorError::PasswordHash(e.to_string()))?;

    if valid {
        Ok(())
    } else {
        warn!("Rejected request with invalid password");
        Err(MonitorError::Authentication("Invalid password".to_string()))
    }
}

/// Resolve a client-supplied backup path inside the backup directory
fn contained_backup(state: &AppState, backup_path: &str) -> Result<PathBuf, MonitorError> {
    if backup_path.is_empty() {
        return Err(MonitorError::Validation("Backup path required".to_string()));
    }

    let backup = paths::resolve_within(&state.config.backup_dir, Path::new(backup_path))?
        .ok_or_else(|| {
            warn!("Rejected backup path outside backup directory: {}", backup_path);
            MonitorError::Validation("Invalid backup path".to_string())
        })?;

    if !backup.is_file() {
        return Err(MonitorError::NotFound("Backup file not found".to_string()));
    }
    Ok(backup)
}

fn existing_script(state: &AppState, script: Script) -> Result<PathBuf, MonitorError> {
    let path = state.config.script_path(script);
    if path.exists() {
        Ok(path)
    } else {
        Err(MonitorError::MissingScript(script))
    }
}

fn execution_failure(message: &str, result: CommandResult, include_output: bool) -> ApiError {
    MonitorError::Execution {
        message: message.to_string(),
        details: result.stderr,
        output: include_output.then_some(result.stdout),
    }
    .into()
}
