//! Status and backup listing handlers

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;
use axum::{extract::State, Json};
use vault_monitor_core::{inspector, FileInfo, SystemStatus};

pub async fn status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let status = state.status.get_status().await?;
    Ok(Json(ApiResponse::data(status)))
}

pub async fn list_backups(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<FileInfo>>>, ApiError> {
    let backups = inspector::list_backups(&state.config.backup_dir)?;
    Ok(Json(ApiResponse::data(backups)))
}
