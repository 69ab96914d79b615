//! Restore and verification log handlers

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use vault_monitor_core::{inspector, paths, LogFileInfo, LogKind, MonitorError};

/// Maximum number of log entries returned by the listing endpoints
pub const LOG_LIMIT: usize = 20;

pub async fn restore_logs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LogFileInfo>>>, ApiError> {
    list(&state, LogKind::Restore)
}

pub async fn verification_logs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<LogFileInfo>>>, ApiError> {
    list(&state, LogKind::Verification)
}

fn list(state: &AppState, kind: LogKind) -> Result<Json<ApiResponse<Vec<LogFileInfo>>>, ApiError> {
    let logs = inspector::list_logs(state.config.log_dir(kind), LOG_LIMIT)?;
    Ok(Json(ApiResponse::data(logs)))
}

/// Stream a log file as a plain-text attachment
pub async fn download(
    State(state): State<AppState>,
    Path((log_type, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind: LogKind = log_type.parse()?;
    let log_dir = state.config.log_dir(kind);

    let log_file = paths::resolve_within(log_dir, &log_dir.join(&filename))?.ok_or_else(|| {
        warn!("Rejected {} log path outside log directory: {}", kind, filename);
        MonitorError::Validation("Invalid file path".to_string())
    })?;

    if !log_file.is_file() {
        return Err(MonitorError::NotFound("Log file not found".to_string()).into());
    }

    debug!("Sending {} log {}", kind, log_file.display());
    let file = tokio::fs::File::open(&log_file)
        .await
        .map_err(MonitorError::from)?;
    let attachment_name = log_file
        .file_name()
        .map(|n| n.to_string_lossy().replace('"', ""))
        .unwrap_or(filename);

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", attachment_name),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
