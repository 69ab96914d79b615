//! Conversion of failures into HTTP responses

use crate::response::ApiResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use vault_monitor_core::MonitorError;

/// Error returned by every handler; always rendered as the JSON envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Invalid request body: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Monitor(e) => match e {
                MonitorError::Authentication(_) => StatusCode::UNAUTHORIZED,
                MonitorError::Validation(_) => StatusCode::BAD_REQUEST,
                MonitorError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match self {
            ApiError::Monitor(MonitorError::Execution {
                message,
                details,
                output,
            }) => ApiResponse::failure(message)
                .with_details(details)
                .with_output(output),
            other => ApiResponse::failure(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
