//! Route table

use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::status::status))
        .route("/backups", get(handlers::status::list_backups))
        .route("/backups/create", post(handlers::backups::create))
        .route("/backups/verify", post(handlers::backups::verify))
        .route("/backups/restore", post(handlers::backups::restore))
        .route("/logs/restore", get(handlers::logs::restore_logs))
        .route("/logs/verification", get(handlers::logs::verification_logs))
        .route(
            "/logs/download/:log_type/:filename",
            get(handlers::logs::download),
        )
}
