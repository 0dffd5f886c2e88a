use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Router の構築
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/request-reset", post(handlers::request_password_reset))
        .route("/reset-password", post(handlers::reset_password))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
