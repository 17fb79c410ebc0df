pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

/// Uploads are single one-page resume PDFs; 10 MiB is generous headroom.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // One endpoint per action button
        .route("/api/v1/evaluations/review", post(handlers::handle_review))
        .route("/api/v1/evaluations/skills", post(handlers::handle_skills))
        .route("/api/v1/evaluations/match", post(handlers::handle_match))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
