pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::annotation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job posts
        .route(
            "/api/v1/jobs",
            get(handlers::handle_list_jobs).delete(handlers::handle_clear_jobs),
        )
        .route("/api/v1/jobs/fetch", post(handlers::handle_fetch_jobs))
        .route("/api/v1/jobs/:id/open", post(handlers::handle_open_job))
        // Editor
        .route("/api/v1/editor", get(handlers::handle_get_editor))
        .route("/api/v1/editor/gesture", post(handlers::handle_gesture))
        .route(
            "/api/v1/editor/clear-labels",
            post(handlers::handle_clear_labels),
        )
        .route("/api/v1/editor/submit", post(handlers::handle_submit))
        // Labels
        .route(
            "/api/v1/labels",
            get(handlers::handle_list_labels).post(handlers::handle_create_label),
        )
        .route("/api/v1/labels/:id", delete(handlers::handle_delete_label))
        .route(
            "/api/v1/labels/:id/select",
            post(handlers::handle_select_label),
        )
        .with_state(state)
}
