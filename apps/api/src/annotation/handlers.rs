//! Axum route handlers for the labeling command interface.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annotation::gestures::Gesture;
use crate::annotation::labels::Label;
use crate::annotation::workspace::EditorView;
use crate::errors::AppError;
use crate::models::job_post::{JobPost, JobSummary};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobSummary>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub added: usize,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLabelRequest {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LabelListResponse {
    pub labels: Vec<Label>,
    pub active_label_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub total_tokens: usize,
    pub status: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Job posts
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    let workspace = state.workspace.lock().await;
    Json(JobListResponse {
        jobs: workspace.job_summaries(),
        status: workspace.status().to_string(),
    })
}

/// POST /api/v1/jobs/fetch
///
/// Pulls the feed and adds every job post not already in the working set.
pub async fn handle_fetch_jobs(
    State(state): State<AppState>,
) -> Result<Json<FetchResponse>, AppError> {
    state.workspace.lock().await.set_status("Loading job posts...");

    let fetched = match state.feed.fetch_jobs().await {
        Ok(jobs) => jobs,
        Err(e) => {
            state
                .workspace
                .lock()
                .await
                .set_status("Error loading job posts");
            return Err(e.into());
        }
    };

    let mut workspace = state.workspace.lock().await;
    let added = workspace.ingest(fetched.into_iter().map(JobPost::from).collect());
    Ok(Json(FetchResponse {
        added,
        jobs: workspace.job_summaries(),
    }))
}

/// DELETE /api/v1/jobs
pub async fn handle_clear_jobs(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.workspace.lock().await.clear_all()?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/jobs/:id/open
pub async fn handle_open_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<EditorView>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.open(&job_id)?;
    Ok(Json(workspace.view()))
}

// ────────────────────────────────────────────────────────────────────────────
// Editor
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/editor
pub async fn handle_get_editor(State(state): State<AppState>) -> Json<EditorView> {
    Json(state.workspace.lock().await.view())
}

/// POST /api/v1/editor/gesture
///
/// One request per user gesture; returns the editor view after it applied.
pub async fn handle_gesture(
    State(state): State<AppState>,
    Json(gesture): Json<Gesture>,
) -> Result<Json<EditorView>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.dispatch(gesture)?;
    Ok(Json(workspace.view()))
}

/// POST /api/v1/editor/clear-labels
pub async fn handle_clear_labels(
    State(state): State<AppState>,
) -> Result<Json<EditorView>, AppError> {
    let mut workspace = state.workspace.lock().await;
    workspace.clear_labels()?;
    Ok(Json(workspace.view()))
}

/// POST /api/v1/editor/submit
///
/// Posts the open job post to the feed. The post is frozen while the request
/// is in flight and leaves the working set only after the backend
/// acknowledged it.
pub async fn handle_submit(
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, AppError> {
    let submission = state.workspace.lock().await.submission()?;

    if let Err(e) = state.feed.submit(&submission).await {
        state
            .workspace
            .lock()
            .await
            .abort_submission(&submission.job_id);
        return Err(e.into());
    }

    let mut workspace = state.workspace.lock().await;
    workspace.complete_submission(&submission.job_id);
    info!(
        "Saved labels for job post {} ({} tokens)",
        submission.job_id, submission.total_tokens
    );

    Ok(Json(SubmitResponse {
        job_id: submission.job_id,
        total_tokens: submission.total_tokens,
        status: workspace.status().to_string(),
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Labels
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/labels
pub async fn handle_list_labels(State(state): State<AppState>) -> Json<LabelListResponse> {
    let workspace = state.workspace.lock().await;
    let registry = workspace.registry();
    Json(LabelListResponse {
        labels: registry.labels().to_vec(),
        active_label_id: registry.active().map(|l| l.id.clone()),
    })
}

/// POST /api/v1/labels
pub async fn handle_create_label(
    State(state): State<AppState>,
    Json(req): Json<CreateLabelRequest>,
) -> Result<(StatusCode, Json<Label>), AppError> {
    let color = req
        .color
        .unwrap_or_else(|| state.config.default_label_color.clone());
    if !is_hex_color(&color) {
        return Err(AppError::Validation(format!(
            "color must be a hex color like #ffd700, got '{color}'"
        )));
    }

    let label = state
        .workspace
        .lock()
        .await
        .create_label(&req.name, &color)?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// DELETE /api/v1/labels/:id
///
/// Protected labels are left in place and still answer 204.
pub async fn handle_delete_label(
    State(state): State<AppState>,
    Path(label_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.workspace.lock().await.delete_label(&label_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/labels/:id/select
pub async fn handle_select_label(
    State(state): State<AppState>,
    Path(label_id): Path<String>,
) -> Result<Json<Label>, AppError> {
    let label = state.workspace.lock().await.select_label(&label_id)?;
    Ok(Json(label))
}

fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_validation() {
        assert!(is_hex_color("#ffd700"));
        assert!(is_hex_color("#666"));
        assert!(!is_hex_color("ffd700"));
        assert!(!is_hex_color("#ffd70"));
        assert!(!is_hex_color("#gggggg"));
    }
}
