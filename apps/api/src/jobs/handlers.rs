//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::import::import_job;
use crate::models::{JobInfo, NewJob};
use crate::state::AppState;
use crate::workspace::handlers::WorkspaceResponse;

#[derive(Debug, Deserialize)]
pub struct ImportJobRequest {
    pub url: String,
}

/// GET /api/v1/jobs
///
/// Newest first.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<JobInfo>> {
    let jobs = state.session.lock().await.jobs().to_vec();
    Json(jobs)
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(request): Json<NewJob>,
) -> Result<(StatusCode, Json<JobInfo>), AppError> {
    if let Some(field) = request.missing_field() {
        return Err(AppError::Validation(format!("{field} is required")));
    }

    let job = JobInfo::from(request);
    state.session.lock().await.add_job(job.clone());
    Ok((StatusCode::CREATED, Json(job)))
}

/// POST /api/v1/jobs/import
///
/// Fetches the posting at `url` and adds the job the model extracts from it.
pub async fn handle_import_job(
    State(state): State<AppState>,
    Json(request): Json<ImportJobRequest>,
) -> Result<(StatusCode, Json<JobInfo>), AppError> {
    let job = import_job(state.ai.as_ref(), &state.http, &request.url).await?;
    state.session.lock().await.add_job(job.clone());
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobInfo>, AppError> {
    let job = state.session.lock().await.job(&id).cloned();
    job.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /api/v1/jobs/:id
///
/// Removes the job together with its generated outputs.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.session.lock().await.remove_job(&id);
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("Job {id} not found"))),
    }
}

/// POST /api/v1/jobs/:id/activate
///
/// Saves the current workspace into the outgoing job, then loads `id`.
pub async fn handle_activate_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    let mut session = state.session.lock().await;
    session.activate_job(&id)?;
    Ok(Json(WorkspaceResponse::from_session(&session)))
}
