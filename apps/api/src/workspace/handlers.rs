//! Axum route handlers for the Workspace API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::session::Session;
use crate::state::AppState;
use crate::workspace::pipeline::{run_feature, run_generation};
use crate::workspace::{Feature, Workspace};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub active_job_id: Option<String>,
    pub workspace: Workspace,
}

impl WorkspaceResponse {
    pub fn from_session(session: &Session) -> Self {
        Self {
            active_job_id: session.active_job_id().map(str::to_string),
            workspace: session.workspace().clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EditCoverLetterRequest {
    pub content: String,
}

async fn current(state: &AppState) -> Json<WorkspaceResponse> {
    Json(WorkspaceResponse::from_session(&*state.session.lock().await))
}

/// GET /api/v1/workspace
pub async fn handle_get_workspace(State(state): State<AppState>) -> Json<WorkspaceResponse> {
    current(&state).await
}

/// POST /api/v1/workspace/generate
///
/// Runs company research and resume analysis together, then writes the cover
/// letter. On failure the workspace is left in the `error` status.
pub async fn handle_generate(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    run_generation(&state).await?;
    Ok(current(&state).await)
}

/// POST /api/v1/workspace/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    run_feature(&state, Feature::CoverLetter).await?;
    Ok(current(&state).await)
}

/// PUT /api/v1/workspace/cover-letter
pub async fn handle_edit_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<EditCoverLetterRequest>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    let mut session = state.session.lock().await;
    session.edit_cover_letter(request.content)?;
    Ok(Json(WorkspaceResponse::from_session(&session)))
}

/// POST /api/v1/workspace/recruiter-message
pub async fn handle_generate_recruiter_message(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    run_feature(&state, Feature::RecruiterMessage).await?;
    Ok(current(&state).await)
}

/// POST /api/v1/workspace/interview-questions
pub async fn handle_generate_interview_questions(
    State(state): State<AppState>,
) -> Result<Json<WorkspaceResponse>, AppError> {
    run_feature(&state, Feature::InterviewPrep).await?;
    Ok(current(&state).await)
}
