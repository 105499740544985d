//! Axum route handlers for the Resume and Profile APIs.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::models::{ProfileUpdate, SavedResume, UserProfile};
use crate::resumes::extract::extract_text;
use crate::state::AppState;
use crate::workspace::WorkspaceStatus;

const FILE_FIELD: &str = "file";

/// GET /api/v1/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Json<Vec<SavedResume>> {
    let resumes = state.session.lock().await.resumes().to_vec();
    Json(resumes)
}

/// POST /api/v1/resumes
///
/// Multipart upload with a single `file` field. The extracted text replaces
/// the current resume and is shown in the workspace.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SavedResume>), AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::FileUpload(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::FileUpload(format!("Failed to read uploaded file: {e}")))?;
        upload = Some((file_name, content_type, bytes));
        break;
    }
    let (file_name, content_type, bytes) = upload.ok_or_else(|| {
        AppError::FileUpload(format!("Missing `{FILE_FIELD}` field in upload"))
    })?;
    info!("Received resume upload {file_name} ({} bytes)", bytes.len());

    let resume = store_upload(&state, file_name, content_type.as_deref(), bytes).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// Extracts the uploaded file and saves it as the current resume. The
/// workspace shows `parsing` meanwhile, unless the user switches jobs.
async fn store_upload(
    state: &AppState,
    file_name: String,
    content_type: Option<&str>,
    bytes: Bytes,
) -> Result<SavedResume, AppError> {
    let (started_on, previous_status) = {
        let mut session = state.session.lock().await;
        if session.workspace().is_busy() {
            return Err(AppError::Conflict(
                "Wait for the current generation to finish before replacing the resume"
                    .to_string(),
            ));
        }
        let started_on = session.active_job_id().map(str::to_string);
        let workspace = session.workspace_mut();
        let previous = workspace.status;
        workspace.set_status(WorkspaceStatus::Parsing);
        (started_on, previous)
    };

    let extracted = extract_text(state.ai.as_ref(), &file_name, content_type, bytes.clone()).await;

    let mut session = state.session.lock().await;
    match extracted {
        Ok(text) => {
            let resume = SavedResume::new(file_name, text, Some(bytes));
            session.add_resume(resume.clone());
            session.finish_parsing(started_on.as_deref(), previous_status);
            Ok(resume)
        }
        Err(err) => {
            session.fail_parsing(started_on.as_deref(), err.user_message());
            Err(err)
        }
    }
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.session.lock().await.remove_resume(&id);
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    let profile = state.session.lock().await.profile().clone();
    Json(profile)
}

/// PUT /api/v1/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Json<UserProfile> {
    let mut session = state.session.lock().await;
    session.update_profile(update);
    Json(session.profile().clone())
}
