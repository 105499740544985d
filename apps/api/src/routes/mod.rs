pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::resumes::extract::MAX_RESUME_BYTES;
use crate::resumes::handlers as resumes;
use crate::state::AppState;
use crate::workspace::handlers as workspace;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resumes & profile
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_upload_resume),
        )
        .route("/api/v1/resumes/:id", delete(resumes::handle_delete_resume))
        .route(
            "/api/v1/profile",
            get(resumes::handle_get_profile).put(resumes::handle_update_profile),
        )
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/import", post(jobs::handle_import_job))
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job).delete(jobs::handle_delete_job),
        )
        .route("/api/v1/jobs/:id/activate", post(jobs::handle_activate_job))
        // Workspace
        .route("/api/v1/workspace", get(workspace::handle_get_workspace))
        .route(
            "/api/v1/workspace/generate",
            post(workspace::handle_generate),
        )
        .route(
            "/api/v1/workspace/cover-letter",
            post(workspace::handle_generate_cover_letter).put(workspace::handle_edit_cover_letter),
        )
        .route(
            "/api/v1/workspace/recruiter-message",
            post(workspace::handle_generate_recruiter_message),
        )
        .route(
            "/api/v1/workspace/interview-questions",
            post(workspace::handle_generate_interview_questions),
        )
        // Multipart framing on top of the largest accepted resume
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES + 64 * 1024))
        .with_state(state)
}
