//! AI capability: the single seam through which the service reaches the
//! generative-text API.
//!
//! No other module calls the API directly. Handlers and the workspace
//! pipeline depend on `dyn AiCapability`, so tests swap in `mock::MockAi`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CompanyResearch, InterviewQuestion, JobInfo, JobPostDraft, ResumeAnalysis, UserProfile,
};

pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod schema;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Gemini API key is not configured")]
    MissingApiKey,

    #[error("Network error calling Gemini: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Gemini blocked the prompt: {0}")]
    Blocked(String),

    #[error("Gemini returned an empty response")]
    EmptyResponse,
}

/// Everything a generation prompt may draw on, captured by value so the
/// session lock is not held while a request is in flight.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub resume_text: String,
    pub job: JobInfo,
    pub profile: UserProfile,
    pub research: Option<CompanyResearch>,
    pub analysis: Option<ResumeAnalysis>,
}

/// The seven AI operations.
///
/// Transport, auth and API failures are returned as `AiError`. An answer that
/// arrives but cannot be read degrades to the operation's typed fallback.
#[async_trait]
pub trait AiCapability: Send + Sync {
    async fn extract_resume_text(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<String, AiError>;

    async fn research_company(&self, job: &JobInfo) -> Result<CompanyResearch, AiError>;

    async fn analyze_resume(
        &self,
        resume_text: &str,
        job: &JobInfo,
    ) -> Result<ResumeAnalysis, AiError>;

    async fn generate_cover_letter(&self, ctx: &GenerationContext) -> Result<String, AiError>;

    async fn generate_recruiter_message(&self, ctx: &GenerationContext)
        -> Result<String, AiError>;

    async fn generate_interview_questions(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Vec<InterviewQuestion>, AiError>;

    async fn extract_job_post(&self, url: &str, page_text: &str) -> Result<JobPostDraft, AiError>;
}
