//! Mock AI capability for tests.
//!
//! Returns canned results and records which operations were called. Any
//! operation can be told to fail with a given `AiError` factory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;

use super::{AiCapability, AiError, GenerationContext};
use crate::models::{
    CompanyResearch, InterviewQuestion, JobInfo, JobPostDraft, ResumeAnalysis,
};
use crate::session::Session;

pub const OP_EXTRACT_RESUME: &str = "extract_resume_text";
pub const OP_RESEARCH: &str = "research_company";
pub const OP_ANALYZE: &str = "analyze_resume";
pub const OP_COVER_LETTER: &str = "generate_cover_letter";
pub const OP_RECRUITER: &str = "generate_recruiter_message";
pub const OP_INTERVIEW: &str = "generate_interview_questions";
pub const OP_JOB_POST: &str = "extract_job_post";

type ErrorFactory = fn() -> AiError;

pub struct MockAi {
    failures: HashMap<&'static str, ErrorFactory>,
    calls: Mutex<Vec<&'static str>>,
    pub research: CompanyResearch,
    pub analysis: ResumeAnalysis,
    pub cover_letter: String,
    pub recruiter_message: String,
    pub questions: Vec<InterviewQuestion>,
    pub job_post: JobPostDraft,
    pub resume_text: String,
}

impl MockAi {
    pub fn new() -> Self {
        Self {
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            research: CompanyResearch {
                summary: "Acme builds reusable rockets.".to_string(),
                industry: "Aerospace".to_string(),
                values: vec!["Safety".to_string()],
                ..Default::default()
            },
            analysis: ResumeAnalysis {
                match_score: 78,
                matching_skills: vec!["Rust".to_string()],
                missing_skills: vec!["Kubernetes".to_string()],
                ..Default::default()
            },
            cover_letter: "Dear Acme hiring team,".to_string(),
            recruiter_message: "Hi! Quick chat about the role?".to_string(),
            questions: vec![InterviewQuestion {
                question: "Tell us about a hard Rust bug.".to_string(),
                category: "technical".to_string(),
                suggested_answer: "The borrow checker story.".to_string(),
            }],
            job_post: JobPostDraft {
                title: "Rust Engineer".to_string(),
                company: "Acme".to_string(),
                description: "Write Rust for rockets.".to_string(),
                company_url: Some("https://acme.example".to_string()),
            },
            resume_text: "Extracted resume text".to_string(),
        }
    }

    /// Makes `operation` fail with the error `factory` builds.
    pub fn failing(mut self, operation: &'static str, factory: ErrorFactory) -> Self {
        self.failures.insert(operation, factory);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, operation: &'static str) -> Result<(), AiError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(operation);
        match self.failures.get(operation) {
            Some(factory) => Err(factory()),
            None => Ok(()),
        }
    }
}

impl Default for MockAi {
    fn default() -> Self {
        Self::new()
    }
}

pub fn rate_limited() -> AiError {
    AiError::Api {
        status: 429,
        message: "Resource has been exhausted (e.g. check quota).".to_string(),
    }
}

#[async_trait]
impl AiCapability for MockAi {
    async fn extract_resume_text(
        &self,
        _file_name: &str,
        _mime_type: &str,
        _bytes: &[u8],
    ) -> Result<String, AiError> {
        self.record(OP_EXTRACT_RESUME)?;
        Ok(self.resume_text.clone())
    }

    async fn research_company(&self, _job: &JobInfo) -> Result<CompanyResearch, AiError> {
        self.record(OP_RESEARCH)?;
        Ok(self.research.clone())
    }

    async fn analyze_resume(
        &self,
        _resume_text: &str,
        _job: &JobInfo,
    ) -> Result<ResumeAnalysis, AiError> {
        self.record(OP_ANALYZE)?;
        Ok(self.analysis.clone())
    }

    async fn generate_cover_letter(&self, _ctx: &GenerationContext) -> Result<String, AiError> {
        self.record(OP_COVER_LETTER)?;
        Ok(self.cover_letter.clone())
    }

    async fn generate_recruiter_message(
        &self,
        _ctx: &GenerationContext,
    ) -> Result<String, AiError> {
        self.record(OP_RECRUITER)?;
        Ok(self.recruiter_message.clone())
    }

    async fn generate_interview_questions(
        &self,
        _ctx: &GenerationContext,
    ) -> Result<Vec<InterviewQuestion>, AiError> {
        self.record(OP_INTERVIEW)?;
        Ok(self.questions.clone())
    }

    async fn extract_job_post(
        &self,
        _url: &str,
        _page_text: &str,
    ) -> Result<JobPostDraft, AiError> {
        self.record(OP_JOB_POST)?;
        Ok(self.job_post.clone())
    }
}

/// Wraps `MockAi` and switches the active job when `trigger` is called,
/// to exercise results that arrive after the user moved on.
pub struct JobSwitchingAi {
    pub inner: MockAi,
    trigger: &'static str,
    session: OnceLock<Arc<tokio::sync::Mutex<Session>>>,
    switch_to: OnceLock<String>,
}

impl JobSwitchingAi {
    pub fn new(trigger: &'static str) -> Self {
        Self {
            inner: MockAi::new(),
            trigger,
            session: OnceLock::new(),
            switch_to: OnceLock::new(),
        }
    }

    pub fn arm(&self, session: Arc<tokio::sync::Mutex<Session>>, switch_to: &str) {
        self.session.set(session).ok();
        self.switch_to.set(switch_to.to_string()).ok();
    }

    async fn maybe_switch(&self, operation: &'static str) {
        if operation != self.trigger {
            return;
        }
        if let (Some(session), Some(target)) = (self.session.get(), self.switch_to.get()) {
            session
                .lock()
                .await
                .activate_job(target)
                .unwrap_or_else(|e| panic!("switching to {target} failed: {e}"));
        }
    }
}

#[async_trait]
impl AiCapability for JobSwitchingAi {
    async fn extract_resume_text(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<String, AiError> {
        self.maybe_switch(OP_EXTRACT_RESUME).await;
        self.inner.extract_resume_text(file_name, mime_type, bytes).await
    }

    async fn research_company(&self, job: &JobInfo) -> Result<CompanyResearch, AiError> {
        self.maybe_switch(OP_RESEARCH).await;
        self.inner.research_company(job).await
    }

    async fn analyze_resume(
        &self,
        resume_text: &str,
        job: &JobInfo,
    ) -> Result<ResumeAnalysis, AiError> {
        self.maybe_switch(OP_ANALYZE).await;
        self.inner.analyze_resume(resume_text, job).await
    }

    async fn generate_cover_letter(&self, ctx: &GenerationContext) -> Result<String, AiError> {
        self.maybe_switch(OP_COVER_LETTER).await;
        self.inner.generate_cover_letter(ctx).await
    }

    async fn generate_recruiter_message(
        &self,
        ctx: &GenerationContext,
    ) -> Result<String, AiError> {
        self.maybe_switch(OP_RECRUITER).await;
        self.inner.generate_recruiter_message(ctx).await
    }

    async fn generate_interview_questions(
        &self,
        ctx: &GenerationContext,
    ) -> Result<Vec<InterviewQuestion>, AiError> {
        self.maybe_switch(OP_INTERVIEW).await;
        self.inner.generate_interview_questions(ctx).await
    }

    async fn extract_job_post(
        &self,
        url: &str,
        page_text: &str,
    ) -> Result<JobPostDraft, AiError> {
        self.maybe_switch(OP_JOB_POST).await;
        self.inner.extract_job_post(url, page_text).await
    }
}
