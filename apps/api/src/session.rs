//! The user's session: both persisted stores, the transient workspace, and
//! the load/save lifecycle that ties them to storage.
//!
//! Every mutation that touches a persisted domain saves that domain before
//! returning. Saves never fail outward (see `storage`).

use tracing::info;

use crate::ai::GenerationContext;
use crate::errors::AppError;
use crate::models::{JobInfo, JobOutputs, ProfileUpdate, SavedResume, UserProfile};
use crate::storage::{JobStorage, ResumeStorage};
use crate::stores::{JobStore, ResumeStore};
use crate::workspace::sync::{apply_outputs, hydrate, switch_active_job};
use crate::workspace::{Feature, Workspace, WorkspaceStatus};

pub struct Session {
    resumes: ResumeStore,
    jobs: JobStore,
    workspace: Workspace,
    active_job_id: Option<String>,
    resume_storage: ResumeStorage,
    job_storage: JobStorage,
}

impl Session {
    /// Loads both domains and hydrates an empty workspace for the active resume.
    pub fn load(resume_storage: ResumeStorage, job_storage: JobStorage) -> Self {
        let resumes = ResumeStore::from_slice(resume_storage.load());
        let jobs = JobStore::new(job_storage.load());
        info!(
            "Session loaded: {} resume(s), {} job(s)",
            resumes.resumes().len(),
            jobs.jobs().len()
        );

        let workspace = hydrate(None, resumes.active());
        Self {
            resumes,
            jobs,
            workspace,
            active_job_id: None,
            resume_storage,
            job_storage,
        }
    }

    pub fn resumes(&self) -> &[SavedResume] {
        self.resumes.resumes()
    }

    pub fn profile(&self) -> &UserProfile {
        self.resumes.profile()
    }

    pub fn jobs(&self) -> &[JobInfo] {
        self.jobs.jobs()
    }

    pub fn job(&self, id: &str) -> Option<&JobInfo> {
        self.jobs.get(id)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    pub fn active_job_id(&self) -> Option<&str> {
        self.active_job_id.as_deref()
    }

    fn persist_resumes(&self) {
        self.resume_storage
            .save(self.resumes.resumes(), self.resumes.profile());
    }

    fn persist_jobs(&self) {
        self.job_storage.save(self.jobs.jobs());
    }

    // ── resumes ────────────────────────────────────────────────────────────

    /// Stores the resume (replacing any other) and points the workspace at it.
    pub fn add_resume(&mut self, resume: SavedResume) {
        info!("Saving resume {} ({})", resume.id, resume.file_name);
        self.workspace.set_resume_text(resume.text.clone());
        self.resumes.add(resume);
        self.persist_resumes();
    }

    pub fn remove_resume(&mut self, id: &str) -> bool {
        let was_active = self.resumes.active().is_some_and(|r| r.id == id);
        let removed = self.resumes.remove(id);
        if removed {
            if was_active {
                self.workspace.set_resume_text(String::new());
            }
            self.persist_resumes();
        }
        removed
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) {
        self.resumes.update_profile(update);
        self.persist_resumes();
    }

    // ── jobs ───────────────────────────────────────────────────────────────

    pub fn add_job(&mut self, job: JobInfo) {
        info!("Adding job {} ({} at {})", job.id, job.title, job.company);
        self.jobs.add(job);
        self.persist_jobs();
    }

    /// Deletes a job and its outputs. Deleting the active job resets the workspace.
    pub fn remove_job(&mut self, id: &str) -> Option<JobInfo> {
        let removed = self.jobs.remove(id)?;
        if self.active_job_id.as_deref() == Some(id) {
            self.active_job_id = None;
            self.workspace = hydrate(None, self.resumes.active());
        }
        self.persist_jobs();
        Some(removed)
    }

    /// Snapshots the current job's workspace, then hydrates `id`. Allowed while
    /// a generation is in flight; its results land on the job it was started for.
    pub fn activate_job(&mut self, id: &str) -> Result<(), AppError> {
        if self.jobs.get(id).is_none() {
            return Err(AppError::NotFound(format!("Job {id} not found")));
        }

        let outgoing = self.active_job_id.take();
        let dirty = switch_active_job(
            &mut self.jobs,
            &mut self.workspace,
            outgoing.as_deref(),
            Some(id),
            self.resumes.active(),
        );
        self.active_job_id = Some(id.to_string());
        if dirty {
            self.persist_jobs();
        }
        Ok(())
    }

    // ── generation ─────────────────────────────────────────────────────────

    /// Captures what a generation needs for the active job.
    pub fn generation_context(&self) -> Result<GenerationContext, AppError> {
        let job = self
            .active_job_id
            .as_deref()
            .and_then(|id| self.jobs.get(id))
            .ok_or_else(|| AppError::Validation("Select a job first".to_string()))?;

        let resume_text = self.workspace.resume_text.trim();
        if resume_text.is_empty() {
            return Err(AppError::Validation("Upload a resume first".to_string()));
        }

        Ok(GenerationContext {
            resume_text: resume_text.to_string(),
            job: job.clone(),
            profile: self.resumes.profile().clone(),
            research: self.workspace.research.clone(),
            analysis: self.workspace.analysis.clone(),
        })
    }

    fn is_active(&self, job_id: &str) -> bool {
        self.active_job_id.as_deref() == Some(job_id)
    }

    /// Moves the workspace from `from` to `to`, only if `job_id` is still active.
    pub fn advance_status(&mut self, job_id: &str, from: WorkspaceStatus, to: WorkspaceStatus) {
        if self.is_active(job_id) && self.workspace.status == from {
            self.workspace.set_status(to);
        }
    }

    /// Ends a resume upload started while `started_on` was the active job.
    /// A job switch during parsing already hydrated that job's status, so the
    /// status is only restored if the workspace is still the one that parsed.
    pub fn finish_parsing(&mut self, started_on: Option<&str>, restore: WorkspaceStatus) {
        if self.still_parsing(started_on) {
            self.workspace.set_status(restore);
        }
    }

    pub fn fail_parsing(&mut self, started_on: Option<&str>, message: &str) {
        if self.still_parsing(started_on) {
            self.workspace.fail(message);
        }
    }

    fn still_parsing(&self, started_on: Option<&str>) -> bool {
        self.active_job_id.as_deref() == started_on
            && self.workspace.status == WorkspaceStatus::Parsing
    }

    pub fn begin_pipeline(&mut self, job_id: &str) {
        if self.is_active(job_id) {
            self.workspace.set_status(WorkspaceStatus::Researching);
        }
    }

    pub fn begin_feature(&mut self, job_id: &str, feature: Feature) {
        if self.is_active(job_id) {
            self.workspace.begin_feature(feature);
        }
    }

    /// Stores generated outputs on the job they were generated for, and shows
    /// them in the workspace if that job is still active. Returns false if the
    /// job was deleted meanwhile.
    pub fn apply_outputs(
        &mut self,
        job_id: &str,
        outputs: JobOutputs,
        status: Option<WorkspaceStatus>,
    ) -> bool {
        if self.is_active(job_id) {
            apply_outputs(&mut self.workspace, &outputs);
            if let Some(status) = status {
                self.workspace.set_status(status);
            }
        }
        let found = self.jobs.merge_outputs(job_id, outputs);
        if found {
            self.persist_jobs();
        }
        found
    }

    pub fn fail_pipeline(&mut self, job_id: &str, message: &str) {
        if self.is_active(job_id) {
            self.workspace.fail(message);
        }
    }

    pub fn fail_feature(&mut self, job_id: &str, feature: Feature, message: &str) {
        if self.is_active(job_id) {
            self.workspace.fail_feature(feature, message);
        }
    }

    /// Manual edit of the active job's cover letter.
    pub fn edit_cover_letter(&mut self, content: String) -> Result<(), AppError> {
        let job_id = self
            .active_job_id
            .clone()
            .ok_or_else(|| AppError::Validation("Select a job first".to_string()))?;
        self.workspace.set_cover_letter(content.clone());
        let edited = JobOutputs {
            cover_letter: Some(content),
            ..Default::default()
        };
        if self.jobs.merge_outputs(&job_id, edited) {
            self.persist_jobs();
        }
        Ok(())
    }
}
