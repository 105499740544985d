//! Transient state for the active job/resume pair.
//!
//! Nothing here outlives a job switch: the workspace is rebuilt from the
//! incoming job's outputs by `sync::hydrate`.

pub mod handlers;
pub mod pipeline;
pub mod sync;

use serde::Serialize;

use crate::models::{CompanyResearch, InterviewQuestion, ResumeAnalysis};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceStatus {
    #[default]
    Idle,
    Parsing,
    Researching,
    Analyzing,
    Generating,
    Completed,
    Error,
}

/// Per-feature generation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureState<T> {
    pub content: T,
    pub generating: bool,
    pub error: Option<String>,
}

impl<T> FeatureState<T> {
    pub fn with_content(content: T) -> Self {
        Self {
            content,
            generating: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub status: WorkspaceStatus,
    pub resume_text: String,
    pub research: Option<CompanyResearch>,
    pub analysis: Option<ResumeAnalysis>,
    pub cover_letter: FeatureState<String>,
    pub recruiter_message: FeatureState<String>,
    pub interview_prep: FeatureState<Vec<InterviewQuestion>>,
    pub error: Option<String>,
}

/// Features generated on demand, outside the main pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    CoverLetter,
    RecruiterMessage,
    InterviewPrep,
}

impl Workspace {
    pub fn set_status(&mut self, status: WorkspaceStatus) {
        self.status = status;
        if status != WorkspaceStatus::Error {
            self.error = None;
        }
    }

    pub fn set_resume_text(&mut self, text: impl Into<String>) {
        self.resume_text = text.into();
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = WorkspaceStatus::Error;
        self.error = Some(message.into());
    }

    pub fn set_research(&mut self, research: CompanyResearch) {
        self.research = Some(research);
    }

    pub fn set_analysis(&mut self, analysis: ResumeAnalysis) {
        self.analysis = Some(analysis);
    }

    pub fn set_cover_letter(&mut self, content: impl Into<String>) {
        self.cover_letter = FeatureState::with_content(content.into());
    }

    pub fn set_recruiter_message(&mut self, content: impl Into<String>) {
        self.recruiter_message = FeatureState::with_content(content.into());
    }

    pub fn set_interview_prep(&mut self, questions: Vec<InterviewQuestion>) {
        self.interview_prep = FeatureState::with_content(questions);
    }

    pub fn is_generating(&self, feature: Feature) -> bool {
        match feature {
            Feature::CoverLetter => self.cover_letter.generating,
            Feature::RecruiterMessage => self.recruiter_message.generating,
            Feature::InterviewPrep => self.interview_prep.generating,
        }
    }

    pub fn begin_feature(&mut self, feature: Feature) {
        match feature {
            Feature::CoverLetter => {
                self.cover_letter.generating = true;
                self.cover_letter.error = None;
            }
            Feature::RecruiterMessage => {
                self.recruiter_message.generating = true;
                self.recruiter_message.error = None;
            }
            Feature::InterviewPrep => {
                self.interview_prep.generating = true;
                self.interview_prep.error = None;
            }
        }
    }

    /// Records a failed on-demand generation, keeping the previous content.
    pub fn fail_feature(&mut self, feature: Feature, message: impl Into<String>) {
        let message = Some(message.into());
        match feature {
            Feature::CoverLetter => {
                self.cover_letter.generating = false;
                self.cover_letter.error = message;
            }
            Feature::RecruiterMessage => {
                self.recruiter_message.generating = false;
                self.recruiter_message.error = message;
            }
            Feature::InterviewPrep => {
                self.interview_prep.generating = false;
                self.interview_prep.error = message;
            }
        }
    }

    /// True while the pipeline is mid-flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.status,
            WorkspaceStatus::Parsing
                | WorkspaceStatus::Researching
                | WorkspaceStatus::Analyzing
                | WorkspaceStatus::Generating
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shape_is_idle_and_empty() {
        let ws = Workspace::default();
        assert_eq!(ws.status, WorkspaceStatus::Idle);
        assert!(ws.resume_text.is_empty());
        assert!(ws.cover_letter.content.is_empty());
        assert!(ws.interview_prep.content.is_empty());
        assert!(ws.error.is_none());
    }

    #[test]
    fn test_fail_feature_keeps_content() {
        let mut ws = Workspace::default();
        ws.set_recruiter_message("Hi Jane");
        ws.begin_feature(Feature::RecruiterMessage);
        assert!(ws.is_generating(Feature::RecruiterMessage));

        ws.fail_feature(Feature::RecruiterMessage, "Network down");
        assert!(!ws.is_generating(Feature::RecruiterMessage));
        assert_eq!(ws.recruiter_message.content, "Hi Jane");
        assert_eq!(ws.recruiter_message.error.as_deref(), Some("Network down"));
    }

    #[test]
    fn test_status_change_clears_error() {
        let mut ws = Workspace::default();
        ws.fail("boom");
        assert!(!ws.is_busy());
        ws.set_status(WorkspaceStatus::Researching);
        assert!(ws.error.is_none());
        assert!(ws.is_busy());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_value(WorkspaceStatus::Researching).unwrap();
        assert_eq!(json, "researching");
    }
}
