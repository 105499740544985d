use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outputs::{CompanyResearch, InterviewQuestion, ResumeAnalysis};

/// The last-generated material for a job. Every field is optional; an empty
/// bag serializes as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research: Option<CompanyResearch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ResumeAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_questions: Option<Vec<InterviewQuestion>>,
}

impl JobOutputs {
    pub fn is_empty(&self) -> bool {
        self.research.is_none()
            && self.analysis.is_none()
            && self.cover_letter.is_none()
            && self.linkedin_message.is_none()
            && self.interview_questions.is_none()
    }

    /// Overlays the `Some` fields of `partial`, keeping stored values elsewhere.
    pub fn merge(&mut self, partial: JobOutputs) {
        let JobOutputs {
            research,
            analysis,
            cover_letter,
            linkedin_message,
            interview_questions,
        } = partial;
        if research.is_some() {
            self.research = research;
        }
        if analysis.is_some() {
            self.analysis = analysis;
        }
        if cover_letter.is_some() {
            self.cover_letter = cover_letter;
        }
        if linkedin_message.is_some() {
            self.linkedin_message = linkedin_message;
        }
        if interview_questions.is_some() {
            self.interview_questions = interview_questions;
        }
    }
}

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub job_url: Option<String>,
    pub company_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub outputs: JobOutputs,
}

/// Request body for adding a job by hand.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
}

impl NewJob {
    /// Returns the first missing required field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("company", &self.company),
            ("description", &self.description),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }
}

impl From<NewJob> for JobInfo {
    fn from(new: NewJob) -> Self {
        JobInfo {
            id: super::new_id(),
            title: new.title.trim().to_string(),
            company: new.company.trim().to_string(),
            description: new.description.trim().to_string(),
            job_url: new.job_url.filter(|u| !u.trim().is_empty()),
            company_url: new.company_url.filter(|u| !u.trim().is_empty()),
            created_at: Utc::now(),
            outputs: JobOutputs::default(),
        }
    }
}
