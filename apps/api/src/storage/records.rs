//! On-disk record shapes and their validation/migration into runtime models.
//!
//! Records carry an optional `version`. Unversioned records predate
//! versioning and are migrated on read: missing timestamps become the load
//! time and missing outputs become `{}`. A record that fails validation is
//! dropped on its own; the rest of the load proceeds.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::json_kind;
use crate::models::{JobInfo, JobOutputs, SavedResume, UserProfile};

pub const CURRENT_RECORD_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record shape is invalid: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),

    #[error("field '{field}' is not an ISO-8601 timestamp: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResume {
    pub id: String,
    pub file_name: String,
    pub text: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJobInfo {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUserProfile {
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub active_resume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl From<&SavedResume> for StoredResume {
    fn from(resume: &SavedResume) -> Self {
        StoredResume {
            id: resume.id.clone(),
            file_name: resume.file_name.clone(),
            text: resume.text.clone(),
            uploaded_at: Some(resume.uploaded_at.to_rfc3339()),
            version: Some(CURRENT_RECORD_VERSION),
        }
    }
}

impl StoredResume {
    pub fn into_runtime(self, now: DateTime<Utc>) -> Result<SavedResume, RecordError> {
        if self.id.trim().is_empty() {
            return Err(RecordError::MissingField("id"));
        }
        let legacy = self.version.is_none();
        Ok(SavedResume {
            uploaded_at: parse_timestamp("uploadedAt", self.uploaded_at, legacy, now)?,
            id: self.id,
            file_name: self.file_name,
            text: self.text,
            file: None,
        })
    }
}

impl From<&JobInfo> for StoredJobInfo {
    fn from(job: &JobInfo) -> Self {
        StoredJobInfo {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            description: job.description.clone(),
            job_url: job.job_url.clone(),
            company_url: job.company_url.clone(),
            created_at: Some(job.created_at.to_rfc3339()),
            outputs: outputs_value(&job.id, &job.outputs),
            version: Some(CURRENT_RECORD_VERSION),
        }
    }
}

/// Outputs that fail to serialize are stored as missing and read back as `{}`.
fn outputs_value<T: Serialize>(job_id: &str, outputs: &T) -> Option<Value> {
    match serde_json::to_value(outputs) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to serialize outputs of job {job_id}, storing none: {e}");
            None
        }
    }
}

impl StoredJobInfo {
    pub fn into_runtime(self, now: DateTime<Utc>) -> Result<JobInfo, RecordError> {
        if self.id.trim().is_empty() {
            return Err(RecordError::MissingField("id"));
        }
        let legacy = self.version.is_none();
        let created_at = parse_timestamp("createdAt", self.created_at, legacy, now)?;

        // Unreadable outputs cost the job its generated material, not its existence.
        let outputs = match self.outputs {
            None | Some(Value::Null) => JobOutputs::default(),
            Some(raw) => serde_json::from_value(raw).unwrap_or_else(|e| {
                warn!("Job {} has unreadable outputs, resetting them: {e}", self.id);
                JobOutputs::default()
            }),
        };

        Ok(JobInfo {
            id: self.id,
            title: self.title,
            company: self.company,
            description: self.description,
            job_url: self.job_url,
            company_url: self.company_url,
            created_at,
            outputs,
        })
    }
}

impl From<&UserProfile> for StoredUserProfile {
    fn from(profile: &UserProfile) -> Self {
        StoredUserProfile {
            portfolio_url: profile.portfolio_url.clone(),
            linkedin_url: profile.linkedin_url.clone(),
            active_resume_id: profile.active_resume_id.clone(),
            version: Some(CURRENT_RECORD_VERSION),
        }
    }
}

impl From<StoredUserProfile> for UserProfile {
    fn from(stored: StoredUserProfile) -> Self {
        UserProfile {
            portfolio_url: stored.portfolio_url,
            linkedin_url: stored.linkedin_url,
            active_resume_id: stored.active_resume_id,
        }
    }
}

fn parse_timestamp(
    field: &'static str,
    raw: Option<String>,
    legacy: bool,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, RecordError> {
    match raw {
        Some(value) => DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| RecordError::InvalidTimestamp { field, value }),
        None if legacy => Ok(now),
        None => Err(RecordError::MissingField(field)),
    }
}

/// Parses an array of stored records, dropping (and logging) every record
/// that fails to deserialize or convert.
pub(crate) fn parse_records<S, T>(
    field: &str,
    value: Option<&Value>,
    now: DateTime<Utc>,
    convert: impl Fn(S, DateTime<Utc>) -> Result<T, RecordError>,
) -> Vec<T>
where
    S: DeserializeOwned,
{
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(
                "Stored '{field}' is a {} instead of an array, ignoring it",
                json_kind(other)
            );
            return Vec::new();
        }
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let result = serde_json::from_value::<S>(item.clone())
                .map_err(RecordError::from)
                .and_then(|stored| convert(stored, now));
            match result {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Dropping malformed '{field}' record #{index}: {e}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_legacy_job_gets_defaults() {
        let stored: StoredJobInfo = serde_json::from_value(json!({
            "id": "j1", "title": "SWE", "company": "Acme", "description": "..."
        }))
        .unwrap();
        let job = stored.into_runtime(now()).unwrap();
        assert_eq!(job.created_at, now());
        assert!(job.outputs.is_empty());
    }

    #[test]
    fn test_versioned_job_requires_created_at() {
        let stored: StoredJobInfo = serde_json::from_value(json!({
            "id": "j1", "title": "SWE", "company": "Acme", "description": "...", "version": 1
        }))
        .unwrap();
        assert!(matches!(
            stored.into_runtime(now()),
            Err(RecordError::MissingField("createdAt"))
        ));
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let stored: StoredResume = serde_json::from_value(json!({
            "id": "r1", "fileName": "cv.pdf", "text": "hello", "uploadedAt": "last tuesday"
        }))
        .unwrap();
        assert!(matches!(
            stored.into_runtime(now()),
            Err(RecordError::InvalidTimestamp { field: "uploadedAt", .. })
        ));
    }

    #[test]
    fn test_unreadable_outputs_reset_to_empty() {
        let stored: StoredJobInfo = serde_json::from_value(json!({
            "id": "j1", "title": "SWE", "company": "Acme", "description": "...",
            "outputs": {"analysis": "not an object"}
        }))
        .unwrap();
        assert!(stored.into_runtime(now()).unwrap().outputs.is_empty());
    }

    #[test]
    fn test_job_outputs_are_stored_as_object() {
        let mut job = JobInfo::from(crate::models::NewJob {
            title: "SWE".to_string(),
            company: "Acme".to_string(),
            description: "...".to_string(),
            job_url: None,
            company_url: None,
        });
        job.outputs.cover_letter = Some("Dear Acme".to_string());
        let stored = StoredJobInfo::from(&job);
        assert_eq!(stored.outputs, Some(json!({"coverLetter": "Dear Acme"})));
    }

    #[test]
    fn test_unserializable_outputs_are_stored_as_none() {
        // Non-string map keys cannot become JSON object keys.
        let outputs = std::collections::BTreeMap::from([((1u8, 2u8), "x")]);
        assert!(outputs_value("j1", &outputs).is_none());
    }

    #[test]
    fn test_parse_records_filters_malformed_entries() {
        let raw = json!([
            {"id": "j1", "title": "SWE", "company": "Acme", "description": "..."},
            {"id": "j2", "title": 42},
            "not a record",
            {"id": "", "title": "SWE", "company": "Acme", "description": "..."},
            {"id": "j3", "title": "SRE", "company": "Initech", "description": "...",
             "createdAt": "2025-12-01T08:30:00.000Z", "version": 1}
        ]);
        let jobs = parse_records("jobs", Some(&raw), now(), StoredJobInfo::into_runtime);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j1", "j3"]);
    }

    #[test]
    fn test_parse_records_non_array_is_empty() {
        let raw = json!({"id": "j1"});
        let jobs = parse_records("jobs", Some(&raw), now(), StoredJobInfo::into_runtime);
        assert!(jobs.is_empty());
    }
}
