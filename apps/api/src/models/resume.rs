use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A resume the user uploaded, with its extracted plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResume {
    pub id: String,
    pub file_name: String,
    pub text: String,
    pub uploaded_at: DateTime<Utc>,
    /// Raw upload bytes. Held only for the lifetime of the process.
    #[serde(skip)]
    pub file: Option<Bytes>,
}

impl SavedResume {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>, file: Option<Bytes>) -> Self {
        Self {
            id: super::new_id(),
            file_name: file_name.into(),
            text: text.into(),
            uploaded_at: Utc::now(),
            file,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub active_resume_id: Option<String>,
}

/// Body of `PUT /api/v1/profile`. The active resume pointer is not client-settable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub portfolio_url: Option<String>,
    pub linkedin_url: Option<String>,
}

impl UserProfile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        self.portfolio_url = update.portfolio_url.filter(|u| !u.trim().is_empty());
        self.linkedin_url = update.linkedin_url.filter(|u| !u.trim().is_empty());
    }
}
