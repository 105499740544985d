use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use super::records::{parse_records, StoredResume, StoredUserProfile};
use super::{read_blob, write_fields, BlobStore, PROFILE_FIELD, RESUMES_FIELD};
use crate::models::{SavedResume, UserProfile};

/// The resume domain's slice of the shared blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeSlice {
    pub resumes: Vec<SavedResume>,
    pub profile: UserProfile,
}

/// Storage adapter for resumes and the user profile.
#[derive(Clone)]
pub struct ResumeStorage {
    store: Arc<dyn BlobStore>,
}

impl ResumeStorage {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Never fails: anything unreadable loads as the default slice.
    pub fn load(&self) -> ResumeSlice {
        let Some(blob) = read_blob(self.store.as_ref()) else {
            return ResumeSlice::default();
        };

        let mut resumes = parse_records(
            RESUMES_FIELD,
            blob.get(RESUMES_FIELD),
            Utc::now(),
            StoredResume::into_runtime,
        );

        // Only one resume is kept; older blobs may hold several.
        if resumes.len() > 1 {
            warn!(
                "Found {} stored resumes, keeping only the most recent",
                resumes.len()
            );
            resumes.sort_by_key(|r| r.uploaded_at);
            resumes.drain(..resumes.len() - 1);
        }

        let mut profile: UserProfile = match blob.get(PROFILE_FIELD) {
            None | Some(Value::Null) => UserProfile::default(),
            Some(raw) => serde_json::from_value::<StoredUserProfile>(raw.clone())
                .map(UserProfile::from)
                .unwrap_or_else(|e| {
                    warn!("Stored user profile is malformed, using defaults: {e}");
                    UserProfile::default()
                }),
        };

        if let Some(active) = profile.active_resume_id.as_deref() {
            if !resumes.iter().any(|r| r.id == active) {
                debug!("Active resume {active} no longer exists, clearing pointer");
                profile.active_resume_id = None;
            }
        }

        ResumeSlice { resumes, profile }
    }

    /// Never fails outward. Returns whether the slice was persisted.
    pub fn save(&self, resumes: &[SavedResume], profile: &UserProfile) -> bool {
        let stored: Vec<StoredResume> = resumes.iter().map(StoredResume::from).collect();
        let fields = match (
            serde_json::to_value(&stored),
            serde_json::to_value(StoredUserProfile::from(profile)),
        ) {
            (Ok(resumes), Ok(profile)) => vec![(RESUMES_FIELD, resumes), (PROFILE_FIELD, profile)],
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to serialize resumes, storage left untouched: {e}");
                return false;
            }
        };

        match write_fields(self.store.as_ref(), fields) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save resumes, storage left untouched: {e}");
                false
            }
        }
    }
}
