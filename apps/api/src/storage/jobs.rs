use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use super::records::{parse_records, StoredJobInfo};
use super::{read_blob, write_fields, BlobStore, JOBS_FIELD};
use crate::models::JobInfo;

/// Storage adapter for the job list.
#[derive(Clone)]
pub struct JobStorage {
    store: Arc<dyn BlobStore>,
}

impl JobStorage {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Never fails: anything unreadable loads as an empty list.
    pub fn load(&self) -> Vec<JobInfo> {
        let Some(blob) = read_blob(self.store.as_ref()) else {
            return Vec::new();
        };

        let jobs = parse_records(
            JOBS_FIELD,
            blob.get(JOBS_FIELD),
            Utc::now(),
            StoredJobInfo::into_runtime,
        );

        let mut seen = HashSet::new();
        jobs.into_iter()
            .filter(|job| {
                let fresh = seen.insert(job.id.clone());
                if !fresh {
                    warn!("Dropping duplicate stored job {}", job.id);
                }
                fresh
            })
            .collect()
    }

    /// Never fails outward. Returns whether the list was persisted.
    pub fn save(&self, jobs: &[JobInfo]) -> bool {
        let stored: Vec<StoredJobInfo> = jobs.iter().map(StoredJobInfo::from).collect();
        let value = match serde_json::to_value(&stored) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize jobs, storage left untouched: {e}");
                return false;
            }
        };

        match write_fields(self.store.as_ref(), vec![(JOBS_FIELD, value)]) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save jobs, storage left untouched: {e}");
                false
            }
        }
    }
}
