//! Persistence of the three domains (resumes, jobs, user profile) inside one
//! JSON blob stored under a single key.
//!
//! Adapters never fail outward: a broken blob loads as defaults, a failed
//! write is logged and leaves the previous blob in place.

pub mod error;
pub mod file;
pub mod jobs;
pub mod memory;
pub mod records;
pub mod resumes;

use serde_json::{Map, Value};
use tracing::warn;

pub use error::StorageError;
pub use file::FileBlobStore;
pub use jobs::JobStorage;
pub use memory::MemoryBlobStore;
pub use resumes::{ResumeSlice, ResumeStorage};

/// The one key all domains share.
pub const STORAGE_KEY: &str = "applyr-data";

pub const RESUMES_FIELD: &str = "resumes";
pub const JOBS_FIELD: &str = "jobs";
pub const PROFILE_FIELD: &str = "userProfile";

/// A synchronous string key-value store with a size quota.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the value under `key`. On error the previous value is intact.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Reads the shared blob as a JSON object.
/// Missing, unreadable, or non-object blobs all yield `None`.
pub(crate) fn read_blob(store: &dyn BlobStore) -> Option<Map<String, Value>> {
    match store.get(STORAGE_KEY) {
        Ok(raw) => raw.as_deref().and_then(parse_blob),
        Err(e) => {
            warn!("Failed to read storage blob '{STORAGE_KEY}': {e}");
            None
        }
    }
}

fn parse_blob(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(
                "Storage blob '{STORAGE_KEY}' is not an object (found {}), ignoring it",
                json_kind(&other)
            );
            None
        }
        Err(e) => {
            warn!("Storage blob '{STORAGE_KEY}' is not valid JSON, ignoring it: {e}");
            None
        }
    }
}

/// Read-modify-write of the shared blob: replaces only the given top-level
/// fields and preserves every sibling.
///
/// A blob that cannot be read aborts the write, since its siblings would be
/// lost. A missing or corrupt blob is replaced.
pub(crate) fn write_fields(
    store: &dyn BlobStore,
    fields: Vec<(&'static str, Value)>,
) -> Result<(), StorageError> {
    let mut blob = store
        .get(STORAGE_KEY)?
        .as_deref()
        .and_then(parse_blob)
        .unwrap_or_default();
    for (name, value) in fields {
        blob.insert(name.to_string(), value);
    }
    let serialized = serde_json::to_string(&Value::Object(blob))?;
    store.set(STORAGE_KEY, &serialized)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
