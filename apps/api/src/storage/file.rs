use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{BlobStore, StorageError};

/// Stores each key as `<dir>/<key>.json`. Writes go to a temp file first and
/// are renamed into place, so a failed write never truncates the old value.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
    quota_bytes: usize,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>, quota_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        // Non-UTF-8 bytes read as replacement characters, so a damaged file
        // is treated as a corrupt blob rather than an unreadable one.
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if value.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota: self.quota_bytes,
            });
        }

        fs::create_dir_all(&self.dir)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path(), 1024);
        assert!(store.get("applyr-data").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path().join("nested"), 1024);
        store.set("applyr-data", r#"{"jobs":[]}"#).unwrap();
        assert_eq!(
            store.get("applyr-data").unwrap().as_deref(),
            Some(r#"{"jobs":[]}"#)
        );
    }

    #[test]
    fn test_quota_leaves_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path(), 16);
        store.set("applyr-data", "{}").unwrap();

        let err = store.set("applyr-data", &"x".repeat(17)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 17, quota: 16 }));
        assert_eq!(store.get("applyr-data").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path(), 1024);
        assert!(matches!(
            store.get("../etc/passwd"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_non_utf8_file_reads_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path(), 1024);
        fs::write(dir.path().join("applyr-data.json"), b"{\"jobs\":\xff}").unwrap();
        let raw = store.get("applyr-data").unwrap().unwrap();
        assert!(raw.starts_with("{\"jobs\":"));
    }
}
