//! File-backed store: one JSON file per user and key.
//!
//! Every write replaces the whole file via write-to-temp + rename, so a crash
//! mid-write leaves the previous snapshot intact.

use std::path::PathBuf;

use super::{KeyValueStore, StoreError, StoreKey};

pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(sanitize_user_id(user_id))
    }

    fn path_for(&self, user_id: &str, key: StoreKey) -> PathBuf {
        self.user_dir(user_id).join(format!("{}.json", key.as_str()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, user_id: &str, key: StoreKey) -> Result<Option<String>, StoreError> {
        let path = self.path_for(user_id, key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, user_id: &str, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let dir = self.user_dir(user_id);
        std::fs::create_dir_all(&dir)?;

        let path = self.path_for(user_id, key);
        let tmp = dir.join(format!(".{}.json.tmp", key.as_str()));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(user = %user_id, key = key.as_str(), bytes = value.len(), "Persisted value");
        Ok(())
    }

    fn remove(&self, user_id: &str, key: StoreKey) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(user_id, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a user id onto a single safe path component.
fn sanitize_user_id(user_id: &str) -> String {
    let cleaned: String = user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
