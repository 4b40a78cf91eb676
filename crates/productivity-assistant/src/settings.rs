//! Per-user settings.
//!
//! Only the model credential lives here. A user-configured key takes
//! precedence over the process-wide fallback from the environment.

use std::sync::Arc;

use crate::storage::{get_json, set_json, KeyValueStore, StoreError, StoreKey};

pub struct Settings {
    store: Arc<dyn KeyValueStore>,
    fallback_api_key: Option<String>,
}

impl Settings {
    pub fn new(store: Arc<dyn KeyValueStore>, fallback_api_key: Option<String>) -> Self {
        let fallback_api_key = fallback_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            store,
            fallback_api_key,
        }
    }

    /// Effective credential, or `None` when neither a stored nor a fallback
    /// key exists. A storage failure degrades to the fallback.
    pub fn api_key(&self, user_id: &str) -> Option<String> {
        match self.stored_api_key(user_id) {
            Ok(Some(key)) => Some(key),
            Ok(None) => self.fallback_api_key.clone(),
            Err(e) => {
                tracing::warn!(user = %user_id, error = %e, "Could not read stored API key");
                self.fallback_api_key.clone()
            }
        }
    }

    pub fn stored_api_key(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        Ok(get_json::<String>(self.store.as_ref(), user_id, StoreKey::ApiKey)?
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty()))
    }

    /// Store a key for `user_id`. A blank key clears the stored one.
    pub fn set_api_key(&self, user_id: &str, key: &str) -> Result<(), StoreError> {
        let key = key.trim();
        if key.is_empty() {
            return self.clear_api_key(user_id);
        }
        set_json(self.store.as_ref(), user_id, StoreKey::ApiKey, key)?;
        tracing::info!(user = %user_id, "API key updated");
        Ok(())
    }

    pub fn clear_api_key(&self, user_id: &str) -> Result<(), StoreError> {
        self.store.remove(user_id, StoreKey::ApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    #[test]
    fn test_stored_key_wins_over_fallback() {
        let settings = Settings::new(Arc::new(InMemoryStore::new()), Some("env-key".into()));
        assert_eq!(settings.api_key("u1").as_deref(), Some("env-key"));

        settings.set_api_key("u1", "  user-key \n").unwrap();
        assert_eq!(settings.api_key("u1").as_deref(), Some("user-key"));
        assert_eq!(settings.api_key("u2").as_deref(), Some("env-key"));
    }

    #[test]
    fn test_blank_key_clears() {
        let settings = Settings::new(Arc::new(InMemoryStore::new()), None);
        settings.set_api_key("u1", "abc").unwrap();
        settings.set_api_key("u1", "   ").unwrap();
        assert!(settings.api_key("u1").is_none());
    }

    #[test]
    fn test_key_is_stored_as_json_string() {
        let store = Arc::new(InMemoryStore::new());
        let settings = Settings::new(store.clone(), None);

        settings.set_api_key("u1", "AIza-123").unwrap();
        assert_eq!(
            store.get("u1", StoreKey::ApiKey).unwrap().as_deref(),
            Some("\"AIza-123\"")
        );

        // Written by another subsystem following the same JSON convention.
        store.set("u2", StoreKey::ApiKey, "\"AIza-456\"").unwrap();
        assert_eq!(settings.api_key("u2").as_deref(), Some("AIza-456"));
    }

    #[test]
    fn test_blank_fallback_is_ignored() {
        let settings = Settings::new(Arc::new(InMemoryStore::new()), Some("  ".into()));
        assert!(settings.api_key("u1").is_none());
    }
}
