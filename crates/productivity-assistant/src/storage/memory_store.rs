use parking_lot::RwLock;
use std::collections::HashMap;

use super::{KeyValueStore, StoreError, StoreKey};

/// Process-local store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<(String, StoreKey), String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, user_id: &str, key: StoreKey) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .get(&(user_id.to_string(), key))
            .cloned())
    }

    fn set(&self, user_id: &str, key: StoreKey, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert((user_id.to_string(), key), value.to_string());
        Ok(())
    }

    fn remove(&self, user_id: &str, key: StoreKey) -> Result<(), StoreError> {
        self.entries.write().remove(&(user_id.to_string(), key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_are_user_scoped() {
        let store = InMemoryStore::new();
        store.set("alice", StoreKey::ApiKey, "a-key").unwrap();
        store.set("bob", StoreKey::ApiKey, "b-key").unwrap();

        assert_eq!(store.get("alice", StoreKey::ApiKey).unwrap().as_deref(), Some("a-key"));
        assert_eq!(store.get("bob", StoreKey::ApiKey).unwrap().as_deref(), Some("b-key"));
        assert!(store.get("alice", StoreKey::Todos).unwrap().is_none());

        store.remove("alice", StoreKey::ApiKey).unwrap();
        assert!(store.get("alice", StoreKey::ApiKey).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }
}
