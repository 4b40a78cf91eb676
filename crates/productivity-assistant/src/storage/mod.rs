//! User-scoped key-value storage.
//!
//! Activity logs, the conversation snapshot and the model credential all live
//! behind [`KeyValueStore`]. Values are JSON text owned by whichever subsystem
//! writes them; this layer never interprets them.

pub mod json_store;
pub mod memory_store;

pub use json_store::JsonFileStore;
pub use memory_store::InMemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keys under which per-user state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    StudySessions,
    TaskHistory,
    JournalEntries,
    Transactions,
    Todos,
    ActivityDates,
    ChatHistory,
    ApiKey,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StudySessions => "study_sessions",
            Self::TaskHistory => "task_history",
            Self::JournalEntries => "journal_entries",
            Self::Transactions => "transactions",
            Self::Todos => "todos",
            Self::ActivityDates => "activity_dates",
            Self::ChatHistory => "chat_history",
            Self::ApiKey => "api_key",
        }
    }
}

pub trait KeyValueStore: Send + Sync {
    fn get(&self, user_id: &str, key: StoreKey) -> Result<Option<String>, StoreError>;

    /// Replaces the whole value stored under `key`.
    fn set(&self, user_id: &str, key: StoreKey, value: &str) -> Result<(), StoreError>;

    fn remove(&self, user_id: &str, key: StoreKey) -> Result<(), StoreError>;
}

/// Read and deserialize a JSON value. `Ok(None)` when nothing is stored.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    user_id: &str,
    key: StoreKey,
) -> Result<Option<T>, StoreError> {
    match store.get(user_id, key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    user_id: &str,
    key: StoreKey,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(user_id, key, &json)
}
