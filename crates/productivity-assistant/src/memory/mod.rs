//! Conversation store.
//!
//! Keeps each user's transcript in memory and writes the most recent
//! `max_messages` as a full JSON snapshot after every append. There is no
//! incremental log: the snapshot is the persisted state.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::storage::{get_json, set_json, KeyValueStore, StoreError, StoreKey};
use crate::types::{Message, MessageRole};

/// Strictly increasing, timestamp-derived message ids.
#[derive(Debug, Default)]
pub struct MessageIdGenerator {
    last: AtomicU64,
}

impl MessageIdGenerator {
    pub fn next_id(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self
                .last
                .compare_exchange_weak(current, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }

    /// Make sure future ids sort after an id loaded from storage.
    pub fn observe(&self, id: u64) {
        self.last.fetch_max(id, Ordering::Relaxed);
    }
}

pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    max_messages: usize,
    sessions: HashMap<String, Vec<Message>>,
    ids: MessageIdGenerator,
}

impl ConversationStore {
    pub fn new(store: Arc<dyn KeyValueStore>, max_messages: usize) -> Self {
        Self {
            store,
            max_messages: max_messages.max(1),
            sessions: HashMap::new(),
            ids: MessageIdGenerator::default(),
        }
    }

    pub fn create_message(&self, role: MessageRole, content: impl Into<String>) -> Message {
        Message {
            id: self.ids.next_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Current transcript. The first load of a session with nothing persisted
    /// yields a welcome message, held in memory until the next append.
    pub fn load(&mut self, user_id: &str, user_name: &str) -> Result<Vec<Message>, StoreError> {
        if let Some(messages) = self.sessions.get(user_id) {
            return Ok(messages.clone());
        }

        let mut messages = self.read_snapshot(user_id)?;
        if messages.is_empty() {
            messages.push(self.create_message(MessageRole::Assistant, welcome_text(user_name)));
        }
        self.sessions.insert(user_id.to_string(), messages.clone());
        Ok(messages)
    }

    /// Append and persist. The in-memory transcript only changes once the
    /// snapshot has been written.
    pub fn append(&mut self, user_id: &str, message: Message) -> Result<(), StoreError> {
        let mut messages = match self.sessions.get(user_id) {
            Some(messages) => messages.clone(),
            None => self.read_snapshot(user_id)?,
        };

        messages.push(message);
        if messages.len() > self.max_messages {
            let excess = messages.len() - self.max_messages;
            messages.drain(..excess);
        }

        set_json(self.store.as_ref(), user_id, StoreKey::ChatHistory, messages.as_slice())?;
        self.sessions.insert(user_id.to_string(), messages);
        Ok(())
    }

    /// Drop the persisted snapshot and empty the in-memory transcript.
    pub fn clear(&mut self, user_id: &str) -> Result<(), StoreError> {
        self.store.remove(user_id, StoreKey::ChatHistory)?;
        self.sessions.insert(user_id.to_string(), Vec::new());
        tracing::info!(user = %user_id, "Conversation cleared");
        Ok(())
    }

    fn read_snapshot(&self, user_id: &str) -> Result<Vec<Message>, StoreError> {
        let messages = match get_json::<Vec<Message>>(self.store.as_ref(), user_id, StoreKey::ChatHistory) {
            Ok(Some(messages)) => messages,
            Ok(None) => Vec::new(),
            Err(StoreError::Serialization(e)) => {
                tracing::warn!(user = %user_id, error = %e, "Corrupt conversation snapshot, starting fresh");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if let Some(max_id) = messages.iter().map(|m| m.id).max() {
            self.ids.observe(max_id);
        }
        Ok(messages)
    }
}

fn welcome_text(user_name: &str) -> String {
    format!(
        "Halo {}! 👋 Saya asisten produktivitasmu. Tanyakan apa saja soal belajar, keuangan, kebiasaan, \
         kesehatan mental, atau manajemen waktu. Kamu juga bisa mengunggah PDF untuk diringkas.",
        user_name
    )
}
