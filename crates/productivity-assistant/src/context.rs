//! Context aggregation.
//!
//! Reads the per-user activity logs owned by the planner, finance, journal and
//! study subsystems and derives the flat [`UserContext`] handed to the response
//! engines. Nothing is cached: every call re-reads the logs.

use chrono::{Days, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::storage::{get_json, KeyValueStore, StoreKey};
use crate::types::{Money, UserContext};

// ── Record shapes ──────────────────────────────────────────────────────────
// Only the fields the aggregator needs; everything else is ignored. Study
// sessions, completed tasks and journal entries are only counted.

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
}

impl Transaction {
    /// Income adds, every other type subtracts.
    pub fn signed_amount(&self) -> f64 {
        if self.kind == "income" {
            self.amount
        } else {
            -self.amount
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoItem {
    pub date: Option<NaiveDate>,
    pub completed: bool,
}

// ── Aggregator ─────────────────────────────────────────────────────────────

pub struct ContextAggregator {
    store: Arc<dyn KeyValueStore>,
}

impl ContextAggregator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Aggregate using the current local date as "today".
    pub fn aggregate(&self, user_id: &str, user_name: &str) -> UserContext {
        self.aggregate_at(user_id, user_name, Local::now().date_naive())
    }

    pub fn aggregate_at(&self, user_id: &str, user_name: &str, today: NaiveDate) -> UserContext {
        let transactions: Vec<Transaction> = self.read_log(user_id, StoreKey::Transactions);
        let todos: Vec<TodoItem> = self.read_log(user_id, StoreKey::Todos);
        let activity: Vec<NaiveDate> = self.read_log(user_id, StoreKey::ActivityDates);

        let context = UserContext {
            user_name: user_name.to_string(),
            study_sessions: self.read_records(user_id, StoreKey::StudySessions).len(),
            tasks_completed: self.read_records(user_id, StoreKey::TaskHistory).len(),
            journal_entries: self.read_records(user_id, StoreKey::JournalEntries).len(),
            balance: balance(&transactions),
            streak: streak(&activity, today),
            today_tasks: pending_tasks_on(&todos, today),
        };

        tracing::debug!(
            user = %user_id,
            study_sessions = context.study_sessions,
            tasks_completed = context.tasks_completed,
            streak = context.streak,
            today_tasks = context.today_tasks,
            "Aggregated user context"
        );

        context
    }

    /// Raw records of a log. Missing and unreadable logs both count as empty.
    fn read_records(&self, user_id: &str, key: StoreKey) -> Vec<serde_json::Value> {
        match get_json::<Vec<serde_json::Value>>(self.store.as_ref(), user_id, key) {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(user = %user_id, key = key.as_str(), error = %e, "Unreadable activity log, treating as empty");
                Vec::new()
            }
        }
    }

    /// Typed records of a log. A malformed record is skipped, not the log.
    fn read_log<T: DeserializeOwned>(&self, user_id: &str, key: StoreKey) -> Vec<T> {
        self.read_records(user_id, key)
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    tracing::warn!(user = %user_id, key = key.as_str(), index, error = %e, "Skipping malformed record");
                    None
                }
            })
            .collect()
    }
}

pub fn balance(transactions: &[Transaction]) -> Money {
    Money(transactions.iter().map(Transaction::signed_amount).sum())
}

pub fn pending_tasks_on(todos: &[TodoItem], day: NaiveDate) -> usize {
    todos
        .iter()
        .filter(|t| t.date == Some(day) && !t.completed)
        .count()
}

/// Consecutive days with activity, counting back from `today`.
/// Zero when `today` itself has no activity.
pub fn streak(activity_dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = activity_dates.iter().copied().collect();

    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    count
}
