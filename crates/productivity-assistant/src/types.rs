use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Signed balance in Rupiah. Displays and serializes as localized currency text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Money(pub f64);

impl Money {
    pub fn amount(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round() as i64;
        let digits = rounded.unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        if rounded < 0 {
            write!(f, "-Rp {}", grouped)
        } else {
            write!(f, "Rp {}", grouped)
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Activity metrics derived for one user, recomputed on every turn.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_name: String,
    pub study_sessions: usize,
    pub tasks_completed: usize,
    pub journal_entries: usize,
    pub balance: Money,
    pub streak: u32,
    pub today_tasks: usize,
}

impl UserContext {
    pub fn empty(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            study_sessions: 0,
            tasks_completed: 0,
            journal_entries: 0,
            balance: Money::default(),
            streak: 0,
            today_tasks: 0,
        }
    }
}

/// Extracted document attached to the context of a single document turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub file_name: String,
    pub page_count: usize,
    pub pages_read: usize,
    pub is_truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
