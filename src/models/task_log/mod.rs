// Task log module
// Append-only audit trail entries attached to a task

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Immutable log entry. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: i64,
    #[serde(default)]
    pub task_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub content: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

impl TaskLog {
    /// Author label shown next to the entry
    pub fn author(&self) -> &str {
        self.user_email.as_deref().unwrap_or("sistema")
    }
}
