// Principal module
// The account acting on the board

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Worker,
}

/// Authenticated account as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub worker_id: Option<i64>,
}

impl Principal {
    pub fn admin(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            role: Role::Admin,
            worker_id: None,
        }
    }

    pub fn worker(id: i64, email: impl Into<String>, worker_id: Option<i64>) -> Self {
        Self {
            id,
            email: email.into(),
            role: Role::Worker,
            worker_id,
        }
    }

    /// Administrative capability: relocate, assign, delete, view history.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
