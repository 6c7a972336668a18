// Project module

use serde::{Deserialize, Serialize};

/// Project a task may reference by name. Tasks store the name as free
/// text, so nothing guarantees the project still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Project {
    /// Case-insensitive match against a task's project text
    pub fn matches(&self, project_text: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(project_text.trim())
    }
}
