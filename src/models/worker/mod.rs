// Worker module
// Field worker that tasks get assigned to

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_WORKER_COLOR: &str = "#6c757d";

/// Availability of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkerStatus {
    #[default]
    Activo,
    Vacaciones,
    Libre,
}

/// Worker as returned by the task store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: WorkerStatus,
    #[serde(default = "default_color")]
    pub color: String,
    /// Missing or `null` means visible; only an explicit `false` hides.
    #[serde(default)]
    pub visible_in_planner: Option<bool>,
}

fn default_color() -> String {
    DEFAULT_WORKER_COLOR.to_string()
}

impl Worker {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: WorkerStatus::Activo,
            color: default_color(),
            visible_in_planner: Some(true),
        }
    }

    /// Set the display color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the planner visibility flag
    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible_in_planner = Some(visible);
        self
    }

    /// Whether the worker may be dragged onto the board or assigned.
    ///
    /// Hidden workers stay valid historical assignees; this is a read filter.
    pub fn is_plannable(&self) -> bool {
        self.visible_in_planner != Some(false)
    }
}

/// Body of worker create/update requests, edited by the team form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerDraft {
    pub name: String,
    pub status: WorkerStatus,
    pub color: String,
    pub visible_in_planner: bool,
}

impl Default for WorkerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: WorkerStatus::Activo,
            color: default_color(),
            visible_in_planner: true,
        }
    }
}

impl WorkerDraft {
    pub fn from_worker(worker: &Worker) -> Self {
        Self {
            name: worker.name.clone(),
            status: worker.status,
            color: worker.color.clone(),
            visible_in_planner: worker.is_plannable(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        Ok(())
    }
}
