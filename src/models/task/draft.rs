use chrono::NaiveDate;

use super::{PrerequisiteFlags, Task, TaskPayload, TaskPriority, TaskStatus};
use crate::error::ValidationError;

/// Editable state of the task creation/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub task_date: NaiveDate,
    pub title: String,
    pub project: String,
    pub start_time: String,
    pub end_time: String,
    pub prerequisites: PrerequisiteFlags,
    pub worker_id: Option<i64>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

impl TaskDraft {
    /// Blank form for `date`: Pendiente, Media, no prerequisites.
    pub fn new(task_date: NaiveDate) -> Self {
        Self {
            task_date,
            title: String::new(),
            project: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            prerequisites: PrerequisiteFlags::default(),
            worker_id: None,
            status: TaskStatus::Pendiente,
            priority: TaskPriority::Media,
        }
    }

    /// Form opened by dropping a worker on a day cell.
    pub fn for_worker(task_date: NaiveDate, worker_id: i64) -> Self {
        Self {
            worker_id: Some(worker_id),
            ..Self::new(task_date)
        }
    }

    /// Form pre-filled from an existing task.
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_date: task.task_date,
            title: task.title.clone(),
            project: task.project.clone(),
            start_time: task.start_time.clone(),
            end_time: task.end_time.clone().unwrap_or_default(),
            prerequisites: PrerequisiteFlags::from_task(task),
            worker_id: task.worker_id,
            status: task.status,
            priority: task.priority,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        Ok(())
    }

    /// Validate and convert to the store body.
    pub fn to_payload(&self) -> Result<TaskPayload, ValidationError> {
        self.validate()?;
        let end_time = self.end_time.trim();
        Ok(TaskPayload {
            task_date: self.task_date,
            title: self.title.trim().to_string(),
            project: self.project.trim().to_string(),
            start_time: self.start_time.trim().to_string(),
            end_time: (!end_time.is_empty()).then(|| end_time.to_string()),
            prereq_ppe: self.prerequisites.ppe.to_labels(),
            prereq_client_response: self.prerequisites.client_response,
            prereq_coord_st: self.prerequisites.coord_st,
            prereq_notes: self.prerequisites.notes.clone(),
            worker_id: self.worker_id,
            status: self.status,
            priority: self.priority,
        })
    }
}
