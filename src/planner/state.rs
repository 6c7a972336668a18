// Dialog state of the board

use crate::models::task::{Task, TaskDraft};
use crate::models::task_log::TaskLog;
use crate::models::worker::WorkerDraft;
use crate::services::assignment::AssignmentSelection;
use crate::services::relocation::TaskMoveDraft;

/// The one modal interaction open on the board, if any.
///
/// Each variant owns the data it edits, so opening a dialog always starts
/// from a fresh draft and closing it drops whatever was staged.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActiveDialog {
    #[default]
    None,
    CreatingTask(TaskDraft),
    EditingTask {
        task: Box<Task>,
        draft: TaskDraft,
        logs: Vec<TaskLog>,
    },
    ConfirmingRelocation(TaskMoveDraft),
    AssigningWorkers {
        task_id: i64,
        selection: AssignmentSelection,
    },
    ViewingLogs {
        task_id: i64,
        logs: Vec<TaskLog>,
    },
    /// Team form; `worker_id` is `None` when adding a new worker
    EditingWorker {
        worker_id: Option<i64>,
        draft: WorkerDraft,
    },
}

impl ActiveDialog {
    pub fn is_open(&self) -> bool {
        !matches!(self, ActiveDialog::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActiveDialog::None => "none",
            ActiveDialog::CreatingTask(_) => "task creation",
            ActiveDialog::EditingTask { .. } => "task detail",
            ActiveDialog::ConfirmingRelocation(_) => "relocation",
            ActiveDialog::AssigningWorkers { .. } => "assignment",
            ActiveDialog::ViewingLogs { .. } => "logs",
            ActiveDialog::EditingWorker { .. } => "worker",
        }
    }

    /// Task the dialog is about, if it concerns an existing one
    pub fn task_id(&self) -> Option<i64> {
        match self {
            ActiveDialog::EditingTask { task, .. } => Some(task.id),
            ActiveDialog::ConfirmingRelocation(draft) => Some(draft.task.id),
            ActiveDialog::AssigningWorkers { task_id, .. } | ActiveDialog::ViewingLogs { task_id, .. } => {
                Some(*task_id)
            }
            ActiveDialog::None | ActiveDialog::CreatingTask(_) | ActiveDialog::EditingWorker { .. } => None,
        }
    }

    /// Form draft of the creation or detail dialog
    pub fn task_draft_mut(&mut self) -> Option<&mut TaskDraft> {
        match self {
            ActiveDialog::CreatingTask(draft) | ActiveDialog::EditingTask { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn worker_draft_mut(&mut self) -> Option<&mut WorkerDraft> {
        match self {
            ActiveDialog::EditingWorker { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn move_draft(&self) -> Option<&TaskMoveDraft> {
        match self {
            ActiveDialog::ConfirmingRelocation(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn move_draft_mut(&mut self) -> Option<&mut TaskMoveDraft> {
        match self {
            ActiveDialog::ConfirmingRelocation(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&AssignmentSelection> {
        match self {
            ActiveDialog::AssigningWorkers { selection, .. } => Some(selection),
            _ => None,
        }
    }

    /// Log entries shown by the detail or logs dialog
    pub fn logs(&self) -> Option<&[TaskLog]> {
        match self {
            ActiveDialog::EditingTask { logs, .. } | ActiveDialog::ViewingLogs { logs, .. } => {
                Some(logs)
            }
            _ => None,
        }
    }

    pub fn logs_mut(&mut self) -> Option<&mut Vec<TaskLog>> {
        match self {
            ActiveDialog::EditingTask { logs, .. } | ActiveDialog::ViewingLogs { logs, .. } => {
                Some(logs)
            }
            _ => None,
        }
    }
}
