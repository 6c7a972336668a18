use chrono::NaiveDate;

use crate::models::principal::Principal;
use crate::models::task::{Task, TaskDraft};
use crate::models::worker::Worker;
use crate::services::relocation::TaskMoveDraft;

/// What is being dragged, decided when the gesture starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPayload {
    /// A worker chip from the team sidebar: assign to a new task
    Worker(i64),
    /// An existing task bar or card: relocate it
    Task { task_id: i64, source_date: NaiveDate },
}

impl DragPayload {
    pub fn worker(worker: &Worker) -> Self {
        DragPayload::Worker(worker.id)
    }

    /// `source_date` is the cell the task was picked up from, defaulting
    /// to the task's own date.
    pub fn task(task: &Task, source_date: Option<NaiveDate>) -> Self {
        DragPayload::Task {
            task_id: task.id,
            source_date: source_date.unwrap_or(task.task_date),
        }
    }

    pub fn effect(&self) -> DropEffect {
        match self {
            DragPayload::Worker(_) => DropEffect::Copy,
            DragPayload::Task { .. } => DropEffect::Move,
        }
    }
}

/// Cursor feedback while hovering a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
    Move,
}

/// An in-progress gesture and the cell currently marked as drop target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DragSession {
    payload: DragPayload,
    hovered: Option<NaiveDate>,
}

impl DragSession {
    pub fn new(payload: DragPayload) -> Self {
        Self {
            payload,
            hovered: None,
        }
    }

    pub fn payload(&self) -> DragPayload {
        self.payload
    }

    /// Pointer entered (or moved over) a cell
    pub fn enter(&mut self, date: NaiveDate) -> DropEffect {
        self.hovered = Some(date);
        self.payload.effect()
    }

    /// Pointer left a cell. Only clears the marker if it belongs to that cell.
    pub fn leave(&mut self, date: NaiveDate) {
        if self.hovered == Some(date) {
            self.hovered = None;
        }
    }

    pub fn drop_target(&self) -> Option<NaiveDate> {
        self.hovered
    }
}

/// Why a drop did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoOpReason {
    /// Only administrators may relocate tasks
    NotAuthorized,
    /// The task is no longer in the loaded window (e.g. deleted meanwhile)
    TaskNotLoaded(i64),
    /// Dropped on the day it came from
    SameDate,
    /// Drop without an active gesture
    NoPayload,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DropDecision {
    Ignore(NoOpReason),
    /// Open the creation form pre-filled for the dropped worker
    CreateTask(TaskDraft),
    /// Open the relocation confirmation dialog
    StageRelocation(TaskMoveDraft),
}

/// Decide what a drop on `target` means.
pub fn interpret_drop(
    payload: Option<DragPayload>,
    target: NaiveDate,
    principal: &Principal,
    tasks: &[Task],
) -> DropDecision {
    match payload {
        None => DropDecision::Ignore(NoOpReason::NoPayload),
        Some(DragPayload::Task { .. }) if !principal.is_admin() => {
            DropDecision::Ignore(NoOpReason::NotAuthorized)
        }
        Some(DragPayload::Task {
            task_id,
            source_date,
        }) => {
            let Some(task) = tasks.iter().find(|t| t.id == task_id) else {
                return DropDecision::Ignore(NoOpReason::TaskNotLoaded(task_id));
            };
            if source_date == target {
                return DropDecision::Ignore(NoOpReason::SameDate);
            }
            DropDecision::StageRelocation(TaskMoveDraft::new(task.clone(), source_date, target))
        }
        Some(DragPayload::Worker(worker_id)) => {
            DropDecision::CreateTask(TaskDraft::for_worker(target, worker_id))
        }
    }
}
