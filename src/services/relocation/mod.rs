//! Task relocation (move) and duplication (copy) transactions.
//!
//! Both transactions are two or three independent store calls. The order is
//! fixed (mutate, then assign, then log) and nothing is rolled back: when a
//! later step fails the earlier ones stay applied and the error is returned
//! to the caller.

use chrono::NaiveDate;

use crate::error::{PlannerResult, ValidationError};
use crate::models::task::Task;
use crate::services::assignment::{plannable_assignees, AssignmentService};
use crate::services::store::TaskStore;
use crate::services::visibility::PlannableWorkers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    #[default]
    Move,
    Copy,
}

/// Staged relocation decision, edited while the confirmation dialog is open.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMoveDraft {
    pub task: Task,
    pub source_date: NaiveDate,
    pub target_date: NaiveDate,
    pub mode: MoveMode,
    /// Required for moves, ignored for copies
    pub reason: String,
}

impl TaskMoveDraft {
    pub fn new(task: Task, source_date: NaiveDate, target_date: NaiveDate) -> Self {
        Self {
            task,
            source_date,
            target_date,
            mode: MoveMode::Move,
            reason: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mode == MoveMode::Move && self.reason.trim().is_empty() {
            return Err(ValidationError::EmptyMoveReason);
        }
        Ok(())
    }

    pub fn move_log_message(&self) -> String {
        format!(
            "Tarea movida de {} a {}. Motivo: {}",
            self.source_date,
            self.target_date,
            self.reason.trim()
        )
    }

    pub fn copy_log_message(&self) -> String {
        format!(
            "Tarea copiada desde #{} ({} -> {})",
            self.task.id, self.source_date, self.target_date
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelocationOutcome {
    Moved {
        task: Task,
    },
    Copied {
        source_id: i64,
        copy: Task,
        assigned: Vec<i64>,
    },
}

pub struct RelocationService<'a, S: TaskStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: TaskStore + ?Sized> RelocationService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Validate and run a staged draft. Validation failures happen before
    /// any store call.
    pub async fn execute(
        &self,
        draft: &TaskMoveDraft,
        plannable: &PlannableWorkers,
    ) -> PlannerResult<RelocationOutcome> {
        draft.validate()?;
        match draft.mode {
            MoveMode::Move => self.relocate(draft).await,
            MoveMode::Copy => self.duplicate(draft, plannable).await,
        }
    }

    async fn relocate(&self, draft: &TaskMoveDraft) -> PlannerResult<RelocationOutcome> {
        let task_id = draft.task.id;
        let payload = draft.task.to_payload(Some(draft.target_date));
        let task = self.store.update_task(task_id, payload).await?;
        self.store.add_log(task_id, draft.move_log_message()).await?;

        log::info!(
            "Moved task #{} from {} to {}",
            task_id,
            draft.source_date,
            draft.target_date
        );
        Ok(RelocationOutcome::Moved { task })
    }

    async fn duplicate(
        &self,
        draft: &TaskMoveDraft,
        plannable: &PlannableWorkers,
    ) -> PlannerResult<RelocationOutcome> {
        let mut payload = draft.task.to_payload(Some(draft.target_date));
        // Assignees travel through the worker set, never the legacy field.
        payload.worker_id = None;
        let mut copy = self.store.create_task(payload).await?;

        let assigned = plannable_assignees(&draft.task, plannable);
        if !assigned.is_empty() {
            copy = AssignmentService::new(self.store)
                .commit_ids(copy.id, assigned.clone())
                .await?;
        }
        self.store.add_log(copy.id, draft.copy_log_message()).await?;

        log::info!(
            "Copied task #{} to #{} on {}",
            draft.task.id,
            copy.id,
            draft.target_date
        );
        Ok(RelocationOutcome::Copied {
            source_id: draft.task.id,
            copy,
            assigned,
        })
    }
}
