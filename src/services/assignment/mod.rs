//! Multi-worker assignment of tasks.
//!
//! Reads always go through [`Task::effective_assignees`], which prefers the
//! worker set over the legacy single `worker_id`. Writes only ever replace
//! the worker set.

use std::collections::BTreeSet;

use crate::models::task::Task;
use crate::services::store::{StoreResult, TaskStore};
use crate::services::visibility::PlannableWorkers;

/// Effective assignees of `task` that are currently plannable, in order.
pub fn plannable_assignees(task: &Task, plannable: &PlannableWorkers) -> Vec<i64> {
    plannable.retain_plannable(task.effective_assignees())
}

/// Candidate worker set being edited in the assignment dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentSelection {
    worker_ids: BTreeSet<i64>,
}

impl AssignmentSelection {
    /// Initial selection for editing `task`
    pub fn for_task(task: &Task, plannable: &PlannableWorkers) -> Self {
        plannable_assignees(task, plannable).into_iter().collect()
    }

    /// Add the worker if absent, remove it if present.
    pub fn toggle(&mut self, worker_id: i64) {
        if !self.worker_ids.remove(&worker_id) {
            self.worker_ids.insert(worker_id);
        }
    }

    pub fn contains(&self, worker_id: i64) -> bool {
        self.worker_ids.contains(&worker_id)
    }

    pub fn ids(&self) -> Vec<i64> {
        self.worker_ids.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.worker_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.worker_ids.len()
    }
}

impl FromIterator<i64> for AssignmentSelection {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self {
            worker_ids: iter.into_iter().collect(),
        }
    }
}

/// Commits assignment sets against the store.
pub struct AssignmentService<'a, S: TaskStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: TaskStore + ?Sized> AssignmentService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Replace the task's assignment wholesale with `worker_ids`.
    pub async fn commit_ids(&self, task_id: i64, worker_ids: Vec<i64>) -> StoreResult<Task> {
        log::debug!("Assigning workers {:?} to task #{}", worker_ids, task_id);
        self.store.assign_workers(task_id, worker_ids).await
    }

    pub async fn commit(&self, task_id: i64, selection: &AssignmentSelection) -> StoreResult<Task> {
        self.commit_ids(task_id, selection.ids()).await
    }
}
