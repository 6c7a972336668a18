//! Date-keyed view over the loaded task window.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::models::task::Task;

/// Tasks bucketed by `task_date`, preserving input order within a day.
///
/// Derived state only: it is rebuilt from scratch whenever the task
/// collection changes and never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    by_date: HashMap<NaiveDate, Vec<Task>>,
}

impl TaskIndex {
    pub fn build(tasks: &[Task]) -> Self {
        let mut by_date: HashMap<NaiveDate, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_date.entry(task.task_date).or_default().push(task.clone());
        }
        Self { by_date }
    }

    /// Tasks on `date`; empty when the day has none.
    pub fn tasks_on(&self, date: NaiveDate) -> &[Task] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count_on(&self, date: NaiveDate) -> usize {
        self.tasks_on(date).len()
    }

    /// Days that have at least one task
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.by_date.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }
}
