//! Plannable-worker filter.

use std::collections::HashSet;

use crate::models::worker::Worker;

/// Workers eligible as drag sources and assignment candidates, in the
/// order the store listed them, plus an id set for membership tests.
#[derive(Debug, Clone, Default)]
pub struct PlannableWorkers {
    workers: Vec<Worker>,
    ids: HashSet<i64>,
}

impl PlannableWorkers {
    pub fn from_workers(all: &[Worker]) -> Self {
        let workers: Vec<Worker> = all.iter().filter(|w| w.is_plannable()).cloned().collect();
        let ids = workers.iter().map(|w| w.id).collect();
        Self { workers, ids }
    }

    pub fn contains(&self, worker_id: i64) -> bool {
        self.ids.contains(&worker_id)
    }

    pub fn get(&self, worker_id: i64) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.iter()
    }

    /// Keep only plannable ids, preserving order.
    pub fn retain_plannable(&self, worker_ids: impl IntoIterator<Item = i64>) -> Vec<i64> {
        worker_ids.into_iter().filter(|id| self.contains(*id)).collect()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
