//! Task store boundary.
//!
//! The board never talks to persistence directly: every read and mutation
//! goes through [`TaskStore`], a request/response contract implemented over
//! HTTP by [`HttpTaskStore`] and in process by [`InMemoryTaskStore`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::principal::Principal;
use crate::models::project::Project;
use crate::models::task::{Task, TaskPayload, TaskStatus};
use crate::models::task_log::TaskLog;
use crate::models::worker::{Worker, WorkerDraft};
use crate::utils::date::DateWindow;

pub mod http;
pub mod memory;

pub use http::HttpTaskStore;
pub use memory::{InMemoryTaskStore, StoreCall};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{resource} #{id} not found")]
    NotFound { resource: &'static str, id: i64 },
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed store response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Request/response contract of the external task/worker/project store.
///
/// Calls are not retried and multi-step sequences are not transactional:
/// callers see each failure as it happens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Account behind the configured credentials
    async fn current_user(&self) -> StoreResult<Principal>;

    async fn list_workers(&self) -> StoreResult<Vec<Worker>>;

    async fn create_worker(&self, draft: WorkerDraft) -> StoreResult<Worker>;

    /// Full replacement of the worker's fields
    async fn update_worker(&self, worker_id: i64, draft: WorkerDraft) -> StoreResult<Worker>;

    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Live tasks with `task_date` inside the inclusive window, workers expanded
    async fn fetch_tasks(&self, window: DateWindow) -> StoreResult<Vec<Task>>;

    /// Every task including soft-deleted rows (admin only)
    async fn task_history(&self) -> StoreResult<Vec<Task>>;

    async fn create_task(&self, payload: TaskPayload) -> StoreResult<Task>;

    /// Full replacement of the task's fields
    async fn update_task(&self, task_id: i64, payload: TaskPayload) -> StoreResult<Task>;

    /// Soft delete; `reason` must be non-empty
    async fn delete_task(&self, task_id: i64, reason: String) -> StoreResult<()>;

    async fn update_status(&self, task_id: i64, status: TaskStatus) -> StoreResult<()>;

    /// Replace the whole assignment set of a task
    async fn assign_workers(&self, task_id: i64, worker_ids: Vec<i64>) -> StoreResult<Task>;

    /// Newest first
    async fn list_logs(&self, task_id: i64) -> StoreResult<Vec<TaskLog>>;

    async fn add_log(&self, task_id: i64, content: String) -> StoreResult<TaskLog>;
}
