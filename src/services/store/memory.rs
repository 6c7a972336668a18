use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use std::sync::{Mutex, MutexGuard};

use super::{StoreError, StoreResult, TaskStore};
use crate::models::principal::Principal;
use crate::models::project::Project;
use crate::models::task::{Task, TaskPayload, TaskStatus};
use crate::models::task_log::TaskLog;
use crate::models::worker::{Worker, WorkerDraft};
use crate::utils::date::DateWindow;

/// Journal entry for every request the in-memory store receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CurrentUser,
    ListWorkers,
    CreateWorker(WorkerDraft),
    UpdateWorker(i64, WorkerDraft),
    ListProjects,
    FetchTasks(DateWindow),
    TaskHistory,
    CreateTask(TaskPayload),
    UpdateTask(i64, TaskPayload),
    DeleteTask(i64, String),
    UpdateStatus(i64, TaskStatus),
    AssignWorkers(i64, Vec<i64>),
    ListLogs(i64),
    AddLog(i64, String),
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::CreateWorker(_)
                | StoreCall::UpdateWorker(..)
                | StoreCall::CreateTask(_)
                | StoreCall::UpdateTask(..)
                | StoreCall::DeleteTask(..)
                | StoreCall::UpdateStatus(..)
                | StoreCall::AssignWorkers(..)
                | StoreCall::AddLog(..)
        )
    }
}

#[derive(Debug)]
struct MemoryState {
    principal: Principal,
    workers: Vec<Worker>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    /// Assignment rows, in insertion order: (task_id, worker_id)
    task_workers: Vec<(i64, i64)>,
    logs: Vec<TaskLog>,
    next_task_id: i64,
    next_log_id: i64,
    calls: Vec<StoreCall>,
}

/// In-process [`TaskStore`] that mirrors the REST API's behavior:
/// soft deletes, automatic audit entries and plannable-worker checks.
pub struct InMemoryTaskStore {
    state: Mutex<MemoryState>,
}

impl InMemoryTaskStore {
    pub fn new(principal: Principal) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                principal,
                workers: Vec::new(),
                projects: Vec::new(),
                tasks: Vec::new(),
                task_workers: Vec::new(),
                logs: Vec::new(),
                next_task_id: 1,
                next_log_id: 1,
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_workers(self, workers: Vec<Worker>) -> Self {
        self.lock().workers = workers;
        self
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.lock().projects = projects;
        self
    }

    /// Insert a task as-is, keeping its id and worker set.
    pub fn seed_task(&self, task: Task) {
        let mut state = self.lock();
        state.next_task_id = state.next_task_id.max(task.id + 1);
        for worker in &task.workers {
            state.task_workers.push((task.id, worker.id));
        }
        state.tasks.push(task);
    }

    /// Requests received so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls().into_iter().filter(StoreCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current stored version of a task, deleted or not.
    pub fn task(&self, task_id: i64) -> Option<Task> {
        let state = self.lock();
        state.tasks.iter().find(|t| t.id == task_id).map(|t| state.expand(t))
    }

    /// Log contents of a task, oldest first.
    pub fn log_contents(&self, task_id: i64) -> Vec<String> {
        self.lock()
            .logs
            .iter()
            .filter(|l| l.task_id == Some(task_id))
            .map(|l| l.content.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl MemoryState {
    fn record(&mut self, call: StoreCall) {
        self.calls.push(call);
    }

    fn task_index(&self, task_id: i64) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(StoreError::NotFound {
                resource: "task",
                id: task_id,
            })
    }

    fn worker(&self, worker_id: i64) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    fn check_plannable(&self, worker_id: Option<i64>) -> StoreResult<()> {
        let Some(worker_id) = worker_id else {
            return Ok(());
        };
        match self.worker(worker_id) {
            None => Err(StoreError::Rejected {
                status: 400,
                message: "Trabajador invalido".to_string(),
            }),
            Some(worker) if !worker.is_plannable() => Err(StoreError::Rejected {
                status: 400,
                message: "Trabajador no visible para planificacion".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    fn add_log(&mut self, task_id: i64, content: String) -> TaskLog {
        let log = TaskLog {
            id: self.next_log_id,
            task_id: Some(task_id),
            created_at: now(),
            content,
            user_id: Some(self.principal.id),
            user_email: Some(self.principal.email.clone()),
            user_role: Some(
                if self.principal.is_admin() {
                    "admin"
                } else {
                    "worker"
                }
                .to_string(),
            ),
        };
        self.next_log_id += 1;
        self.logs.push(log.clone());
        log
    }

    fn link_worker(&mut self, task_id: i64, worker_id: i64) {
        if !self.task_workers.contains(&(task_id, worker_id)) {
            self.task_workers.push((task_id, worker_id));
        }
    }

    /// Task as served to clients: worker set and primary worker expanded.
    fn expand(&self, task: &Task) -> Task {
        let mut out = task.clone();
        out.workers = self
            .task_workers
            .iter()
            .filter(|(tid, _)| *tid == task.id)
            .filter_map(|(_, wid)| self.worker(*wid).cloned())
            .collect();
        let primary = task
            .worker_id
            .and_then(|id| self.worker(id))
            .or_else(|| out.workers.first());
        out.worker_name = primary.map(|w| w.name.clone());
        out.worker_color = primary.map(|w| w.color.clone());
        out
    }

    /// Newest update first, then highest id
    fn sorted(&self, mut tasks: Vec<Task>) -> Vec<Task> {
        tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        tasks.iter().map(|t| self.expand(t)).collect()
    }
}

fn apply_payload(task: &mut Task, payload: &TaskPayload) -> Vec<&'static str> {
    let mut changed = Vec::new();
    macro_rules! set {
        ($field:ident) => {
            if task.$field != payload.$field {
                changed.push(stringify!($field));
                task.$field = payload.$field.clone();
            }
        };
    }
    set!(task_date);
    set!(title);
    set!(project);
    set!(start_time);
    set!(end_time);
    set!(prereq_ppe);
    set!(prereq_client_response);
    set!(prereq_coord_st);
    set!(prereq_notes);
    set!(worker_id);
    set!(status);
    set!(priority);
    changed
}

fn apply_worker_draft(mut worker: Worker, draft: &WorkerDraft) -> Worker {
    worker.name = draft.name.clone();
    worker.status = draft.status;
    worker.color = draft.color.clone();
    worker.visible_in_planner = Some(draft.visible_in_planner);
    worker
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn current_user(&self) -> StoreResult<Principal> {
        let mut state = self.lock();
        state.record(StoreCall::CurrentUser);
        Ok(state.principal.clone())
    }

    async fn list_workers(&self) -> StoreResult<Vec<Worker>> {
        let mut state = self.lock();
        state.record(StoreCall::ListWorkers);
        Ok(state.workers.clone())
    }

    async fn create_worker(&self, draft: WorkerDraft) -> StoreResult<Worker> {
        let mut state = self.lock();
        state.record(StoreCall::CreateWorker(draft.clone()));
        let id = state.workers.iter().map(|w| w.id).max().unwrap_or(0) + 1;
        let worker = apply_worker_draft(Worker::new(id, String::new()), &draft);
        state.workers.push(worker.clone());
        Ok(worker)
    }

    async fn update_worker(&self, worker_id: i64, draft: WorkerDraft) -> StoreResult<Worker> {
        let mut state = self.lock();
        state.record(StoreCall::UpdateWorker(worker_id, draft.clone()));
        let slot = state
            .workers
            .iter_mut()
            .find(|w| w.id == worker_id)
            .ok_or(StoreError::NotFound {
                resource: "worker",
                id: worker_id,
            })?;
        *slot = apply_worker_draft(slot.clone(), &draft);
        Ok(slot.clone())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let mut state = self.lock();
        state.record(StoreCall::ListProjects);
        Ok(state.projects.clone())
    }

    async fn fetch_tasks(&self, window: DateWindow) -> StoreResult<Vec<Task>> {
        let mut state = self.lock();
        state.record(StoreCall::FetchTasks(window));
        let live = state
            .tasks
            .iter()
            .filter(|t| !t.is_deleted() && window.contains(t.task_date))
            .cloned()
            .collect();
        Ok(state.sorted(live))
    }

    async fn task_history(&self) -> StoreResult<Vec<Task>> {
        let mut state = self.lock();
        state.record(StoreCall::TaskHistory);
        if !state.principal.is_admin() {
            return Err(StoreError::Rejected {
                status: 403,
                message: "Solo admin".to_string(),
            });
        }
        let all = state.tasks.clone();
        Ok(state.sorted(all))
    }

    async fn create_task(&self, payload: TaskPayload) -> StoreResult<Task> {
        let mut state = self.lock();
        state.record(StoreCall::CreateTask(payload.clone()));
        state.check_plannable(payload.worker_id)?;

        let id = state.next_task_id;
        state.next_task_id += 1;
        let mut task = Task {
            id,
            task_date: payload.task_date,
            title: String::new(),
            project: String::new(),
            start_time: String::new(),
            end_time: None,
            prereq_ppe: String::new(),
            prereq_client_response: false,
            prereq_coord_st: false,
            prereq_notes: String::new(),
            worker_id: None,
            worker_name: None,
            worker_color: None,
            workers: Vec::new(),
            status: payload.status,
            priority: payload.priority,
            deleted_at: None,
            updated_at: Some(now()),
        };
        apply_payload(&mut task, &payload);
        if let Some(worker_id) = payload.worker_id {
            state.link_worker(id, worker_id);
        }
        state.add_log(id, "Tarea creada".to_string());
        state.tasks.push(task.clone());
        Ok(state.expand(&task))
    }

    async fn update_task(&self, task_id: i64, payload: TaskPayload) -> StoreResult<Task> {
        let mut state = self.lock();
        state.record(StoreCall::UpdateTask(task_id, payload.clone()));
        state.check_plannable(payload.worker_id)?;
        let idx = state.task_index(task_id)?;

        let changed = {
            let task = &mut state.tasks[idx];
            let changed = apply_payload(task, &payload);
            task.updated_at = Some(now());
            changed
        };
        if let Some(worker_id) = payload.worker_id {
            state.link_worker(task_id, worker_id);
        }
        if !changed.is_empty() {
            state.add_log(task_id, format!("Tarea actualizada: {}", changed.join(", ")));
        }
        let task = state.tasks[idx].clone();
        Ok(state.expand(&task))
    }

    async fn delete_task(&self, task_id: i64, reason: String) -> StoreResult<()> {
        let mut state = self.lock();
        state.record(StoreCall::DeleteTask(task_id, reason.clone()));
        let idx = state.task_index(task_id)?;
        let stamp = now();
        state.tasks[idx].deleted_at = Some(stamp);
        state.tasks[idx].updated_at = Some(stamp);
        state.add_log(task_id, format!("Tarea eliminada. Motivo: {reason}"));
        Ok(())
    }

    async fn update_status(&self, task_id: i64, status: TaskStatus) -> StoreResult<()> {
        let mut state = self.lock();
        state.record(StoreCall::UpdateStatus(task_id, status));
        let idx = state.task_index(task_id)?;
        state.tasks[idx].status = status;
        state.tasks[idx].updated_at = Some(now());
        state.add_log(task_id, format!("Estado cambiado a {status}"));
        Ok(())
    }

    async fn assign_workers(&self, task_id: i64, worker_ids: Vec<i64>) -> StoreResult<Task> {
        let mut state = self.lock();
        state.record(StoreCall::AssignWorkers(task_id, worker_ids.clone()));
        let idx = state.task_index(task_id)?;

        let mut unique: Vec<i64> = Vec::with_capacity(worker_ids.len());
        for id in worker_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        let all_plannable = unique
            .iter()
            .all(|id| state.worker(*id).is_some_and(Worker::is_plannable));
        if !all_plannable {
            return Err(StoreError::Rejected {
                status: 400,
                message: "Trabajador invalido".to_string(),
            });
        }

        state.task_workers.retain(|(tid, _)| *tid != task_id);
        for id in &unique {
            state.task_workers.push((task_id, *id));
        }
        state.tasks[idx].worker_id = unique.first().copied();
        state.tasks[idx].updated_at = Some(now());

        let names: Vec<String> = unique
            .iter()
            .filter_map(|id| state.worker(*id).map(|w| w.name.clone()))
            .collect();
        let label = if names.is_empty() {
            "Sin asignar".to_string()
        } else {
            names.join(", ")
        };
        state.add_log(task_id, format!("Asignados: {label}"));

        let task = state.tasks[idx].clone();
        Ok(state.expand(&task))
    }

    async fn list_logs(&self, task_id: i64) -> StoreResult<Vec<TaskLog>> {
        let mut state = self.lock();
        state.record(StoreCall::ListLogs(task_id));
        state.task_index(task_id)?;
        let mut logs: Vec<TaskLog> = state
            .logs
            .iter()
            .filter(|l| l.task_id == Some(task_id))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(logs)
    }

    async fn add_log(&self, task_id: i64, content: String) -> StoreResult<TaskLog> {
        let mut state = self.lock();
        state.record(StoreCall::AddLog(task_id, content.clone()));
        state.task_index(task_id)?;
        Ok(state.add_log(task_id, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::fixtures::{task, ymd};

    fn store() -> InMemoryTaskStore {
        InMemoryTaskStore::new(Principal::admin(1, "admin@example.com")).with_workers(vec![
            Worker::new(3, "Ana"),
            Worker::new(9, "Luis").with_visibility(false),
        ])
    }

    #[tokio::test]
    async fn test_fetch_filters_window_and_deleted() {
        let store = store();
        store.seed_task(task(1, ymd(2024, 3, 1)));
        store.seed_task(task(2, ymd(2024, 5, 1)));
        store.seed_task(task(3, ymd(2024, 3, 2)));
        store.delete_task(3, "duplicada".to_string()).await.unwrap();

        let window = DateWindow::for_month(ymd(2024, 3, 1));
        let tasks = store.fetch_tasks(window).await.unwrap();
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1]);

        let history = store.task_history().await.unwrap();
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_assign_replaces_set_and_sets_primary() {
        let store = store();
        store.seed_task(task(1, ymd(2024, 3, 1)));
        store.assign_workers(1, vec![3, 3]).await.unwrap();
        let updated = store.assign_workers(1, vec![3]).await.unwrap();
        assert_eq!(updated.effective_assignees(), vec![3]);
        assert_eq!(updated.worker_id, Some(3));
        assert_eq!(updated.worker_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_assign_hidden_worker_rejected() {
        let store = store();
        store.seed_task(task(1, ymd(2024, 3, 1)));
        let err = store.assign_workers(1, vec![3, 9]).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_hiding_worker_keeps_existing_assignment() {
        let store = store();
        let mut seeded = task(1, ymd(2024, 3, 1));
        seeded.workers = vec![Worker::new(3, "Ana")];
        store.seed_task(seeded);

        let mut draft = WorkerDraft::from_worker(&Worker::new(3, "Ana"));
        draft.visible_in_planner = false;
        let updated = store.update_worker(3, draft).await.unwrap();
        assert!(!updated.is_plannable());

        assert_eq!(store.task(1).unwrap().effective_assignees(), vec![3]);
        let created = store.create_worker(WorkerDraft { name: "Eva".to_string(), ..WorkerDraft::default() }).await.unwrap();
        assert_eq!(created.id, 10);
        assert_eq!(store.list_workers().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let store = store();
        let err = store.delete_task(42, "x".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { id: 42, .. }));
    }

    #[tokio::test]
    async fn test_update_logs_changed_fields() {
        let store = store();
        store.seed_task(task(1, ymd(2024, 3, 1)));
        let payload = store.task(1).unwrap().to_payload(Some(ymd(2024, 3, 8)));
        store.update_task(1, payload).await.unwrap();
        assert_eq!(store.log_contents(1), vec!["Tarea actualizada: task_date"]);
    }
}
