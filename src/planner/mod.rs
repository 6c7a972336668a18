//! The scheduling board.
//!
//! [`Planner`] owns the loaded month window, the team directory, the one
//! active dialog and the in-progress drag gesture, and turns operator
//! actions into [`TaskStore`] calls. Every committed mutation ends with a
//! full reload of the displayed window.

pub mod cell;
pub mod drag;
pub mod navigation;
pub mod state;

use chrono::NaiveDate;

use crate::error::{PlannerError, PlannerResult, ValidationError};
use crate::models::principal::Principal;
use crate::models::project::Project;
use crate::models::task::{Task, TaskDraft, TaskStatus};
use crate::models::task_log::TaskLog;
use crate::models::worker::{Worker, WorkerDraft};
use crate::services::assignment::{AssignmentSelection, AssignmentService};
use crate::services::index::TaskIndex;
use crate::services::relocation::{MoveMode, RelocationOutcome, RelocationService};
use crate::services::store::TaskStore;
use crate::services::visibility::PlannableWorkers;
use crate::utils::date::{first_of_month, month_grid, DateWindow};

use cell::{CellContext, DayCell};
use drag::{interpret_drop, DragPayload, DragSession, DropDecision, DropEffect};
use navigation::{ReloadTicket, ReloadTracker};
use state::ActiveDialog;

pub struct Planner<S: TaskStore> {
    store: S,
    principal: Principal,
    today: NaiveDate,
    current_month: NaiveDate,
    selected_date: NaiveDate,
    tasks: Vec<Task>,
    index: TaskIndex,
    workers: Vec<Worker>,
    plannable: PlannableWorkers,
    projects: Vec<Project>,
    dialog: ActiveDialog,
    drag: Option<DragSession>,
    reloads: ReloadTracker,
    /// Last failure shown to the operator, cleared when a dialog opens or closes
    notice: Option<String>,
}

impl<S: TaskStore> Planner<S> {
    /// Board showing the month of `today`, with nothing loaded yet.
    pub fn new(store: S, principal: Principal, today: NaiveDate) -> Self {
        Self {
            store,
            principal,
            today,
            current_month: first_of_month(today),
            selected_date: today,
            tasks: Vec::new(),
            index: TaskIndex::default(),
            workers: Vec::new(),
            plannable: PlannableWorkers::default(),
            projects: Vec::new(),
            dialog: ActiveDialog::None,
            drag: None,
            reloads: ReloadTracker::default(),
            notice: None,
        }
    }

    /// Resolve the current account, load the team directory (admins only)
    /// and the first window.
    pub async fn connect(store: S, today: NaiveDate) -> PlannerResult<Self> {
        let principal = store.current_user().await?;
        log::info!("Signed in as {} ({:?})", principal.email, principal.role);
        let mut planner = Self::new(store, principal, today);
        if planner.principal.is_admin() {
            planner.refresh_directory().await?;
        }
        planner.reload().await?;
        Ok(planner)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn current_month(&self) -> NaiveDate {
        self.current_month
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::for_month(self.current_month)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn index(&self) -> &TaskIndex {
        &self.index
    }

    /// Tasks listed beside the grid for the selected day
    pub fn selected_tasks(&self) -> &[Task] {
        self.index.tasks_on(self.selected_date)
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn plannable(&self) -> &PlannableWorkers {
        &self.plannable
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn dialog(&self) -> &ActiveDialog {
        &self.dialog
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The 42 cells of the displayed month.
    pub fn grid(&self) -> Vec<DayCell> {
        let ctx = CellContext {
            month: self.current_month,
            today: self.today,
            selected: self.selected_date,
            drop_target: self.drop_target(),
        };
        month_grid(self.current_month)
            .into_iter()
            .map(|date| DayCell::build(date, self.index.tasks_on(date), &ctx))
            .collect()
    }

    pub async fn refresh_directory(&mut self) -> PlannerResult<()> {
        let workers = self.store.list_workers().await?;
        self.projects = self.store.list_projects().await?;
        self.set_workers(workers);
        Ok(())
    }

    pub fn set_workers(&mut self, workers: Vec<Worker>) {
        self.plannable = PlannableWorkers::from_workers(&workers);
        log::debug!(
            "{} workers loaded, {} plannable",
            workers.len(),
            self.plannable.len()
        );
        self.workers = workers;
    }

    // ---- Window loading ----

    /// Start a fetch of the displayed window. Only the latest ticket's
    /// result will be accepted by [`Planner::apply_reload`].
    pub fn begin_reload(&mut self) -> ReloadTicket {
        let ticket = self.reloads.issue(self.window());
        log::debug!(
            "Reload #{} for {}..{}",
            ticket.seq(),
            ticket.window().start,
            ticket.window().end
        );
        ticket
    }

    /// Replace the loaded tasks with a fetch result. Returns false (and
    /// keeps the current tasks) when a newer reload has been issued since.
    pub fn apply_reload(&mut self, ticket: ReloadTicket, tasks: Vec<Task>) -> bool {
        if !self.reloads.is_current(&ticket) {
            log::warn!("Discarding stale reload #{}", ticket.seq());
            return false;
        }
        self.index = TaskIndex::build(&tasks);
        self.tasks = tasks;
        true
    }

    pub async fn reload(&mut self) -> PlannerResult<()> {
        let ticket = self.begin_reload();
        let tasks = self.store.fetch_tasks(ticket.window()).await?;
        self.apply_reload(ticket, tasks);
        Ok(())
    }

    /// Show the month `delta` months away and load its window.
    pub async fn navigate(&mut self, delta: i32) -> PlannerResult<()> {
        self.current_month = navigation::navigate(self.current_month, delta);
        self.reload().await
    }

    /// Show the month containing `date` and load its window.
    pub async fn show_month(&mut self, date: NaiveDate) -> PlannerResult<()> {
        self.current_month = first_of_month(date);
        self.reload().await
    }

    // ---- Drag and drop ----

    /// Pick up a worker chip. Only plannable workers can be dragged.
    pub fn begin_worker_drag(&mut self, worker_id: i64) -> bool {
        let Some(worker) = self.plannable.get(worker_id) else {
            log::debug!("Worker #{} is not plannable, drag refused", worker_id);
            return false;
        };
        self.drag = Some(DragSession::new(DragPayload::worker(worker)));
        true
    }

    /// Pick up a loaded task. Only administrators can drag tasks.
    pub fn begin_task_drag(&mut self, task_id: i64, source_date: Option<NaiveDate>) -> bool {
        if !self.principal.is_admin() {
            return false;
        }
        let Some(task) = self.tasks.iter().find(|t| t.id == task_id) else {
            return false;
        };
        self.drag = Some(DragSession::new(DragPayload::task(task, source_date)));
        true
    }

    pub fn drag_over(&mut self, date: NaiveDate) -> Option<DropEffect> {
        self.drag.as_mut().map(|session| session.enter(date))
    }

    pub fn drag_leave(&mut self, date: NaiveDate) {
        if let Some(session) = self.drag.as_mut() {
            session.leave(date);
        }
    }

    pub fn drop_target(&self) -> Option<NaiveDate> {
        self.drag.as_ref().and_then(DragSession::drop_target)
    }

    /// Gesture abandoned outside the grid
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Finish the gesture on `target`. The drop-target marker is cleared
    /// whatever the outcome; accepted drops select `target` and open the
    /// matching dialog.
    pub fn drop_on(&mut self, target: NaiveDate) -> DropDecision {
        let payload = self.drag.take().map(|session| session.payload());
        let decision = interpret_drop(payload, target, &self.principal, &self.tasks);
        match &decision {
            DropDecision::Ignore(reason) => {
                log::debug!("Drop on {} ignored: {:?}", target, reason);
            }
            DropDecision::CreateTask(draft) => {
                self.selected_date = target;
                self.open_dialog(ActiveDialog::CreatingTask(draft.clone()));
            }
            DropDecision::StageRelocation(draft) => {
                self.selected_date = target;
                self.open_dialog(ActiveDialog::ConfirmingRelocation(draft.clone()));
            }
        }
        decision
    }

    // ---- Dialogs ----

    fn open_dialog(&mut self, dialog: ActiveDialog) {
        self.notice = None;
        self.dialog = dialog;
    }

    /// Close whatever dialog is open, discarding its staged state.
    pub fn cancel_dialog(&mut self) {
        self.notice = None;
        self.dialog = ActiveDialog::None;
    }

    fn require_admin(&self, action: &'static str) -> PlannerResult<()> {
        if self.principal.is_admin() {
            Ok(())
        } else {
            Err(PlannerError::Unauthorized(action))
        }
    }

    fn loaded_task(&self, task_id: i64) -> PlannerResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or(PlannerError::NotLoaded {
                resource: "task",
                id: task_id,
            })
    }

    /// Record a failure for the operator and hand it back.
    fn report(&mut self, err: impl Into<PlannerError>) -> PlannerError {
        let err = err.into();
        if err.is_validation() {
            log::debug!("Rejected input: {}", err);
        } else {
            log::warn!("{}", err);
        }
        self.notice = Some(err.to_string());
        err
    }

    pub fn set_move_mode(&mut self, mode: MoveMode) -> PlannerResult<()> {
        let draft = self
            .dialog
            .move_draft_mut()
            .ok_or(PlannerError::NoActiveDialog("relocation"))?;
        draft.mode = mode;
        Ok(())
    }

    pub fn set_move_reason(&mut self, reason: impl Into<String>) -> PlannerResult<()> {
        let draft = self
            .dialog
            .move_draft_mut()
            .ok_or(PlannerError::NoActiveDialog("relocation"))?;
        draft.reason = reason.into();
        Ok(())
    }

    /// Run the staged relocation. On any failure the dialog stays open with
    /// its draft; on success it closes and the window is reloaded.
    pub async fn confirm_relocation(&mut self) -> PlannerResult<RelocationOutcome> {
        let draft = self
            .dialog
            .move_draft()
            .cloned()
            .ok_or(PlannerError::NoActiveDialog("relocation"))?;
        let result = RelocationService::new(&self.store)
            .execute(&draft, &self.plannable)
            .await;
        let outcome = result.map_err(|e| self.report(e))?;
        self.cancel_dialog();
        self.reload().await?;
        Ok(outcome)
    }

    pub fn open_create_form(&mut self) -> PlannerResult<()> {
        self.require_admin("task creation")?;
        self.open_dialog(ActiveDialog::CreatingTask(TaskDraft::new(self.selected_date)));
        Ok(())
    }

    /// Open the detail form of a loaded task, with its log entries.
    pub async fn open_task(&mut self, task_id: i64) -> PlannerResult<()> {
        let task = self.loaded_task(task_id)?.clone();
        let logs = self.store.list_logs(task_id).await?;
        self.selected_date = task.task_date;
        self.open_dialog(ActiveDialog::EditingTask {
            draft: TaskDraft::from_task(&task),
            task: Box::new(task),
            logs,
        });
        Ok(())
    }

    /// Form of the creation or detail dialog, for editing
    pub fn task_form_mut(&mut self) -> Option<&mut TaskDraft> {
        self.dialog.task_draft_mut()
    }

    /// Submit the creation or detail form.
    pub async fn save_task_form(&mut self) -> PlannerResult<Task> {
        self.require_admin("task editing")?;
        let (task_id, payload) = match &self.dialog {
            ActiveDialog::CreatingTask(draft) => (None, draft.to_payload()),
            ActiveDialog::EditingTask { task, draft, .. } => (Some(task.id), draft.to_payload()),
            _ => return Err(PlannerError::NoActiveDialog("task form")),
        };
        let payload = payload.map_err(|e| self.report(e))?;

        let result = match task_id {
            None => self.store.create_task(payload).await,
            Some(id) => self.store.update_task(id, payload).await,
        };
        let saved = result.map_err(|e| self.report(e))?;

        log::info!("Saved task #{} on {}", saved.id, saved.task_date);
        self.cancel_dialog();
        self.reload().await?;
        Ok(saved)
    }

    /// Soft-delete a task. The reason is mandatory.
    pub async fn delete_task(&mut self, task_id: i64, reason: &str) -> PlannerResult<()> {
        self.require_admin("task deletion")?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(self.report(ValidationError::EmptyDeleteReason));
        }
        let result = self.store.delete_task(task_id, reason.to_string()).await;
        result.map_err(|e| self.report(e))?;

        log::info!("Deleted task #{}", task_id);
        if self.dialog.task_id() == Some(task_id) {
            self.cancel_dialog();
        }
        self.reload().await
    }

    /// Workers may only report progress or completion; administrators may
    /// set any status.
    pub async fn update_status(&mut self, task_id: i64, status: TaskStatus) -> PlannerResult<()> {
        if !self.principal.is_admin()
            && !matches!(status, TaskStatus::EnProgreso | TaskStatus::Finalizada)
        {
            return Err(PlannerError::Unauthorized("status change"));
        }
        self.store.update_status(task_id, status).await?;
        log::info!("Task #{} is now {}", task_id, status);
        self.reload().await
    }

    pub fn open_assignment(&mut self, task_id: i64) -> PlannerResult<()> {
        self.require_admin("assignment")?;
        let selection = AssignmentSelection::for_task(self.loaded_task(task_id)?, &self.plannable);
        self.open_dialog(ActiveDialog::AssigningWorkers { task_id, selection });
        Ok(())
    }

    /// Flip a worker in the assignment dialog. Returns whether the worker
    /// is selected afterwards; non-plannable workers are never selectable.
    pub fn toggle_assignee(&mut self, worker_id: i64) -> PlannerResult<bool> {
        let ActiveDialog::AssigningWorkers { selection, .. } = &mut self.dialog else {
            return Err(PlannerError::NoActiveDialog("assignment"));
        };
        if !self.plannable.contains(worker_id) {
            return Ok(false);
        }
        selection.toggle(worker_id);
        Ok(selection.contains(worker_id))
    }

    /// Commit the selection as the task's complete worker set.
    pub async fn save_assignment(&mut self) -> PlannerResult<Task> {
        let ActiveDialog::AssigningWorkers { task_id, selection } = &self.dialog else {
            return Err(PlannerError::NoActiveDialog("assignment"));
        };
        let (task_id, worker_ids) = (*task_id, selection.ids());
        let result = AssignmentService::new(&self.store)
            .commit_ids(task_id, worker_ids)
            .await;
        let task = result.map_err(|e| self.report(e))?;

        log::info!("Task #{} assigned to {}", task.id, task.assignee_label());
        self.cancel_dialog();
        self.reload().await?;
        Ok(task)
    }

    pub async fn open_logs(&mut self, task_id: i64) -> PlannerResult<()> {
        let logs = self.store.list_logs(task_id).await?;
        self.open_dialog(ActiveDialog::ViewingLogs { task_id, logs });
        Ok(())
    }

    /// Append a comment to the task of the open logs or detail dialog and
    /// refresh the listed entries.
    pub async fn add_comment(&mut self, content: &str) -> PlannerResult<TaskLog> {
        let task_id = match &self.dialog {
            ActiveDialog::ViewingLogs { task_id, .. } => *task_id,
            ActiveDialog::EditingTask { task, .. } => task.id,
            _ => return Err(PlannerError::NoActiveDialog("logs")),
        };
        let content = content.trim();
        if content.is_empty() {
            return Err(self.report(ValidationError::EmptyComment));
        }
        let result = self.store.add_log(task_id, content.to_string()).await;
        let entry = result.map_err(|e| self.report(e))?;

        let logs = self.store.list_logs(task_id).await?;
        if let Some(listed) = self.dialog.logs_mut() {
            *listed = logs;
        }
        Ok(entry)
    }

    /// Open the team form for a new worker (`None`) or an existing one.
    pub fn open_worker_form(&mut self, worker_id: Option<i64>) -> PlannerResult<()> {
        self.require_admin("team maintenance")?;
        let draft = match worker_id {
            None => WorkerDraft::default(),
            Some(id) => {
                let worker = self
                    .workers
                    .iter()
                    .find(|w| w.id == id)
                    .ok_or(PlannerError::NotLoaded {
                        resource: "worker",
                        id,
                    })?;
                WorkerDraft::from_worker(worker)
            }
        };
        self.open_dialog(ActiveDialog::EditingWorker { worker_id, draft });
        Ok(())
    }

    pub fn worker_form_mut(&mut self) -> Option<&mut WorkerDraft> {
        self.dialog.worker_draft_mut()
    }

    /// Submit the team form and refresh the directory, so visibility
    /// changes take effect on drag sources and assignment dialogs.
    pub async fn save_worker_form(&mut self) -> PlannerResult<Worker> {
        let ActiveDialog::EditingWorker { worker_id, draft } = &self.dialog else {
            return Err(PlannerError::NoActiveDialog("worker"));
        };
        let (worker_id, draft) = (*worker_id, draft.clone());
        draft.validate().map_err(|e| self.report(e))?;

        let result = match worker_id {
            None => self.store.create_worker(draft).await,
            Some(id) => self.store.update_worker(id, draft).await,
        };
        let worker = result.map_err(|e| self.report(e))?;

        log::info!("Saved worker #{} ({})", worker.id, worker.name);
        self.cancel_dialog();
        self.refresh_directory().await?;
        Ok(worker)
    }

    /// Every task, deleted ones included.
    pub async fn history(&self) -> PlannerResult<Vec<Task>> {
        self.require_admin("history")?;
        Ok(self.store.task_history().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::fixtures::{task, ymd};
    use crate::services::store::{MockTaskStore, StoreError};
    use mockall::predicate::eq;

    fn admin() -> Principal {
        Principal::admin(1, "admin@example.com")
    }

    fn planner_with(store: MockTaskStore, principal: Principal, tasks: Vec<Task>) -> Planner<MockTaskStore> {
        let mut planner = Planner::new(store, principal, ymd(2024, 3, 14));
        let ticket = planner.begin_reload();
        planner.apply_reload(ticket, tasks);
        planner
    }

    #[test]
    fn test_new_board_shows_month_of_today() {
        let planner = Planner::new(MockTaskStore::new(), admin(), ymd(2024, 3, 14));
        assert_eq!(planner.current_month(), ymd(2024, 3, 1));
        assert_eq!(planner.selected_date(), ymd(2024, 3, 14));
        assert_eq!(planner.window().start, ymd(2024, 2, 26));
        assert_eq!(planner.grid().len(), 42);
    }

    #[test]
    fn test_stale_reload_is_discarded() {
        let mut planner = Planner::new(MockTaskStore::new(), admin(), ymd(2024, 3, 14));
        let first = planner.begin_reload();
        let second = planner.begin_reload();

        assert!(planner.apply_reload(second, vec![task(2, ymd(2024, 3, 5))]));
        assert!(!planner.apply_reload(first, vec![task(1, ymd(2024, 3, 5))]));
        assert_eq!(planner.tasks().len(), 1);
        assert_eq!(planner.tasks()[0].id, 2);
        assert_eq!(planner.index().count_on(ymd(2024, 3, 5)), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_keeps_dialog_open() {
        // No expectations: any store call would panic.
        let mut planner = planner_with(MockTaskStore::new(), admin(), vec![task(7, ymd(2024, 3, 1))]);
        assert!(planner.begin_task_drag(7, None));
        planner.drag_over(ymd(2024, 3, 8));
        assert_eq!(planner.drop_target(), Some(ymd(2024, 3, 8)));
        assert!(matches!(planner.drop_on(ymd(2024, 3, 8)), DropDecision::StageRelocation(_)));
        assert_eq!(planner.drop_target(), None);
        assert_eq!(planner.selected_date(), ymd(2024, 3, 8));

        let err = planner.confirm_relocation().await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ValidationError::EmptyMoveReason)));
        assert!(planner.dialog().move_draft().is_some());
        assert_eq!(planner.notice(), Some("Debes indicar una causa para mover la tarea."));
    }

    #[tokio::test]
    async fn test_store_failure_keeps_dialog_open() {
        let mut store = MockTaskStore::new();
        store.expect_update_task().times(1).returning(|_, _| {
            Err(StoreError::Rejected {
                status: 400,
                message: "Trabajador no visible en planificador".to_string(),
            })
        });
        store.expect_fetch_tasks().never();
        let mut planner = planner_with(store, admin(), vec![task(7, ymd(2024, 3, 1))]);
        planner.begin_task_drag(7, None);
        planner.drop_on(ymd(2024, 3, 8));
        planner.set_move_reason("lluvia").unwrap();

        assert!(planner.confirm_relocation().await.is_err());
        assert_eq!(planner.dialog().move_draft().map(|d| d.reason.as_str()), Some("lluvia"));
        assert!(planner.notice().is_some());
    }

    #[tokio::test]
    async fn test_non_admin_cannot_drag_or_view_history() {
        let store = MockTaskStore::new();
        let worker = Principal::worker(2, "w@example.com", Some(3));
        let mut planner = planner_with(store, worker, vec![task(7, ymd(2024, 3, 1))]);
        assert!(!planner.begin_task_drag(7, None));
        assert!(matches!(
            planner.history().await,
            Err(PlannerError::Unauthorized("history"))
        ));
    }

    #[tokio::test]
    async fn test_worker_status_change_is_limited() {
        let mut store = MockTaskStore::new();
        store
            .expect_update_status()
            .with(eq(7), eq(TaskStatus::Finalizada))
            .times(1)
            .returning(|_, _| Ok(()));
        store.expect_fetch_tasks().times(1).returning(|_| Ok(Vec::new()));
        let worker = Principal::worker(2, "w@example.com", Some(3));
        let mut planner = planner_with(store, worker, vec![task(7, ymd(2024, 3, 1))]);

        assert!(matches!(
            planner.update_status(7, TaskStatus::Bloqueada).await,
            Err(PlannerError::Unauthorized(_))
        ));
        planner.update_status(7, TaskStatus::Finalizada).await.unwrap();
        assert!(planner.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_reason() {
        let mut planner = planner_with(MockTaskStore::new(), admin(), vec![task(7, ymd(2024, 3, 1))]);
        let err = planner.delete_task(7, "  ").await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ValidationError::EmptyDeleteReason)));
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let mut store = MockTaskStore::new();
        store.expect_list_logs().with(eq(7)).times(1).returning(|_| Ok(Vec::new()));
        store.expect_add_log().never();
        let mut planner = planner_with(store, admin(), vec![task(7, ymd(2024, 3, 1))]);

        planner.open_logs(7).await.unwrap();
        let err = planner.add_comment("   ").await.unwrap_err();
        assert!(matches!(err, PlannerError::Validation(ValidationError::EmptyComment)));
    }

    #[test]
    fn test_toggle_ignores_hidden_workers() {
        let mut planner = planner_with(MockTaskStore::new(), admin(), vec![task(7, ymd(2024, 3, 1))]);
        planner.set_workers(vec![
            Worker::new(3, "Ana"),
            Worker::new(9, "Luis").with_visibility(false),
        ]);
        planner.open_assignment(7).unwrap();
        assert!(planner.toggle_assignee(3).unwrap());
        assert!(!planner.toggle_assignee(9).unwrap());
        assert_eq!(planner.dialog().selection().map(|s| s.ids()), Some(vec![3]));
        assert!(!planner.toggle_assignee(3).unwrap());
    }

    #[test]
    fn test_hidden_worker_cannot_be_dragged() {
        let mut planner = Planner::new(MockTaskStore::new(), admin(), ymd(2024, 3, 14));
        planner.set_workers(vec![Worker::new(9, "Luis").with_visibility(false)]);
        assert!(!planner.begin_worker_drag(9));
        assert_eq!(planner.drag_over(ymd(2024, 3, 4)), None);
    }
}
