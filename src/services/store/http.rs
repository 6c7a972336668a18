use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{StoreError, StoreResult, TaskStore};
use crate::models::principal::Principal;
use crate::models::project::Project;
use crate::models::settings::Settings;
use crate::models::task::{Task, TaskPayload, TaskStatus};
use crate::models::task_log::TaskLog;
use crate::models::worker::{Worker, WorkerDraft};
use crate::utils::date::{date_key, DateWindow};

/// [`TaskStore`] backed by the planner REST API.
pub struct HttpTaskStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct AssignBody<'a> {
    worker_ids: &'a [i64],
}

#[derive(Serialize)]
struct LogBody<'a> {
    content: &'a str,
}

impl HttpTaskStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build task store HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.validate().map_err(|e| anyhow::anyhow!(e))?;
        Self::new(
            settings.api_url.clone(),
            settings.api_token.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the raw body, mapping non-2xx statuses.
    async fn send_raw(
        &self,
        request: RequestBuilder,
        missing: Option<(&'static str, i64)>,
    ) -> StoreResult<String> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            if let Some((resource, id)) = missing {
                return Err(StoreError::NotFound { resource, id });
            }
        }
        if !status.is_success() {
            let message = if body.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body
            };
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        missing: Option<(&'static str, i64)>,
    ) -> StoreResult<T> {
        let body = self.send_raw(request, missing).await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn current_user(&self) -> StoreResult<Principal> {
        self.send(self.client.get(self.url("/me")), None).await
    }

    async fn list_workers(&self) -> StoreResult<Vec<Worker>> {
        self.send(self.client.get(self.url("/workers")), None).await
    }

    async fn create_worker(&self, draft: WorkerDraft) -> StoreResult<Worker> {
        let request = self.client.post(self.url("/workers")).json(&draft);
        self.send(request, None).await
    }

    async fn update_worker(&self, worker_id: i64, draft: WorkerDraft) -> StoreResult<Worker> {
        let request = self
            .client
            .put(self.url(&format!("/workers/{worker_id}")))
            .json(&draft);
        self.send(request, Some(("worker", worker_id))).await
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.send(self.client.get(self.url("/projects")), None).await
    }

    async fn fetch_tasks(&self, window: DateWindow) -> StoreResult<Vec<Task>> {
        let request = self.client.get(self.url("/tasks")).query(&[
            ("start_date", date_key(window.start)),
            ("end_date", date_key(window.end)),
        ]);
        self.send(request, None).await
    }

    async fn task_history(&self) -> StoreResult<Vec<Task>> {
        self.send(self.client.get(self.url("/tasks/history")), None).await
    }

    async fn create_task(&self, payload: TaskPayload) -> StoreResult<Task> {
        let request = self.client.post(self.url("/tasks")).json(&payload);
        self.send(request, None).await
    }

    async fn update_task(&self, task_id: i64, payload: TaskPayload) -> StoreResult<Task> {
        let request = self
            .client
            .put(self.url(&format!("/tasks/{task_id}")))
            .json(&payload);
        self.send(request, Some(("task", task_id))).await
    }

    async fn delete_task(&self, task_id: i64, reason: String) -> StoreResult<()> {
        let request = self
            .client
            .delete(self.url(&format!("/tasks/{task_id}")))
            .query(&[("reason", reason.as_str())]);
        self.send_raw(request, Some(("task", task_id))).await?;
        Ok(())
    }

    async fn update_status(&self, task_id: i64, status: TaskStatus) -> StoreResult<()> {
        let request = self
            .client
            .patch(self.url(&format!("/tasks/{task_id}/status")))
            .query(&[("status_value", status.as_str())]);
        self.send_raw(request, Some(("task", task_id))).await?;
        Ok(())
    }

    async fn assign_workers(&self, task_id: i64, worker_ids: Vec<i64>) -> StoreResult<Task> {
        let request = self
            .client
            .put(self.url(&format!("/tasks/{task_id}/workers")))
            .json(&AssignBody {
                worker_ids: &worker_ids,
            });
        self.send(request, Some(("task", task_id))).await
    }

    async fn list_logs(&self, task_id: i64) -> StoreResult<Vec<TaskLog>> {
        let request = self.client.get(self.url(&format!("/tasks/{task_id}/logs")));
        self.send(request, Some(("task", task_id))).await
    }

    async fn add_log(&self, task_id: i64, content: String) -> StoreResult<TaskLog> {
        let request = self
            .client
            .post(self.url(&format!("/tasks/{task_id}/logs")))
            .json(&LogBody { content: &content });
        self.send(request, Some(("task", task_id))).await
    }
}
