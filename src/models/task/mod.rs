// Task module
// Scheduled work task as exchanged with the task store

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::worker::Worker;

pub mod draft;
pub mod prerequisites;

pub use draft::TaskDraft;
pub use prerequisites::{PpeItems, PrerequisiteFlags};

use prerequisites::int_flag;

/// Progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskStatus {
    #[default]
    Pendiente,
    #[serde(rename = "En progreso")]
    EnProgreso,
    Bloqueada,
    Finalizada,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pendiente,
        TaskStatus::EnProgreso,
        TaskStatus::Bloqueada,
        TaskStatus::Finalizada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pendiente => "Pendiente",
            TaskStatus::EnProgreso => "En progreso",
            TaskStatus::Bloqueada => "Bloqueada",
            TaskStatus::Finalizada => "Finalizada",
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum TaskPriority {
    Baja,
    #[default]
    Media,
    Alta,
    Urgente,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Baja,
        TaskPriority::Media,
        TaskPriority::Alta,
        TaskPriority::Urgente,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Baja => "Baja",
            TaskPriority::Media => "Media",
            TaskPriority::Alta => "Alta",
            TaskPriority::Urgente => "Urgente",
        }
    }
}

macro_rules! vocab_impls {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s.trim())
                    .ok_or_else(|| format!("Unknown {} {:?}", $what, s))
            }
        }
    };
}

vocab_impls!(TaskStatus, "status");
vocab_impls!(TaskPriority, "priority");

/// Task as returned by the store, including the expanded worker list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub task_date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Comma-joined equipment labels, see [`PpeItems`].
    #[serde(default)]
    pub prereq_ppe: String,
    #[serde(default, with = "int_flag")]
    pub prereq_client_response: bool,
    #[serde(default, with = "int_flag")]
    pub prereq_coord_st: bool,
    #[serde(default)]
    pub prereq_notes: String,
    /// Legacy single assignee. `workers` wins whenever it is non-empty.
    #[serde(default)]
    pub worker_id: Option<i64>,
    #[serde(default)]
    pub worker_name: Option<String>,
    #[serde(default)]
    pub worker_color: Option<String>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Task {
    /// Assignee identifiers: the worker set when present, otherwise the
    /// legacy single worker, otherwise nobody.
    pub fn effective_assignees(&self) -> Vec<i64> {
        if !self.workers.is_empty() {
            return self.workers.iter().map(|w| w.id).collect();
        }
        self.worker_id.into_iter().collect()
    }

    /// Names shown on a task card.
    pub fn assignee_label(&self) -> String {
        if !self.workers.is_empty() {
            return self
                .workers
                .iter()
                .map(|w| w.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
        }
        self.worker_name
            .clone()
            .unwrap_or_else(|| "Sin asignar".to_string())
    }

    /// `HH:MM` or `HH:MM-HH:MM`
    pub fn time_range(&self) -> String {
        match self.end_time.as_deref().filter(|t| !t.is_empty()) {
            Some(end) => format!("{}-{}", self.start_time, end),
            None => self.start_time.clone(),
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Full replacement field set for this task, optionally on another date.
    pub fn to_payload(&self, date_override: Option<NaiveDate>) -> TaskPayload {
        TaskPayload {
            task_date: date_override.unwrap_or(self.task_date),
            title: self.title.clone(),
            project: self.project.clone(),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone().filter(|t| !t.is_empty()),
            prereq_ppe: self.prereq_ppe.clone(),
            prereq_client_response: self.prereq_client_response,
            prereq_coord_st: self.prereq_coord_st,
            prereq_notes: self.prereq_notes.clone(),
            worker_id: self.worker_id,
            status: self.status,
            priority: self.priority,
        }
    }
}

/// Body of create and update requests: every task field except the
/// store-assigned ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task_date: NaiveDate,
    pub title: String,
    pub project: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub prereq_ppe: String,
    #[serde(with = "int_flag")]
    pub prereq_client_response: bool,
    #[serde(with = "int_flag")]
    pub prereq_coord_st: bool,
    pub prereq_notes: String,
    pub worker_id: Option<i64>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn task(id: i64, date: NaiveDate) -> Task {
        Task {
            id,
            task_date: date,
            title: format!("Tarea {id}"),
            project: "Obra Norte".to_string(),
            start_time: "08:00".to_string(),
            end_time: Some("12:00".to_string()),
            prereq_ppe: "casco,zapatos".to_string(),
            prereq_client_response: true,
            prereq_coord_st: false,
            prereq_notes: "Llevar escalera".to_string(),
            worker_id: None,
            worker_name: None,
            worker_color: None,
            workers: Vec::new(),
            status: TaskStatus::Pendiente,
            priority: TaskPriority::Alta,
            deleted_at: None,
            updated_at: None,
        }
    }
}
