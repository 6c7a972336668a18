// Test fixtures - reusable test data
// Provides a consistent team, tasks and board across the integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use task_planner::models::principal::Principal;
use task_planner::models::project::Project;
use task_planner::models::task::{Task, TaskPriority, TaskStatus};
use task_planner::models::worker::Worker;
use task_planner::planner::Planner;
use task_planner::services::store::InMemoryTaskStore;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Thursday 2024-03-14, so the board opens on March 2024
pub fn today() -> NaiveDate {
    ymd(2024, 3, 14)
}

/// Ana and Bea are plannable, Luis is hidden from the planner.
pub fn team() -> Vec<Worker> {
    vec![
        Worker::new(3, "Ana").with_color("#e74c3c"),
        Worker::new(4, "Bea").with_color("#27ae60"),
        Worker::new(9, "Luis").with_color("#8e44ad").with_visibility(false),
    ]
}

pub fn projects() -> Vec<Project> {
    vec![Project {
        id: 1,
        name: "Obra Norte".to_string(),
        contact: Some("Marta".to_string()),
        address: None,
    }]
}

pub fn task(id: i64, date: NaiveDate) -> Task {
    Task {
        id,
        task_date: date,
        title: format!("Tarea {id}"),
        project: "Obra Norte".to_string(),
        start_time: "08:00".to_string(),
        end_time: Some("12:00".to_string()),
        prereq_ppe: "casco".to_string(),
        prereq_client_response: false,
        prereq_coord_st: true,
        prereq_notes: String::new(),
        worker_id: None,
        worker_name: None,
        worker_color: None,
        workers: Vec::new(),
        status: TaskStatus::Pendiente,
        priority: TaskPriority::Media,
        deleted_at: None,
        updated_at: None,
    }
}

/// Task assigned to the given team members through the worker set.
pub fn assigned_task(id: i64, date: NaiveDate, worker_ids: &[i64]) -> Task {
    let mut t = task(id, date);
    t.workers = team()
        .into_iter()
        .filter(|w| worker_ids.contains(&w.id))
        .collect();
    t
}

pub fn store_for(principal: Principal, tasks: Vec<Task>) -> InMemoryTaskStore {
    let store = InMemoryTaskStore::new(principal)
        .with_workers(team())
        .with_projects(projects());
    for t in tasks {
        store.seed_task(t);
    }
    store
}

/// Connected admin board with an empty call journal.
pub async fn admin_board(tasks: Vec<Task>) -> Planner<InMemoryTaskStore> {
    let store = store_for(Principal::admin(1, "admin@example.com"), tasks);
    let planner = Planner::connect(store, today()).await.unwrap();
    planner.store().clear_calls();
    planner
}

pub async fn worker_board(tasks: Vec<Task>) -> Planner<InMemoryTaskStore> {
    let store = store_for(Principal::worker(2, "ana@example.com", Some(3)), tasks);
    let planner = Planner::connect(store, today()).await.unwrap();
    planner.store().clear_calls();
    planner
}
