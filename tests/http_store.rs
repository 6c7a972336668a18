// Request shapes of the HTTP task store against a mock REST API
use serde_json::json;
use std::time::Duration;
use task_planner::models::principal::Role;
use task_planner::models::task::TaskStatus;
use task_planner::services::store::{HttpTaskStore, StoreError, TaskStore};
use task_planner::utils::date::DateWindow;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn task_json(id: i64, date: &str) -> serde_json::Value {
    json!({
        "id": id,
        "task_date": date,
        "title": format!("Tarea {id}"),
        "project": "Obra Norte",
        "start_time": "08:00",
        "end_time": null,
        "prereq_ppe": "casco,zapatos",
        "prereq_client_response": 1,
        "prereq_coord_st": 0,
        "prereq_notes": "",
        "worker_id": 3,
        "worker_name": "Ana",
        "worker_color": "#e74c3c",
        "workers": [{"id": 3, "name": "Ana", "status": "Activo", "color": "#e74c3c", "visible_in_planner": true}],
        "status": "En progreso",
        "priority": "Alta",
        "deleted_at": null,
        "updated_at": "2024-03-01T09:30:00"
    })
}

fn store(server: &MockServer) -> HttpTaskStore {
    HttpTaskStore::new(server.uri(), Some("secret".to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_current_user_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "email": "admin@example.com", "role": "admin", "worker_id": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let principal = store(&server).current_user().await.unwrap();
    assert_eq!(principal.role, Role::Admin);
}

#[tokio::test]
async fn test_fetch_tasks_queries_window_bounds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("start_date", "2024-02-26"))
        .and(query_param("end_date", "2024-04-07"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json(7, "2024-03-01")])))
        .expect(1)
        .mount(&server)
        .await;

    let window = DateWindow::for_month(chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let tasks = store(&server).fetch_tasks(window).await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].prereq_client_response);
    assert!(!tasks[0].prereq_coord_st);
    assert_eq!(tasks[0].status, TaskStatus::EnProgreso);
    assert_eq!(tasks[0].effective_assignees(), vec![3]);
}

#[tokio::test]
async fn test_assign_workers_sends_full_set() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/7/workers"))
        .and(body_json(json!({"worker_ids": [3, 4]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(7, "2024-03-01")))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).assign_workers(7, vec![3, 4]).await.unwrap();
}

#[tokio::test]
async fn test_status_and_delete_use_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/tasks/7/status"))
        .and(query_param("status_value", "Finalizada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/7"))
        .and(query_param("reason", "duplicada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    store.update_status(7, TaskStatus::Finalizada).await.unwrap();
    store.delete_task(7, "duplicada".to_string()).await.unwrap();
}

#[tokio::test]
async fn test_add_log_posts_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks/7/logs"))
        .and(body_json(json!({"content": "Tarea movida de 2024-03-01 a 2024-03-08. Motivo: lluvia"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "task_id": 7,
            "created_at": "2024-03-01T10:00:00",
            "content": "Tarea movida de 2024-03-01 a 2024-03-08. Motivo: lluvia",
            "user_id": 1,
            "user_email": "admin@example.com",
            "user_role": "admin"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entry = store(&server)
        .add_log(7, "Tarea movida de 2024-03-01 a 2024-03-08. Motivo: lluvia".to_string())
        .await
        .unwrap();
    assert_eq!(entry.author(), "admin@example.com");
}

#[tokio::test]
async fn test_error_statuses_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "No encontrado"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/history"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Solo admin"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let store = store(&server);
    let payload = serde_json::from_value(json!({
        "task_date": "2024-03-08", "title": "x", "project": "", "start_time": "",
        "end_time": null, "prereq_ppe": "", "prereq_client_response": 0,
        "prereq_coord_st": 0, "prereq_notes": "", "worker_id": null,
        "status": "Pendiente", "priority": "Media"
    }))
    .unwrap();

    assert!(matches!(
        store.update_task(42, payload).await,
        Err(StoreError::NotFound { resource: "task", id: 42 })
    ));
    assert!(matches!(
        store.task_history().await,
        Err(StoreError::Rejected { status: 403, .. })
    ));
    assert!(matches!(store.list_workers().await, Err(StoreError::Decode(_))));
}
