// Benchmark for month grid and task index building
// Measures the per-reload work of the board for growing task windows

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use task_planner::models::task::{Task, TaskPriority, TaskStatus};
use task_planner::services::index::TaskIndex;
use task_planner::utils::date::month_grid;

fn window_tasks(count: usize) -> Vec<Task> {
    let start = NaiveDate::from_ymd_opt(2024, 2, 26).unwrap();
    (0..count)
        .map(|i| Task {
            id: i as i64,
            task_date: start + Days::new((i % 42) as u64),
            title: format!("Tarea {i}"),
            project: String::new(),
            start_time: "08:00".to_string(),
            end_time: None,
            prereq_ppe: String::new(),
            prereq_client_response: false,
            prereq_coord_st: false,
            prereq_notes: String::new(),
            worker_id: None,
            worker_name: None,
            worker_color: None,
            workers: Vec::new(),
            status: TaskStatus::Pendiente,
            priority: TaskPriority::Media,
            deleted_at: None,
            updated_at: None,
        })
        .collect()
}

fn benchmark_month_grid(c: &mut Criterion) {
    let reference = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    c.bench_function("month_grid", |b| b.iter(|| month_grid(black_box(reference))));
}

fn benchmark_task_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("task_index");
    for count in [50usize, 500, 5000] {
        let tasks = window_tasks(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &tasks, |b, tasks| {
            b.iter(|| TaskIndex::build(black_box(tasks)))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_month_grid, benchmark_task_index);
criterion_main!(benches);
