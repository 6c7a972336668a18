use chrono::{Datelike, NaiveDate};

use crate::models::task::Task;
use crate::utils::date::is_weekend;

/// Dots rendered per cell before the rest collapse into a "+N" count.
pub const MAX_DOTS: usize = 6;

/// Dot color for tasks without any worker color.
pub const UNASSIGNED_COLOR: &str = "#2b6cff";

/// Colored marker of one (task, worker) pair inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeDot {
    pub task_id: i64,
    pub worker_id: Option<i64>,
    pub color: String,
    /// Hover text: task title, plus the worker name when there is one
    pub title: String,
}

/// Render model of one of the 42 grid cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_weekend: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_drop_target: bool,
    pub dots: Vec<AssigneeDot>,
    /// Dots beyond [`MAX_DOTS`]
    pub overflow: usize,
}

/// Board state the cell flags depend on.
#[derive(Debug, Clone, Copy)]
pub struct CellContext {
    pub month: NaiveDate,
    pub today: NaiveDate,
    pub selected: NaiveDate,
    pub drop_target: Option<NaiveDate>,
}

impl DayCell {
    pub fn build(date: NaiveDate, tasks: &[Task], ctx: &CellContext) -> Self {
        let mut dots = task_dots(tasks);
        let overflow = dots.len().saturating_sub(MAX_DOTS);
        dots.truncate(MAX_DOTS);
        Self {
            date,
            in_month: date.year() == ctx.month.year() && date.month() == ctx.month.month(),
            is_weekend: is_weekend(date),
            is_today: date == ctx.today,
            is_selected: date == ctx.selected,
            is_drop_target: ctx.drop_target == Some(date),
            dots,
            overflow,
        }
    }

    /// "+N" label, if any dots were cut
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{}", self.overflow))
    }
}

fn task_dots(tasks: &[Task]) -> Vec<AssigneeDot> {
    tasks
        .iter()
        .flat_map(|task| {
            let fallback = task
                .worker_color
                .as_deref()
                .filter(|c| !c.is_empty())
                .unwrap_or(UNASSIGNED_COLOR);
            if task.workers.is_empty() {
                return vec![AssigneeDot {
                    task_id: task.id,
                    worker_id: None,
                    color: fallback.to_string(),
                    title: task.title.clone(),
                }];
            }
            task.workers
                .iter()
                .map(|worker| AssigneeDot {
                    task_id: task.id,
                    worker_id: Some(worker.id),
                    color: if worker.color.is_empty() {
                        fallback.to_string()
                    } else {
                        worker.color.clone()
                    },
                    title: format!("{} ({})", task.title, worker.name),
                })
                .collect()
        })
        .collect()
}
