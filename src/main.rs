// Task Planner
// Command line entry point over the HTTP task store

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use task_planner::models::task::{PrerequisiteFlags, TaskStatus};
use task_planner::planner::drag::DropDecision;
use task_planner::planner::Planner;
use task_planner::services::relocation::{MoveMode, RelocationOutcome};
use task_planner::services::settings::SettingsService;
use task_planner::services::store::HttpTaskStore;
use task_planner::utils::date::date_key;

#[derive(Parser, Debug)]
#[command(name = "task-planner", version, about = "Month scheduling board for field tasks")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the task store base URL
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the 6-week grid of a month with per-day task counts
    Month {
        /// Any day of the month to show (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List the tasks of one day
    Day { date: NaiveDate },

    /// List every task, deleted ones included (admin only)
    History,

    /// Show the log entries of a task
    Logs { task_id: i64 },

    /// Change the status of a task
    Status { task_id: i64, status: TaskStatus },

    /// Move or copy a task to another day
    Relocate {
        task_id: i64,

        /// Day the task currently sits on
        #[arg(long)]
        from: NaiveDate,

        #[arg(long)]
        to: NaiveDate,

        /// Duplicate instead of moving
        #[arg(long)]
        copy: bool,

        /// Why the task is moved (required unless --copy)
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings_service = match &cli.config {
        Some(path) => SettingsService::new(path),
        None => SettingsService::default_location(),
    };
    let mut settings = settings_service.load()?;
    if let Some(url) = cli.api_url {
        settings.api_url = url;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();
    log::debug!("Settings loaded from {}", settings_service.path().display());

    let store = HttpTaskStore::from_settings(&settings)?;
    let today = Local::now().date_naive();
    let mut planner = Planner::connect(store, today)
        .await
        .with_context(|| format!("Failed to connect to {}", settings.api_url))?;

    match cli.command {
        Command::Month { date } => {
            if let Some(date) = date {
                planner.show_month(date).await?;
            }
            print_month(&planner);
        }

        Command::Day { date } => {
            planner.show_month(date).await?;
            planner.select_date(date);
            let tasks = planner.selected_tasks();
            if tasks.is_empty() {
                println!("Sin tareas para este dia");
            }
            for t in tasks {
                let prereqs = if PrerequisiteFlags::from_task(t).all_checked() {
                    "requisitos ok"
                } else {
                    "requisitos pendientes"
                };
                println!(
                    "#{} {} [{}] {} | {} | {} | {} | {}",
                    t.id,
                    t.title,
                    t.project,
                    t.time_range(),
                    t.assignee_label(),
                    t.status,
                    t.priority,
                    prereqs
                );
            }
        }

        Command::History => {
            for t in planner.history().await? {
                let state = if t.is_deleted() { "eliminada" } else { "activa" };
                println!("#{} {} {} ({}, {})", t.id, date_key(t.task_date), t.title, t.status, state);
            }
        }

        Command::Logs { task_id } => {
            planner.open_logs(task_id).await?;
            for entry in planner.dialog().logs().unwrap_or_default() {
                println!("{} {}: {}", entry.created_at, entry.author(), entry.content);
            }
        }

        Command::Status { task_id, status } => {
            planner.update_status(task_id, status).await?;
            println!("Tarea #{} -> {}", task_id, status);
        }

        Command::Relocate {
            task_id,
            from,
            to,
            copy,
            reason,
        } => {
            planner.show_month(from).await?;
            if !planner.begin_task_drag(task_id, Some(from)) {
                bail!("Task #{} cannot be relocated from {}", task_id, from);
            }
            if let DropDecision::Ignore(why) = planner.drop_on(to) {
                bail!("Nothing to do: {:?}", why);
            }
            planner.set_move_mode(if copy { MoveMode::Copy } else { MoveMode::Move })?;
            planner.set_move_reason(reason)?;
            match planner.confirm_relocation().await? {
                RelocationOutcome::Moved { task } => {
                    println!("Tarea #{} movida a {}", task.id, date_key(task.task_date));
                }
                RelocationOutcome::Copied { copy, .. } => {
                    println!("Tarea #{} copiada como #{} en {}", task_id, copy.id, date_key(copy.task_date));
                }
            }
        }
    }

    Ok(())
}

fn print_month(planner: &Planner<HttpTaskStore>) {
    println!("{}", planner.current_month().format("%B %Y"));
    println!(" Lu  Ma  Mi  Ju  Vi  Sa  Do");
    for week in planner.grid().chunks(7) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                let count = planner.index().count_on(cell.date);
                let day = if cell.in_month {
                    format!("{:>2}", cell.date.day())
                } else {
                    " .".to_string()
                };
                if count > 0 {
                    format!("{}{:<2}", day, count)
                } else {
                    format!("{}  ", day)
                }
            })
            .collect();
        println!("{}", line.join(""));
    }
}
