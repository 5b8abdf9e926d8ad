use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use p2j_core::time::parse_date;
use p2j_core::{FileStore, NewTask, Priority, Task, TaskPatch, TaskStatus, TaskStore};

use crate::state::{open_store, read_profile};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task (single day, or a range with --start/--deadline)
    Add {
        title: String,

        /// Scheduled day (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Suggested time range, e.g. "9-11 AM" or "14:00-15:30"
        #[arg(long)]
        time: Option<String>,

        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        #[arg(long, value_parser = parse_date_arg)]
        deadline: Option<NaiveDate>,

        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value_t = p2j_core::DEFAULT_XP_REWARD)]
        xp: i64,

        /// Generate one "Day N" subtask per day of a multi-day range
        #[arg(long, default_value_t = false)]
        daily: bool,
    },

    /// List tasks for a day, or all of them
    List {
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        all: bool,
    },

    /// Change fields of a task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_parser = parse_priority)]
        priority: Option<Priority>,

        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        #[arg(long, value_parser = parse_date_arg)]
        deadline: Option<NaiveDate>,

        /// Drop the start date and deadline
        #[arg(long, default_value_t = false, conflicts_with_all = ["start", "deadline"])]
        clear_range: bool,

        #[arg(long)]
        xp: Option<i64>,
    },

    /// Mark a task completed and collect its XP
    Done { id: String },

    /// Delete a task
    Rm { id: String },

    /// Toggle a subtask; the task's status follows its subtasks
    Subtask { task_id: String, subtask_id: String },
}

pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    match s.to_ascii_lowercase().as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        _ => Err(format!("unknown priority '{s}' (high, medium, low)")),
    }
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    match s.to_ascii_lowercase().replace('-', "_").as_str() {
        "pending" => Ok(TaskStatus::Pending),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" | "done" => Ok(TaskStatus::Completed),
        _ => Err(format!("unknown status '{s}' (pending, in-progress, completed)")),
    }
}

pub fn run(cmd: TaskCommand) -> Result<()> {
    let mut store = open_store()?;
    match cmd {
        TaskCommand::Add {
            title,
            date,
            time,
            start,
            deadline,
            priority,
            description,
            xp,
            daily,
        } => {
            let today = read_profile()?.today()?;
            let mut draft = build_draft(title, date, start, deadline, today, daily)?
                .with_priority(priority)
                .with_xp_reward(xp);
            if let Some(d) = description {
                draft = draft.with_description(d);
            }
            if let Some(t) = time {
                draft = draft.with_time(t);
            }
            let id = store.add_task(draft);
            println!("Added {}", short_id(&id));
        }
        TaskCommand::List { date, all } => {
            let day = match date {
                Some(d) => d,
                None => read_profile()?.today()?,
            };
            let tasks: Vec<&Task> = if all {
                store.tasks().iter().collect()
            } else {
                store
                    .tasks()
                    .iter()
                    .filter(|t| t.date_range().contains(day))
                    .collect()
            };
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for t in tasks {
                print_task(t);
            }
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            priority,
            status,
            date,
            time,
            start,
            deadline,
            clear_range,
            xp,
        } => {
            let id = resolve_id(&store, &id)?;
            let mut patch = TaskPatch::new();
            patch.title = title;
            patch.description = description.map(Some);
            patch.priority = priority;
            patch.status = status;
            patch.scheduled_date = date;
            patch.scheduled_time = time.map(|t| (!t.is_empty()).then_some(t));
            patch.start_date = start.map(Some);
            patch.deadline = deadline.map(Some);
            patch.xp_reward = xp;
            if clear_range {
                patch = patch.start_date(None).deadline(None);
            }
            if patch.is_empty() {
                bail!("nothing to change");
            }
            store.update_task(&id, patch)?;
            println!("Updated {}", short_id(&id));
        }
        TaskCommand::Done { id } => {
            let id = resolve_id(&store, &id)?;
            let before = store.user().level();
            if store.complete_task(&id) {
                let user = store.user();
                println!("Completed. XP {} (level {})", user.xp, user.level());
                if user.level() > before {
                    println!("Level up! You are now a {}.", user.tier().title());
                }
            } else {
                println!("Already completed.");
            }
        }
        TaskCommand::Rm { id } => {
            let id = resolve_id(&store, &id)?;
            store.delete_task(&id);
            println!("Deleted {}", short_id(&id));
        }
        TaskCommand::Subtask {
            task_id,
            subtask_id,
        } => {
            let id = resolve_id(&store, &task_id)?;
            let task = store.task(&id).context("task vanished")?;
            let sub = find_subtask(task, &subtask_id)
                .with_context(|| format!("no subtask '{subtask_id}' on {}", short_id(&id)))?;
            store.toggle_subtask(&id, &sub);
            if let Some(t) = store.task(&id) {
                print_task(t);
            }
        }
    }
    Ok(())
}

fn build_draft(
    title: String,
    date: Option<NaiveDate>,
    start: Option<NaiveDate>,
    deadline: Option<NaiveDate>,
    today: NaiveDate,
    daily: bool,
) -> Result<NewTask> {
    let scheduled = date.or(start).unwrap_or(today);
    let mut draft = NewTask::new(title, scheduled);
    if start.is_some() || deadline.is_some() {
        let s = start.unwrap_or(scheduled);
        let d = deadline.unwrap_or(s);
        if d < s {
            bail!("deadline {d} is before start {s}");
        }
        draft = draft.with_range(s, d);
        if daily {
            draft = draft.with_daily_subtasks();
        }
    }
    Ok(draft)
}

/// Exact id, or a unique prefix with or without the `task-` part.
pub fn resolve_id(store: &TaskStore<FileStore>, query: &str) -> Result<String> {
    find_id(store.tasks(), query)
}

fn find_id(tasks: &[Task], query: &str) -> Result<String> {
    if let Some(t) = tasks.iter().find(|t| t.id == query) {
        return Ok(t.id.clone());
    }
    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|t| {
            t.id.starts_with(query)
                || t.id
                    .strip_prefix("task-")
                    .is_some_and(|rest| rest.starts_with(query))
        })
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => bail!("no task matches '{query}'"),
        _ => bail!("'{query}' matches {} tasks; use more characters", matches.len()),
    }
}

/// 1-based position ("Day N"), full id, or a prefix of the id's hex part.
fn find_subtask(task: &Task, query: &str) -> Option<String> {
    if let Ok(n) = query.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| task.subtasks.get(i)).map(|s| s.id.clone());
    }
    task.subtasks
        .iter()
        .find(|s| {
            s.id == query
                || s.id
                    .strip_prefix("subtask-")
                    .is_some_and(|hex| hex.starts_with(query))
        })
        .map(|s| s.id.clone())
}

pub fn short_id(id: &str) -> &str {
    let rest = id.strip_prefix("task-").unwrap_or(id);
    rest.get(..8).unwrap_or(rest)
}

fn status_mark(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Pending => "[ ]",
        TaskStatus::InProgress => "[~]",
        TaskStatus::Completed => "[x]",
    }
}

pub fn print_task(t: &Task) {
    let range = t.date_range();
    let when = if range.start == range.end {
        range.start.to_string()
    } else {
        format!("{}..{}", range.start, range.end)
    };
    println!(
        "{} {}  {:<23} {:<7} {}{}  +{}xp{}",
        status_mark(t.status),
        short_id(&t.id),
        when,
        format!("{:?}", t.priority).to_lowercase(),
        t.title,
        t.scheduled_time
            .as_deref()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default(),
        t.xp_reward,
        if t.ai_generated { "  ai" } else { "" },
    );
    for (i, s) in t.subtasks.iter().enumerate() {
        println!(
            "      {:>2}. {} {} {}",
            i + 1,
            if s.completed { "[x]" } else { "[ ]" },
            s.date,
            s.title,
        );
    }
}
