//! Task model for the planner: tasks, per-day subtasks, drafts and patches.
//!
//! Field names on the wire match the snapshots the web client wrote to local
//! storage (`startDate`, `deadline`, snake_case elsewhere), so existing
//! snapshots load unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PatchError;

pub const DEFAULT_XP_REWARD: i64 = 10;

fn default_xp_reward() -> i64 {
    DEFAULT_XP_REWARD
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Inclusive calendar span of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub scheduled_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<SubTask>,
    #[serde(default = "default_xp_reward")]
    pub xp_reward: i64,
    #[serde(default)]
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Distinct start date and deadline: drawn as a multi-day bar.
    pub fn is_ranged(&self) -> bool {
        matches!((self.start_date, self.deadline), (Some(s), Some(d)) if s != d)
    }

    /// Effective span: `startDate`/`deadline` when present, else the scheduled day.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start_date.unwrap_or(self.scheduled_date),
            end: self.deadline.unwrap_or(self.scheduled_date),
        }
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// Flip one subtask and roll the result up into the task status.
    ///
    /// A fully completed subtask list forces `Completed`; un-checking a
    /// subtask afterwards leaves the status alone. Returns false when the
    /// subtask id is unknown.
    pub fn toggle_subtask(&mut self, subtask_id: &str) -> bool {
        let Some(sub) = self.subtasks.iter_mut().find(|s| s.id == subtask_id) else {
            return false;
        };
        sub.completed = !sub.completed;

        let total = self.subtasks.len();
        if total > 0 && self.completed_subtasks() == total {
            self.status = TaskStatus::Completed;
        }
        true
    }

    /// Apply a patch, rejecting it if the merged task would end before it starts.
    pub fn apply(&mut self, patch: TaskPatch) -> Result<(), PatchError> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title;
        }
        if let Some(description) = patch.description {
            next.description = description;
        }
        if let Some(priority) = patch.priority {
            next.priority = priority;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(day) = patch.scheduled_date {
            next.scheduled_date = day;
        }
        if let Some(time) = patch.scheduled_time {
            next.scheduled_time = time;
        }
        if let Some(start) = patch.start_date {
            next.start_date = start;
        }
        if let Some(deadline) = patch.deadline {
            next.deadline = deadline;
        }
        if let Some(subtasks) = patch.subtasks {
            next.subtasks = subtasks;
        }
        if let Some(xp) = patch.xp_reward {
            next.xp_reward = xp;
        }

        if let (Some(start), Some(deadline)) = (next.start_date, next.deadline) {
            if deadline < start {
                return Err(PatchError::DeadlineBeforeStart { start, deadline });
            }
        }

        *self = next;
        Ok(())
    }
}

/// A task as submitted by the UI or the schedule generator: everything
/// except the id and creation time, which the store assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub subtasks: Vec<SubTask>,
    pub xp_reward: i64,
    pub ai_generated: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>, scheduled_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            scheduled_date,
            scheduled_time: None,
            start_date: None,
            deadline: None,
            subtasks: Vec::new(),
            xp_reward: DEFAULT_XP_REWARD,
            ai_generated: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.scheduled_time = Some(time.into());
        self
    }

    pub fn with_range(mut self, start: NaiveDate, deadline: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.deadline = Some(deadline);
        self
    }

    pub fn with_xp_reward(mut self, xp: i64) -> Self {
        self.xp_reward = xp;
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<SubTask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    pub fn ai_generated(mut self) -> Self {
        self.ai_generated = true;
        self
    }

    /// Fill `subtasks` with one "Day N" entry per day of the range.
    ///
    /// Only ranged drafts (distinct start and deadline) get subtasks.
    pub fn with_daily_subtasks(mut self) -> Self {
        if let (Some(start), Some(deadline)) = (self.start_date, self.deadline) {
            if start != deadline {
                self.subtasks = daily_subtasks(start, deadline, &self.title);
            }
        }
        self
    }

    pub(crate) fn into_task(self, id: String, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            start_date: self.start_date,
            deadline: self.deadline,
            subtasks: self.subtasks,
            xp_reward: self.xp_reward,
            ai_generated: self.ai_generated,
            created_at,
        }
    }
}

/// One unchecked subtask per calendar day in `start..=end`.
pub fn daily_subtasks(start: NaiveDate, end: NaiveDate, title: &str) -> Vec<SubTask> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .enumerate()
        .map(|(i, date)| SubTask {
            id: format!("subtask-{}", Uuid::new_v4().simple()),
            date,
            title: format!("Day {} - {}", i + 1, title),
            completed: false,
        })
        .collect()
}

/// Typed partial update for a task.
///
/// Outer `None` leaves a field alone; for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<Option<String>>,
    pub start_date: Option<Option<NaiveDate>>,
    pub deadline: Option<Option<NaiveDate>>,
    pub subtasks: Option<Vec<SubTask>>,
    pub xp_reward: Option<i64>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn scheduled_date(mut self, day: NaiveDate) -> Self {
        self.scheduled_date = Some(day);
        self
    }

    pub fn scheduled_time(mut self, time: Option<String>) -> Self {
        self.scheduled_time = Some(time);
        self
    }

    pub fn start_date(mut self, start: Option<NaiveDate>) -> Self {
        self.start_date = Some(start);
        self
    }

    pub fn deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn xp_reward(mut self, xp: i64) -> Self {
        self.xp_reward = Some(xp);
        self
    }

    /// Dates written back by a timeline drag.
    ///
    /// The bar's start is `scheduled_date`, and also `startDate` when the task
    /// carries one, so the bar stays where it was dropped.
    pub fn reschedule(task: &Task, range: DateRange) -> Self {
        let mut patch = Self::new()
            .scheduled_date(range.start)
            .deadline(Some(range.end));
        if task.start_date.is_some() {
            patch = patch.start_date(Some(range.start));
        }
        patch
    }
}
