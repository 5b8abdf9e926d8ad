//! Visual progress of a task bar, 0–100.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;

use crate::task::Task;
use crate::time::hours_of_day;

// Up to two `H[:MM]` tokens separated by spaces or dashes: "9-11", "9:30 - 11 AM".
static TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):?(\d+)?[\s-]*(?:(\d+):?(\d+)?)?").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_hour: u32,
    pub start_min: u32,
    pub end_hour: u32,
    pub end_min: u32,
}

impl TimeRange {
    pub fn start_hours(&self) -> f64 {
        self.start_hour as f64 + self.start_min as f64 / 60.0
    }

    pub fn end_hours(&self) -> f64 {
        self.end_hour as f64 + self.end_min as f64 / 60.0
    }
}

/// Best-effort parse of a free-text time window.
///
/// A missing end, or an end hour not after the start hour, becomes a one
/// hour window from the start. Out-of-clock values (hour 24+ for the start,
/// 25+ for the end, minute 60+) are rejected. No AM/PM or overnight handling.
pub fn parse_time_range(s: &str) -> Option<TimeRange> {
    let caps = TIME_RANGE.captures(s)?;
    let num = |i: usize| -> Option<Option<u32>> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok().map(Some),
            None => Some(None),
        }
    };

    let start_hour = num(1)??;
    let start_min = num(2)?.unwrap_or(0);
    let end_hour = num(3)?;
    let end_min = num(4)?.unwrap_or(0);
    if start_hour > 23 || start_min > 59 || end_hour.is_some_and(|h| h > 24) || end_min > 59 {
        return None;
    }

    Some(match end_hour {
        Some(end_hour) if end_hour > start_hour => TimeRange {
            start_hour,
            start_min,
            end_hour,
            end_min,
        },
        _ => TimeRange {
            start_hour,
            start_min,
            end_hour: start_hour + 1,
            end_min: start_min,
        },
    })
}

/// Progress in priority order: completed, subtask ratio, day comparison,
/// then position of `now` inside the scheduled time window.
pub fn task_progress(task: &Task, now: NaiveDateTime) -> f64 {
    if task.is_completed() {
        return 100.0;
    }

    if !task.subtasks.is_empty() {
        return task.completed_subtasks() as f64 / task.subtasks.len() as f64 * 100.0;
    }

    let today = now.date();
    if task.scheduled_date < today {
        return 100.0;
    }
    if task.scheduled_date > today {
        return 0.0;
    }

    let Some(window) = task.scheduled_time.as_deref().and_then(parse_time_range) else {
        return 0.0;
    };

    let current = hours_of_day(now.time());
    let (start, end) = (window.start_hours(), window.end_hours());
    if current <= start {
        return 0.0;
    }
    if current >= end {
        return 100.0;
    }
    ((current - start) / (end - start) * 100.0).clamp(0.0, 100.0)
}
