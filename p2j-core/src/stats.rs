//! Completion statistics for the dashboard and the weekly report.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::schedule::SummaryRequest;
use crate::task::Task;
use crate::user::Personality;

fn rate(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStats {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    /// Seven entries, oldest first, ending today.
    pub daily: Vec<DayStats>,
}

impl WeeklyStats {
    /// Tasks scheduled within the last seven days, today included.
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let first = today - Duration::days(6);
        let week: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.scheduled_date >= first && t.scheduled_date <= today)
            .collect();

        let daily = first
            .iter_days()
            .take(7)
            .map(|date| {
                let total = week.iter().filter(|t| t.scheduled_date == date).count();
                let completed = week
                    .iter()
                    .filter(|t| t.scheduled_date == date && t.is_completed())
                    .count();
                DayStats {
                    date,
                    total,
                    completed,
                    rate: rate(completed, total),
                }
            })
            .collect();

        let completed_tasks = week.iter().filter(|t| t.is_completed()).count();
        Self {
            total_tasks: week.len(),
            completed_tasks,
            completion_rate: rate(completed_tasks, week.len()),
            daily,
        }
    }

    pub fn summary_request(&self, personality: Personality) -> SummaryRequest {
        SummaryRequest {
            completion_rate: self.completion_rate,
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            personality,
        }
    }
}

/// Today's tasks against the user's daily goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProgress {
    pub total: usize,
    pub completed: usize,
    pub rate: f64,
    pub goal: u32,
    pub goal_reached: bool,
}

impl DailyProgress {
    pub fn compute(tasks: &[Task], today: NaiveDate, goal: u32) -> Self {
        let (total, completed) = tasks
            .iter()
            .filter(|t| t.scheduled_date == today)
            .fold((0, 0), |(n, done), t| (n + 1, done + t.is_completed() as usize));
        Self {
            total,
            completed,
            rate: rate(completed, total),
            goal,
            goal_reached: completed >= goal as usize,
        }
    }
}
