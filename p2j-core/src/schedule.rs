//! Prompt building and reply parsing for AI schedule generation and the
//! weekly summary.
//!
//! The model is a black box returning prose. Schedules must contain a JSON
//! array somewhere in that prose; summaries are used as-is.
//!
//! Failure policy differs on purpose: a bad schedule reply is an error the
//! caller must show, a bad summary reply becomes [`FALLBACK_SUMMARY`].

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

use crate::error::ScheduleError;
use crate::task::{DEFAULT_XP_REWARD, NewTask, Priority, TaskStatus};
use crate::user::Personality;

pub const FALLBACK_SUMMARY: &str =
    "This week went well! Keep up the momentum, next week will be even better!";

// First '[' through last ']', across newlines.
static JSON_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\[.*\]").unwrap());

impl Personality {
    pub fn system_prompt(self) -> &'static str {
        match self {
            Personality::Warm => {
                "You are a warm and considerate time planning assistant, encouraging the user like a mentor. Use a warm tone to give suggestions."
            }
            Personality::Savage => {
                "You are a sarcastic but effective time planning assistant, encouraging the user with sharp humor. Don't be too mean, keep it friendly."
            }
            Personality::Rational => {
                "You are a rational and efficient time planning assistant, focused on logic and efficiency, providing professional time management advice."
            }
        }
    }

    pub fn tone(self) -> &'static str {
        match self {
            Personality::Warm => "Warm and encouraging",
            Personality::Savage => "Sarcastic and humorous",
            Personality::Rational => "Rational and professional",
        }
    }
}

pub fn schedule_prompt(user_input: &str, personality: Personality, today: NaiveDate) -> String {
    let system = personality.system_prompt();
    let tone = personality.tone();
    format!(
        r#"{system}

Your task description: {user_input}

Please break down this task into a reasonable daily plan. Requirements:

1. Analyze the complexity of the task and break it down into 3-7 sub-tasks
2. Set the priority for each sub-task (high/medium/low)
3. Allocate it to the following days reasonably
4. Append the suggested time range for each task (e.g. "9-11 AM")
5. Use {tone} tone to give an encouraging short sentence

Return JSON format (only return JSON array, no other content):
[
  {{
    "title": "Task Title",
    "description": "Detailed description and encouraging sentence in {tone} tone",
    "priority": "high|medium|low",
    "scheduled_date": "YYYY-MM-DD",
    "scheduled_time": "Suggested time range",
    "xp_reward": 10
  }}
]

Note:
- scheduled_date starts from today
- High-priority tasks should be scheduled first
- No more than 3 tasks per day
- Today's date is {today}"#,
        today = today.format("%Y-%m-%d"),
    )
}

/// Aggregate input for the weekly summary; also the proxy's request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub completion_rate: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    #[serde(default)]
    pub personality: Personality,
}

pub fn summary_prompt(req: &SummaryRequest) -> String {
    let system = req.personality.system_prompt();
    let tone = req.personality.tone();
    format!(
        "{system}\n\nThis week's data:\n\
         - Completion rate: {:.1}%\n\
         - Total tasks: {}\n\
         - Completed: {}\n\n\
         Please generate a summary report in {tone} tone (30-50 words), evaluate this week's performance and give suggestions for next week.",
        req.completion_rate, req.total_tasks, req.completed_tasks,
    )
}

#[derive(Debug, Deserialize)]
struct ScheduledItem {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Priority,
    scheduled_date: NaiveDate,
    #[serde(default)]
    scheduled_time: Option<String>,
    #[serde(default)]
    xp_reward: Option<i64>,
}

impl From<ScheduledItem> for NewTask {
    fn from(item: ScheduledItem) -> Self {
        let xp = match item.xp_reward {
            Some(xp) if xp != 0 => xp,
            _ => DEFAULT_XP_REWARD,
        };
        NewTask {
            title: item.title,
            description: item.description,
            priority: item.priority,
            status: TaskStatus::Pending,
            scheduled_date: item.scheduled_date,
            scheduled_time: item.scheduled_time,
            start_date: None,
            deadline: None,
            subtasks: Vec::new(),
            xp_reward: xp,
            ai_generated: true,
        }
    }
}

/// Pull the task array out of a free-text model reply.
pub fn parse_schedule_reply(reply: &str) -> Result<Vec<NewTask>, ScheduleError> {
    let m = JSON_ARRAY.find(reply).ok_or(ScheduleError::NoJsonArray)?;
    let items: Vec<ScheduledItem> = serde_json::from_str(m.as_str())?;
    Ok(items.into_iter().map(NewTask::from).collect())
}

/// Collapse any summary failure, or an empty reply, into the fallback sentence.
pub fn summary_or_fallback<E: std::fmt::Display>(reply: Result<String, E>) -> String {
    match reply {
        Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
        Ok(_) => FALLBACK_SUMMARY.to_string(),
        Err(e) => {
            warn!(error = %e, "weekly summary failed; using fallback");
            FALLBACK_SUMMARY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_wrapped_in_prose() {
        let reply = r#"Sure! Here is your plan:
```json
[
  {"title": "Outline", "description": "You got this", "priority": "high",
   "scheduled_date": "2024-05-01", "scheduled_time": "9-11 AM", "xp_reward": 20},
  {"title": "Draft", "priority": "low", "scheduled_date": "2024-05-02"}
]
```
Good luck!"#;
        let tasks = parse_schedule_reply(reply).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Outline");
        assert_eq!(tasks[0].priority, Priority::High);
        assert_eq!(tasks[0].xp_reward, 20);
        assert_eq!(tasks[0].scheduled_time.as_deref(), Some("9-11 AM"));
        assert_eq!(tasks[1].xp_reward, DEFAULT_XP_REWARD);
        assert!(tasks.iter().all(|t| t.ai_generated && t.status == TaskStatus::Pending));
    }

    #[test]
    fn zero_xp_defaults_to_ten() {
        let tasks =
            parse_schedule_reply(r#"[{"title":"a","scheduled_date":"2024-05-01","xp_reward":0}]"#)
                .unwrap();
        assert_eq!(tasks[0].xp_reward, 10);
    }

    #[test]
    fn missing_or_bad_array_is_an_error() {
        assert!(matches!(
            parse_schedule_reply("I cannot help with that."),
            Err(ScheduleError::NoJsonArray)
        ));
        assert!(matches!(
            parse_schedule_reply("[not json]"),
            Err(ScheduleError::Json(_))
        ));
    }

    #[test]
    fn prompts_carry_personality_and_date() {
        let p = schedule_prompt("learn rust", Personality::Savage, "2024-05-01".parse().unwrap());
        assert!(p.starts_with(Personality::Savage.system_prompt()));
        assert!(p.contains("Your task description: learn rust"));
        assert!(p.contains("Today's date is 2024-05-01"));
        assert!(p.contains("Sarcastic and humorous tone"));

        let s = summary_prompt(&SummaryRequest {
            completion_rate: 66.666,
            total_tasks: 3,
            completed_tasks: 2,
            personality: Personality::Rational,
        });
        assert!(s.contains("Completion rate: 66.7%"));
        assert!(s.contains("Completed: 2"));
    }

    #[test]
    fn summary_failures_fall_back() {
        assert_eq!(summary_or_fallback::<String>(Err("boom".into())), FALLBACK_SUMMARY);
        assert_eq!(summary_or_fallback::<String>(Ok("   ".into())), FALLBACK_SUMMARY);
        assert_eq!(summary_or_fallback::<String>(Ok(" Nice week. ".into())), "Nice week.");
    }

    #[test]
    fn summary_request_wire_shape() {
        let req: SummaryRequest = serde_json::from_str(
            r#"{"completionRate":50.0,"totalTasks":4,"completedTasks":2}"#,
        )
        .unwrap();
        assert_eq!(req.personality, Personality::Warm);
        assert_eq!(req.total_tasks, 4);
    }
}
