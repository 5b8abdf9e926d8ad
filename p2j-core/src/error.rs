//! Error types for the planner core.
//!
//! The store itself never fails a caller; these cover the two places where a
//! caller must react: an invalid task patch and an unusable model reply.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("deadline {deadline} precedes start date {start}")]
    DeadlineBeforeStart { start: NaiveDate, deadline: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("model reply contains no JSON array")]
    NoJsonArray,

    #[error("model reply is not a valid task array: {0}")]
    Json(#[from] serde_json::Error),
}
