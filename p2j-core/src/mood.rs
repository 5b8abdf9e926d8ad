//! Daily mood entries: at most one per calendar date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values offered by the mood picker. The store accepts any string.
pub const KNOWN_MOODS: [&str; 5] = ["happy", "neutral", "tired", "anxious", "motivated"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMood {
    pub id: String,
    pub mood: String,
    pub date: NaiveDate,
}
