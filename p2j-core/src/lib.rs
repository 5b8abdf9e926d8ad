//! p2j-core: task store, XP engine and timeline geometry for the P2J planner

pub mod error;
pub mod focus;
pub mod mood;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;
pub mod time;
pub mod timeline;
pub mod user;

pub use error::{PatchError, ScheduleError};
pub use focus::{FocusConfig, FocusTimer, Phase, TickOutcome};
pub use mood::{DailyMood, KNOWN_MOODS};
pub use schedule::{
    FALLBACK_SUMMARY, SummaryRequest, parse_schedule_reply, schedule_prompt, summary_or_fallback,
    summary_prompt,
};
pub use stats::{DailyProgress, DayStats, WeeklyStats};
pub use storage::{FileStore, KeyValueStore, MemoryStore, NullStore};
pub use store::TaskStore;
pub use task::{
    DEFAULT_XP_REWARD, DateRange, NewTask, Priority, SubTask, Task, TaskPatch, TaskStatus,
    daily_subtasks,
};
pub use timeline::{
    DisplayOrder, DragEffect, DragState, Gesture, GestureIntent, Point, Timeline, TimelineBar,
    TimelineMetrics, ViewMode, Viewport, commit_effect,
};
pub use user::{LevelTier, Personality, User, UserPatch, XP_PER_LEVEL, level_for_xp};
