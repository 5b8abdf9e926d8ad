//! TaskStore: the single source of truth for tasks, the user profile and moods.
//!
//! Every mutation is applied in memory and then written through to the
//! injected [`KeyValueStore`] as a full snapshot. The store never reports
//! storage failures: they are logged and the in-memory state stands.
//!
//! Missing ids are silent no-ops. The boolean returns only tell the caller
//! whether anything changed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PatchError;
use crate::mood::DailyMood;
use crate::storage::{KeyValueStore, MOODS_KEY, TASKS_KEY, USER_KEY};
use crate::task::{DateRange, NewTask, Task, TaskPatch, TaskStatus};
use crate::user::{User, UserPatch};

#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    user: User,
    moods: Vec<DailyMood>,
    storage: S,

    // Every id handed out or loaded, so a fresh id can never repeat one.
    issued: HashSet<String>,
    last_created: Option<DateTime<Utc>>,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            tasks: Vec::new(),
            user: User::default(),
            moods: Vec::new(),
            storage,
            issued: HashSet::new(),
            last_created: None,
        }
    }

    /// New store restored from whatever the substrate holds.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load_from_storage();
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_on(&self, day: NaiveDate) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.scheduled_date == day)
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn moods(&self) -> &[DailyMood] {
        &self.moods
    }

    pub fn mood_on(&self, day: NaiveDate) -> Option<&DailyMood> {
        self.moods.iter().find(|m| m.date == day)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn add_task(&mut self, draft: NewTask) -> String {
        self.add_task_at(draft, Utc::now())
    }

    /// Same as [`add_task`](Self::add_task) with an explicit clock reading.
    ///
    /// `created_at` never goes backwards across sequential adds, even if the
    /// supplied clock does.
    pub fn add_task_at(&mut self, draft: NewTask, now: DateTime<Utc>) -> String {
        let created_at = match self.last_created {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.last_created = Some(created_at);

        let id = self.fresh_id("task");
        self.tasks.push(draft.into_task(id.clone(), created_at));
        debug!(task_id = %id, "task added");
        self.save_to_storage();
        id
    }

    /// Returns `Ok(false)` when no task has this id.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<bool, PatchError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.apply(patch)?;
        debug!(task_id = %id, "task updated");
        self.save_to_storage();
        Ok(true)
    }

    /// Write a new date span back onto a task, as a timeline drag does.
    pub fn reschedule(&mut self, id: &str, range: DateRange) -> Result<bool, PatchError> {
        let Some(task) = self.task(id) else {
            return Ok(false);
        };
        let patch = TaskPatch::reschedule(task, range);
        self.update_task(id, patch)
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(task_id = %id, "task deleted");
        }
        self.save_to_storage();
        removed
    }

    /// Mark completed and grant the task's XP, once.
    pub fn complete_task(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if task.is_completed() {
            return false;
        }
        task.status = TaskStatus::Completed;
        let reward = task.xp_reward;
        debug!(task_id = %id, reward, "task completed");
        self.add_xp(reward);
        true
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> bool {
        let toggled = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .is_some_and(|t| t.toggle_subtask(subtask_id));
        self.save_to_storage();
        toggled
    }

    pub fn update_user(&mut self, patch: UserPatch) {
        patch.apply(&mut self.user);
        self.save_to_storage();
    }

    /// Negative amounts are applied as given.
    pub fn add_xp(&mut self, amount: i64) {
        self.user.xp = self.user.xp.saturating_add(amount);
        debug!(xp = self.user.xp, level = self.user.level(), "xp changed");
        self.save_to_storage();
    }

    /// Upsert by date: an existing entry for `date` keeps its id and gets the new mood.
    pub fn set_mood(&mut self, mood: impl Into<String>, date: NaiveDate) {
        let mood = mood.into();
        match self.moods.iter_mut().find(|m| m.date == date) {
            Some(existing) => existing.mood = mood,
            None => {
                let id = self.fresh_id("mood");
                self.moods.push(DailyMood { id, mood, date });
            }
        }
        self.save_to_storage();
    }

    /// Replace in-memory state with each snapshot key the substrate holds.
    ///
    /// Missing keys keep the current value; unreadable ones are logged and skipped.
    pub fn load_from_storage(&mut self) {
        if let Some(tasks) = self.read_key::<Vec<Task>>(TASKS_KEY) {
            self.tasks = tasks;
        }
        if let Some(user) = self.read_key::<User>(USER_KEY) {
            self.user = user;
        }
        if let Some(moods) = self.read_key::<Vec<DailyMood>>(MOODS_KEY) {
            self.moods = moods;
        }

        self.issued.extend(self.tasks.iter().map(|t| t.id.clone()));
        self.issued.extend(self.moods.iter().map(|m| m.id.clone()));
        self.last_created = self.tasks.iter().map(|t| t.created_at).max();
        debug!(
            tasks = self.tasks.len(),
            moods = self.moods.len(),
            "store loaded"
        );
    }

    pub fn save_to_storage(&mut self) {
        let tasks = encode(TASKS_KEY, &self.tasks);
        let user = encode(USER_KEY, &self.user);
        let moods = encode(MOODS_KEY, &self.moods);

        for (key, value) in [(TASKS_KEY, tasks), (USER_KEY, user), (MOODS_KEY, moods)] {
            let Some(value) = value else { continue };
            if let Err(e) = self.storage.set(key, &value) {
                warn!(key, error = %e, "write-through failed; keeping in-memory state");
            }
        }
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable snapshot");
                None
            }
        }
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}-{}", Uuid::new_v4().simple());
            if self.issued.insert(id.clone()) {
                return id;
            }
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(key, error = %e, "snapshot serialization failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, NullStore};
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn store() -> TaskStore<MemoryStore> {
        TaskStore::new(MemoryStore::new())
    }

    #[test]
    fn add_assigns_distinct_ids_and_monotonic_timestamps() {
        let mut s = store();
        let base = Utc::now();
        let a = s.add_task_at(NewTask::new("a", d("2024-01-01")), base);
        // A clock that steps backwards must not make created_at go back.
        let b = s.add_task_at(NewTask::new("b", d("2024-01-01")), base - Duration::seconds(5));
        let c = s.add_task(NewTask::new("c", d("2024-01-01")));

        assert_eq!(s.tasks().len(), 3);
        assert!(a != b && b != c && a != c);
        let times: Vec<_> = s.tasks().iter().map(|t| t.created_at).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.tasks()[0].title, "a");
    }

    #[test]
    fn add_accepts_empty_title() {
        let mut s = store();
        let id = s.add_task(NewTask::new("", d("2024-01-01")));
        assert_eq!(s.task(&id).unwrap().title, "");
    }

    #[test]
    fn complete_grants_xp_once() {
        let mut s = store();
        let id = s.add_task(NewTask::new("a", d("2024-01-01")));
        assert!(s.complete_task(&id));
        assert_eq!(s.user().xp, 10);
        assert_eq!(s.task(&id).unwrap().status, TaskStatus::Completed);

        assert!(!s.complete_task(&id));
        assert_eq!(s.user().xp, 10);
        assert!(!s.complete_task("missing"));
    }

    #[test]
    fn add_xp_levels_up() {
        let mut s = store();
        s.add_xp(250);
        assert_eq!(s.user().xp, 250);
        assert_eq!(s.user().level(), 3);
    }

    #[test]
    fn add_xp_saturates() {
        let mut s = store();
        s.add_xp(i64::MAX);
        s.add_xp(i64::MAX);
        assert_eq!(s.user().xp, i64::MAX);
        s.add_xp(-50);
        assert_eq!(s.user().xp, i64::MAX - 50);
    }

    #[test]
    fn mood_upserts_by_date() {
        let mut s = store();
        s.set_mood("happy", d("2024-01-01"));
        let first_id = s.moods()[0].id.clone();
        s.set_mood("tired", d("2024-01-01"));
        s.set_mood("neutral", d("2024-01-02"));

        assert_eq!(s.moods().len(), 2);
        let m = s.mood_on(d("2024-01-01")).unwrap();
        assert_eq!(m.mood, "tired");
        assert_eq!(m.id, first_id);
    }

    #[test]
    fn missing_ids_are_noops() {
        let mut s = store();
        let id = s.add_task(NewTask::new("a", d("2024-01-01")));
        assert_eq!(s.update_task("nope", TaskPatch::new().title("x")), Ok(false));
        assert!(!s.delete_task("nope"));
        assert!(!s.toggle_subtask("nope", "sub"));
        assert!(!s.toggle_subtask(&id, "sub"));
        assert_eq!(s.tasks().len(), 1);
    }

    #[test]
    fn delete_is_reflected_in_next_snapshot() {
        let mut s = store();
        let a = s.add_task(NewTask::new("a", d("2024-01-01")));
        s.add_task(NewTask::new("b", d("2024-01-01")));
        assert!(s.delete_task(&a));

        let raw = s.storage().get(TASKS_KEY).unwrap().unwrap();
        let persisted: Vec<Task> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].title, "b");
    }

    #[test]
    fn write_through_round_trips() {
        let mut s = store();
        let id = s.add_task(
            NewTask::new("ranged", d("2024-01-05"))
                .with_range(d("2024-01-05"), d("2024-01-07"))
                .with_daily_subtasks(),
        );
        s.add_xp(130);
        s.set_mood("motivated", d("2024-01-05"));

        let restored = TaskStore::open(s.storage().clone());
        assert_eq!(restored.tasks(), s.tasks());
        assert_eq!(restored.user(), s.user());
        assert_eq!(restored.moods(), s.moods());
        assert_eq!(restored.task(&id).unwrap().subtasks.len(), 3);
    }

    #[test]
    fn corrupt_snapshot_is_skipped() {
        let mut mem = MemoryStore::new();
        mem.set(TASKS_KEY, "{not json").unwrap();
        mem.set(USER_KEY, r#"{"id":"u","username":"kim","xp":5,"ai_personality":"rational","daily_goal_count":2}"#)
            .unwrap();
        let s = TaskStore::open(mem);
        assert!(s.tasks().is_empty());
        assert_eq!(s.user().username, "kim");
    }

    #[test]
    fn works_without_substrate() {
        let mut s = TaskStore::open(NullStore);
        let id = s.add_task(NewTask::new("a", d("2024-01-01")));
        assert!(s.complete_task(&id));
        assert_eq!(s.user().xp, 10);
    }

    #[test]
    fn invalid_patch_leaves_task_and_storage_alone() {
        let mut s = store();
        let id = s.add_task(
            NewTask::new("ranged", d("2024-01-05")).with_range(d("2024-01-05"), d("2024-01-07")),
        );
        let before = s.storage().get(TASKS_KEY).unwrap();
        let res = s.update_task(&id, TaskPatch::new().deadline(Some(d("2024-01-01"))));
        assert!(res.is_err());
        assert_eq!(s.task(&id).unwrap().deadline, Some(d("2024-01-07")));
        assert_eq!(s.storage().get(TASKS_KEY).unwrap(), before);
    }

    #[test]
    fn reschedule_moves_start_date_with_bar() {
        let mut s = store();
        let id = s.add_task(
            NewTask::new("ranged", d("2024-01-05")).with_range(d("2024-01-05"), d("2024-01-07")),
        );
        let range = DateRange::new(d("2024-01-08"), d("2024-01-10"));
        assert_eq!(s.reschedule(&id, range), Ok(true));
        let t = s.task(&id).unwrap();
        assert_eq!(t.scheduled_date, d("2024-01-08"));
        assert_eq!(t.start_date, Some(d("2024-01-08")));
        assert_eq!(t.date_range(), range);
    }
}
