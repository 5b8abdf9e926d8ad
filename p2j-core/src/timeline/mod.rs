//! Timeline geometry: tasks as horizontal bars on a day or month axis.
//!
//! Columns are one day (day view) or one calendar month (month view). The
//! visible window starts a fixed lookback before the anchor date. A bar's
//! pixel position is its column offset from the window start times the
//! column width.

mod drag;
mod order;
mod progress;

pub use drag::{
    DateDrag, DragEffect, DragMachine, DragState, Gesture, GestureIntent, Grab, Point, RowDrag,
    Zone, hit_zone,
};
pub use order::DisplayOrder;
pub use progress::{TimeRange, parse_time_range, task_progress};

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PatchError;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::{DateRange, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Day,
    Month,
}

impl ViewMode {
    /// Columns shown before the anchor.
    pub fn lookback(self) -> i64 {
        match self {
            ViewMode::Day => 3,
            ViewMode::Month => 2,
        }
    }

    pub fn window_len(self) -> usize {
        match self {
            ViewMode::Day => 30,
            ViewMode::Month => 12,
        }
    }

    /// Columns moved by one previous/next action.
    pub fn page_step(self) -> i64 {
        match self {
            ViewMode::Day => 7,
            ViewMode::Month => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineMetrics {
    pub day_width: f64,
    pub month_width: f64,
    pub row_height: f64,
    /// Width of the resize handles at each end of a bar.
    pub edge_threshold: f64,
}

impl Default for TimelineMetrics {
    fn default() -> Self {
        Self {
            day_width: 80.0,
            month_width: 120.0,
            row_height: 60.0,
            edge_threshold: 8.0,
        }
    }
}

impl TimelineMetrics {
    pub fn column_width(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::Day => self.day_width,
            ViewMode::Month => self.month_width,
        }
    }
}

/// Whole columns from `from` to `to`. Month view ignores the day of month.
pub fn column_offset(mode: ViewMode, from: NaiveDate, to: NaiveDate) -> i64 {
    match mode {
        ViewMode::Day => (to - from).num_days(),
        ViewMode::Month => {
            (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
        }
    }
}

/// Move a date by whole columns. Month steps clamp to the end of shorter months.
pub fn shift_columns(mode: ViewMode, day: NaiveDate, columns: i64) -> NaiveDate {
    let shifted = match mode {
        ViewMode::Day => Duration::try_days(columns).and_then(|d| day.checked_add_signed(d)),
        ViewMode::Month => {
            let months = Months::new(columns.unsigned_abs().min(u32::MAX as u64) as u32);
            if columns >= 0 {
                day.checked_add_months(months)
            } else {
                day.checked_sub_months(months)
            }
        }
    };
    shifted.unwrap_or(day)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
    pub visible: bool,
    pub range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub mode: ViewMode,
    pub anchor: NaiveDate,
    pub metrics: TimelineMetrics,
    pub scroll_left: f64,
}

impl Viewport {
    pub fn new(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self {
            mode,
            anchor,
            metrics: TimelineMetrics::default(),
            scroll_left: 0.0,
        }
    }

    pub fn with_metrics(mut self, metrics: TimelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn column_width(&self) -> f64 {
        self.metrics.column_width(self.mode)
    }

    pub fn window_start(&self) -> NaiveDate {
        shift_columns(self.mode, self.anchor, -self.mode.lookback())
    }

    /// Date at the head of each visible column.
    pub fn columns(&self) -> Vec<NaiveDate> {
        let start = self.window_start();
        (0..self.mode.window_len() as i64)
            .map(|i| shift_columns(self.mode, start, i))
            .collect()
    }

    pub fn total_width(&self) -> f64 {
        self.mode.window_len() as f64 * self.column_width()
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn previous(&mut self) {
        self.anchor = shift_columns(self.mode, self.anchor, -self.mode.page_step());
    }

    pub fn next(&mut self) {
        self.anchor = shift_columns(self.mode, self.anchor, self.mode.page_step());
    }

    /// Pixel x of "today": mid-column in day view, proportional to the day
    /// of month in month view.
    pub fn today_position(&self, today: NaiveDate) -> f64 {
        let w = self.column_width();
        let offset = column_offset(self.mode, self.window_start(), today) as f64;
        match self.mode {
            ViewMode::Day => offset * w + w / 2.0,
            ViewMode::Month => {
                let days = days_in_month(today) as f64;
                offset * w + (today.day() as f64 / days) * w
            }
        }
    }

    /// Re-anchor on today and scroll so today sits mid-viewport.
    pub fn go_to_today(&mut self, today: NaiveDate, client_width: f64) {
        self.anchor = today;
        self.scroll_left = (self.today_position(today) - client_width / 2.0).max(0.0);
    }

    pub fn bar(&self, task: &Task) -> BarGeometry {
        let range = task.date_range();
        let w = self.column_width();
        let origin = self.window_start();
        let start = column_offset(self.mode, origin, range.start);
        let end = column_offset(self.mode, origin, range.end);

        let left = start as f64 * w;
        let width = (end - start + 1).max(1) as f64 * w;
        let visible = left >= -2.0 * w && left <= self.total_width();
        BarGeometry {
            left,
            width,
            visible,
            range,
        }
    }
}

fn days_in_month(day: NaiveDate) -> u32 {
    let first = day.with_day(1).unwrap_or(day);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    (next - first).num_days().max(1) as u32
}

/// One rendered bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBar {
    pub task_id: String,
    pub title: String,
    pub row: usize,
    pub left: f64,
    pub width: f64,
    pub progress: f64,
}

/// Viewport plus the view-only row order and the active drag.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub viewport: Viewport,
    order: DisplayOrder,
    drag: DragMachine,
}

impl Timeline {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            order: DisplayOrder::new(),
            drag: DragMachine::new(),
        }
    }

    pub fn order(&self) -> &DisplayOrder {
        &self.order
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn sync(&mut self, tasks: &[Task]) {
        self.order.sync(tasks);
    }

    /// Visible bars in display order. Rows count hidden tasks too, so a bar
    /// keeps its row while the window pages.
    pub fn bars(&self, tasks: &[Task], now: NaiveDateTime) -> Vec<TimelineBar> {
        self.order
            .ordered(tasks)
            .into_iter()
            .enumerate()
            .filter_map(|(row, task)| {
                let geo = self.viewport.bar(task);
                geo.visible.then(|| TimelineBar {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    row,
                    left: geo.left,
                    width: geo.width,
                    progress: task_progress(task, now),
                })
            })
            .collect()
    }

    /// Start dragging `task`, grabbed `offset_x` pixels from its left edge.
    ///
    /// Returns `None` if the task is not in the display order.
    pub fn begin_drag(
        &mut self,
        task: &Task,
        offset_x: f64,
        pointer: Point,
        intent: GestureIntent,
    ) -> Option<Gesture> {
        let row = self.order.position(&task.id)?;
        let geo = self.viewport.bar(task);
        let grab = Grab {
            task_id: task.id.clone(),
            range: geo.range,
            row,
            offset_x,
            bar_width: geo.width,
            intent,
        };
        let gesture = self
            .drag
            .pointer_down(grab, pointer, self.viewport.metrics.edge_threshold);
        debug!(task_id = %task.id, ?gesture, "drag started");
        Some(gesture)
    }

    /// Start a specific gesture on `task` without hit testing the bar.
    ///
    /// Returns `false` if the task is not in the display order.
    pub fn begin_gesture(&mut self, task: &Task, gesture: Gesture, pointer: Point) -> bool {
        let Some(row) = self.order.position(&task.id) else {
            return false;
        };
        let geo = self.viewport.bar(task);
        let grab = Grab {
            task_id: task.id.clone(),
            range: geo.range,
            row,
            offset_x: 0.0,
            bar_width: geo.width,
            intent: GestureIntent::Translate,
        };
        self.drag.begin(grab, pointer, gesture);
        debug!(task_id = %task.id, ?gesture, "drag started");
        true
    }

    pub fn drag_to(&mut self, pointer: Point) -> DragEffect {
        self.drag.pointer_move(
            pointer,
            self.viewport.mode,
            &self.viewport.metrics,
            &mut self.order,
        )
    }

    pub fn end_drag(&mut self) -> Option<Gesture> {
        self.drag.pointer_up()
    }
}

/// Write a drag effect's new dates back to the store.
///
/// Reorders and feedback are view state and leave the store untouched.
pub fn commit_effect<S: KeyValueStore>(
    store: &mut TaskStore<S>,
    effect: &DragEffect,
) -> Result<bool, PatchError> {
    match effect {
        DragEffect::Reschedule { task_id, range } => store.reschedule(task_id, *range),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::NewTask;
    use chrono::Utc;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ranged(start: &str, end: &str) -> Task {
        NewTask::new("r", d(start))
            .with_range(d(start), d(end))
            .into_task("task-r".into(), Utc::now())
    }

    #[test]
    fn day_bar_position() {
        // Window starts three days before the anchor: 2024-01-01.
        let vp = Viewport::new(ViewMode::Day, d("2024-01-04"));
        assert_eq!(vp.window_start(), d("2024-01-01"));

        let geo = vp.bar(&ranged("2024-01-05", "2024-01-07"));
        assert_eq!(geo.left, 4.0 * 80.0);
        assert_eq!(geo.width, 3.0 * 80.0);
        assert!(geo.visible);
    }

    #[test]
    fn visibility_bounds() {
        let vp = Viewport::new(ViewMode::Day, d("2024-01-04"));
        assert!(vp.bar(&ranged("2023-12-30", "2023-12-30")).visible);
        assert!(!vp.bar(&ranged("2023-12-29", "2024-01-03")).visible);
        assert!(vp.bar(&ranged("2024-01-31", "2024-01-31")).visible);
        assert!(!vp.bar(&ranged("2024-02-01", "2024-02-01")).visible);
    }

    #[test]
    fn inverted_range_still_one_column_wide() {
        let vp = Viewport::new(ViewMode::Day, d("2024-01-04"));
        let mut t = ranged("2024-01-05", "2024-01-07");
        t.deadline = Some(d("2024-01-02"));
        assert_eq!(vp.bar(&t).width, 80.0);
    }

    #[test]
    fn month_bar_uses_calendar_months() {
        let vp = Viewport::new(ViewMode::Month, d("2024-03-15"));
        assert_eq!(vp.window_start(), d("2024-01-15"));

        let geo = vp.bar(&ranged("2024-02-28", "2024-04-01"));
        assert_eq!(geo.left, 120.0);
        assert_eq!(geo.width, 3.0 * 120.0);
        assert_eq!(vp.columns().len(), 12);
        assert_eq!(vp.columns()[11], d("2024-12-15"));
    }

    #[test]
    fn paging_and_today() {
        let mut vp = Viewport::new(ViewMode::Day, d("2024-01-10"));
        vp.next();
        assert_eq!(vp.anchor, d("2024-01-17"));
        vp.previous();
        vp.previous();
        assert_eq!(vp.anchor, d("2024-01-03"));

        vp.go_to_today(d("2024-01-20"), 400.0);
        assert_eq!(vp.anchor, d("2024-01-20"));
        // Today is column 3 of the new window: 3*80 + 40 = 280.
        assert_eq!(vp.today_position(d("2024-01-20")), 280.0);
        assert_eq!(vp.scroll_left, 80.0);

        let mut mv = Viewport::new(ViewMode::Month, d("2024-01-10"));
        mv.next();
        assert_eq!(mv.anchor, d("2024-04-10"));
        // 2024-04-15: window starts 2024-02-10, offset 2 months, 15/30 of a column.
        assert_eq!(mv.today_position(d("2024-04-15")), 2.0 * 120.0 + 60.0);
    }

    #[test]
    fn huge_shift_leaves_date_unchanged() {
        let day = d("2024-03-10");
        assert_eq!(shift_columns(ViewMode::Day, day, 200_000_000_000_000), day);
        assert_eq!(shift_columns(ViewMode::Day, day, i64::MIN), day);
        assert_eq!(shift_columns(ViewMode::Month, day, i64::MAX), day);
        assert_eq!(shift_columns(ViewMode::Day, day, -10), d("2024-02-29"));
    }

    #[test]
    fn bars_follow_display_order() {
        let now = d("2024-01-06").and_hms_opt(12, 0, 0).unwrap();
        let mut a = ranged("2024-01-05", "2024-01-07");
        a.id = "a".into();
        let mut b = ranged("2024-03-05", "2024-03-07");
        b.id = "b".into();
        let mut c = ranged("2024-01-02", "2024-01-02");
        c.id = "c".into();
        let tasks = vec![a, b, c];

        let mut tl = Timeline::new(Viewport::new(ViewMode::Day, d("2024-01-04")));
        tl.sync(&tasks);
        let bars = tl.bars(&tasks, now);
        let rows: Vec<_> = bars.iter().map(|b| (b.task_id.as_str(), b.row)).collect();
        assert_eq!(rows, [("a", 0), ("c", 2)]);
        assert_eq!(bars[1].progress, 100.0);
    }
}
