//! Pointer-drag state machine for timeline bars.
//!
//! States: idle, resizing the start, resizing the end, moving, reordering.
//! A drag starts on pointer-down over a bar zone, emits one effect per
//! pointer-move, and ends on pointer-up. Only whole columns (or rows) of
//! travel take effect; the consumed distance is moved into the drag origin
//! and any leftover fraction is dropped when the pointer is released.

use crate::task::DateRange;

use super::order::DisplayOrder;
use super::{TimelineMetrics, ViewMode, shift_columns};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    LeftEdge,
    RightEdge,
    Interior,
}

/// Which part of a bar `offset_x` (pointer x minus bar left) falls in.
pub fn hit_zone(offset_x: f64, bar_width: f64, threshold: f64) -> Zone {
    if offset_x < threshold {
        Zone::LeftEdge
    } else if offset_x > bar_width - threshold {
        Zone::RightEdge
    } else {
        Zone::Interior
    }
}

/// What a press on the bar interior should do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GestureIntent {
    /// Interior drags reorder rows.
    #[default]
    Auto,
    /// Interior drags shift the whole date span.
    Translate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ResizeStart,
    ResizeEnd,
    Move,
    Reorder,
}

impl Gesture {
    pub fn for_zone(zone: Zone, intent: GestureIntent) -> Self {
        match (zone, intent) {
            (Zone::LeftEdge, _) => Gesture::ResizeStart,
            (Zone::RightEdge, _) => Gesture::ResizeEnd,
            (Zone::Interior, GestureIntent::Auto) => Gesture::Reorder,
            (Zone::Interior, GestureIntent::Translate) => Gesture::Move,
        }
    }
}

/// Everything the machine needs to know about the bar under the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Grab {
    pub task_id: String,
    pub range: DateRange,
    pub row: usize,
    pub offset_x: f64,
    pub bar_width: f64,
    pub intent: GestureIntent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateDrag {
    pub task_id: String,
    pub range: DateRange,
    origin: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowDrag {
    pub task_id: String,
    pub row: usize,
    origin: Point,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    ResizingStart(DateDrag),
    ResizingEnd(DateDrag),
    Moving(DateDrag),
    Reordering(RowDrag),
}

impl DragState {
    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            DragState::Idle => None,
            DragState::ResizingStart(_) => Some(Gesture::ResizeStart),
            DragState::ResizingEnd(_) => Some(Gesture::ResizeEnd),
            DragState::Moving(_) => Some(Gesture::Move),
            DragState::Reordering(_) => Some(Gesture::Reorder),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    None,
    /// Sub-column travel; only the visual offset changes.
    Feedback { dx: f64, dy: f64 },
    /// New dates to write back to the store.
    Reschedule { task_id: String, range: DateRange },
    /// The row order changed.
    Reorder { task_id: String, from: usize, to: usize },
}

#[derive(Debug, Clone, Default)]
pub struct DragMachine {
    state: DragState,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// Begin a drag. A press while already dragging replaces the old drag.
    pub fn pointer_down(&mut self, grab: Grab, pointer: Point, threshold: f64) -> Gesture {
        let gesture = Gesture::for_zone(hit_zone(grab.offset_x, grab.bar_width, threshold), grab.intent);
        self.begin(grab, pointer, gesture);
        gesture
    }

    /// Start `gesture` directly, skipping hit testing. `grab.offset_x` is ignored.
    pub fn begin(&mut self, grab: Grab, pointer: Point, gesture: Gesture) {
        let date_drag = || DateDrag {
            task_id: grab.task_id.clone(),
            range: grab.range,
            origin: pointer,
        };
        self.state = match gesture {
            Gesture::ResizeStart => DragState::ResizingStart(date_drag()),
            Gesture::ResizeEnd => DragState::ResizingEnd(date_drag()),
            Gesture::Move => DragState::Moving(date_drag()),
            Gesture::Reorder => DragState::Reordering(RowDrag {
                task_id: grab.task_id.clone(),
                row: grab.row,
                origin: pointer,
            }),
        };
    }

    pub fn pointer_move(
        &mut self,
        pointer: Point,
        mode: ViewMode,
        metrics: &TimelineMetrics,
        order: &mut DisplayOrder,
    ) -> DragEffect {
        let column = metrics.column_width(mode);
        match &mut self.state {
            DragState::Idle => DragEffect::None,
            DragState::ResizingStart(drag) => {
                let cols = whole_steps(pointer.x - drag.origin.x, column);
                if cols == 0 {
                    return DragEffect::None;
                }
                drag.origin.x += cols as f64 * column;
                let mut start = shift_columns(mode, drag.range.start, cols);
                if start >= drag.range.end {
                    start = shift_columns(mode, drag.range.end, -1);
                }
                commit(drag, DateRange::new(start, drag.range.end))
            }
            DragState::ResizingEnd(drag) => {
                let cols = whole_steps(pointer.x - drag.origin.x, column);
                if cols == 0 {
                    return DragEffect::None;
                }
                drag.origin.x += cols as f64 * column;
                let mut end = shift_columns(mode, drag.range.end, cols);
                if end <= drag.range.start {
                    end = shift_columns(mode, drag.range.start, 1);
                }
                commit(drag, DateRange::new(drag.range.start, end))
            }
            DragState::Moving(drag) => {
                let dx = pointer.x - drag.origin.x;
                let dy = pointer.y - drag.origin.y;
                let cols = whole_steps(dx, column);
                if cols == 0 {
                    return DragEffect::Feedback { dx, dy };
                }
                drag.origin.x += cols as f64 * column;
                let range = DateRange::new(
                    shift_columns(mode, drag.range.start, cols),
                    shift_columns(mode, drag.range.end, cols),
                );
                commit(drag, range)
            }
            DragState::Reordering(drag) => {
                let dy = pointer.y - drag.origin.y;
                let rows = whole_steps(dy, metrics.row_height);
                let target = drag.row as i64 + rows;
                if rows == 0 || target < 0 || target >= order.len() as i64 {
                    return DragEffect::Feedback { dx: 0.0, dy };
                }
                let from = drag.row;
                let to = target as usize;
                if !order.move_to(from, to) {
                    return DragEffect::Feedback { dx: 0.0, dy };
                }
                drag.row = to;
                drag.origin.y += rows as f64 * metrics.row_height;
                DragEffect::Reorder {
                    task_id: drag.task_id.clone(),
                    from,
                    to,
                }
            }
        }
    }

    /// End the drag, returning which gesture was active.
    pub fn pointer_up(&mut self) -> Option<Gesture> {
        let gesture = self.state.gesture();
        self.state = DragState::Idle;
        gesture
    }
}

fn commit(drag: &mut DateDrag, range: DateRange) -> DragEffect {
    if range == drag.range {
        return DragEffect::None;
    }
    drag.range = range;
    DragEffect::Reschedule {
        task_id: drag.task_id.clone(),
        range,
    }
}

/// Whole steps of `size` contained in `delta`, truncated toward zero.
fn whole_steps(delta: f64, size: f64) -> i64 {
    if size <= 0.0 {
        return 0;
    }
    (delta / size).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const W: f64 = 80.0;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn grab(offset_x: f64, intent: GestureIntent) -> Grab {
        Grab {
            task_id: "t".into(),
            range: DateRange::new(d("2024-01-05"), d("2024-01-07")),
            row: 0,
            offset_x,
            bar_width: 3.0 * W,
            intent,
        }
    }

    fn order() -> DisplayOrder {
        let tasks: Vec<_> = ["t", "u", "v"]
            .iter()
            .map(|id| {
                crate::task::NewTask::new(*id, d("2024-01-01"))
                    .into_task(id.to_string(), chrono::Utc::now())
            })
            .collect();
        DisplayOrder::from_tasks(&tasks)
    }

    #[test]
    fn zones() {
        assert_eq!(hit_zone(3.0, 100.0, 8.0), Zone::LeftEdge);
        assert_eq!(hit_zone(50.0, 100.0, 8.0), Zone::Interior);
        assert_eq!(hit_zone(97.0, 100.0, 8.0), Zone::RightEdge);
        assert_eq!(Gesture::for_zone(Zone::Interior, GestureIntent::Auto), Gesture::Reorder);
        assert_eq!(Gesture::for_zone(Zone::Interior, GestureIntent::Translate), Gesture::Move);
        assert_eq!(Gesture::for_zone(Zone::LeftEdge, GestureIntent::Translate), Gesture::ResizeStart);
    }

    #[test]
    fn resize_start_clamps_one_day_before_end() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        assert_eq!(fsm.pointer_down(grab(2.0, GestureIntent::Auto), Point::new(0.0, 0.0), 8.0), Gesture::ResizeStart);

        let eff = fsm.pointer_move(Point::new(2.0 * W + 5.0, 0.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-01-06"), d("2024-01-07")),
            }
        );

        // Further travel cannot cross the end.
        let eff = fsm.pointer_move(Point::new(5.0 * W, 0.0), ViewMode::Day, &m, &mut order);
        assert_eq!(eff, DragEffect::None);
        assert_eq!(fsm.pointer_up(), Some(Gesture::ResizeStart));
        assert!(!fsm.is_dragging());
    }

    #[test]
    fn resize_end_clamps_one_day_after_start() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        fsm.pointer_down(grab(3.0 * W - 2.0, GestureIntent::Auto), Point::new(500.0, 0.0), 8.0);

        let eff = fsm.pointer_move(Point::new(500.0 - 4.0 * W, 0.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-01-05"), d("2024-01-06")),
            }
        );
    }

    #[test]
    fn partial_columns_do_nothing_until_crossed() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        fsm.pointer_down(grab(2.0, GestureIntent::Auto), Point::new(0.0, 0.0), 8.0);
        assert_eq!(
            fsm.pointer_move(Point::new(W - 1.0, 0.0), ViewMode::Day, &m, &mut order),
            DragEffect::None
        );
        // Leftward resize widens the bar.
        let eff = fsm.pointer_move(Point::new(-W - 1.0, 0.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-01-04"), d("2024-01-07")),
            }
        );
    }

    #[test]
    fn move_translates_and_reports_feedback() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        assert_eq!(fsm.pointer_down(grab(100.0, GestureIntent::Translate), Point::new(0.0, 0.0), 8.0), Gesture::Move);

        assert_eq!(
            fsm.pointer_move(Point::new(30.0, 12.0), ViewMode::Day, &m, &mut order),
            DragEffect::Feedback { dx: 30.0, dy: 12.0 }
        );

        let eff = fsm.pointer_move(Point::new(2.0 * W + 10.0, 40.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-01-07"), d("2024-01-09")),
            }
        );

        // Origin advanced by two columns; the 10px remainder is feedback only.
        assert_eq!(
            fsm.pointer_move(Point::new(2.0 * W + 10.0, 40.0), ViewMode::Day, &m, &mut order),
            DragEffect::Feedback { dx: 10.0, dy: 40.0 }
        );
    }

    #[test]
    fn month_mode_moves_by_calendar_month() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        let mut g = grab(100.0, GestureIntent::Translate);
        g.range = DateRange::new(d("2024-01-31"), d("2024-02-15"));
        fsm.pointer_down(g, Point::new(0.0, 0.0), 8.0);

        let eff = fsm.pointer_move(Point::new(m.month_width + 1.0, 0.0), ViewMode::Month, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-02-29"), d("2024-03-15")),
            }
        );
    }

    #[test]
    fn reorder_splices_display_order() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        assert_eq!(fsm.pointer_down(grab(100.0, GestureIntent::Auto), Point::new(0.0, 0.0), 8.0), Gesture::Reorder);

        let eff = fsm.pointer_move(Point::new(0.0, 2.0 * m.row_height + 5.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reorder {
                task_id: "t".into(),
                from: 0,
                to: 2,
            }
        );
        assert_eq!(order.ids(), ["u", "v", "t"]);

        // Past the last row: nothing to splice.
        let eff = fsm.pointer_move(Point::new(0.0, 4.0 * m.row_height), ViewMode::Day, &m, &mut order);
        assert!(matches!(eff, DragEffect::Feedback { .. }));
        assert_eq!(order.ids(), ["u", "v", "t"]);
    }

    #[test]
    fn explicit_move_on_narrow_bar() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        let mut g = grab(5.0, GestureIntent::Translate);
        g.bar_width = 10.0;
        // Hit testing would call this a left-edge resize.
        assert_eq!(hit_zone(g.offset_x, g.bar_width, 8.0), Zone::LeftEdge);
        fsm.begin(g, Point::new(0.0, 0.0), Gesture::Move);

        let eff = fsm.pointer_move(Point::new(W, 0.0), ViewMode::Day, &m, &mut order);
        assert_eq!(
            eff,
            DragEffect::Reschedule {
                task_id: "t".into(),
                range: DateRange::new(d("2024-01-06"), d("2024-01-08")),
            }
        );
        assert_eq!(fsm.pointer_up(), Some(Gesture::Move));
    }

    #[test]
    fn idle_machine_ignores_moves() {
        let m = TimelineMetrics::default();
        let mut order = order();
        let mut fsm = DragMachine::new();
        assert_eq!(fsm.pointer_move(Point::new(500.0, 500.0), ViewMode::Day, &m, &mut order), DragEffect::None);
        assert_eq!(fsm.pointer_up(), None);
    }
}
