use anyhow::{Context, Result, bail};
use chrono::{Datelike, NaiveDate};
use clap::{Subcommand, ValueEnum};
use p2j_core::timeline::{DragEffect, Point, column_offset};
use p2j_core::{Gesture, Timeline, TimelineBar, ViewMode, Viewport, commit_effect};
use tracing::debug;

use crate::config::load_config;
use crate::state::{open_store, read_profile};
use crate::task_cmd::{parse_date_arg, resolve_id, short_id};

// Characters per column in the text rendering.
const CELL: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Day,
    Month,
}

impl From<ModeArg> for ViewMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Day => ViewMode::Day,
            ModeArg::Month => ViewMode::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Handle {
    /// Left edge: moves the start date
    Start,
    /// Right edge: moves the deadline
    End,
    /// Whole bar: shifts both dates
    Move,
}

#[derive(Subcommand, Debug)]
pub enum TimelineCommand {
    /// Draw the task bars around a date
    Show {
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Center of the window (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        anchor: Option<NaiveDate>,

        /// Page the window back (negative) or forward by N steps
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page: i32,
    },

    /// Drag a bar edge or the whole bar by whole columns
    Drag {
        id: String,

        #[arg(long, value_enum, default_value = "move")]
        handle: Handle,

        /// Columns to drag; negative drags left
        #[arg(long, allow_hyphen_values = true)]
        by: i64,

        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
}

pub fn run(cmd: TimelineCommand) -> Result<()> {
    let cfg = load_config()?;
    let profile = read_profile()?;
    let today = profile.today()?;
    let now = profile.now()?;

    match cmd {
        TimelineCommand::Show { mode, anchor, page } => {
            let store = open_store()?;
            let mode = mode.map(ViewMode::from).unwrap_or(cfg.timeline.view);
            let mut viewport =
                Viewport::new(mode, anchor.unwrap_or(today)).with_metrics(cfg.timeline.metrics());
            for _ in 0..page.unsigned_abs() {
                if page < 0 {
                    viewport.previous();
                } else {
                    viewport.next();
                }
            }
            let mut timeline = Timeline::new(viewport);
            timeline.sync(store.tasks());
            let bars = timeline.bars(store.tasks(), now);
            print!("{}", render(&timeline.viewport, &bars, today));
        }
        TimelineCommand::Drag {
            id,
            handle,
            by,
            mode,
        } => {
            let mut store = open_store()?;
            let id = resolve_id(&store, &id)?;
            let task = store.task(&id).context("task vanished")?.clone();
            let mode = mode.map(ViewMode::from).unwrap_or(cfg.timeline.view);
            let viewport = Viewport::new(mode, task.date_range().start)
                .with_metrics(cfg.timeline.metrics());

            let mut timeline = Timeline::new(viewport);
            timeline.sync(store.tasks());
            let effect = drag_by(&mut timeline, &task, handle, by)?;
            debug!(?effect, "drag finished");

            match &effect {
                DragEffect::Reschedule { range, .. } => {
                    commit_effect(&mut store, &effect)?;
                    println!("{} now spans {} to {}", short_id(&id), range.start, range.end);
                }
                _ => println!("No change."),
            }
        }
    }
    Ok(())
}

/// Press on the chosen handle, move `by` columns in one step, release.
fn drag_by(
    timeline: &mut Timeline,
    task: &p2j_core::Task,
    handle: Handle,
    by: i64,
) -> Result<DragEffect> {
    let gesture = match handle {
        Handle::Start => Gesture::ResizeStart,
        Handle::End => Gesture::ResizeEnd,
        Handle::Move => Gesture::Move,
    };
    let row = timeline.order().position(&task.id).unwrap_or(0);
    let y = (row as f64 + 0.5) * timeline.viewport.metrics.row_height;
    let down = Point::new(timeline.viewport.bar(task).left, y);

    if !timeline.begin_gesture(task, gesture, down) {
        bail!("task is not on the timeline");
    }
    let dx = by as f64 * timeline.viewport.column_width();
    let effect = timeline.drag_to(Point::new(down.x + dx, y));
    timeline.end_drag();
    Ok(effect)
}

fn column_label(mode: ViewMode, day: NaiveDate) -> String {
    match mode {
        ViewMode::Day => format!("{:>2}", day.day()),
        ViewMode::Month => format!("{:>2}", day.month()),
    }
}

/// Text rendering: a header of column labels, then one line per visible bar.
pub fn render(viewport: &Viewport, bars: &[TimelineBar], today: NaiveDate) -> String {
    let columns = viewport.columns();
    let width = viewport.column_width();
    let today_col = column_offset(viewport.mode, viewport.window_start(), today);

    let mut out = String::new();
    let (first, last) = (columns[0], columns[columns.len() - 1]);
    out.push_str(&format!("{first} .. {last}\n"));
    for (i, day) in columns.iter().enumerate() {
        let mark = if i as i64 == today_col { '*' } else { ' ' };
        out.push(mark);
        out.push_str(&column_label(viewport.mode, *day));
    }
    out.push('\n');

    for bar in bars {
        let start = (bar.left / width).round() as i64;
        let span = ((bar.width / width).round() as i64).max(1);
        let mut line = String::new();
        for col in 0..columns.len() as i64 {
            let cell = if col >= start && col < start + span { "###" } else { " . " };
            line.push_str(cell);
        }
        debug_assert_eq!(line.len(), columns.len() * CELL);
        out.push_str(&format!(
            "{line}  {} {} ({:.0}%)\n",
            short_id(&bar.task_id),
            bar.title,
            bar.progress
        ));
    }
    out
}
