//! Focus timer: alternating 25-minute focus and 5-minute break countdowns.
//!
//! Driven by explicit one-second `tick`s so the caller owns the clock.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Focus,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusConfig {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Running { remaining_secs: u32 },
    /// The given phase just ran out; the timer has stopped on the next phase.
    PhaseFinished(Phase),
}

#[derive(Debug, Clone)]
pub struct FocusTimer {
    config: FocusConfig,
    phase: Phase,
    remaining_secs: u32,
    running: bool,
}

impl FocusTimer {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            phase: Phase::Focus,
            remaining_secs: config.focus_minutes * 60,
            running: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// `MM:SS` of the remaining time.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Back to a stopped, full-length focus phase.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Focus;
        self.remaining_secs = self.config.focus_minutes * 60;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs > 0 {
                return TickOutcome::Running {
                    remaining_secs: self.remaining_secs,
                };
            }
        }

        let finished = self.phase;
        self.running = false;
        let (next, minutes) = match finished {
            Phase::Focus => (Phase::Break, self.config.break_minutes),
            Phase::Break => (Phase::Focus, self.config.focus_minutes),
        };
        self.phase = next;
        self.remaining_secs = minutes * 60;
        TickOutcome::PhaseFinished(finished)
    }
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_rolls_into_break() {
        let mut t = FocusTimer::default();
        assert_eq!(t.tick(), TickOutcome::Idle);
        t.start();
        for _ in 0..(25 * 60 - 1) {
            assert!(matches!(t.tick(), TickOutcome::Running { .. }));
        }
        assert_eq!(t.tick(), TickOutcome::PhaseFinished(Phase::Focus));
        assert_eq!(t.phase(), Phase::Break);
        assert!(!t.is_running());
        assert_eq!(t.display(), "05:00");
    }

    #[test]
    fn pause_and_reset() {
        let mut t = FocusTimer::new(FocusConfig {
            focus_minutes: 1,
            break_minutes: 1,
        });
        t.start();
        t.tick();
        t.pause();
        assert_eq!(t.tick(), TickOutcome::Idle);
        assert_eq!(t.display(), "00:59");
        t.reset();
        assert_eq!(t.remaining_secs(), 60);
        assert_eq!(t.phase(), Phase::Focus);
    }
}
