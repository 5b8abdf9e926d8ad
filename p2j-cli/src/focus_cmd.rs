use anyhow::Result;
use p2j_core::{FocusConfig, FocusTimer, Phase, TickOutcome};
use std::io::{self, Write};
use std::time::Duration;
use tracing::info;

use crate::config::load_config;

/// Run focus/break phases in the terminal until `cycles` focus phases finish
/// or Ctrl-C is pressed.
pub async fn run(cycles: u32) -> Result<()> {
    let cfg = load_config()?;
    let mut timer = FocusTimer::new(FocusConfig::from(&cfg.focus));
    let mut finished_focus = 0;
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // First tick fires immediately.
    interval.tick().await;

    timer.start();
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopped.");
                return Ok(());
            }
        }

        match timer.tick() {
            TickOutcome::Running { .. } => {
                print!("\r{} {}", label(timer.phase()), timer.display());
                io::stdout().flush().ok();
            }
            TickOutcome::PhaseFinished(Phase::Focus) => {
                finished_focus += 1;
                info!(finished_focus, "focus phase done");
                println!("\n\x07Focus done. Take a break.");
                if finished_focus >= cycles {
                    return Ok(());
                }
                timer.start();
            }
            TickOutcome::PhaseFinished(Phase::Break) => {
                println!("\n\x07Break over. Back to it.");
                timer.start();
            }
            TickOutcome::Idle => {}
        }
    }
}

fn label(phase: Phase) -> &'static str {
    match phase {
        Phase::Focus => "focus",
        Phase::Break => "break",
    }
}
