use anyhow::{Result, bail};
use p2j_core::{NewTask, Personality, WeeklyStats};
use tracing::info;

use crate::config::load_config;
use crate::llm::LlmClient;
use crate::state::{open_store, read_profile};
use crate::task_cmd::print_task;

/// Ask the model to break `input` into dated tasks and append them.
pub async fn plan(input: String, personality: Option<Personality>, dry_run: bool) -> Result<()> {
    let input = input.trim().to_string();
    if input.is_empty() {
        bail!("describe what you want to plan, e.g. p2j plan \"learn Rust in two weeks\"");
    }
    let cfg = load_config()?;
    let today = read_profile()?.today()?;
    let mut store = open_store()?;
    let personality = personality.unwrap_or(store.user().ai_personality);

    let client = LlmClient::from_config(&cfg.llm)?;
    println!("Planning with a {personality:?} assistant...");
    let drafts = client.generate_schedule(&input, personality, today).await?;

    if dry_run {
        for draft in &drafts {
            print_draft(draft);
        }
        return Ok(());
    }

    for draft in drafts {
        let id = store.add_task(draft);
        if let Some(t) = store.task(&id) {
            print_task(t);
        }
    }
    info!(total = store.tasks().len(), "plan saved");
    Ok(())
}

fn print_draft(d: &NewTask) {
    println!(
        "- {} {:<7} {}{}  +{}xp",
        d.scheduled_date,
        format!("{:?}", d.priority).to_lowercase(),
        d.title,
        d.scheduled_time
            .as_deref()
            .map(|s| format!(" ({s})"))
            .unwrap_or_default(),
        d.xp_reward,
    );
}

/// Last seven days of completions, with an AI summary unless `offline`.
pub async fn report(offline: bool) -> Result<()> {
    let cfg = load_config()?;
    let today = read_profile()?.today()?;
    let store = open_store()?;
    let week = WeeklyStats::compute(store.tasks(), today);

    print!("{}", render_week(&week));

    if offline {
        return Ok(());
    }
    let req = week.summary_request(store.user().ai_personality);
    let summary = match LlmClient::from_config(&cfg.llm) {
        Ok(client) => client.generate_summary(&req).await,
        Err(e) => p2j_core::summary_or_fallback::<anyhow::Error>(Err(e)),
    };
    println!("\n{summary}");
    Ok(())
}

fn render_week(week: &WeeklyStats) -> String {
    let mut out = format!(
        "Week: {}/{} completed ({:.1}%)\n",
        week.completed_tasks, week.total_tasks, week.completion_rate
    );
    for day in &week.daily {
        let filled = (day.rate / 10.0).round() as usize;
        out.push_str(&format!(
            "{} {}  {:<10} {}/{}\n",
            day.date,
            day.date.format("%a"),
            "#".repeat(filled),
            day.completed,
            day.total,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use p2j_core::{MemoryStore, TaskStatus, TaskStore};

    #[test]
    fn week_rendering_has_one_line_per_day() {
        let today: NaiveDate = "2024-01-10".parse().unwrap();
        let mut store = TaskStore::new(MemoryStore::new());
        store.add_task(NewTask::new("a", today).with_status(TaskStatus::Completed));
        store.add_task(NewTask::new("b", today));

        let text = render_week(&WeeklyStats::compute(store.tasks(), today));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "Week: 1/2 completed (50.0%)");
        assert!(lines[7].starts_with("2024-01-10 Wed  #####"));
        assert!(lines[7].ends_with("1/2"));
    }
}
