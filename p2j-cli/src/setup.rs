use anyhow::{Context, Result};
use p2j_core::time::parse_timezone;
use p2j_core::{Personality, UserPatch};
use std::io::{self, Write};

use crate::state::{Profile, open_store, profile_path, read_profile, write_profile};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Also used as a clap value parser.
pub fn parse_personality(s: &str) -> Result<Personality, String> {
    match s.to_ascii_lowercase().as_str() {
        "warm" => Ok(Personality::Warm),
        "savage" => Ok(Personality::Savage),
        "rational" => Ok(Personality::Rational),
        _ => Err(format!("unknown personality '{s}' (warm, savage, rational)")),
    }
}

pub fn run_setup() -> Result<()> {
    println!("P2J setup\n");
    let mut store = open_store()?;
    let current = store.user().clone();

    let name = prompt(&format!("Your name [{}]", current.username))?;
    let personality = prompt("Assistant personality: warm, savage or rational [warm]")?;
    let goal = prompt(&format!("Tasks per day goal [{}]", current.daily_goal_count))?;

    let mut profile = read_profile().unwrap_or_default();
    let tz = prompt(&format!("Timezone [{}]", profile.timezone))?;
    if !tz.is_empty() {
        parse_timezone(&tz)?;
        profile.timezone = tz;
    }

    let mut patch = UserPatch::default();
    if !name.is_empty() {
        patch.username = Some(name);
    }
    if !personality.is_empty() {
        patch.ai_personality = Some(parse_personality(&personality).map_err(anyhow::Error::msg)?);
    }
    if !goal.is_empty() {
        patch.daily_goal_count = Some(goal.parse().context("daily goal must be a number")?);
    }
    store.update_user(patch);

    write_profile(&Profile {
        created_at_utc: profile
            .created_at_utc
            .or_else(|| Some(chrono::Utc::now().to_rfc3339())),
        timezone: profile.timezone,
    })?;

    println!("\nWrote:");
    println!("- {}", profile_path()?.display());
    println!("- {}", store.storage().dir().display());

    println!("\nNext recommended steps:");
    println!("- p2j auth paste-key   (or export OPENROUTER_API_KEY)");
    println!("- p2j plan \"Prepare for the marathon in two weeks\"");
    println!("- p2j timeline show");
    Ok(())
}
