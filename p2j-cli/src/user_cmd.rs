use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use p2j_core::{DailyProgress, KNOWN_MOODS, Personality, User, UserPatch, XP_PER_LEVEL};
use tracing::warn;

use crate::setup::parse_personality;
use crate::state::{open_store, read_profile};
use crate::task_cmd::parse_date_arg;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Level, XP and today's progress toward the daily goal
    Show,

    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long, value_parser = parse_personality)]
        personality: Option<Personality>,

        /// Tasks per day goal
        #[arg(long)]
        goal: Option<u32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum XpCommand {
    /// Add (or with a negative amount, remove) XP
    Add {
        #[arg(allow_hyphen_values = true)]
        amount: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    /// Record the mood for a day (default: today)
    Set {
        mood: String,

        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Recorded moods, newest first
    List {
        #[arg(long, default_value_t = 14)]
        limit: usize,
    },
}

pub fn run_user(cmd: UserCommand) -> Result<()> {
    let mut store = open_store()?;
    match cmd {
        UserCommand::Show => {
            let today = read_profile()?.today()?;
            let user = store.user();
            println!("{}", describe_user(user));
            let progress = DailyProgress::compute(store.tasks(), today, user.daily_goal_count);
            println!(
                "Today: {}/{} done ({:.0}%), goal {}{}",
                progress.completed,
                progress.total,
                progress.rate,
                progress.goal,
                if progress.goal_reached { " reached" } else { "" },
            );
            if let Some(m) = store.mood_on(today) {
                println!("Mood: {}", m.mood);
            }
        }
        UserCommand::Set {
            name,
            personality,
            goal,
        } => {
            let patch = UserPatch {
                username: name,
                ai_personality: personality,
                daily_goal_count: goal,
                ..UserPatch::default()
            };
            if patch == UserPatch::default() {
                bail!("nothing to change");
            }
            store.update_user(patch);
            println!("{}", describe_user(store.user()));
        }
    }
    Ok(())
}

pub fn run_xp(cmd: XpCommand) -> Result<()> {
    let mut store = open_store()?;
    match cmd {
        XpCommand::Add { amount } => {
            store.add_xp(amount);
            println!("{}", describe_user(store.user()));
        }
    }
    Ok(())
}

pub fn run_mood(cmd: MoodCommand) -> Result<()> {
    let mut store = open_store()?;
    match cmd {
        MoodCommand::Set { mood, date } => {
            let date = match date {
                Some(d) => d,
                None => read_profile()?.today()?,
            };
            let mood = mood.to_lowercase();
            if !KNOWN_MOODS.contains(&mood.as_str()) {
                warn!(%mood, "unrecognised mood; storing as given");
            }
            store.set_mood(mood, date);
            println!("Mood for {date} saved.");
        }
        MoodCommand::List { limit } => {
            let mut moods: Vec<_> = store.moods().iter().collect();
            moods.sort_by(|a, b| b.date.cmp(&a.date));
            for m in moods.into_iter().take(limit) {
                println!("{}  {}", m.date, m.mood);
            }
        }
    }
    Ok(())
}

fn describe_user(user: &User) -> String {
    format!(
        "{} | {} | level {} | {} XP ({}/{} to next) | {:?}",
        user.username,
        user.tier().title(),
        user.level(),
        user.xp,
        user.xp_into_level(),
        XP_PER_LEVEL,
        user.ai_personality,
    )
}
