use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use p2j_core::time::{local_now, local_today, parse_timezone};
use p2j_core::{FileStore, TaskStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub fn p2j_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".p2j"))
}

pub fn ensure_p2j_home() -> Result<PathBuf> {
    let dir = p2j_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub created_at_utc: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            created_at_utc: None,
            timezone: default_timezone(),
        }
    }
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

impl Profile {
    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }

    /// Today's date in the profile's timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(local_today(Utc::now(), self.tz()?))
    }

    pub fn now(&self) -> Result<chrono::NaiveDateTime> {
        Ok(local_now(Utc::now(), self.tz()?))
    }
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_p2j_home()?.join("profile.json"))
}

pub fn write_profile(profile: &Profile) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_profile() -> Result<Profile> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(Profile::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn store_dir() -> Result<PathBuf> {
    Ok(ensure_p2j_home()?.join("store"))
}

/// The task store backed by `~/.p2j/store/`.
pub fn open_store() -> Result<TaskStore<FileStore>> {
    let files = FileStore::open(store_dir()?)?;
    Ok(TaskStore::open(files))
}
