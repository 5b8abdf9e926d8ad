use anyhow::{Context, Result};
use p2j_core::{FocusConfig, TimelineMetrics, ViewMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_p2j_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub timeline: TimelineSection,
    #[serde(default)]
    pub focus: FocusSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSection {
    /// Full chat-completions URL of an OpenAI-compatible endpoint.
    pub endpoint: String,
    pub model: String,
    /// Sent as `X-Title`; OpenRouter shows it on its dashboard.
    pub app_title: String,
    pub temperature: Option<f32>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "deepseek/deepseek-chat-v3.1".to_string(),
            app_title: "P2J Timeline App".to_string(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSection {
    pub view: ViewMode,
    pub day_width: f64,
    pub month_width: f64,
    pub row_height: f64,
    pub edge_threshold: f64,
}

impl Default for TimelineSection {
    fn default() -> Self {
        let m = TimelineMetrics::default();
        Self {
            view: ViewMode::Day,
            day_width: m.day_width,
            month_width: m.month_width,
            row_height: m.row_height,
            edge_threshold: m.edge_threshold,
        }
    }
}

impl TimelineSection {
    pub fn metrics(&self) -> TimelineMetrics {
        TimelineMetrics {
            day_width: self.day_width,
            month_width: self.month_width,
            row_height: self.row_height,
            edge_threshold: self.edge_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSection {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for FocusSection {
    fn default() -> Self {
        let f = FocusConfig::default();
        Self {
            focus_minutes: f.focus_minutes,
            break_minutes: f.break_minutes,
        }
    }
}

impl From<&FocusSection> for FocusConfig {
    fn from(s: &FocusSection) -> Self {
        FocusConfig {
            focus_minutes: s.focus_minutes,
            break_minutes: s.break_minutes,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_p2j_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
