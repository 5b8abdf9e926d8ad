use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::state::ensure_p2j_home;

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub api_key: Option<String>,
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_p2j_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste API key (starts with sk-)")?;
    if !key.starts_with("sk-") {
        bail!("key didn't look like an API key (expected prefix sk-)");
    }
    auth.api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved API key to ~/.p2j/auth.json");
    Ok(())
}

/// The environment wins over the stored key.
pub fn resolve_api_key() -> Result<String> {
    pick_key(std::env::var(API_KEY_ENV).ok(), load_auth()?)
}

fn pick_key(env: Option<String>, stored: AuthState) -> Result<String> {
    env.filter(|k| !k.trim().is_empty())
        .or(stored.api_key)
        .ok_or_else(|| anyhow::anyhow!("no API key; set {API_KEY_ENV} or run: p2j auth paste-key"))
}
