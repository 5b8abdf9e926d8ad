//! Local user profile and the XP/level engine.

use serde::{Deserialize, Serialize};

pub const XP_PER_LEVEL: i64 = 100;

/// `floor(xp / 100) + 1`.
pub fn level_for_xp(xp: i64) -> i64 {
    xp.div_euclid(XP_PER_LEVEL) + 1
}

/// Framing used when prompting the model. Irrelevant to store logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    #[default]
    Warm,
    Savage,
    Rational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTier {
    Dreamer,
    Builder,
    Master,
}

impl LevelTier {
    pub fn for_level(level: i64) -> Self {
        match level {
            l if l >= 8 => LevelTier::Master,
            l if l >= 4 => LevelTier::Builder,
            _ => LevelTier::Dreamer,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            LevelTier::Dreamer => "Dreamer",
            LevelTier::Builder => "Builder",
            LevelTier::Master => "Master",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "UserRecord")]
pub struct User {
    pub id: String,
    pub username: String,
    pub xp: i64,
    pub ai_personality: Personality,
    pub daily_goal_count: u32,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: "default-user".to_string(),
            username: "Anonymous User".to_string(),
            xp: 0,
            ai_personality: Personality::Warm,
            daily_goal_count: 5,
        }
    }
}

impl User {
    /// Always derived from `xp`; there is no stored level to drift.
    pub fn level(&self) -> i64 {
        level_for_xp(self.xp)
    }

    pub fn tier(&self) -> LevelTier {
        LevelTier::for_level(self.level())
    }

    /// XP earned inside the current level, `0..100`.
    pub fn xp_into_level(&self) -> i64 {
        self.xp.rem_euclid(XP_PER_LEVEL)
    }
}

// Snapshot form: carries the derived level so stored profiles stay readable.
// It is ignored when loading.
#[derive(Serialize)]
struct UserRecord {
    id: String,
    username: String,
    xp: i64,
    level: i64,
    ai_personality: Personality,
    daily_goal_count: u32,
}

impl From<User> for UserRecord {
    fn from(u: User) -> Self {
        let level = u.level();
        Self {
            id: u.id,
            username: u.username,
            xp: u.xp,
            level,
            ai_personality: u.ai_personality,
            daily_goal_count: u.daily_goal_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub username: Option<String>,
    pub xp: Option<i64>,
    pub ai_personality: Option<Personality>,
    pub daily_goal_count: Option<u32>,
}

impl UserPatch {
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.username {
            user.username = name;
        }
        if let Some(xp) = self.xp {
            user.xp = xp;
        }
        if let Some(p) = self.ai_personality {
            user.ai_personality = p;
        }
        if let Some(n) = self.daily_goal_count {
            user.daily_goal_count = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_for_xp(-1), 0);
    }

    #[test]
    fn tiers() {
        assert_eq!(LevelTier::for_level(1), LevelTier::Dreamer);
        assert_eq!(LevelTier::for_level(3), LevelTier::Dreamer);
        assert_eq!(LevelTier::for_level(4), LevelTier::Builder);
        assert_eq!(LevelTier::for_level(7), LevelTier::Builder);
        assert_eq!(LevelTier::for_level(8), LevelTier::Master);
        assert_eq!(LevelTier::for_level(0), LevelTier::Dreamer);
    }

    #[test]
    fn direct_xp_edit_keeps_level_consistent() {
        let mut u = User::default();
        UserPatch {
            xp: Some(420),
            ..Default::default()
        }
        .apply(&mut u);
        assert_eq!(u.level(), 5);
        assert_eq!(u.xp_into_level(), 20);
        assert_eq!(u.tier(), LevelTier::Builder);
    }

    #[test]
    fn snapshot_round_trip_ignores_stored_level() {
        let u = User {
            xp: 250,
            ..User::default()
        };
        let v = serde_json::to_value(&u).unwrap();
        assert_eq!(v["level"], 3);
        assert_eq!(v["ai_personality"], "warm");

        // A stale level in storage does not matter.
        let stale = r#"{"id":"u","username":"n","xp":250,"level":1,
            "ai_personality":"savage","daily_goal_count":3}"#;
        let back: User = serde_json::from_str(stale).unwrap();
        assert_eq!(back.level(), 3);
        assert_eq!(back.ai_personality, Personality::Savage);
    }
}
