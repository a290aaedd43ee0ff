//! Runtime configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

/// Settings the engine and the binary read at startup
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    /// Aggregate JSON document holding every player
    pub save_file: PathBuf,
    /// Minimum gap between two actions of the same player
    pub action_debounce: Duration,
    pub hunt_cooldown: Duration,
    /// First rest cooldown; doubles with each consecutive rest
    pub rest_base_cooldown: Duration,
    /// How often the binary flushes a full snapshot
    pub autosave_interval: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_file: PathBuf::from("players.json"),
            action_debounce: Duration::from_millis(800),
            hunt_cooldown: Duration::from_secs(5),
            rest_base_cooldown: Duration::from_secs(120),
            autosave_interval: Duration::from_secs(60),
        }
    }
}

impl GameConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `RPG_SAVE_FILE`
    /// - `RPG_ACTION_DEBOUNCE_MS`
    /// - `RPG_HUNT_COOLDOWN_SECS`
    /// - `RPG_REST_BASE_COOLDOWN_SECS`
    /// - `RPG_AUTOSAVE_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparsable values keep the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("RPG_SAVE_FILE").filter(|p| !p.trim().is_empty()) {
            config.save_file = PathBuf::from(path);
        }
        if let Some(ms) = read_value::<u64>(&lookup, "RPG_ACTION_DEBOUNCE_MS") {
            config.action_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = read_value::<u64>(&lookup, "RPG_HUNT_COOLDOWN_SECS") {
            config.hunt_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = read_value::<u64>(&lookup, "RPG_REST_BASE_COOLDOWN_SECS") {
            config.rest_base_cooldown = Duration::from_secs(secs);
        }
        if let Some(secs) = read_value::<u64>(&lookup, "RPG_AUTOSAVE_SECS") {
            config.autosave_interval = Duration::from_secs(secs.max(1));
        }

        config
    }
}

fn read_value<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, keeping default", key, raw);
            None
        }
    }
}
