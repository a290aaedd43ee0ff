//! The aggregate player document on disk.
//!
//! Every player lives in one pretty-printed JSON object keyed by player id.
//! Writes go to a temporary file that is renamed over the document, and the
//! previous document is kept next to it as `<file>.bak`.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{error, info, warn};
use rpg_shared::PlayerState;
use thiserror::Error;

/// Player records keyed by player id
pub type PlayerMap = BTreeMap<String, PlayerState>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file store with backup-before-write and atomic replace
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Load every player.
    ///
    /// A missing document is an empty game. An unreadable document is moved
    /// aside as `<file>.corrupt-<timestamp>` and the backup is used instead,
    /// so the next save cannot copy the damaged bytes over the backup.
    pub fn load_all_players(&self) -> PlayerMap {
        let document_corrupt = match read_document(&self.path) {
            Ok(Some(players)) => {
                info!("Loaded {} players from {}", players.len(), self.path.display());
                return players;
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                true
            }
        };

        if document_corrupt {
            self.quarantine();
        }

        let backup = self.backup_path();
        match read_document(&backup) {
            Ok(Some(players)) => {
                warn!("Restored {} players from backup {}", players.len(), backup.display());
                return players;
            }
            Ok(None) => {}
            Err(e) => error!("Failed to read backup {}: {}", backup.display(), e),
        }

        if document_corrupt {
            error!("Player document and backup are unreadable, starting empty");
        } else {
            info!("No player document at {}, starting empty", self.path.display());
        }

        PlayerMap::new()
    }

    fn quarantine(&self) {
        let target = self.sibling(&format!(".corrupt-{}", Utc::now().format("%Y%m%d%H%M%S")));
        match fs::rename(&self.path, &target) {
            Ok(()) => warn!("Moved unreadable {} to {}", self.path.display(), target.display()),
            Err(e) => error!("Failed to move aside unreadable {}: {}", self.path.display(), e),
        }
    }

    /// Replace the document with `players`.
    ///
    /// On failure the previous document is restored from the backup if the
    /// replace got far enough to lose it.
    pub fn save_all_players(&self, players: &PlayerMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(players)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        // Only a readable document may replace the backup
        let backup = self.backup_path();
        match read_document(&self.path) {
            Ok(Some(_)) => {
                fs::copy(&self.path, &backup)?;
            }
            Ok(None) => {}
            Err(e) => warn!("Keeping previous backup, {} is unreadable: {}", self.path.display(), e),
        }

        if let Err(e) = self.replace(&json) {
            error!("Failed to write {}: {}", self.path.display(), e);
            let _ = fs::remove_file(self.temp_path());
            if !self.path.exists() && backup.exists() {
                match fs::copy(&backup, &self.path) {
                    Ok(_) => info!("Restored {} from backup", self.path.display()),
                    Err(restore) => error!("Failed to restore {} from backup: {}", self.path.display(), restore),
                }
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn replace(&self, json: &str) -> io::Result<()> {
        let temp = self.temp_path();
        let mut file = File::create(&temp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp, &self.path)
    }
}

/// `Ok(None)` when the file does not exist
fn read_document(path: &Path) -> Result<Option<PlayerMap>, StoreError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut players: PlayerMap = serde_json::from_str(&data)?;
    // Older documents may omit the id inside the record
    for (id, player) in players.iter_mut() {
        if player.id.is_empty() {
            player.id = id.clone();
        }
    }
    Ok(Some(players))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpg_shared::{CharacterClass, MonsterState};

    fn sample_players() -> PlayerMap {
        let mut players = PlayerMap::new();
        for (id, class) in [("100", CharacterClass::Warrior), ("200", CharacterClass::Mage)] {
            let mut player = crate::entities::new_player(id, class, Utc::now());
            player.gold = 42;
            player.inventory.insert("Small Potion".into(), 2);
            player.last_rest_at = Some(Utc::now());
            players.insert(id.to_string(), player);
        }
        players
    }

    #[test]
    fn test_missing_document_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        assert!(store.load_all_players().is_empty());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let mut players = sample_players();
        players.get_mut("100").unwrap().active_monster = Some(MonsterState {
            name: "Slime".into(),
            hp: 12,
            max_hp: 40,
            atk: 5,
            level: 1,
            xp_reward: 10,
            gold_reward: 3,
            drop_table: vec![],
            innate_effects: vec![],
            boss: None,
        });

        store.save_all_players(&players).unwrap();
        assert_eq!(store.load_all_players(), players);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_timestamps_are_iso8601() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        store.save_all_players(&sample_players()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        let created = raw["100"]["created_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn test_second_save_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let mut players = sample_players();
        store.save_all_players(&players).unwrap();

        players.get_mut("100").unwrap().gold = 999;
        store.save_all_players(&players).unwrap();

        let backup: PlayerMap =
            serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
        assert_eq!(backup["100"].gold, 42);
        assert_eq!(store.load_all_players()["100"].gold, 999);
    }

    #[test]
    fn test_corrupt_document_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let players = sample_players();
        store.save_all_players(&players).unwrap();
        store.save_all_players(&players).unwrap();

        fs::write(store.path(), "{ not json").unwrap();
        assert_eq!(store.load_all_players(), players);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_failed_save_after_backup_restore_keeps_players() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let players = sample_players();
        store.save_all_players(&players).unwrap();
        store.save_all_players(&players).unwrap();

        fs::write(store.path(), "{ not json").unwrap();
        let restored = store.load_all_players();
        assert_eq!(restored, players);

        // A directory in the temp file's place makes the write fail
        fs::create_dir(store.temp_path()).unwrap();
        assert!(store.save_all_players(&restored).is_err());

        assert_eq!(store.load_all_players(), players);
    }

    #[test]
    fn test_corrupt_document_never_replaces_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        let players = sample_players();
        store.save_all_players(&players).unwrap();
        store.save_all_players(&players).unwrap();

        fs::write(store.path(), "{ not json").unwrap();
        let mut changed = players.clone();
        changed.get_mut("200").unwrap().gold = 7;
        store.save_all_players(&changed).unwrap();

        let backup: PlayerMap =
            serde_json::from_str(&fs::read_to_string(store.backup_path()).unwrap()).unwrap();
        assert_eq!(backup, players);
        assert_eq!(store.load_all_players(), changed);
    }

    #[test]
    fn test_unreadable_document_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        fs::write(store.path(), "garbage").unwrap();

        assert!(store.load_all_players().is_empty());
        assert!(!store.path().exists());
        let quarantined = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("players.json.corrupt-"));
        assert!(quarantined);
    }

    #[test]
    fn test_missing_ids_are_filled_from_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("players.json"));
        fs::write(store.path(), r#"{"77": {"level": 3, "gold": 5}}"#).unwrap();

        let players = store.load_all_players();
        assert_eq!(players["77"].id, "77");
        assert_eq!(players["77"].level, 3);
    }
}
