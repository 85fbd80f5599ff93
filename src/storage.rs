use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DAY_SECS: i64 = 86_400;
/// Message timestamps older than this are dropped on every write.
pub const STATS_RETENTION_SECS: i64 = 3 * DAY_SECS;

const USERS_FILE: &str = "users.json";
const STATE_FILE: &str = "user_state.json";
const SETTINGS_FILE: &str = "settings.json";
const STATS_FILE: &str = "stats.json";

// users.json: {"users": [id, ...]}
#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersRecord {
    users: BTreeSet<i64>,
}

// user_state.json: {"<uid>": {"started": bool}}
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct UserFlags {
    started: bool,
}

type StateRecord = BTreeMap<String, UserFlags>;

// settings.json: {"germany_enabled": true}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub germany_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            germany_enabled: true,
        }
    }
}

// stats.json: {"messages": [unix_ts, ...]}
#[derive(Debug, Default, Serialize, Deserialize)]
struct StatsRecord {
    messages: Vec<i64>,
}

/// File-backed store for the four logical records: the user registry,
/// per-user onboarding flags, global settings and the message-timestamp log.
///
/// Every write replaces the whole record. A missing or unparsable file reads
/// as the record's default; corruption is logged, never propagated.
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    fn read_record<T: DeserializeOwned + Default>(&self, file: &str) -> T {
        let path = self.data_dir.join(file);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Corrupt record {:?}, falling back to default: {}", path, e);
                    T::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => T::default(),
            Err(e) => {
                log::warn!("Failed to read {:?}, falling back to default: {}", path, e);
                T::default()
            }
        }
    }

    fn write_record<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.data_dir.join(file);
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    /// Adds a user to the registry. No write is performed when the id is
    /// already present.
    pub fn add_user(&self, user_id: i64) -> Result<()> {
        let mut record: UsersRecord = self.read_record(USERS_FILE);
        if record.users.insert(user_id) {
            self.write_record(USERS_FILE, &record)?;
        }
        Ok(())
    }

    /// The full registry, ascending, for deterministic fan-out and counting.
    pub fn all_users(&self) -> Vec<i64> {
        let record: UsersRecord = self.read_record(USERS_FILE);
        record.users.into_iter().collect()
    }

    pub fn has_started(&self, user_id: i64) -> bool {
        let state: StateRecord = self.read_record(STATE_FILE);
        state
            .get(&user_id.to_string())
            .is_some_and(|flags| flags.started)
    }

    /// Marks the user's one-time onboarding as complete. Idempotent; the flag
    /// never reverts.
    pub fn mark_started(&self, user_id: i64) -> Result<()> {
        let mut state: StateRecord = self.read_record(STATE_FILE);
        state.insert(user_id.to_string(), UserFlags { started: true });
        self.write_record(STATE_FILE, &state)
    }

    /// How many of the given registry members have completed onboarding.
    pub fn started_count(&self, users: &[i64]) -> usize {
        let state: StateRecord = self.read_record(STATE_FILE);
        users
            .iter()
            .filter(|id| {
                state
                    .get(&id.to_string())
                    .is_some_and(|flags| flags.started)
            })
            .count()
    }

    /// Current global flags. Seeds and persists the default record on the
    /// first-ever call.
    pub fn settings(&self) -> Result<Settings> {
        if !self.data_dir.join(SETTINGS_FILE).exists() {
            let defaults = Settings::default();
            self.write_record(SETTINGS_FILE, &defaults)?;
            return Ok(defaults);
        }
        Ok(self.read_record(SETTINGS_FILE))
    }

    pub fn toggle_germany(&self) -> Result<Settings> {
        let mut settings = self.settings()?;
        settings.germany_enabled = !settings.germany_enabled;
        self.write_record(SETTINGS_FILE, &settings)?;
        Ok(settings)
    }

    /// Appends a message timestamp and prunes everything outside the
    /// retention window.
    pub fn record_message(&self, now: i64) -> Result<()> {
        let mut stats: StatsRecord = self.read_record(STATS_FILE);
        stats.messages.push(now);
        stats.messages.retain(|&t| t >= now - STATS_RETENTION_SECS);
        self.write_record(STATS_FILE, &stats)
    }

    pub fn count_last_24h(&self, now: i64) -> usize {
        let stats: StatsRecord = self.read_record(STATS_FILE);
        stats.messages.iter().filter(|&&t| t >= now - DAY_SECS).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn storage(dir: &tempfile::TempDir) -> Storage {
        Storage::new(dir.path()).unwrap()
    }

    #[test]
    fn test_add_user_is_idempotent() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir);

        storage.add_user(100).unwrap();
        storage.add_user(100).unwrap();
        storage.add_user(7).unwrap();

        assert_eq!(storage.all_users(), vec![7, 100]);
    }

    #[test]
    fn test_onboarding_is_monotonic() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir);

        assert!(!storage.has_started(100));
        storage.mark_started(100).unwrap();
        assert!(storage.has_started(100));
        storage.mark_started(100).unwrap();
        assert!(storage.has_started(100));
        assert!(!storage.has_started(101));
    }

    #[test]
    fn test_started_count_over_registry() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir);

        for id in [1, 2, 3] {
            storage.add_user(id).unwrap();
        }
        storage.mark_started(1).unwrap();
        storage.mark_started(3).unwrap();
        // Started but never registered: not counted against the registry.
        storage.mark_started(99).unwrap();

        let users = storage.all_users();
        assert_eq!(storage.started_count(&users), 2);
    }

    #[test]
    fn test_settings_seed_and_toggle_round_trip() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir);

        assert!(storage.settings().unwrap().germany_enabled);
        assert!(dir.path().join("settings.json").exists());

        assert!(!storage.toggle_germany().unwrap().germany_enabled);
        assert!(!storage.settings().unwrap().germany_enabled);
        assert!(storage.toggle_germany().unwrap().germany_enabled);
    }

    #[test]
    fn test_corrupt_record_reads_as_default() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("users.json"), "{not valid json").unwrap();
        let storage = storage(&dir);

        assert!(storage.all_users().is_empty());
        storage.add_user(1).unwrap();
        assert_eq!(storage.all_users(), vec![1]);
    }

    #[test]
    fn test_stats_prune_and_24h_count() {
        let dir = tempdir().unwrap();
        let storage = storage(&dir);
        let now = 1_700_000_000;

        storage.record_message(now - 4 * DAY_SECS).unwrap();
        storage.record_message(now - 2 * DAY_SECS).unwrap();
        storage.record_message(now - DAY_SECS - 1).unwrap();
        storage.record_message(now - 10).unwrap();
        storage.record_message(now).unwrap();

        // Only the entries within the trailing 24 hours count.
        assert_eq!(storage.count_last_24h(now), 2);

        // The 4-day-old entry was pruned by a later write.
        let raw = std::fs::read_to_string(dir.path().join("stats.json")).unwrap();
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let messages: Vec<i64> = record["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(
            messages,
            vec![now - 2 * DAY_SECS, now - DAY_SECS - 1, now - 10, now]
        );
    }
}
