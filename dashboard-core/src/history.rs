use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::model::CurrentWeather;

/// Maximum number of retained lookups; the oldest is evicted beyond this.
pub const MAX_HISTORY_ENTRIES: usize = 5;

/// Durable, bounded store of past successful lookups.
///
/// History is a convenience feature, so every operation is infallible from
/// the caller's point of view: storage problems degrade to an empty or
/// session-only history and are only logged.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: Option<PathBuf>,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store without a backing file, for when durable storage could not
    /// be resolved. Reads yield nothing and writes are skipped.
    pub fn detached() -> Self {
        Self { path: None }
    }

    /// Read the persisted history, most recent first. Absent, corrupt or
    /// unavailable storage all yield an empty sequence.
    pub fn load(&self) -> Vec<CurrentWeather> {
        let Some(path) = &self.path else {
            return Vec::new();
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    tracing::warn!("Failed to read history file {}: {err}", path.display());
                }
                return Vec::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Discarding corrupt history file {}: {err}", path.display());
                Vec::new()
            }
        }
    }

    /// Insert a fresh snapshot: any previous entry for the same location
    /// (matched case-insensitively) is dropped, the new one goes first and
    /// the list is truncated to [`MAX_HISTORY_ENTRIES`]. The updated
    /// sequence is returned even when persisting it fails.
    pub fn record(&self, entry: &CurrentWeather) -> Vec<CurrentWeather> {
        let mut entries = self.load();

        let name = entry.location_name.to_lowercase();
        entries.retain(|existing| existing.location_name.to_lowercase() != name);
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY_ENTRIES);

        self.persist(&entries);
        entries
    }

    /// Remove all persisted history. Never fails the caller.
    pub fn clear(&self) -> Vec<CurrentWeather> {
        if let Some(path) = &self.path {
            if let Err(err) = fs::remove_file(path) {
                if err.kind() != ErrorKind::NotFound {
                    tracing::warn!("Failed to clear history file {}: {err}", path.display());
                }
            }
        }
        Vec::new()
    }

    fn persist(&self, entries: &[CurrentWeather]) {
        let Some(path) = &self.path else { return };

        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(
                    "Failed to create history directory {}: {err}",
                    parent.display()
                );
                return;
            }
        }

        match serde_json::to_string(entries) {
            Ok(json) => {
                if let Err(err) = fs::write(path, json) {
                    tracing::warn!("Failed to write history file {}: {err}", path.display());
                }
            }
            Err(err) => tracing::warn!("Failed to serialize history: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(name: &str, temp: f64) -> CurrentWeather {
        CurrentWeather {
            location_name: name.to_string(),
            country_code: None,
            temperature_c: temp,
            feels_like_c: temp - 1.0,
            humidity_pct: 60,
            wind_speed_mps: 3.2,
            condition_main: "Clouds".to_string(),
            condition_description: "scattered clouds".to_string(),
            icon_code: "03d".to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("history.json"))
    }

    #[test]
    fn load_is_empty_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn record_persists_across_store_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        HistoryStore::new(path.clone()).record(&snapshot("Paris", 14.0));

        let reloaded = HistoryStore::new(path).load();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].location_name, "Paris");
    }

    #[test]
    fn same_location_replaces_older_entry_at_front() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.record(&snapshot("Paris", 10.0));
        store.record(&snapshot("London", 8.0));
        let entries = store.record(&snapshot("PARIS", 15.0));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].location_name, "PARIS");
        assert!((entries[0].temperature_c - 15.0).abs() < f64::EPSILON);
        assert_eq!(entries[1].location_name, "London");
    }

    #[test]
    fn capacity_evicts_the_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let cities = ["Paris", "London", "Tokyo", "Oslo", "Cairo", "Lima"];
        let mut entries = Vec::new();
        for (i, city) in cities.iter().enumerate() {
            entries = store.record(&snapshot(city, i as f64));
        }

        assert_eq!(entries.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(entries[0].location_name, "Lima");
        assert!(entries.iter().all(|e| e.location_name != "Paris"));
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(HistoryStore::new(path).load().is_empty());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.record(&snapshot("Paris", 14.0));
        assert_eq!(store.clear().len(), 0);
        assert!(store.load().is_empty());
    }

    #[test]
    fn detached_store_still_returns_the_new_entry() {
        let store = HistoryStore::detached();

        let entries = store.record(&snapshot("Paris", 14.0));
        assert_eq!(entries.len(), 1);
        assert!(store.load().is_empty());
    }
}
