//! JSON-file backed storage for objectives, captures and tracker settings.
use ntropy_gacha::constants::DEFAULT_CONVERSION_RATIO;
use ntropy_gacha::{Capture, Objective, TrackerStorage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid tracker data: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tracker data for {path} could not be serialized: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_conversion_ratio")]
    pub conversion_ratio: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conversion_ratio: DEFAULT_CONVERSION_RATIO,
        }
    }
}

const fn default_conversion_ratio() -> u32 {
    DEFAULT_CONVERSION_RATIO
}

/// On-disk document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackerData {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    /// Read the document; a missing file is an empty tracker.
    pub fn load(&self) -> Result<TrackerData, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(TrackerData::default()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.label(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.label(),
            source,
        })
    }

    pub fn save(&self, data: &TrackerData) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data).map_err(|source| StoreError::Serialize {
            path: self.label(),
            source,
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.label(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| StoreError::Write {
            path: self.label(),
            source,
        })
    }

    /// Apply `edit` and write the document back only if it reports a change.
    fn update(&self, edit: impl FnOnce(&mut TrackerData) -> bool) -> Result<bool, StoreError> {
        let mut data = self.load()?;
        let changed = edit(&mut data);
        if changed {
            self.save(&data)?;
        }
        Ok(changed)
    }

    pub fn settings(&self) -> Result<Settings, StoreError> {
        Ok(self.load()?.settings)
    }

    /// Next free `obj-<n>` id across all games.
    pub fn next_objective_id(&self) -> Result<String, StoreError> {
        let data = self.load()?;
        let next = data
            .objectives
            .iter()
            .filter_map(|o| o.id.strip_prefix("obj-")?.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Ok(format!("obj-{next}"))
    }
}

impl TrackerStorage for JsonFileStore {
    type Error = StoreError;

    fn load_objectives(&self, game_id: u32) -> Result<Vec<Objective>, Self::Error> {
        Ok(self
            .load()?
            .objectives
            .into_iter()
            .filter(|o| o.game_id == game_id)
            .collect())
    }

    fn save_objective(&self, objective: &Objective) -> Result<(), Self::Error> {
        self.update(|data| {
            data.objectives
                .retain(|o| !(o.game_id == objective.game_id && o.id == objective.id));
            data.objectives.push(objective.clone());
            true
        })
        .map(|_| ())
    }

    fn remove_objective(&self, game_id: u32, objective_id: &str) -> Result<bool, Self::Error> {
        self.update(|data| {
            let before = data.objectives.len();
            data.objectives
                .retain(|o| !(o.game_id == game_id && o.id == objective_id));
            data.objectives.len() < before
        })
    }

    fn append_capture(&self, capture: &Capture) -> Result<(), Self::Error> {
        self.update(|data| {
            data.captures.push(capture.clone());
            true
        })
        .map(|_| ())
    }

    fn load_captures(&self) -> Result<Vec<Capture>, Self::Error> {
        Ok(self.load()?.captures)
    }

    fn delete_capture(&self, capture_id: u64) -> Result<bool, Self::Error> {
        self.update(|data| {
            let before = data.captures.len();
            data.captures.retain(|c| c.id != capture_id);
            data.captures.len() < before
        })
    }

    fn clear_captures(&self, game_id: Option<u32>) -> Result<usize, Self::Error> {
        let mut removed = 0;
        self.update(|data| {
            let before = data.captures.len();
            data.captures
                .retain(|c| game_id.is_some_and(|id| c.game_id != id));
            removed = before - data.captures.len();
            removed > 0
        })?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(label: &str) -> JsonFileStore {
        let path = std::env::temp_dir().join(format!(
            "ntropy-store-{label}-{}.json",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        JsonFileStore::new(path)
    }

    fn objective(id: &str, game_id: u32) -> Objective {
        Objective {
            id: id.to_string(),
            game_id,
            name: "Featured".to_string(),
            pulls_needed: 180,
            current_pity: 0,
            guaranteed: false,
        }
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = temp_store("missing");
        let data = store.load().unwrap();
        assert!(data.objectives.is_empty());
        assert_eq!(data.settings.conversion_ratio, 160);
        assert_eq!(store.next_objective_id().unwrap(), "obj-1");
    }

    #[test]
    fn objectives_round_trip_through_file() {
        let store = temp_store("objectives");
        store.save_objective(&objective("obj-1", 1)).unwrap();
        store.save_objective(&objective("obj-4", 2)).unwrap();
        store.save_objective(&objective("obj-1", 1)).unwrap();
        assert_eq!(store.load_objectives(1).unwrap().len(), 1);
        assert_eq!(store.next_objective_id().unwrap(), "obj-5");
        assert!(store.remove_objective(2, "obj-4").unwrap());
        assert!(!store.remove_objective(2, "obj-4").unwrap());
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn corrupt_file_reports_parse_error() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
        let _ = fs::remove_file(store.path());
    }

    fn capture(id: u64, game_id: u32) -> Capture {
        Capture {
            id,
            game_id,
            value: 10.0,
            timestamp: "2025-03-01 12:00:00".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn no_op_edits_leave_missing_file_absent() {
        let store = temp_store("untouched");
        assert!(!store.remove_objective(1, "obj-1").unwrap());
        assert!(!store.delete_capture(7).unwrap());
        assert_eq!(store.clear_captures(None).unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn clear_captures_keeps_objectives_and_other_games() {
        let store = temp_store("clear");
        store.save_objective(&objective("obj-1", 1)).unwrap();
        for (id, game_id) in [(1, 1), (2, 2), (3, 1)] {
            store.append_capture(&capture(id, game_id)).unwrap();
        }
        assert_eq!(store.clear_captures(Some(1)).unwrap(), 2);
        let ids: Vec<u64> = store.load_captures().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, [2]);
        assert_eq!(store.clear_captures(None).unwrap(), 1);
        assert!(store.load_captures().unwrap().is_empty());
        assert_eq!(store.load_objectives(1).unwrap().len(), 1);
        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn write_failures_are_not_reported_as_bad_data() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = StoreError::Serialize {
            path: "tracker.json".to_string(),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("tracker data for tracker.json could not be serialized"));
        assert!(!message.contains("not valid tracker data"));
    }
}
