//! Durable storage for areas and the restoration ledger.
//!
//! One artifact holds both sequences. Writes go to a sibling temp file
//! followed by an atomic rename, so a concurrent load never observes a
//! partially written artifact. A missing file means empty state; a corrupt
//! one degrades to empty state with the failure reported, never a crash.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::error::RegenError;
use crate::ledger::OreRecord;

/// The serialized artifact: every area plus every pending restoration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SavedState {
    pub areas: Vec<Area>,
    pub records: Vec<OreRecord>,
}

/// Handle to the on-disk data file.
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and write the full state, atomically.
    pub fn save(&self, state: &SavedState) -> Result<(), RegenError> {
        let bytes = serde_json::to_vec(state)
            .map_err(|e| RegenError::Persistence(format!("encode: {e}")))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| RegenError::Persistence(format!("create data dir: {e}")))?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes)
            .map_err(|e| RegenError::Persistence(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| RegenError::Persistence(format!("rename {}: {e}", tmp.display())))?;
        Ok(())
    }

    /// Read the full state back. A missing file is empty state, not an
    /// error; an unreadable or corrupt file is an error the caller should
    /// log before continuing with empty state.
    pub fn load(&self) -> Result<SavedState, RegenError> {
        if !self.path.exists() {
            return Ok(SavedState::default());
        }
        let bytes = fs::read(&self.path)
            .map_err(|e| RegenError::Persistence(format!("read {}: {e}", self.path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RegenError::Persistence(format!("decode {}: {e}", self.path.display())))
    }

    /// Fire-and-forget save on the persistence worker pool.
    ///
    /// Dispatches onto the ambient tokio runtime when one is running, and
    /// degrades to an inline blocking save when none is. Failures are
    /// logged and dropped; the next scheduled trigger is the retry.
    pub fn save_in_background(self: &Arc<Self>, state: SavedState) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let file = Arc::clone(self);
                handle.spawn_blocking(move || {
                    if let Err(e) = file.save(&state) {
                        log::warn!("oreregen: background save failed: {e}");
                    }
                });
            }
            Err(_) => {
                if let Err(e) = self.save(&state) {
                    log::warn!("oreregen: save failed: {e}");
                }
            }
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map_or_else(
            || std::ffi::OsString::from("data"),
            std::ffi::OsStr::to_os_string,
        );
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use uuid::Uuid;

    use super::*;
    use crate::area::BlockPos;

    fn sample_state() -> SavedState {
        let mut area = Area::new(
            Uuid::new_v4(),
            "spawn camp".into(),
            BlockPos::new(-5, 64, -5),
            BlockPos::new(20, 80, 20),
        );
        area.trusted = HashSet::from([Uuid::new_v4(), Uuid::new_v4()]);
        SavedState {
            areas: vec![area],
            records: vec![OreRecord {
                world: "overworld".into(),
                pos: BlockPos::new(100, 12, -40),
                material: "minecraft:deepslate_iron_ore".into(),
                broken_at_ms: 1_700_000_000_000,
            }],
        }
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.json"));
        let state = sample_state();

        file.save(&state).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded.areas.len(), 1);
        assert_eq!(loaded.areas[0].id, state.areas[0].id);
        assert_eq!(loaded.areas[0].owner, state.areas[0].owner);
        assert_eq!(loaded.areas[0].name, state.areas[0].name);
        assert_eq!(loaded.areas[0].corner1, state.areas[0].corner1);
        assert_eq!(loaded.areas[0].corner2, state.areas[0].corner2);
        assert_eq!(loaded.areas[0].trusted, state.areas[0].trusted);
        assert_eq!(loaded.records, state.records);
    }

    #[test]
    fn empty_state_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.json"));
        file.save(&SavedState::default()).unwrap();
        let loaded = file.load().unwrap();
        assert!(loaded.areas.is_empty());
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("absent.json"));
        let loaded = file.load().unwrap();
        assert!(loaded.areas.is_empty());
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, b"{ not json").unwrap();
        let file = DataFile::new(path);
        assert!(matches!(file.load(), Err(RegenError::Persistence(_))));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.json"));
        file.save(&sample_state()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("data.json")]);
    }

    #[tokio::test]
    async fn background_save_lands_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(DataFile::new(dir.path().join("data.json")));
        file.save_in_background(sample_state());

        // Bounded wait for the spawned blocking task to finish.
        for _ in 0..100 {
            if file.path().exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let loaded = file.load().unwrap();
        assert_eq!(loaded.areas.len(), 1);
        assert_eq!(loaded.records.len(), 1);
    }
}
