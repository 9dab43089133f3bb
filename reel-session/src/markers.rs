//! Persisted session markers
//!
//! A single marker survives restarts: the selected profile id. It is read
//! once at profile-store startup, written on every explicit selection, and
//! cleared on logout or when the selected profile is deleted.

use reel_common::{Error, ProfileId, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Storage for the persisted selected-profile marker
pub trait MarkerStore: Send + Sync {
    fn read_selected_profile(&self) -> Result<Option<ProfileId>>;

    fn write_selected_profile(&self, profile_id: ProfileId) -> Result<()>;

    /// Clearing an absent marker is a no-op
    fn clear_selected_profile(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct MarkerFile {
    selected_profile: ProfileId,
}

/// Marker storage backed by a JSON file under the platform config dir
pub struct FileMarkers {
    path: PathBuf,
}

impl FileMarkers {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `<config dir>/reel/markers.json`
    pub fn default_path() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        Ok(Self::new(dir.join("reel").join("markers.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MarkerStore for FileMarkers {
    fn read_selected_profile(&self) -> Result<Option<ProfileId>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str::<MarkerFile>(&raw) {
            Ok(marker) => Ok(Some(marker.selected_profile)),
            Err(e) => {
                // A corrupt marker degrades to "no selection", never an error
                warn!(error = %e, "ignoring malformed marker file");
                Ok(None)
            }
        }
    }

    fn write_selected_profile(&self, profile_id: ProfileId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let marker = MarkerFile {
            selected_profile: profile_id,
        };
        let raw = serde_json::to_string_pretty(&marker)
            .map_err(|e| Error::Internal(format!("marker serialization failed: {e}")))?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear_selected_profile(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory marker storage for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryMarkers {
    selected: Mutex<Option<ProfileId>>,
}

impl MemoryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ProfileId>> {
        self.selected.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MarkerStore for MemoryMarkers {
    fn read_selected_profile(&self) -> Result<Option<ProfileId>> {
        Ok(*self.lock())
    }

    fn write_selected_profile(&self, profile_id: ProfileId) -> Result<()> {
        *self.lock() = Some(profile_id);
        Ok(())
    }

    fn clear_selected_profile(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_markers_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let markers = FileMarkers::new(dir.path().join("nested").join("markers.json"));

        assert_eq!(markers.read_selected_profile().unwrap(), None);

        let id = ProfileId::generate();
        markers.write_selected_profile(id).unwrap();
        assert_eq!(markers.read_selected_profile().unwrap(), Some(id));

        markers.clear_selected_profile().unwrap();
        assert_eq!(markers.read_selected_profile().unwrap(), None);
        // Clearing again is a no-op
        markers.clear_selected_profile().unwrap();
    }

    #[test]
    fn malformed_marker_file_reads_as_no_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.json");
        std::fs::write(&path, "not json").unwrap();

        let markers = FileMarkers::new(path);
        assert_eq!(markers.read_selected_profile().unwrap(), None);
    }

    #[test]
    fn memory_markers_round_trip() {
        let markers = MemoryMarkers::new();
        let id = ProfileId::generate();

        assert_eq!(markers.read_selected_profile().unwrap(), None);
        markers.write_selected_profile(id).unwrap();
        assert_eq!(markers.read_selected_profile().unwrap(), Some(id));
        markers.clear_selected_profile().unwrap();
        assert_eq!(markers.read_selected_profile().unwrap(), None);
    }
}
