use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::models::{Format, Result, TrackerError};
use crate::snapshot::schema::Snapshot;
use crate::tracker::TrackerState;

/// JSON file holding the whole tracker state.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file yields a fresh state. A file that does not parse is an
    /// error; it is never replaced by defaults.
    pub fn load(&self, default_format: Format) -> Result<TrackerState> {
        if !self.path.exists() {
            info!("No state file at {:?}, starting fresh", self.path);
            return Ok(TrackerState::new(default_format));
        }

        let text = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&text).map_err(|e| {
            TrackerError::CorruptSnapshot(format!("{}: {}", self.path.display(), e))
        })?;

        let (state, repairs) = snapshot.into_state();
        if !repairs.is_empty() {
            warn!("{} value(s) repaired while loading {:?}", repairs.len(), self.path);
        }
        debug!("Loaded state from {:?}", self.path);
        Ok(state)
    }

    /// Writes through a temporary file and renames it over the old state.
    pub fn save(&self, state: &TrackerState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &Snapshot::from_state(state))?;
        writer.flush()?;
        drop(writer);

        fs::rename(&temp_path, &self.path)?;
        debug!("Saved state to {:?}", self.path);
        Ok(())
    }
}
