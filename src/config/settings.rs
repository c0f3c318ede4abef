use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::{Path, PathBuf};

use crate::models::{Format, TrackerError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub storage: StorageSettings,
    pub tracking: TrackingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Defaults to the platform's local data directory.
    pub data_dir: Option<PathBuf>,
    pub state_file: String,
}

/// Upper bound for `tracking.history_days`, about a century.
pub const MAX_HISTORY_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub default_format: Format,
    /// Length of the "last N games" strip.
    pub recent_results: usize,
    pub game_duration_window: usize,
    pub recent_sessions: usize,
    /// Days of per-day history kept before pruning.
    pub history_days: i64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            default_format: Format::Constructed,
            recent_results: 10,
            game_duration_window: 50,
            recent_sessions: 5,
            history_days: 120,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Ladder Tracker".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            storage: StorageSettings {
                data_dir: None,
                state_file: "tracker_state.json".to_string(),
            },
            tracking: TrackingSettings::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LADDER_TRACKER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    /// Full path of the persisted state file.
    pub fn state_path(&self) -> crate::models::Result<PathBuf> {
        let dir = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .ok_or_else(|| {
                    TrackerError::ConfigError("No local data directory available".to_string())
                })?
                .join("ladder-tracker"),
        };
        Ok(dir.join(&self.storage.state_file))
    }

    pub fn validate(&self) -> Result<(), String> {
        let t = &self.tracking;
        if t.recent_results == 0 {
            return Err("tracking.recent_results must be at least 1".to_string());
        }
        if t.game_duration_window == 0 {
            return Err("tracking.game_duration_window must be at least 1".to_string());
        }
        if t.history_days < 14 {
            return Err(format!(
                "tracking.history_days must cover two weeks, got {}",
                t.history_days
            ));
        }
        if t.history_days > MAX_HISTORY_DAYS {
            return Err(format!(
                "tracking.history_days must be at most {}, got {}",
                MAX_HISTORY_DAYS, t.history_days
            ));
        }
        if self.storage.state_file.trim().is_empty() {
            return Err("storage.state_file must not be empty".to_string());
        }

        Ok(())
    }
}
