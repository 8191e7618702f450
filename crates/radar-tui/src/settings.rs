//! Persisted user settings.
//!
//! The dark-mode flag is the only durable client-side state. It is read
//! once at startup and written back through a single update operation:
//! persist to disk first, then update the in-memory value the renderer
//! sees. A missing file means light mode.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use radar_core::theme::Mode;
use radar_core::RadarError;

/// Durable user preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub mode: Mode,
}

/// Process-wide settings store backed by a JSON file.
pub struct SettingsStore {
    path: PathBuf,
    settings: UserSettings,
}

impl SettingsStore {
    /// Load settings from `path`, defaulting when the file is absent.
    ///
    /// An unreadable or malformed file is logged and treated as absent
    /// rather than failing startup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Malformed settings file, using defaults");
                    UserSettings::default()
                }
            },
            Err(_) => UserSettings::default(),
        };
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> UserSettings {
        self.settings
    }

    pub fn mode(&self) -> Mode {
        self.settings.mode
    }

    /// Persist the new mode, then apply it in memory.
    ///
    /// Memory only ever reflects what the disk accepted, so a failed write
    /// leaves both sides on the previous value.
    pub fn set_mode(&mut self, mode: Mode) -> Result<Mode, RadarError> {
        let next = UserSettings { mode };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RadarError::Settings(format!("{}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(&next)?;
        fs::write(&self.path, json)
            .map_err(|e| RadarError::Settings(format!("{}: {e}", self.path.display())))?;

        self.settings = next;
        tracing::debug!(mode = ?mode, path = %self.path.display(), "Settings saved");
        Ok(mode)
    }

    /// Flip light/dark and persist.
    pub fn toggle_mode(&mut self) -> Result<Mode, RadarError> {
        self.set_mode(self.settings.mode.toggled())
    }
}

/// Default settings location under the user's home directory.
pub fn default_settings_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/radar/settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_defaults_to_light_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert_eq!(store.mode(), Mode::Light);
    }

    #[test]
    fn mode_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let mut store = SettingsStore::open(&path);
        store.set_mode(Mode::Dark).unwrap();
        assert_eq!(store.mode(), Mode::Dark);

        // A fresh store sees the persisted value.
        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.mode(), Mode::Dark);
    }

    #[test]
    fn toggling_twice_returns_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::open(&path);
        let original = store.mode();
        store.toggle_mode().unwrap();
        store.toggle_mode().unwrap();
        assert_eq!(store.mode(), original);

        let reopened = SettingsStore::open(&path);
        assert_eq!(reopened.mode(), original);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::open(&path);
        assert_eq!(store.mode(), Mode::Light);
    }
}
