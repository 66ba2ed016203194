//! Manager settings for gamesave
//!
//! State that belongs to the tool rather than to one game: the game the
//! quick commands act on and how chatty status output is.

use serde::{Deserialize, Serialize};

use super::paths::GameSavePaths;
use crate::error::GameSaveError;
use crate::status::StatusVerbosity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerSettings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Game selected most recently, matched case-insensitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_game: Option<String>,

    /// Which status messages are printed
    #[serde(default)]
    pub status_verbosity: StatusVerbosity,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            last_selected_game: None,
            status_verbosity: StatusVerbosity::default(),
        }
    }
}

impl ManagerSettings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &GameSavePaths) -> Result<Self, GameSaveError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                GameSaveError::Io(format!("Failed to read settings file: {}", e))
            })?;

            serde_json::from_str(&contents).map_err(|e| {
                GameSaveError::Config(format!("Failed to parse settings file: {}", e))
            })
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Self::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GameSavePaths) -> Result<(), GameSaveError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            GameSaveError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| GameSaveError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = ManagerSettings::default();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.last_selected_game, None);
        assert_eq!(settings.status_verbosity, StatusVerbosity::User);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = ManagerSettings {
            last_selected_game: Some("Quest".to_string()),
            status_verbosity: StatusVerbosity::Info,
            ..ManagerSettings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = ManagerSettings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.last_selected_game.as_deref(), Some("Quest"));
        assert_eq!(loaded.status_verbosity, StatusVerbosity::Info);
    }

    #[test]
    fn test_load_missing_fields_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "{}").unwrap();

        let loaded = ManagerSettings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.status_verbosity, StatusVerbosity::User);
    }

    #[test]
    fn test_load_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), "not json").unwrap();

        let err = ManagerSettings::load_or_create(&paths).unwrap_err();
        assert!(matches!(err, GameSaveError::Config(_)));
    }
}
