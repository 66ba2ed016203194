//! Path management for gamesave
//!
//! ## Path Resolution Order
//!
//! 1. `GAMESAVE_CONFIG_DIR` environment variable (if set)
//! 2. The platform configuration directory: `~/.config/gamesave` on Linux,
//!    `~/Library/Application Support/gamesave` on macOS,
//!    `%APPDATA%\gamesave\config` on Windows

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::GameSaveError;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "GAMESAVE_CONFIG_DIR";

/// Manages all paths used by gamesave
#[derive(Debug, Clone)]
pub struct GameSavePaths {
    /// Directory holding the game list and manager settings
    base_dir: PathBuf,
}

impl GameSavePaths {
    /// Create a new GameSavePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, GameSaveError> {
        let base_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "gamesave")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    GameSaveError::Config("Could not determine the home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create GameSavePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the game list
    pub fn games_file(&self) -> PathBuf {
        self.base_dir.join("games.json")
    }

    /// Get the path to the manager settings
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_directories(&self) -> Result<(), GameSaveError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            GameSaveError::Io(format!("Failed to create config directory: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.games_file(), temp_dir.path().join("games.json"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("settings.json"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        std::env::set_var(CONFIG_DIR_ENV, custom_path);
        let paths = GameSavePaths::new().unwrap();
        std::env::remove_var(CONFIG_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GameSavePaths::with_base_dir(temp_dir.path().join("nested").join("config"));

        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().is_dir());
    }
}
