//! Game repository for JSON storage
//!
//! Manages loading and saving game configurations to games.json

use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::GameSaveError;
use crate::models::GameConfig;

use super::file_io::{read_json, write_json_atomic};

/// Serializable game list
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GameData {
    games: Vec<GameConfig>,
}

/// Repository for game configuration persistence
///
/// Games keep the order they were added in.
pub struct GameStore {
    path: PathBuf,
    data: RwLock<Vec<GameConfig>>,
}

impl GameStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    /// Load games from disk, rejecting any that fail validation
    pub fn load(&self) -> Result<(), GameSaveError> {
        let file_data: GameData = read_json(&self.path)?;

        for game in &file_data.games {
            game.validate().map_err(|e| {
                GameSaveError::Config(format!("Game '{}' in {}: {}", game.name, self.path.display(), e))
            })?;
        }

        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = file_data.games;

        Ok(())
    }

    /// Save games to disk
    pub fn save(&self) -> Result<(), GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let file_data = GameData {
            games: data.clone(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    pub fn get_all(&self) -> Result<Vec<GameConfig>, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.clone())
    }

    /// Get a game by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Option<GameConfig>, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let name_lower = name.to_lowercase();
        Ok(data
            .iter()
            .find(|g| g.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert a game, or replace the one stored under `previous_name`
    pub fn upsert(&self, game: GameConfig, previous_name: Option<&str>) -> Result<(), GameSaveError> {
        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let key = previous_name.unwrap_or(&game.name).to_lowercase();
        match data.iter_mut().find(|g| g.name.to_lowercase() == key) {
            Some(existing) => *existing = game,
            None => data.push(game),
        }
        Ok(())
    }

    /// Delete a game by name, returning whether it existed
    pub fn delete(&self, name: &str) -> Result<bool, GameSaveError> {
        let mut data = self.data.write().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let name_lower = name.to_lowercase();
        let before = data.len();
        data.retain(|g| g.name.to_lowercase() != name_lower);
        Ok(data.len() != before)
    }

    /// Check if a game name is already taken by a game other than `exclude`
    pub fn name_exists(&self, name: &str, exclude: Option<&str>) -> Result<bool, GameSaveError> {
        let data = self.data.read().map_err(|e| {
            GameSaveError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let name_lower = name.to_lowercase();
        let exclude_lower = exclude.map(str::to_lowercase);
        Ok(data.iter().any(|g| {
            let existing = g.name.to_lowercase();
            existing == name_lower && Some(&existing) != exclude_lower.as_ref()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StrategyKind;
    use crate::models::SaveFile;
    use crate::monitor::MonitoringMode;
    use tempfile::TempDir;

    fn quest() -> GameConfig {
        let mut game = GameConfig::new("Quest", "/saves", "/backups", StrategyKind::PeerDirectory);
        game.game_directory = "QuestSave".to_string();
        game
    }

    fn create_test_store() -> (TempDir, GameStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = GameStore::new(temp_dir.path().join("games.json"));
        (temp_dir, store)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, store) = create_test_store();
        store.load().unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, store) = create_test_store();

        let mut file_game = GameConfig::new(
            "Farm",
            "/saves",
            "/backups",
            StrategyKind::SubordinateUserFile,
        );
        file_game.save_file = Some(SaveFile::new("farm", "sav").unwrap());
        file_game.set_name_format("D V T RE").unwrap();
        file_game.monitoring_mode = MonitoringMode::Active;

        store.upsert(quest(), None).unwrap();
        store.upsert(file_game.clone(), None).unwrap();
        store.save().unwrap();

        let reloaded = GameStore::new(temp_dir.path().join("games.json"));
        reloaded.load().unwrap();
        let games = reloaded.get_all().unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0], quest());
        assert_eq!(games[1], file_game);
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let (_temp_dir, store) = create_test_store();
        store.upsert(quest(), None).unwrap();

        assert!(store.get_by_name("QUEST").unwrap().is_some());
        assert!(store.get_by_name("Other").unwrap().is_none());
    }

    #[test]
    fn test_upsert_renames_in_place() {
        let (_temp_dir, store) = create_test_store();
        store.upsert(quest(), None).unwrap();

        let mut renamed = quest();
        renamed.name = "Quest II".to_string();
        store.upsert(renamed, Some("Quest")).unwrap();

        let games = store.get_all().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].name, "Quest II");
    }

    #[test]
    fn test_delete_and_name_exists() {
        let (_temp_dir, store) = create_test_store();
        store.upsert(quest(), None).unwrap();

        assert!(store.name_exists("quest", None).unwrap());
        assert!(!store.name_exists("quest", Some("Quest")).unwrap());

        assert!(store.delete("Quest").unwrap());
        assert!(!store.delete("Quest").unwrap());
    }

    #[test]
    fn test_load_rejects_invalid_name_format() {
        let (temp_dir, store) = create_test_store();
        std::fs::write(
            temp_dir.path().join("games.json"),
            r#"{ "games": [ {
                "name": "Broken",
                "parent_directory": "/saves",
                "user_directory": "/backups",
                "game_directory": "Save",
                "strategy_type": "peer_directory",
                "name_format": "D D"
            } ] }"#,
        )
        .unwrap();

        assert!(store.load().is_err());
    }

    #[test]
    fn test_load_rejects_unknown_strategy() {
        let (temp_dir, store) = create_test_store();
        std::fs::write(
            temp_dir.path().join("games.json"),
            r#"{ "games": [ {
                "name": "Cloud",
                "parent_directory": "/saves",
                "user_directory": "/backups",
                "strategy_type": "cloud_sync"
            } ] }"#,
        )
        .unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("cloud_sync"));
    }
}
