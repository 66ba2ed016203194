//! Game library service
//!
//! Owns the persisted game list and manager settings, and provides the
//! game-level operations on top of them: add, edit, copy, remove and select
//! games, open a game's [`GameBackupSet`], and the two silent entry points
//! that act on the last selected game without asking anything.

use tracing::{debug, info};

use crate::backup::GameBackupSet;
use crate::config::{GameSavePaths, ManagerSettings};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::GameConfig;
use crate::status::StatusReport;
use crate::storage::GameStore;

/// All configured games plus manager settings
pub struct GameLibrary {
    paths: GameSavePaths,
    store: GameStore,
    settings: ManagerSettings,
}

impl GameLibrary {
    /// Load the game list and settings found under `paths`
    pub fn open(paths: GameSavePaths) -> GameSaveResult<Self> {
        let store = GameStore::new(paths.games_file());
        store.load()?;
        let settings = ManagerSettings::load_or_create(&paths)?;

        Ok(Self {
            paths,
            store,
            settings,
        })
    }

    pub fn paths(&self) -> &GameSavePaths {
        &self.paths
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    pub fn games(&self) -> GameSaveResult<Vec<GameConfig>> {
        self.store.get_all()
    }

    /// Get a game by name (case-insensitive)
    pub fn game(&self, name: &str) -> GameSaveResult<GameConfig> {
        self.store
            .get_by_name(name)?
            .ok_or_else(|| GameSaveError::game_not_found(name))
    }

    pub fn open_set(&self, name: &str) -> GameSaveResult<GameBackupSet> {
        GameBackupSet::new(self.game(name)?)
    }

    /// Name of the game the quick commands act on
    pub fn selected_game(&self) -> Option<&str> {
        self.settings.last_selected_game.as_deref()
    }

    /// Open the named game, or the selected one when `name` is `None`
    pub fn open_set_or_selected(&self, name: Option<&str>) -> GameSaveResult<GameBackupSet> {
        match name.or(self.selected_game()) {
            Some(name) => self.open_set(name),
            None => Err(GameSaveError::Validation(
                "No game given and none selected. Use 'gamesave game select <name>'".into(),
            )),
        }
    }

    pub fn add_game(&self, game: GameConfig) -> GameSaveResult<GameConfig> {
        game.validate()?;
        if self.store.name_exists(&game.name, None)? {
            return Err(GameSaveError::Validation(format!(
                "A game named '{}' already exists",
                game.name
            )));
        }

        self.store.upsert(game.clone(), None)?;
        self.store.save()?;
        info!(game = %game.name, "Added game");
        Ok(game)
    }

    /// Replace the configuration stored as `previous_name`
    pub fn update_game(&mut self, previous_name: &str, game: GameConfig) -> GameSaveResult<()> {
        game.validate()?;
        let previous = self.game(previous_name)?;
        if self.store.name_exists(&game.name, Some(&previous.name))? {
            return Err(GameSaveError::Validation(format!(
                "A game named '{}' already exists",
                game.name
            )));
        }

        self.store.upsert(game.clone(), Some(&previous.name))?;
        self.store.save()?;

        if self.is_selected(&previous.name) && previous.name != game.name {
            self.settings.last_selected_game = Some(game.name.clone());
            self.settings.save(&self.paths)?;
        }

        debug!(game = %game.name, "Updated game");
        Ok(())
    }

    /// Persist the configuration a backup set currently carries
    pub fn save_set(&mut self, set: &GameBackupSet) -> GameSaveResult<()> {
        self.update_game(set.name(), set.config().clone())
    }

    /// Duplicate a game as `"<name> - Copy"`, with monitoring off
    pub fn copy_game(&self, name: &str) -> GameSaveResult<GameConfig> {
        let mut copy = self.game(name)?.clone_with_copy_name();
        while self.store.name_exists(&copy.name, None)? {
            copy = copy.clone_with_copy_name();
        }
        self.add_game(copy)
    }

    pub fn remove_game(&mut self, name: &str) -> GameSaveResult<()> {
        let game = self.game(name)?;
        self.store.delete(&game.name)?;
        self.store.save()?;

        if self.is_selected(&game.name) {
            self.settings.last_selected_game = None;
            self.settings.save(&self.paths)?;
        }

        info!(game = %game.name, "Removed game");
        Ok(())
    }

    /// Remember `name` as the game the quick commands act on
    pub fn select_game(&mut self, name: &str) -> GameSaveResult<GameConfig> {
        let game = self.game(name)?;
        self.settings.last_selected_game = Some(game.name.clone());
        self.settings.save(&self.paths)?;
        Ok(game)
    }

    fn is_selected(&self, name: &str) -> bool {
        self.selected_game()
            .map_or(false, |selected| selected.to_lowercase() == name.to_lowercase())
    }

    /// The selected game's backup set, reporting why there is none
    fn silent_target(&self, report: &mut StatusReport) -> Option<GameBackupSet> {
        let Some(name) = self.selected_game() else {
            report.user("No game selected.");
            return None;
        };

        match self.open_set(name) {
            Ok(set) => Some(set),
            Err(e) => {
                report.error(e.to_string());
                None
            }
        }
    }

    /// Restore the most recent backup of the selected game
    ///
    /// Does nothing but report when there is no game or no backup.
    pub fn restore_most_recent_silent(&self, report: &mut StatusReport) {
        let Some(set) = self.silent_target(report) else {
            return;
        };

        match set.latest_backup() {
            Ok(Some(latest)) => {
                let name = set.name_of(&latest).unwrap_or_default();
                report.record(
                    set.restore(&latest),
                    &format!("Restored {} from '{}'.", set.name(), name),
                );
            }
            Ok(None) => report.user(format!("No backups to restore for {}.", set.name())),
            Err(e) => report.error(e.to_string()),
        }
    }

    /// Back up the selected game reusing the latest backup's tag
    ///
    /// Does nothing but report when there is no game or no backup.
    pub fn backup_silent(&self, report: &mut StatusReport) {
        let Some(set) = self.silent_target(report) else {
            return;
        };

        match set.latest_backup() {
            Ok(Some(latest)) => {
                match set.backup(Some(&latest), None).and_then(|taken| set.name_of(&taken)) {
                    Ok(name) => report.user(format!("Backed up {} as '{}'.", set.name(), name)),
                    Err(e) => report.error(e.to_string()),
                }
            }
            Ok(None) => report.user(format!(
                "No earlier backup of {} to take the tag from.",
                set.name()
            )),
            Err(e) => report.error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::StrategyKind;
    use crate::monitor::MonitoringMode;
    use crate::status::StatusVerbosity;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn quest(root: &Path) -> GameConfig {
        let parent = root.join("saves");
        fs::create_dir_all(parent.join("QuestSave")).unwrap();
        fs::write(parent.join("QuestSave").join("slot1.sav"), b"level 1").unwrap();

        let mut game = GameConfig::new("Quest", &parent, root.join("backups"), StrategyKind::PeerDirectory);
        game.game_directory = "QuestSave".to_string();
        game
    }

    fn open(temp: &TempDir) -> GameLibrary {
        GameLibrary::open(GameSavePaths::with_base_dir(temp.path().join("config"))).unwrap()
    }

    #[test]
    fn test_add_select_and_reopen() {
        let temp = TempDir::new().unwrap();
        let mut library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();
        library.select_game("QUEST").unwrap();

        let reopened = open(&temp);
        assert_eq!(reopened.games().unwrap().len(), 1);
        assert_eq!(reopened.selected_game(), Some("Quest"));
    }

    #[test]
    fn test_add_duplicate_name() {
        let temp = TempDir::new().unwrap();
        let library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();

        let err = library.add_game(quest(temp.path())).unwrap_err();
        assert!(matches!(err, GameSaveError::Validation(_)));
    }

    #[test]
    fn test_copy_game() {
        let temp = TempDir::new().unwrap();
        let library = open(&temp);
        let mut game = quest(temp.path());
        game.monitoring_mode = MonitoringMode::Active;
        library.add_game(game).unwrap();

        let copy = library.copy_game("Quest").unwrap();
        assert_eq!(copy.name, "Quest - Copy");
        assert_eq!(copy.monitoring_mode, MonitoringMode::Off);

        let second = library.copy_game("Quest").unwrap();
        assert_eq!(second.name, "Quest - Copy - Copy");
    }

    #[test]
    fn test_rename_keeps_selection() {
        let temp = TempDir::new().unwrap();
        let mut library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();
        library.select_game("Quest").unwrap();

        let mut renamed = library.game("Quest").unwrap();
        renamed.name = "Quest Remastered".to_string();
        library.update_game("Quest", renamed).unwrap();

        assert_eq!(library.selected_game(), Some("Quest Remastered"));
        assert!(library.game("Quest").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_clears_selection() {
        let temp = TempDir::new().unwrap();
        let mut library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();
        library.select_game("Quest").unwrap();

        library.remove_game("quest").unwrap();
        assert_eq!(library.selected_game(), None);
        assert!(library.games().unwrap().is_empty());
    }

    #[test]
    fn test_silent_entry_points_without_selection() {
        let temp = TempDir::new().unwrap();
        let library = open(&temp);
        let mut report = StatusReport::new(StatusVerbosity::User);

        library.restore_most_recent_silent(&mut report);
        library.backup_silent(&mut report);

        assert!(!report.has_error());
        assert_eq!(report.messages().len(), 2);
    }

    #[test]
    fn test_silent_entry_points_without_backups() {
        let temp = TempDir::new().unwrap();
        let mut library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();
        library.select_game("Quest").unwrap();

        let mut report = StatusReport::default();
        library.backup_silent(&mut report);
        library.restore_most_recent_silent(&mut report);

        assert!(!report.has_error());
        assert!(library.open_set("Quest").unwrap().load_backups().unwrap().is_empty());
    }

    #[test]
    fn test_silent_backup_and_restore() {
        let temp = TempDir::new().unwrap();
        let mut library = open(&temp);
        library.add_game(quest(temp.path())).unwrap();
        library.select_game("Quest").unwrap();

        let set = library.open_set("Quest").unwrap();
        set.backup(None, Some("Start")).unwrap();

        let mut report = StatusReport::default();
        library.backup_silent(&mut report);
        assert!(!report.has_error(), "{}", report);

        let backups = set.load_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].tag(), "Start");

        let save = temp.path().join("saves").join("QuestSave").join("slot1.sav");
        fs::write(&save, b"level 3").unwrap();

        let mut report = StatusReport::default();
        library.restore_most_recent_silent(&mut report);
        assert!(!report.has_error(), "{}", report);
        assert_eq!(fs::read(&save).unwrap(), b"level 1");
    }
}
