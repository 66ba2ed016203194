//! Directory backup strategy
//!
//! The game keeps its save in `<parent>/<game_directory>`. Each backup is a
//! full clone of that directory under `<user>/<backup name>`. The revert
//! artifact and automatic backups share `<user>/<revert_suffix>`, which the
//! listing skips.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::strategy::{
    io_error, rename_entry, sorted_entries, to_local, BackupStrategy, MonitorTarget,
};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::GameConfig;
use crate::monitor::MonitoringSnapshot;
use crate::storage::file_io::{copy_dir_replacing, newest_modified};

#[derive(Debug, Clone)]
pub struct DirectoryStrategy {
    game: Arc<GameConfig>,
}

impl DirectoryStrategy {
    pub fn new(game: Arc<GameConfig>) -> Self {
        Self { game }
    }

    /// The directory the game writes to
    pub fn save_location(&self) -> PathBuf {
        self.game.parent_directory.join(&self.game.game_directory)
    }

    pub fn backup_location(&self, name: &str) -> PathBuf {
        self.game.user_directory.join(name)
    }

    fn revert_area(&self) -> PathBuf {
        self.game.user_directory.join(self.game.revert_suffix.as_str())
    }

    pub fn revert_location(&self) -> PathBuf {
        self.revert_area().join(format!(
            "{}_{}",
            self.game.game_directory, self.game.revert_suffix
        ))
    }

    /// File inside a save directory whose time stands for the whole save
    ///
    /// Without a configured save file the newest file in the tree is used.
    fn stamp_path(&self, dir: PathBuf) -> PathBuf {
        match self.game.save_file_name() {
            name if name.is_empty() => dir,
            name => dir.join(name),
        }
    }
}

impl BackupStrategy for DirectoryStrategy {
    fn game(&self) -> &GameConfig {
        &self.game
    }

    fn backup_names(&self) -> GameSaveResult<Vec<String>> {
        let game_dir = self.game.game_directory.as_str();
        let suffix = self.game.revert_suffix.as_str();

        sorted_entries(&self.game.user_directory, |entry, name| {
            entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
                && (game_dir.is_empty() || !name.ends_with(game_dir))
                && !name.ends_with(suffix)
        })
    }

    fn create(&self, name: &str) -> GameSaveResult<()> {
        let source = self.save_location();
        if !source.is_dir() {
            return Err(GameSaveError::save_not_found(source.display().to_string()));
        }

        let dest = self.backup_location(name);
        copy_dir_replacing(&source, &dest).map_err(|e| io_error("back up to", &dest, e))?;

        let revert = self.revert_location();
        if revert.exists() {
            fs::remove_dir_all(&revert).map_err(|e| io_error("remove", &revert, e))?;
        }

        info!(game = %self.game.name, backup = name, "Created backup");
        Ok(())
    }

    fn restore(&self, name: &str) -> GameSaveResult<()> {
        let source = self.backup_location(name);
        if !source.is_dir() {
            return Err(GameSaveError::backup_not_found(name));
        }

        let live = self.save_location();
        if live.exists() {
            let revert = self.revert_location();
            copy_dir_replacing(&live, &revert).map_err(|e| io_error("snapshot", &revert, e))?;
        }

        copy_dir_replacing(&source, &live).map_err(|e| io_error("restore", &live, e))?;

        info!(game = %self.game.name, backup = name, "Restored backup");
        Ok(())
    }

    fn rename(&self, old_name: &str, new_name: &str) -> GameSaveResult<()> {
        rename_entry(&self.game.user_directory, old_name, new_name)
    }

    fn revert(&self) -> GameSaveResult<()> {
        let revert = self.revert_location();
        if !revert.is_dir() {
            return Err(GameSaveError::NoRevertAvailable(self.game.name.clone()));
        }

        let live = self.save_location();
        copy_dir_replacing(&revert, &live).map_err(|e| io_error("revert", &live, e))?;
        fs::remove_dir_all(&revert).map_err(|e| io_error("remove", &revert, e))?;

        info!(game = %self.game.name, "Reverted to the save taken before the last restore");
        Ok(())
    }

    fn delete(&self, name: &str) -> GameSaveResult<()> {
        let path = self.backup_location(name);
        if !path.is_dir() {
            return Err(GameSaveError::backup_not_found(name));
        }

        fs::remove_dir_all(&path).map_err(|e| io_error("delete", &path, e))?;
        info!(game = %self.game.name, backup = name, "Deleted backup");
        Ok(())
    }

    fn has_revert_artifact(&self) -> bool {
        self.revert_location().is_dir()
    }

    fn monitor_target(&self) -> MonitorTarget {
        MonitorTarget {
            directory: self.save_location(),
            filter: "*".to_string(),
        }
    }

    fn status_snapshot(&self) -> GameSaveResult<MonitoringSnapshot> {
        let save_path = self.stamp_path(self.save_location());
        let save_time = newest_modified(&save_path).map_err(|e| io_error("stat", &save_path, e))?;

        let last_backup_time = match self.latest_backup_name()? {
            Some(latest) => {
                let path = self.stamp_path(self.backup_location(&latest));
                newest_modified(&path).map_err(|e| io_error("stat", &path, e))?
            }
            None => None,
        };

        Ok(MonitoringSnapshot {
            save_time: to_local(save_time),
            last_backup_time: to_local(last_backup_time),
            has_revert_artifact: self.has_revert_artifact(),
        })
    }

    fn automatic_backup(&self, label: &str) -> GameSaveResult<PathBuf> {
        let source = self.save_location();
        if !source.is_dir() {
            return Err(GameSaveError::save_not_found(source.display().to_string()));
        }

        let dest = self.revert_area().join(label);
        copy_dir_replacing(&source, &dest).map_err(|e| io_error("back up to", &dest, e))?;

        debug!(game = %self.game.name, path = %dest.display(), "Automatic backup taken");
        Ok(dest)
    }
}
