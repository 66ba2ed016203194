//! Single file backup strategy
//!
//! The game writes one save file, `<parent>/<prefix>.<extension>`. Backups are
//! copies of that file in `<user>[/<game_directory>]`, named by the codec with
//! the extension kept at the end. The revert artifact sits beside them as
//! `<save file>.<revert_suffix>`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::strategy::{
    io_error, rename_entry, sorted_entries, to_local, BackupStrategy, MonitorTarget,
};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::GameConfig;
use crate::monitor::MonitoringSnapshot;
use crate::storage::file_io::{copy_file_preserving_mtime, newest_modified};

#[derive(Debug, Clone)]
pub struct SingleFileStrategy {
    game: Arc<GameConfig>,
}

impl SingleFileStrategy {
    pub fn new(game: Arc<GameConfig>) -> Self {
        Self { game }
    }

    pub fn save_location(&self) -> PathBuf {
        self.game.parent_directory.join(self.game.save_file_name())
    }

    /// Folder holding this game's backups
    pub fn backup_directory(&self) -> PathBuf {
        if self.game.game_directory.is_empty() {
            self.game.user_directory.clone()
        } else {
            self.game.user_directory.join(&self.game.game_directory)
        }
    }

    pub fn backup_location(&self, name: &str) -> PathBuf {
        self.backup_directory().join(name)
    }

    fn revert_name(&self) -> String {
        format!("{}.{}", self.game.save_file_name(), self.game.revert_suffix)
    }

    pub fn revert_location(&self) -> PathBuf {
        self.backup_directory().join(self.revert_name())
    }

    fn ensure_parent(&self, path: &Path) -> GameSaveResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("create", parent, e))?;
        }
        Ok(())
    }

    /// Copy `from` over `to`, creating the destination folder as needed
    fn copy(&self, action: &str, from: &Path, to: &Path) -> GameSaveResult<()> {
        self.ensure_parent(to)?;
        copy_file_preserving_mtime(from, to).map_err(|e| io_error(action, to, e))
    }
}

impl BackupStrategy for SingleFileStrategy {
    fn game(&self) -> &GameConfig {
        &self.game
    }

    fn backup_names(&self) -> GameSaveResult<Vec<String>> {
        let revert = self.revert_name();
        let suffix = match self.game.extension() {
            "" => None,
            ext => Some(format!(".{}", ext)),
        };

        sorted_entries(&self.backup_directory(), |entry, name| {
            entry.file_type().map(|t| t.is_file()).unwrap_or(false)
                && name != revert
                && suffix.as_deref().map_or(true, |s| name.ends_with(s))
        })
    }

    fn create(&self, name: &str) -> GameSaveResult<()> {
        let source = self.save_location();
        if !source.is_file() {
            return Err(GameSaveError::save_not_found(source.display().to_string()));
        }

        self.copy("back up to", &source, &self.backup_location(name))?;

        let revert = self.revert_location();
        if revert.exists() {
            fs::remove_file(&revert).map_err(|e| io_error("remove", &revert, e))?;
        }

        info!(game = %self.game.name, backup = name, "Created backup");
        Ok(())
    }

    fn restore(&self, name: &str) -> GameSaveResult<()> {
        let source = self.backup_location(name);
        if !source.is_file() {
            return Err(GameSaveError::backup_not_found(name));
        }

        let live = self.save_location();
        if live.is_file() {
            self.copy("snapshot", &live, &self.revert_location())?;
        } else {
            debug!(path = %live.display(), "No live save to keep for revert");
        }

        self.copy("restore", &source, &live)?;

        info!(game = %self.game.name, backup = name, "Restored backup");
        Ok(())
    }

    fn rename(&self, old_name: &str, new_name: &str) -> GameSaveResult<()> {
        rename_entry(&self.backup_directory(), old_name, new_name)
    }

    fn revert(&self) -> GameSaveResult<()> {
        let revert = self.revert_location();
        if !revert.is_file() {
            return Err(GameSaveError::NoRevertAvailable(self.game.name.clone()));
        }

        self.copy("revert", &revert, &self.save_location())?;
        fs::remove_file(&revert).map_err(|e| io_error("remove", &revert, e))?;

        info!(game = %self.game.name, "Reverted to the save taken before the last restore");
        Ok(())
    }

    fn delete(&self, name: &str) -> GameSaveResult<()> {
        let path = self.backup_location(name);
        if !path.is_file() {
            return Err(GameSaveError::backup_not_found(name));
        }

        fs::remove_file(&path).map_err(|e| io_error("delete", &path, e))?;
        info!(game = %self.game.name, backup = name, "Deleted backup");
        Ok(())
    }

    fn has_revert_artifact(&self) -> bool {
        self.revert_location().is_file()
    }

    fn monitor_target(&self) -> MonitorTarget {
        let filter = match self.game.save_file.as_ref() {
            Some(file) => format!("{}.*", file.prefix),
            None => "*".to_string(),
        };
        MonitorTarget {
            directory: self.game.parent_directory.clone(),
            filter,
        }
    }

    fn status_snapshot(&self) -> GameSaveResult<MonitoringSnapshot> {
        let live = self.save_location();
        let save_time = newest_modified(&live).map_err(|e| io_error("stat", &live, e))?;

        let last_backup_time = match self.latest_backup_name()? {
            Some(latest) => {
                let path = self.backup_location(&latest);
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
        if !source.is_file() {
            return Err(GameSaveError::save_not_found(source.display().to_string()));
        }

        let file_name = match self.game.extension() {
            "" => label.to_string(),
            ext => format!("{}.{}", label, ext),
        };
        let dest = self
            .game
            .user_directory
            .join(self.game.revert_suffix.as_str())
            .join(file_name);
        self.copy("back up to", &source, &dest)?;

        debug!(game = %self.game.name, path = %dest.display(), "Automatic backup taken");
        Ok(dest)
    }
}
