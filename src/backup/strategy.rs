//! Backup strategy capability set
//!
//! A strategy owns every filesystem operation for one game: where the live
//! save is, where backups and the revert artifact live, and how a backup is
//! copied. The set of strategies is closed, so [`Strategy`] dispatches over
//! the two variants instead of boxing a trait object.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::directory::DirectoryStrategy;
use super::single_file::SingleFileStrategy;
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::{BackupIdentity, GameConfig};
use crate::monitor::MonitoringSnapshot;
use crate::naming::NameCodec;

/// Identifier of a storage strategy as persisted in the game configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StrategyKind {
    /// Each backup is a directory cloned from the game's save directory
    PeerDirectory,
    /// Each backup is a copy of the single save file
    SubordinateUserFile,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PeerDirectory => "peer_directory",
            Self::SubordinateUserFile => "subordinate_user_file",
        }
    }

    pub fn parse(s: &str) -> GameSaveResult<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "peer_directory" | "directory" => Ok(Self::PeerDirectory),
            "subordinate_user_file" | "file" | "single_file" => Ok(Self::SubordinateUserFile),
            _ => Err(GameSaveError::UnsupportedStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for StrategyKind {
    type Error = GameSaveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StrategyKind> for String {
    fn from(value: StrategyKind) -> Self {
        value.as_str().to_string()
    }
}

/// Location a file watcher would observe for a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorTarget {
    pub directory: PathBuf,
    /// Glob style file filter inside `directory`
    pub filter: String,
}

/// Storage operations shared by every strategy
pub trait BackupStrategy {
    /// Configuration the strategy works for
    fn game(&self) -> &GameConfig;

    /// Names of all backups on disk, newest first
    fn backup_names(&self) -> GameSaveResult<Vec<String>>;

    /// Copy the live save into a new backup called `name`
    fn create(&self, name: &str) -> GameSaveResult<()>;

    /// Snapshot the live save into the revert artifact, then overwrite it from `name`
    fn restore(&self, name: &str) -> GameSaveResult<()>;

    /// Move a backup to a new name
    fn rename(&self, old_name: &str, new_name: &str) -> GameSaveResult<()>;

    /// Put the revert artifact back over the live save and discard it
    fn revert(&self) -> GameSaveResult<()>;

    fn delete(&self, name: &str) -> GameSaveResult<()>;

    fn has_revert_artifact(&self) -> bool;

    fn monitor_target(&self) -> MonitorTarget;

    /// Modification times of the live save and of the latest backup
    fn status_snapshot(&self) -> GameSaveResult<MonitoringSnapshot>;

    /// Copy the live save into the automatic backup area under `label`
    fn automatic_backup(&self, label: &str) -> GameSaveResult<PathBuf>;

    /// Decoded identities of the newest `max_count` backups
    ///
    /// Entries whose names cannot be decoded with the current name format are
    /// skipped.
    fn list_backups(&self, max_count: usize) -> GameSaveResult<Vec<BackupIdentity>> {
        let codec = NameCodec::new(self.game());
        let mut backups = Vec::new();

        for name in self.backup_names()? {
            if backups.len() == max_count {
                break;
            }
            match codec.decode(&name) {
                Ok(identity) => backups.push(identity),
                Err(e) => warn!(game = %self.game().name, %name, "Skipping backup: {}", e),
            }
        }

        Ok(backups)
    }

    /// Newest entry whose name decodes under the current name format
    fn latest_backup_name(&self) -> GameSaveResult<Option<String>> {
        let codec = NameCodec::new(self.game());
        Ok(self
            .backup_names()?
            .into_iter()
            .find(|name| codec.decode(name).is_ok()))
    }
}

/// The storage strategy selected for a game
#[derive(Debug, Clone)]
pub enum Strategy {
    Directory(DirectoryStrategy),
    SingleFile(SingleFileStrategy),
}

impl Strategy {
    pub fn for_game(game: Arc<GameConfig>) -> Self {
        match game.strategy {
            StrategyKind::PeerDirectory => Self::Directory(DirectoryStrategy::new(game)),
            StrategyKind::SubordinateUserFile => Self::SingleFile(SingleFileStrategy::new(game)),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Directory(_) => StrategyKind::PeerDirectory,
            Self::SingleFile(_) => StrategyKind::SubordinateUserFile,
        }
    }

    fn inner(&self) -> &dyn BackupStrategy {
        match self {
            Self::Directory(s) => s,
            Self::SingleFile(s) => s,
        }
    }
}

impl BackupStrategy for Strategy {
    fn game(&self) -> &GameConfig {
        self.inner().game()
    }

    fn backup_names(&self) -> GameSaveResult<Vec<String>> {
        self.inner().backup_names()
    }

    fn create(&self, name: &str) -> GameSaveResult<()> {
        self.inner().create(name)
    }

    fn restore(&self, name: &str) -> GameSaveResult<()> {
        self.inner().restore(name)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> GameSaveResult<()> {
        self.inner().rename(old_name, new_name)
    }

    fn revert(&self) -> GameSaveResult<()> {
        self.inner().revert()
    }

    fn delete(&self, name: &str) -> GameSaveResult<()> {
        self.inner().delete(name)
    }

    fn has_revert_artifact(&self) -> bool {
        self.inner().has_revert_artifact()
    }

    fn monitor_target(&self) -> MonitorTarget {
        self.inner().monitor_target()
    }

    fn status_snapshot(&self) -> GameSaveResult<MonitoringSnapshot> {
        self.inner().status_snapshot()
    }

    fn automatic_backup(&self, label: &str) -> GameSaveResult<PathBuf> {
        self.inner().automatic_backup(label)
    }
}

/// Wrap an I/O failure with the operation and path it happened on
pub(crate) fn io_error(action: &str, path: &Path, err: io::Error) -> GameSaveError {
    if err.kind() == io::ErrorKind::NotFound {
        return GameSaveError::NotFound {
            entity_type: "Path",
            identifier: path.display().to_string(),
        };
    }
    GameSaveError::Io(format!("Failed to {} {}: {}", action, path.display(), err))
}

pub(crate) fn to_local(time: Option<SystemTime>) -> Option<DateTime<Local>> {
    time.map(DateTime::<Local>::from)
}

/// Entry names in `dir` accepted by `keep`, sorted newest first
///
/// A missing directory has no backups yet.
pub(crate) fn sorted_entries<F>(dir: &Path, mut keep: F) -> GameSaveResult<Vec<String>>
where
    F: FnMut(&fs::DirEntry, &str) -> bool,
{
    if !dir.exists() {
        debug!(path = %dir.display(), "Backup directory does not exist yet");
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_error("read", dir, e))? {
        let entry = entry.map_err(|e| io_error("read", dir, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if keep(&entry, &name) {
            names.push(name);
        }
    }

    names.sort_by(|a, b| b.cmp(a));
    Ok(names)
}

/// Rename one entry of `dir`, tolerating case-insensitive filesystems
///
/// Names equal ignoring case go through an intermediate `<new>_temp` entry.
/// Any other occupied target is a duplicate, including an entry whose name
/// differs from the source only by case on a case-sensitive filesystem.
pub(crate) fn rename_entry(dir: &Path, old_name: &str, new_name: &str) -> GameSaveResult<()> {
    let source = dir.join(old_name);
    let target = dir.join(new_name);

    if !source.exists() {
        return Err(GameSaveError::backup_not_found(old_name));
    }

    if old_name.to_lowercase() == new_name.to_lowercase() {
        if has_entry_named(dir, new_name)? {
            return Err(GameSaveError::DuplicateName(new_name.to_string()));
        }
        let staging = dir.join(format!("{}_temp", new_name));
        fs::rename(&source, &staging).map_err(|e| io_error("rename", &source, e))?;
        fs::rename(&staging, &target).map_err(|e| io_error("rename", &staging, e))?;
    } else {
        if target.exists() {
            return Err(GameSaveError::DuplicateName(new_name.to_string()));
        }
        fs::rename(&source, &target).map_err(|e| io_error("rename", &source, e))?;
    }

    debug!(from = old_name, to = new_name, "Renamed backup");
    Ok(())
}

/// Whether `dir` lists an entry spelled exactly `name`
///
/// A case-insensitive filesystem lists the source under its own spelling, so
/// only a separate entry matches.
fn has_entry_named(dir: &Path, name: &str) -> GameSaveResult<bool> {
    for entry in fs::read_dir(dir).map_err(|e| io_error("read", dir, e))? {
        let entry = entry.map_err(|e| io_error("read", dir, e))?;
        if entry.file_name().to_string_lossy() == name {
            return Ok(true);
        }
    }
    Ok(false)
}
