//! Backup identity model
//!
//! The structured form of one backup name. An identity is built fresh for
//! each backup, restore or rename and rendered to a name by
//! [`NameCodec`](crate::naming::NameCodec); it is never stored on its own.

use chrono::{DateTime, Local};

use super::game::{GameConfig, Parts};
use super::version::Version;
use crate::error::{GameSaveError, GameSaveResult};

/// Highest reuse count that can be rendered
pub const MAX_REUSE: u8 = 99;

/// Result of counting one more restore of a backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseOutcome {
    /// The counter now holds this value
    Counted(u8),
    /// The counter passed 99 and was reset to 0; a new backup must be taken
    Overflow,
}

/// Decoded metadata of one backup name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupIdentity {
    pub prefix: String,
    pub game_directory: String,
    pub date: String,
    pub version: Version,
    tag: String,
    reuse: u8,
    /// Extension without the leading dot, empty when absent from the name
    pub extension: String,
}

impl BackupIdentity {
    /// A new identity for a game that has no backup to start from
    pub fn fresh(game: &GameConfig, now: DateTime<Local>) -> Self {
        Self {
            prefix: game.save_prefix.to_string(),
            game_directory: game.game_directory.clone(),
            date: game.date_format.render(now),
            version: game.initial_version,
            tag: String::new(),
            reuse: 0,
            extension: game.extension().to_string(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn reuse(&self) -> u8 {
        self.reuse
    }

    /// Set the tag verbatim, as read from a backup name
    pub(crate) fn set_tag_verbatim(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn set_reuse(&mut self, reuse: u8) -> GameSaveResult<()> {
        if reuse > MAX_REUSE {
            return Err(GameSaveError::Validation(format!(
                "Reuse count {} is above {}",
                reuse, MAX_REUSE
            )));
        }
        self.reuse = reuse;
        Ok(())
    }

    /// Count one more restore of this backup
    pub fn increment_reuse(&mut self) -> ReuseOutcome {
        if self.reuse >= MAX_REUSE {
            self.reuse = 0;
            ReuseOutcome::Overflow
        } else {
            self.reuse += 1;
            ReuseOutcome::Counted(self.reuse)
        }
    }

    /// Apply a new tag using the parts merge rule
    ///
    /// A value starting with one of the `parts` markers replaces the existing
    /// tag from the last occurrence of that marker onwards, or is appended
    /// after a space when the marker is absent. Any other value replaces the
    /// whole tag.
    pub fn set_tag(&mut self, value: &str, parts: &Parts) -> GameSaveResult<()> {
        self.tag = merge_tag(&self.tag, value, parts)?;
        Ok(())
    }
}

/// Merge `value` into `existing` following the parts rule
pub fn merge_tag(existing: &str, value: &str, parts: &Parts) -> GameSaveResult<String> {
    let marker = value.chars().next().ok_or(GameSaveError::EmptyTag)?;

    if !parts.contains(marker) {
        return Ok(value.to_string());
    }

    Ok(match existing.rfind(marker) {
        Some(index) => format!("{}{}", &existing[..index], value),
        None if existing.is_empty() => value.to_string(),
        None => format!("{} {}", existing, value),
    })
}
