//! Backup CLI commands
//!
//! Implements CLI commands for taking, restoring and managing the backups of
//! one game. Every command acts on the selected game unless `--game` is given.

use clap::Subcommand;

use crate::backup::{BackupStrategy, GameBackupSet};
use crate::error::{GameSaveError, GameSaveResult};
use crate::models::BackupIdentity;
use crate::services::GameLibrary;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// List backups, newest first
    List {
        /// Game name (defaults to the selected game)
        #[arg(short, long)]
        game: Option<String>,
        /// Show at most this many backups
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Take a new backup of the live save
    Create {
        /// Tag for the new backup; marks such as '-' or '+' replace only part of the tag
        #[arg(allow_hyphen_values = true)]
        tag: Option<String>,
        /// Game name (defaults to the selected game)
        #[arg(short, long)]
        game: Option<String>,
        /// Backup to take the version and tag from (defaults to the latest)
        #[arg(long)]
        from: Option<String>,
    },

    /// Restore a backup over the live save
    Restore {
        /// Backup name (use 'latest' for the most recent)
        backup: String,
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Change the tag of a backup
    Rename {
        /// Backup name
        backup: String,
        /// New tag
        #[arg(allow_hyphen_values = true)]
        tag: String,
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Delete a backup
    Delete {
        /// Backup name
        backup: String,
        #[arg(short, long)]
        game: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Undo the last restore
    Revert {
        #[arg(short, long)]
        game: Option<String>,
    },
}

/// Handle a backup command
pub fn handle_backup_command(library: &GameLibrary, cmd: BackupCommands) -> GameSaveResult<()> {
    match cmd {
        BackupCommands::List { game, max } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let mut backups = set.load_backups()?;
            if let Some(max) = max {
                backups.truncate(max);
            }

            if backups.is_empty() {
                println!("No backups found for {}.", set.name());
                println!("Create one with: gamesave backup create [tag]");
                return Ok(());
            }

            println!("Backups of {}", set.name());
            println!("{}", "=".repeat(11 + set.name().len()));
            println!();

            for (i, backup) in backups.iter().enumerate() {
                println!("  {:>3}. {}", i + 1, set.name_of(backup)?);
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
            if set.strategy().has_revert_artifact() {
                println!("A restore can be reverted with: gamesave backup revert");
            }
        }

        BackupCommands::Create { tag, game, from } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let base = match from {
                Some(name) => Some(set.find_backup(&name)?),
                None => set.latest_backup()?,
            };

            let taken = set.backup(base.as_ref(), tag.as_deref())?;
            println!("Backup created: {}", set.name_of(&taken)?);
        }

        BackupCommands::Restore { backup, game } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let identity = resolve_backup(&set, &backup)?;
            let restored_from = set.name_of(&identity)?;

            let updated = set.restore(&identity)?;
            println!("Restored {} from: {}", set.name(), restored_from);

            let updated_name = set.name_of(&updated)?;
            if updated_name != restored_from {
                println!("Backup is now: {}", updated_name);
            }
            println!("Undo with: gamesave backup revert");
        }

        BackupCommands::Rename { backup, tag, game } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let identity = resolve_backup(&set, &backup)?;

            let renamed = set.rename(&identity, &tag)?;
            println!("Renamed to: {}", set.name_of(&renamed)?);
        }

        BackupCommands::Delete {
            backup,
            game,
            force,
        } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let identity = resolve_backup(&set, &backup)?;
            let name = set.name_of(&identity)?;

            if !force {
                println!("This will permanently delete '{}'.", name);
                println!("To proceed, run again with --force flag:");
                println!("  gamesave backup delete \"{}\" --force", name);
                return Ok(());
            }

            set.delete(&identity)?;
            println!("Deleted backup: {}", name);
        }

        BackupCommands::Revert { game } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            set.revert()?;
            println!("Reverted {} to the save it had before the last restore.", set.name());
        }
    }

    Ok(())
}

/// Resolve a backup name, or "latest"
fn resolve_backup(set: &GameBackupSet, backup: &str) -> GameSaveResult<BackupIdentity> {
    if backup.eq_ignore_ascii_case("latest") {
        return set
            .latest_backup()?
            .ok_or_else(|| GameSaveError::backup_not_found("latest"));
    }
    set.find_backup(backup)
}
