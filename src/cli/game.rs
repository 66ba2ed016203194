//! Game CLI commands
//!
//! Implements CLI commands for adding, editing and selecting games.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::backup::StrategyKind;
use crate::error::GameSaveResult;
use crate::models::{
    DateFormat, GameConfig, Parts, RevertSuffix, SaveFile, SavePrefix, Separator, Version,
};
use crate::monitor::MonitoringMode;
use crate::services::GameLibrary;

/// Game subcommands
#[derive(Subcommand)]
pub enum GameCommands {
    /// List all configured games
    List,
    /// Show a game's configuration
    Show {
        /// Game name
        game: String,
    },
    /// Add a new game
    Add {
        /// Game name
        name: String,
        /// Folder where the game writes its save
        #[arg(long)]
        parent: PathBuf,
        /// Folder where backups are kept
        #[arg(long)]
        user: PathBuf,
        /// Storage strategy (peer_directory or subordinate_user_file)
        #[arg(short, long, default_value = "peer_directory")]
        strategy: String,
        #[command(flatten)]
        options: GameOptions,
    },
    /// Change a game's configuration
    Edit {
        /// Game name
        game: String,
        /// New game name
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        parent: Option<PathBuf>,
        #[arg(long)]
        user: Option<PathBuf>,
        #[arg(short, long)]
        strategy: Option<String>,
        #[command(flatten)]
        options: GameOptions,
    },
    /// Duplicate a game under a "- Copy" name
    Copy {
        /// Game name
        game: String,
    },
    /// Remove a game (its backups stay on disk)
    Remove {
        /// Game name
        game: String,
    },
    /// Select the game the quick commands act on
    Select {
        /// Game name
        game: String,
    },
}

/// Naming and storage settings shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct GameOptions {
    /// Sub folder of the parent folder holding the save
    #[arg(short = 'g', long)]
    game_dir: Option<String>,
    /// Save file name without extension (single file strategy)
    #[arg(long)]
    save_file: Option<String>,
    /// Save file extension without the dot
    #[arg(short, long)]
    extension: Option<String>,
    /// Backup name format, e.g. "PsD V T R"
    #[arg(long)]
    name_format: Option<String>,
    /// strftime pattern for backup dates
    #[arg(long)]
    date_format: Option<String>,
    /// Version pattern, e.g. "v000.00"
    #[arg(long)]
    version_format: Option<String>,
    /// Version of the first backup
    #[arg(long)]
    initial_version: Option<String>,
    /// Prefix of backup names
    #[arg(short, long)]
    prefix: Option<String>,
    /// Tag marks that replace only part of a tag
    #[arg(long)]
    parts: Option<String>,
    /// Text rendered for each 's' in the name format
    #[arg(long)]
    separator: Option<String>,
    /// Number of backups listed
    #[arg(long)]
    max_backups: Option<usize>,
    /// Name of the revert artifact and automatic backup folder
    #[arg(long)]
    revert_suffix: Option<String>,
    /// Monitoring mode (off, passive or active)
    #[arg(long)]
    mode: Option<String>,
}

impl GameOptions {
    fn apply(self, game: &mut GameConfig) -> GameSaveResult<()> {
        if let Some(dir) = self.game_dir {
            game.game_directory = dir;
        }

        if self.save_file.is_some() || self.extension.is_some() {
            let current = game.save_file.clone().unwrap_or_default();
            let prefix = self.save_file.unwrap_or_else(|| current.prefix.to_string());
            let extension = self.extension.unwrap_or_else(|| current.extension.to_string());
            game.save_file = Some(SaveFile::new(&prefix, &extension)?);
        }

        if let Some(pattern) = self.date_format {
            game.date_format = DateFormat::parse(&pattern)?;
        }
        if let Some(prefix) = self.prefix {
            game.save_prefix = SavePrefix::parse(&prefix)?;
        }
        if let Some(parts) = self.parts {
            game.parts = Parts::parse(&parts)?;
        }
        if let Some(separator) = self.separator {
            game.separator = Separator::parse(&separator)?;
        }
        if let Some(suffix) = self.revert_suffix {
            game.revert_suffix = RevertSuffix::parse(&suffix)?;
        }
        if let Some(max) = self.max_backups {
            game.max_backups = max;
        }
        if let Some(mode) = self.mode {
            game.monitoring_mode = MonitoringMode::parse(&mode)?;
        }

        match (self.version_format, self.initial_version) {
            (Some(format), Some(version)) => {
                game.initial_version = Version::parse(&version)?;
                game.set_version_format(&format)?;
            }
            (Some(format), None) => game.set_version_format(&format)?,
            (None, Some(version)) => game.set_initial_version(&version)?,
            (None, None) => {}
        }

        if let Some(format) = self.name_format {
            game.set_name_format(&format)?;
        }

        game.validate()
    }
}

/// Handle a game command
pub fn handle_game_command(library: &mut GameLibrary, cmd: GameCommands) -> GameSaveResult<()> {
    match cmd {
        GameCommands::List => {
            let games = library.games()?;

            if games.is_empty() {
                println!("No games configured.");
                println!("Add one with: gamesave game add <name> --parent <dir> --user <dir>");
                return Ok(());
            }

            let selected = library.selected_game().map(str::to_lowercase);
            println!("{:30} {:22} {:8}", "Name", "Strategy", "Monitor");
            println!("{}", "-".repeat(62));

            for game in &games {
                let marker = if selected.as_deref() == Some(game.name.to_lowercase().as_str()) {
                    "*"
                } else {
                    ""
                };
                println!(
                    "{:30} {:22} {:8}{}",
                    truncate(&game.name, 30),
                    game.strategy.to_string(),
                    game.monitoring_mode.to_string(),
                    marker
                );
            }

            println!("\nTotal: {} games", games.len());
            if selected.is_some() {
                println!("* = selected for quick-backup and quick-restore");
            }
        }

        GameCommands::Show { game } => {
            let game = library.game(&game)?;
            print_game(&game);
        }

        GameCommands::Add {
            name,
            parent,
            user,
            strategy,
            options,
        } => {
            let mut game = GameConfig::new(name, parent, user, StrategyKind::parse(&strategy)?);
            options.apply(&mut game)?;
            let game = library.add_game(game)?;
            println!("Added game: {}", game);
        }

        GameCommands::Edit {
            game,
            name,
            parent,
            user,
            strategy,
            options,
        } => {
            let mut updated = library.game(&game)?;
            let previous_name = updated.name.clone();

            if let Some(name) = name {
                updated.name = name;
            }
            if let Some(parent) = parent {
                updated.parent_directory = parent;
            }
            if let Some(user) = user {
                updated.user_directory = user;
            }
            if let Some(strategy) = strategy {
                updated.strategy = StrategyKind::parse(&strategy)?;
            }
            options.apply(&mut updated)?;

            library.update_game(&previous_name, updated.clone())?;
            println!("Updated game: {}", updated);
        }

        GameCommands::Copy { game } => {
            let copy = library.copy_game(&game)?;
            println!("Added game: {}", copy);
        }

        GameCommands::Remove { game } => {
            library.remove_game(&game)?;
            println!("Removed game: {}", game);
            println!("Backups on disk were left in place.");
        }

        GameCommands::Select { game } => {
            let game = library.select_game(&game)?;
            println!("Selected game: {}", game.name);
        }
    }

    Ok(())
}

fn print_game(game: &GameConfig) {
    println!("Game: {}", game.name);
    println!("Strategy:         {}", game.strategy);
    println!("Save folder:      {}", game.parent_directory.display());
    println!("Backup folder:    {}", game.user_directory.display());
    if !game.game_directory.is_empty() {
        println!("Game directory:   {}", game.game_directory);
    }
    if game.save_file.is_some() {
        println!("Save file:        {}", game.save_file_name());
    }
    println!();
    println!("Name format:      {}", game.name_format);
    println!("Date format:      {}", game.date_format);
    println!("Version format:   {}", game.version_format.pattern());
    println!("Initial version:  {}", game.initial_version);
    println!("Prefix:           {}", game.save_prefix);
    println!("Separator:        '{}'", game.separator);
    println!("Parts:            {}", game.parts);
    println!("Max backups:      {}", game.max_backups);
    println!("Revert suffix:    {}", game.revert_suffix);
    println!("Monitoring:       {}", game.monitoring_mode);
}

/// Truncate a string to a maximum length
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
