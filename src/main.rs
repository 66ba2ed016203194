use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use gamesave::cli::{
    handle_backup_command, handle_game_command, handle_monitor_command, BackupCommands,
    GameCommands, MonitorCommands,
};
use gamesave::config::GameSavePaths;
use gamesave::logging::init_logging;
use gamesave::services::GameLibrary;
use gamesave::status::StatusReport;

#[derive(Parser)]
#[command(
    name = "gamesave",
    version,
    about = "Versioned, tagged backups of game save data",
    long_about = "gamesave keeps backups of game saves under names that carry \
                  their date, version, tag and reuse count, restores them with \
                  one level of undo, and can watch a save location to take \
                  automatic backups."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Game management commands
    #[command(subcommand)]
    Game(GameCommands),

    /// Backup commands for one game
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Save location monitoring commands
    #[command(subcommand)]
    Monitor(MonitorCommands),

    /// Restore the most recent backup of the selected game
    QuickRestore,

    /// Back up the selected game, keeping the latest backup's tag
    QuickBackup,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = GameSavePaths::new()?;
    let mut library = GameLibrary::open(paths)?;

    match cli.command {
        Some(Commands::Game(cmd)) => {
            handle_game_command(&mut library, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&library, cmd)?;
        }
        Some(Commands::Monitor(cmd)) => {
            handle_monitor_command(&mut library, cmd)?;
        }
        Some(Commands::QuickRestore) => {
            let mut report = StatusReport::new(library.settings().status_verbosity);
            library.restore_most_recent_silent(&mut report);
            finish(report);
        }
        Some(Commands::QuickBackup) => {
            let mut report = StatusReport::new(library.settings().status_verbosity);
            library.backup_silent(&mut report);
            finish(report);
        }
        Some(Commands::Config) => {
            let paths = library.paths();
            let settings = library.settings();
            println!("gamesave Configuration");
            println!("======================");
            println!("Config directory: {}", paths.base_dir().display());
            println!("Game list:        {}", paths.games_file().display());
            println!("Settings:         {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!(
                "  Selected game:    {}",
                settings.last_selected_game.as_deref().unwrap_or("(none)")
            );
            println!("  Status messages:  {:?}", settings.status_verbosity);
        }
        None => {
            println!("gamesave - versioned backups of game saves");
            println!();
            println!("Run 'gamesave --help' for usage information.");
        }
    }

    Ok(())
}

/// Print a quick command's report, exiting non-zero if it holds an error
fn finish(report: StatusReport) {
    if report.has_error() {
        eprintln!("{}", report);
        std::process::exit(1);
    }
    if !report.is_empty() {
        println!("{}", report);
    }
}
