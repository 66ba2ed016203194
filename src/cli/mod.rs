//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod backup;
pub mod game;
pub mod monitor;

pub use backup::{handle_backup_command, BackupCommands};
pub use game::{handle_game_command, GameCommands};
pub use monitor::{handle_monitor_command, MonitorCommands};
