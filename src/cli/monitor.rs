//! Monitor CLI commands
//!
//! Implements CLI commands for the save location monitor: the status view,
//! mode changes, and a foreground watch that prints sampler events.

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use clap::Subcommand;

use crate::backup::{BackupStrategy, GameBackupSet};
use crate::error::GameSaveResult;
use crate::monitor::{MonitorEvent, MonitorState, MonitoringMode};
use crate::services::GameLibrary;

/// Monitor subcommands
#[derive(Subcommand)]
pub enum MonitorCommands {
    /// Show save and backup times and the derived status
    Status {
        /// Game name (defaults to the selected game)
        #[arg(short, long)]
        game: Option<String>,
    },
    /// Move to the next monitoring mode (off, passive, active)
    Cycle {
        #[arg(short, long)]
        game: Option<String>,
    },
    /// Set the monitoring mode
    Set {
        /// off, passive or active
        mode: String,
        #[arg(short, long)]
        game: Option<String>,
    },
    /// Watch the save location in the foreground and print what happens
    Watch {
        #[arg(short, long)]
        game: Option<String>,
        /// Stop after this many seconds (runs until interrupted otherwise)
        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

/// Handle a monitor command
pub fn handle_monitor_command(library: &mut GameLibrary, cmd: MonitorCommands) -> GameSaveResult<()> {
    match cmd {
        MonitorCommands::Status { game } => {
            let set = library.open_set_or_selected(game.as_deref())?;
            let state = set.monitor_state()?;
            print_status(&set, &state);
        }

        MonitorCommands::Cycle { game } => {
            let mut set = library.open_set_or_selected(game.as_deref())?;
            let mode = set.cycle_monitoring_mode()?;
            set.lose_focus();
            library.save_set(&set)?;
            println!("Monitoring for {} is now {}", set.name(), mode);
        }

        MonitorCommands::Set { mode, game } => {
            let mode = MonitoringMode::parse(&mode)?;
            let mut set = library.open_set_or_selected(game.as_deref())?;
            set.set_monitoring_mode(mode)?;
            set.lose_focus();
            library.save_set(&set)?;
            println!("Monitoring for {} is now {}", set.name(), mode);
        }

        MonitorCommands::Watch { game, seconds } => {
            let mut set = library.open_set_or_selected(game.as_deref())?;
            if !set.monitoring_mode().is_watching() {
                println!("Monitoring is off for {}.", set.name());
                println!("Turn it on with: gamesave monitor set passive");
                return Ok(());
            }

            watch(&mut set, seconds.map(Duration::from_secs))?;
        }
    }

    Ok(())
}

fn watch(set: &mut GameBackupSet, limit: Option<Duration>) -> GameSaveResult<()> {
    let events = set.gain_focus()?;
    let target = set.strategy().monitor_target();
    println!(
        "Watching {} in {} ({}), mode {}",
        set.name(),
        target.directory.display(),
        target.filter,
        set.monitoring_mode()
    );

    let deadline = limit.map(|limit| Instant::now() + limit);
    loop {
        let wait = match deadline {
            Some(deadline) => match deadline.checked_duration_since(Instant::now()) {
                Some(remaining) => remaining,
                None => break,
            },
            None => Duration::from_secs(3600),
        };

        match events.recv_timeout(wait) {
            Ok(event) => print_event(&event),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    set.lose_focus();
    println!("Stopped watching {}.", set.name());
    Ok(())
}

fn print_event(event: &MonitorEvent) {
    let now = Local::now().format("%H:%M:%S");
    match event {
        MonitorEvent::Snapshot { snapshot, status } => {
            let status = status.map_or_else(|| "Unknown".to_string(), |s| s.to_string());
            println!("[{}] Save changed at {}: {}", now, clock(snapshot.save_time), status);
        }
        MonitorEvent::AutomaticBackup { label, path } => {
            println!("[{}] Automatic backup {} taken: {}", now, label, path.display());
        }
        MonitorEvent::ModeChanged(mode) => println!("[{}] Monitoring is now {}", now, mode),
        MonitorEvent::Anomaly(reason) => println!("[{}] {}", now, reason),
        MonitorEvent::Error(message) => eprintln!("[{}] Error: {}", now, message),
    }
}

fn print_status(set: &GameBackupSet, state: &MonitorState) {
    let status = state
        .status
        .map_or_else(|| "Unknown".to_string(), |s| s.to_string());
    let last_auto = state
        .last_auto_backup
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!("Game:            {}", set.name());
    println!("Mode:            {}", state.mode);
    println!("Status:          {}", status);
    println!("Save time:       {}", clock(state.snapshot.save_time));
    println!("Last backup:     {}", clock(state.snapshot.last_backup_time));
    println!(
        "Revert:          {}",
        if state.snapshot.has_revert_artifact {
            "available"
        } else {
            "none"
        }
    );
    println!("Auto backups:    {:03} (last {})", state.auto_backup_counter, last_auto);
}

fn clock(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
