//! Monitoring state machine
//!
//! Everything the sampler decides on a tick lives here, free of threads and
//! timers: status classification, the two debounce checks and the automatic
//! backup counter.

use std::fmt;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use crate::error::GameSaveError;

/// Save changes closer together than this many seconds belong to one save burst
pub const QUIET_WINDOW_SECS: i64 = 10;

/// Automatic backup labels wrap after this many backups
const COUNTER_MODULUS: u16 = 1000;

/// How closely a game is watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonitoringMode {
    #[default]
    Off,
    /// Watch and report, backups stay manual
    Passive,
    /// Watch and take automatic backups
    Active,
}

impl MonitoringMode {
    /// Next mode in the `Off -> Passive -> Active -> Off` cycle
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::Passive,
            Self::Passive => Self::Active,
            Self::Active => Self::Off,
        }
    }

    pub fn is_watching(self) -> bool {
        self != Self::Off
    }

    pub fn parse(s: &str) -> Result<Self, GameSaveError> {
        match s.trim().to_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "passive" => Ok(Self::Passive),
            "active" | "auto" => Ok(Self::Active),
            _ => Err(GameSaveError::Validation(format!(
                "Unknown monitoring mode '{}'. Use off, passive or active",
                s
            ))),
        }
    }
}

impl fmt::Display for MonitoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "Off"),
            Self::Passive => write!(f, "Passive"),
            Self::Active => write!(f, "Active"),
        }
    }
}

/// Freshness of the live save compared with the latest backup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringStatus {
    /// The game saved since the latest backup
    Playing,
    /// A backup was restored and can be reverted
    Restored,
    /// Nothing changed since the latest backup
    BackedUp,
}

impl fmt::Display for MonitoringStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::Restored => write!(f, "Restored"),
            Self::BackedUp => write!(f, "Backed up"),
        }
    }
}

/// Timestamps read from disk on one refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitoringSnapshot {
    pub save_time: Option<DateTime<Local>>,
    pub last_backup_time: Option<DateTime<Local>>,
    pub has_revert_artifact: bool,
}

/// Classify a snapshot, `None` when the times cannot be reconciled
///
/// A save older than the latest backup, or no live save at all, leaves the
/// previous status in place.
pub fn classify(snapshot: &MonitoringSnapshot) -> Option<MonitoringStatus> {
    let save = snapshot.save_time?;
    match snapshot.last_backup_time {
        None => Some(MonitoringStatus::Playing),
        Some(backup) if save > backup => Some(MonitoringStatus::Playing),
        Some(backup) if save == backup => Some(if snapshot.has_revert_artifact {
            MonitoringStatus::Restored
        } else {
            MonitoringStatus::BackedUp
        }),
        Some(_) => None,
    }
}

/// What one applied snapshot asks the sampler to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The save time moved and observers should hear about it
    pub notify: bool,
    /// Label of the automatic backup to take
    pub backup_label: Option<String>,
    /// Reason the status could not be derived
    pub anomaly: Option<String>,
}

/// Monitoring state shared between the sampler and its owner
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub mode: MonitoringMode,
    pub status: Option<MonitoringStatus>,
    pub snapshot: MonitoringSnapshot,
    /// Save time accepted after the quiet window
    committed_save_time: Option<DateTime<Local>>,
    /// Last save time observers were told about
    notified_save_time: Option<DateTime<Local>>,
    pub auto_backup_counter: u16,
    pub last_auto_backup: Option<DateTime<Local>>,
}

impl MonitorState {
    pub fn new(mode: MonitoringMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Store a snapshot and reclassify, without touching the debounce state
    pub fn refresh(&mut self, snapshot: MonitoringSnapshot) -> Option<String> {
        self.snapshot = snapshot;
        match classify(&snapshot) {
            Some(status) => {
                self.status = Some(status);
                None
            }
            None if snapshot.save_time.is_none() => Some("Game save not found".to_string()),
            None => Some("Game save time is before the latest backup".to_string()),
        }
    }

    /// Run one sampler tick against a fresh snapshot
    pub fn apply_snapshot(&mut self, snapshot: MonitoringSnapshot) -> TickOutcome {
        let mut outcome = TickOutcome {
            anomaly: self.refresh(snapshot),
            ..TickOutcome::default()
        };

        if snapshot.save_time == self.committed_save_time {
            return outcome;
        }

        outcome.notify = snapshot.save_time != self.notified_save_time;
        self.notified_save_time = snapshot.save_time;

        if let (Some(save), Some(previous)) = (snapshot.save_time, self.committed_save_time) {
            if save - previous < Duration::seconds(QUIET_WINDOW_SECS) {
                return outcome;
            }
        }

        if self.mode == MonitoringMode::Active && snapshot.save_time.is_some() {
            outcome.backup_label = Some(self.next_label());
        }

        self.committed_save_time = snapshot.save_time;
        outcome
    }

    /// Advance the automatic backup counter and render its label
    fn next_label(&mut self) -> String {
        self.auto_backup_counter = (self.auto_backup_counter + 1) % COUNTER_MODULUS;
        format!("{:03}", self.auto_backup_counter)
    }

    /// Accept the current save time without triggering anything
    ///
    /// Used when monitoring starts so the save already on disk is not mistaken
    /// for a new one.
    pub fn baseline(&mut self, snapshot: MonitoringSnapshot) -> Option<String> {
        let anomaly = self.refresh(snapshot);
        self.committed_save_time = snapshot.save_time;
        self.notified_save_time = snapshot.save_time;
        anomaly
    }
}
