//! Periodic sampler
//!
//! One background thread per watched game. Each tick reads a snapshot through
//! the game's strategy, feeds it to [`MonitorState`], and hands the resulting
//! events to observers over bounded channels. The thread never waits on an
//! observer: a full queue loses the event.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use super::state::{MonitorState, MonitoringMode, MonitoringSnapshot, MonitoringStatus};
use crate::backup::BackupStrategy;
use crate::error::{GameSaveError, GameSaveResult};

/// Time between two samples
pub const SAMPLE_PERIOD: Duration = Duration::from_secs(1);

/// Events buffered per observer before new ones are dropped
const OBSERVER_QUEUE: usize = 64;

/// Notification sent from the sampler to observers
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    /// The live save changed
    Snapshot {
        snapshot: MonitoringSnapshot,
        status: Option<MonitoringStatus>,
    },
    AutomaticBackup {
        label: String,
        path: PathBuf,
    },
    ModeChanged(MonitoringMode),
    /// The snapshot could not be classified
    Anomaly(String),
    /// A tick failed; sampling continues
    Error(String),
}

type Observers = Arc<Mutex<Vec<SyncSender<MonitorEvent>>>>;

struct Sampler {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Watches one game's save through its strategy
pub struct MonitoringEngine<S> {
    strategy: Arc<S>,
    state: Arc<Mutex<MonitorState>>,
    observers: Observers,
    sampler: Option<Sampler>,
    period: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn broadcast(observers: &Mutex<Vec<SyncSender<MonitorEvent>>>, event: MonitorEvent) {
    lock(observers).retain(|observer| match observer.try_send(event.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("Observer queue full, dropping monitor event");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    });
}

/// One sampler tick
fn run_tick<S: BackupStrategy>(
    strategy: &S,
    state: &Mutex<MonitorState>,
    observers: &Mutex<Vec<SyncSender<MonitorEvent>>>,
) {
    let snapshot = match strategy.status_snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(game = %strategy.game().name, "Monitoring tick failed: {}", e);
            broadcast(observers, MonitorEvent::Error(e.to_string()));
            return;
        }
    };

    let (outcome, status) = {
        let mut state = lock(state);
        let outcome = state.apply_snapshot(snapshot);
        (outcome, state.status)
    };

    if outcome.notify {
        if let Some(anomaly) = outcome.anomaly {
            broadcast(observers, MonitorEvent::Anomaly(anomaly));
        }
        broadcast(observers, MonitorEvent::Snapshot { snapshot, status });
    }

    if let Some(label) = outcome.backup_label {
        match strategy.automatic_backup(&label) {
            Ok(path) => {
                lock(state).last_auto_backup = Some(Local::now());
                info!(game = %strategy.game().name, %label, "Automatic backup taken");
                broadcast(observers, MonitorEvent::AutomaticBackup { label, path });
            }
            Err(e) => {
                warn!(game = %strategy.game().name, "Automatic backup failed: {}", e);
                broadcast(observers, MonitorEvent::Error(e.to_string()));
            }
        }
    }
}

impl<S> MonitoringEngine<S> {
    pub fn mode(&self) -> MonitoringMode {
        lock(&self.state).mode
    }

    /// Copy of the current monitoring state
    pub fn state(&self) -> MonitorState {
        lock(&self.state).clone()
    }

    pub fn is_running(&self) -> bool {
        self.sampler.is_some()
    }

    /// Register an observer; it stays attached until [`stop`](Self::stop)
    pub fn subscribe(&self) -> Receiver<MonitorEvent> {
        let (sender, receiver) = mpsc::sync_channel(OBSERVER_QUEUE);
        lock(&self.observers).push(sender);
        receiver
    }

    /// Stop the sampler thread, keeping observers attached
    fn halt(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            let _ = sampler.stop.send(());
            if sampler.handle.join().is_err() {
                warn!("Monitoring thread panicked");
            }
            debug!("Monitoring stopped");
        }
    }

    /// Stop sampling and detach every observer
    ///
    /// Calling this on a stopped engine does nothing.
    pub fn stop(&mut self) {
        self.halt();
        lock(&self.observers).clear();
    }
}

impl<S> MonitoringEngine<S>
where
    S: BackupStrategy + Send + Sync + 'static,
{
    pub fn new(strategy: Arc<S>, mode: MonitoringMode) -> Self {
        Self {
            strategy,
            state: Arc::new(Mutex::new(MonitorState::new(mode))),
            observers: Arc::new(Mutex::new(Vec::new())),
            sampler: None,
            period: SAMPLE_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Read a snapshot now and reclassify the status
    pub fn refresh(&self) -> GameSaveResult<MonitorState> {
        let snapshot = self.strategy.status_snapshot()?;
        let mut state = lock(&self.state);
        if let Some(anomaly) = state.refresh(snapshot) {
            debug!(game = %self.strategy.game().name, "{}", anomaly);
        }
        Ok(state.clone())
    }

    /// Run one tick on the calling thread
    pub fn tick(&self) {
        run_tick(self.strategy.as_ref(), &self.state, &self.observers);
    }

    /// Start the sampler unless it is running or the mode is `Off`
    pub fn start(&mut self) -> GameSaveResult<()> {
        if self.sampler.is_some() || !self.mode().is_watching() {
            return Ok(());
        }

        match self.strategy.status_snapshot() {
            Ok(snapshot) => {
                lock(&self.state).baseline(snapshot);
            }
            Err(e) => warn!(game = %self.strategy.game().name, "Could not read initial snapshot: {}", e),
        }

        let (stop, stop_signal) = mpsc::channel();
        let strategy = Arc::clone(&self.strategy);
        let state = Arc::clone(&self.state);
        let observers = Arc::clone(&self.observers);
        let period = self.period;

        let handle = thread::Builder::new()
            .name("gamesave-monitor".to_string())
            .spawn(move || loop {
                match stop_signal.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => run_tick(strategy.as_ref(), &state, &observers),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| GameSaveError::Io(format!("Failed to start monitoring thread: {}", e)))?;

        self.sampler = Some(Sampler { stop, handle });
        debug!(game = %self.strategy.game().name, "Monitoring started");
        Ok(())
    }

    /// Switch mode, starting or stopping the sampler as needed
    pub fn set_mode(&mut self, mode: MonitoringMode) -> GameSaveResult<()> {
        lock(&self.state).mode = mode;
        if mode.is_watching() {
            self.start()?;
        } else {
            self.halt();
        }
        broadcast(&self.observers, MonitorEvent::ModeChanged(mode));
        Ok(())
    }

    pub fn cycle_mode(&mut self) -> GameSaveResult<MonitoringMode> {
        let next = self.mode().cycle();
        self.set_mode(next)?;
        Ok(next)
    }
}

impl<S> Drop for MonitoringEngine<S> {
    fn drop(&mut self) {
        self.halt();
    }
}
