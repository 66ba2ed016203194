//! Save location monitoring
//!
//! A game can be watched in one of three modes. While watched, a sampler
//! thread compares the live save's modification time with the latest
//! backup, keeps the [`MonitoringStatus`] current, and in `Active` mode takes
//! numbered automatic backups once a save burst has settled.

mod engine;
mod state;

pub use engine::{MonitorEvent, MonitoringEngine, SAMPLE_PERIOD};
pub use state::{
    classify, MonitorState, MonitoringMode, MonitoringSnapshot, MonitoringStatus, TickOutcome,
    QUIET_WINDOW_SECS,
};
