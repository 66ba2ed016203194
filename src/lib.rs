//! gamesave - versioned, tagged backups of game save data
//!
//! This library provides the core functionality for the gamesave tool. A
//! backup's metadata (date, version, tag and reuse count) lives in its file or
//! directory name, rendered and parsed under a per-game name format, and a
//! game's save location can be watched to take automatic backups.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Game configuration, name format grammar and backup identities
//! - `naming`: Backup name encoding and decoding
//! - `backup`: Directory and single file backup strategies, per-game flows
//! - `monitor`: Save location monitoring and automatic backups
//! - `storage`: JSON file storage and copy helpers
//! - `services`: The game library and silent entry points
//! - `status`: Cumulative status messages
//! - `cli`: Command handlers
//! - `logging`: Diagnostic output
//!
//! # Example
//!
//! ```rust,ignore
//! use gamesave::config::GameSavePaths;
//! use gamesave::services::GameLibrary;
//!
//! let library = GameLibrary::open(GameSavePaths::new()?)?;
//! let set = library.open_set("Quest")?;
//! let taken = set.backup(set.latest_backup()?.as_ref(), Some("-boss"))?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod naming;
pub mod services;
pub mod status;
pub mod storage;

pub use error::{GameSaveError, GameSaveResult};
