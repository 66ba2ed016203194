//! Backup storage for game saves
//!
//! # Architecture
//!
//! - [`BackupStrategy`]: the storage operations every strategy offers
//! - [`DirectoryStrategy`]: backups are clones of the game's save directory
//! - [`SingleFileStrategy`]: backups are copies of one save file
//! - [`Strategy`]: the strategy chosen for a game by its [`StrategyKind`]
//! - [`GameBackupSet`]: a game with its strategy and monitor, running the
//!   manual backup, restore and rename flows
//!
//! # Example
//!
//! ```rust,ignore
//! use gamesave::backup::GameBackupSet;
//!
//! let set = GameBackupSet::new(game)?;
//! let latest = set.latest_backup()?;
//! let taken = set.backup(latest.as_ref(), Some("-boss"))?;
//! println!("{}", set.name_of(&taken)?);
//! ```

mod directory;
mod game_set;
mod single_file;
mod strategy;

pub use directory::DirectoryStrategy;
pub use game_set::GameBackupSet;
pub use single_file::SingleFileStrategy;
pub use strategy::{BackupStrategy, MonitorTarget, Strategy, StrategyKind};
