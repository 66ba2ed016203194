//! Core data models for gamesave
//!
//! Game configuration, the backup name grammar, version numbers and the
//! decoded identity of a backup.

pub mod format;
pub mod game;
pub mod identity;
pub mod version;

pub use format::{NameFormat, Token};
pub use game::{
    DateFormat, Extension, GameConfig, Parts, RevertSuffix, SaveFile, SavePrefix, Separator,
};
pub use identity::{merge_tag, BackupIdentity, ReuseOutcome, MAX_REUSE};
pub use version::{Version, VersionFormat};
