//! Backup name codec
//!
//! Renders a [`BackupIdentity`](crate::models::BackupIdentity) into a backup
//! name under a game's name format, and parses such a name back.

mod codec;

pub use codec::NameCodec;
