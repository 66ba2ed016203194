//! Custom error types for gamesave
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for gamesave operations
#[derive(Error, Debug)]
pub enum GameSaveError {
    /// A backup name cannot be reconciled with the game's name format
    #[error("Malformed backup name '{name}': {reason}")]
    MalformedBackupName { name: String, reason: String },

    /// A tag was set to an empty value
    #[error("Tag cannot be empty")]
    EmptyTag,

    /// Rename target is already occupied by a different backup
    #[error("A backup with the name '{0}' already exists")]
    DuplicateName(String),

    /// Entity not found errors (backups, live saves, games)
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Revert requested without a revert artifact on disk
    #[error("Nothing to revert for game '{0}'")]
    NoRevertAvailable(String),

    /// Strategy identifier not recognised
    #[error("Unsupported backup strategy: {0}")]
    UnsupportedStrategy(String),

    /// A configuration field failed validation
    #[error("Invalid {field}: {reason}")]
    InvalidFormatConfiguration { field: &'static str, reason: String },

    /// Version would no longer fit the configured pattern
    #[error("Version {version} does not fit the version format '{format}'")]
    VersionOverflow { version: String, format: String },

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GameSaveError {
    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for games
    pub fn game_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Game",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for the live save location
    pub fn save_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Game save",
            identifier: identifier.into(),
        }
    }

    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedBackupName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormatConfiguration {
            field,
            reason: reason.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a configuration validation error
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidFormatConfiguration { .. })
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for GameSaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GameSaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for gamesave operations
pub type GameSaveResult<T> = Result<T, GameSaveError>;
