//! Configuration module for gamesave
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - Manager settings persistence

pub mod paths;
pub mod settings;

pub use paths::GameSavePaths;
pub use settings::ManagerSettings;
