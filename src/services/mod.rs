//! Service layer for gamesave
//!
//! The service layer provides the game-level operations on top of the
//! storage layer, handling validation and the selected game.

pub mod library;

pub use library::GameLibrary;
