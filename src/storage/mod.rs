//! Storage layer for gamesave
//!
//! JSON persistence for the game list with atomic writes, and the copy
//! helpers the backup strategies use to move save data around.

pub mod file_io;
pub mod games;

pub use file_io::{read_json, write_json_atomic};
pub use games::GameStore;
