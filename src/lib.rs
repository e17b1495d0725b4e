//! A drop-piece board game engine driven by pluggable agents
//!
//! The non-random agent uses a depth-limited minimax search over a
//! transposition table keyed by the board encoding, so positions reached
//! through different move orders share one node and one subtree.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_minimax::{config::{GameConfig, SearchConfig}, cursor::MoveCursor};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut cursor = MoveCursor::new(GameConfig::default(), SearchConfig::default())?;
//! cursor.explore(3)?;
//! let column = cursor.best_column()?;
//! cursor.advance(column)?;
//!
//! assert!(column < 7);
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod config;

pub mod codec;

pub mod evaluator;

pub mod arrayboard;

pub mod node_store;

pub mod solver;

pub mod cursor;

pub mod agent;

pub mod protocol;

pub mod game;

mod test;

pub use error::EngineError;

/// The default number of rows on the game board
pub const DEFAULT_ROWS: usize = 6;

/// The default number of columns on the game board
pub const DEFAULT_COLS: usize = 7;

/// The default run length that wins the game
pub const DEFAULT_WIN_LENGTH: usize = 4;

/// The default number of plies the minimax agent searches past the current position
pub const DEFAULT_SEARCH_DEPTH: usize = 7;

// a default game must be winnable along every axis
const_assert!(DEFAULT_WIN_LENGTH <= DEFAULT_ROWS);
const_assert!(DEFAULT_WIN_LENGTH <= DEFAULT_COLS);
const_assert!(DEFAULT_SEARCH_DEPTH >= 1);
