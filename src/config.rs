//! Game rules and search settings

use anyhow::Result;

use crate::{
    codec::Side, EngineError, DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_SEARCH_DEPTH,
    DEFAULT_WIN_LENGTH,
};

/// The rules of one game: board dimensions, winning run length and who moves first
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct GameConfig {
    rows: usize,
    cols: usize,
    win_length: usize,
    first: Side,
}

impl GameConfig {
    /// Creates a validated configuration
    pub fn new(rows: usize, cols: usize, win_length: usize, first: Side) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(EngineError::InvalidDimensions { rows, cols }.into());
        }
        let max = rows.max(cols);
        if win_length == 0 || win_length > max {
            return Err(EngineError::InvalidWinLength { win_length, max }.into());
        }
        Ok(Self {
            rows,
            cols,
            win_length,
            first,
        })
    }

    /// A standard-rules board of the given size
    pub fn with_dimensions(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, DEFAULT_WIN_LENGTH.min(rows.max(cols)), Side::A)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    /// The side to move on the empty board
    pub fn first(&self) -> Side {
        self.first
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            win_length: DEFAULT_WIN_LENGTH,
            first: Side::A,
        }
    }
}

/// How leaf values are signed before they are combined up the tree
///
/// SIDE_A always maximizes and SIDE_B always minimizes; interior nodes pass
/// the chosen child value up unchanged in both modes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LeafSign {
    /// Positive when SIDE_A is to move at the leaf. Kept for comparison: with
    /// this rule a side scores its own completed runs against itself
    SideToMove,
    /// Positive when SIDE_A placed the last piece, so a SIDE_A win is `+win_length`
    LastMover,
}

/// Settings of the minimax agent
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchConfig {
    /// Plies searched past the current position on every move
    pub depth: usize,
    pub leaf_sign: LeafSign,
    /// Print search diagnostics to stdout
    pub verbose: bool,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(EngineError::InvalidDepth(self.depth).into());
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_SEARCH_DEPTH,
            leaf_sign: LeafSign::LastMover,
            verbose: false,
        }
    }
}
