//! Contract violations reported by the engine
//!
//! Every variant describes a caller mistake or an inconsistent state, never a
//! transient condition, so none of them are worth retrying.

use thiserror::Error;

use crate::codec::Side;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    #[error("invalid board dimensions {rows}x{cols}: both must be at least 1")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid win length {win_length}: must be between 1 and {max}")]
    InvalidWinLength { win_length: usize, max: usize },

    #[error("invalid search depth {0}: must be at least 1")]
    InvalidDepth(usize),

    #[error("invalid move, column {column} out of range. Columns must be below {cols}")]
    ColumnOutOfRange { column: usize, cols: usize },

    #[error("invalid move, column {column} full")]
    ColumnFull { column: usize },

    #[error("run length requested for empty cell at row {row}, column {col}")]
    EmptyCell { row: usize, col: usize },

    #[error("cell at row {row}, column {col} is outside the board")]
    CellOutOfBounds { row: usize, col: usize },

    #[error("board encoding has {got} cells, expected {expected}")]
    InvalidEncodingLength { expected: usize, got: usize },

    #[error("invalid mark '{mark}' at index {index} of board encoding")]
    InvalidMark { mark: char, index: usize },

    #[error("no best move recorded for position {0}: explore it first")]
    Unexplored(String),

    #[error("agent received a move request before being configured")]
    NotConfigured,

    #[error("agent is already configured to play {0:?}")]
    AlreadyConfigured(Side),

    #[error("the game is already over")]
    GameOver,
}
