//! Longest same-owner run through a freshly occupied cell
//!
//! Shared by the live win check and the search heuristic, so a displayed
//! result and a search conclusion can never disagree.

use anyhow::Result;

use crate::{codec::Grid, EngineError};

/// Axis directions as (row step, column step); each is walked both ways
pub const DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, 0), (0, 1), (-1, 1)];

/// Returns the longest contiguous run of the mark at `row`, `col` along any of
/// the four axes, counting the cell itself
///
/// A result of at least the win length means the owner of that cell has won.
/// Fails if the cell is outside the board or still empty.
pub fn run_length(grid: &Grid, col: usize, row: usize) -> Result<usize> {
    if row >= grid.rows() || col >= grid.cols() {
        return Err(EngineError::CellOutOfBounds { row, col }.into());
    }
    let mark = grid.get(row, col);
    if mark.is_empty() {
        return Err(EngineError::EmptyCell { row, col }.into());
    }

    let count = |dr: isize, dc: isize| {
        let mut steps = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while grid.in_bounds(r, c) && grid.get(r as usize, c as usize) == mark {
            steps += 1;
            r += dr;
            c += dc;
        }
        steps
    };

    Ok(DIRECTIONS
        .iter()
        .map(|&(dr, dc)| 1 + count(dr, dc) + count(-dr, -dc))
        .max()
        .unwrap_or(1))
}
