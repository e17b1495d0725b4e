//! Conversion between the compact board encoding and a 2D grid of marks
//!
//! An encoding is a string of `rows * cols` marks stored row-major, top row
//! first, using `-` for an empty cell, `O` for a SIDE_A piece and `X` for a
//! SIDE_B piece. The encoding doubles as the identity of a search node.

use anyhow::Result;
use static_assertions::*;

use std::fmt;

use crate::EngineError;

pub const EMPTY_CHAR: char = '-';
pub const SIDE_A_CHAR: char = 'O';
pub const SIDE_B_CHAR: char = 'X';

// the three marks must stay distinguishable
const_assert!(EMPTY_CHAR as u32 != SIDE_A_CHAR as u32);
const_assert!(EMPTY_CHAR as u32 != SIDE_B_CHAR as u32);
const_assert!(SIDE_A_CHAR as u32 != SIDE_B_CHAR as u32);

/// One of the two players
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn mark(self) -> Mark {
        match self {
            Side::A => Mark::SideA,
            Side::B => Mark::SideB,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "side A ({})", SIDE_A_CHAR),
            Side::B => write!(f, "side B ({})", SIDE_B_CHAR),
        }
    }
}

/// The content of a single cell
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Mark {
    Empty,
    SideA,
    SideB,
}

impl Mark {
    pub fn is_empty(self) -> bool {
        self == Mark::Empty
    }

    pub fn to_char(self) -> char {
        match self {
            Mark::Empty => EMPTY_CHAR,
            Mark::SideA => SIDE_A_CHAR,
            Mark::SideB => SIDE_B_CHAR,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            EMPTY_CHAR => Some(Mark::Empty),
            SIDE_A_CHAR => Some(Mark::SideA),
            SIDE_B_CHAR => Some(Mark::SideB),
            _ => None,
        }
    }
}

/// A board encoding: exactly `rows * cols` marks, row-major
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Encoding(String);

impl Encoding {
    /// The encoding of a board with no pieces on it
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self(std::iter::repeat(EMPTY_CHAR).take(rows * cols).collect())
    }

    /// Parses and validates an encoding for a `rows` x `cols` board
    pub fn parse(text: &str, rows: usize, cols: usize) -> Result<Self> {
        let got = text.chars().count();
        if got != rows * cols {
            return Err(EngineError::InvalidEncodingLength {
                expected: rows * cols,
                got,
            }
            .into());
        }
        if let Some((index, mark)) = text
            .chars()
            .enumerate()
            .find(|(_, c)| Mark::from_char(*c).is_none())
        {
            return Err(EngineError::InvalidMark { mark, index }.into());
        }
        Ok(Self(text.to_owned()))
    }

    /// Returns a copy of this encoding with `mark` placed at `index` (`row * cols + col`)
    ///
    /// Callers guarantee `index` is in range; all marks are single-byte characters
    pub fn with_mark(&self, index: usize, mark: Mark) -> Self {
        let mut code = self.0.clone();
        let mut buf = [0u8; 4];
        code.replace_range(index..index + 1, mark.to_char().encode_utf8(&mut buf));
        Self(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the encoding into `rows` rows of `cols` marks
    pub fn decode(&self, rows: usize, cols: usize) -> Grid {
        let cells = self.0.chars().filter_map(Mark::from_char).collect();
        Grid { rows, cols, cells }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded board: marks stored row-major, row 0 at the top
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Mark>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Mark::Empty; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// The mark at `row`, `col`. Panics when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Mark {
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, mark: Mark) {
        self.cells[row * self.cols + col] = mark;
    }

    /// Iterates over the rows, top first
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Mark]> {
        self.cells.chunks(self.cols.max(1))
    }

    pub fn encode(&self) -> Encoding {
        Encoding(self.cells.iter().map(|m| m.to_char()).collect())
    }
}
