use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use crate::{
    codec::{Encoding, Grid, Mark, Side},
    config::GameConfig,
    evaluator::run_length,
    EngineError,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    SideAWin,
    SideBWin,
    Draw,
}

impl GameState {
    pub fn won_by(side: Side) -> Self {
        match side {
            Side::A => GameState::SideAWin,
            Side::B => GameState::SideBWin,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameState::Playing
    }
}

/// The live game board kept by whoever referees a game
///
/// Rejects illegal moves and decides wins with the same run evaluator the
/// search uses.
#[derive(Clone, Debug)]
pub struct ArrayBoard {
    config: GameConfig,
    grid: Grid, // row 0 is the top row
    free_rows: Vec<Option<usize>>,
    pub to_move: Side,
    pub history: Vec<usize>,
    pub state: GameState,
}

impl ArrayBoard {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            grid: Grid::new(config.rows(), config.cols()),
            free_rows: vec![Some(config.rows() - 1); config.cols()],
            to_move: config.first(),
            history: Vec::new(),
            state: GameState::Playing,
        }
    }

    /// Replays a sequence of zero-indexed columns
    pub fn from_moves(config: GameConfig, moves: &[usize]) -> Result<Self> {
        let mut board = Self::new(config);
        for &column in moves {
            board.play_checked(column)?;
        }
        Ok(board)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn encoding(&self) -> Encoding {
        self.grid.encode()
    }

    pub fn num_moves(&self) -> usize {
        self.history.len()
    }

    pub fn playable(&self, column: usize) -> bool {
        self.free_rows.get(column).copied().flatten().is_some()
    }

    pub fn playable_columns(&self) -> Vec<usize> {
        (0..self.config.cols()).filter(|&c| self.playable(c)).collect()
    }

    /// Run length through an occupied cell, as used for the live win check
    pub fn run_length_at(&self, column: usize, row: usize) -> Result<usize> {
        run_length(&self.grid, column, row)
    }

    /// Drops a piece for the side to move, returning the resulting game state
    pub fn play_checked(&mut self, column: usize) -> Result<GameState> {
        if self.state.is_over() {
            return Err(EngineError::GameOver.into());
        }
        if column >= self.config.cols() {
            return Err(EngineError::ColumnOutOfRange {
                column,
                cols: self.config.cols(),
            }
            .into());
        }
        let row = self.free_rows[column].ok_or(EngineError::ColumnFull { column })?;

        self.grid.set(row, column, self.to_move.mark());
        self.free_rows[column] = row.checked_sub(1);
        self.history.push(column);

        self.state = if run_length(&self.grid, column, row)? >= self.config.win_length() {
            GameState::won_by(self.to_move)
        } else if self.history.len() == self.config.cells() {
            GameState::Draw
        } else {
            GameState::Playing
        };
        self.to_move = self.to_move.opponent();

        Ok(self.state)
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();

        // column labels are one-indexed for human players
        let labels: String = (1..=self.config.cols())
            .map(|x| std::char::from_digit((x % 10) as u32, 10).unwrap_or(' '))
            .collect();
        stdout.queue(PrintStyledContent(style(labels + "\n")))?;

        for row in self.grid.iter_rows() {
            for cell in row {
                stdout.queue(PrintStyledContent(
                    style("O")
                        .attribute(Attribute::Bold)
                        .on(Color::DarkBlue)
                        .with(match cell {
                            Mark::SideA => Color::Red,
                            Mark::SideB => Color::Yellow,
                            Mark::Empty => Color::DarkBlue,
                        }),
                ))?;
            }
            stdout.queue(PrintStyledContent(style("\n")))?;
        }
        stdout.flush()?;
        Ok(())
    }
}
