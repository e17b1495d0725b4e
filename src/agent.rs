//! Decision-making agents

use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    arrayboard::ArrayBoard,
    codec::Side,
    config::{GameConfig, SearchConfig},
    cursor::MoveCursor,
    EngineError,
};

/// The capability every agent offers to the turn protocol
pub trait Agent {
    /// Called once before any move request
    fn configure(&mut self, side: Side, config: &GameConfig) -> Result<()>;

    /// Returns the column to play, given the opponent's last move
    /// (`None` when this agent opens the game)
    fn play(&mut self, last_move: Option<usize>) -> Result<usize>;

    fn name(&self) -> &str;
}

/// Plays the best move found by a fixed-depth minimax search
pub struct MinimaxAgent {
    search: SearchConfig,
    cursor: Option<MoveCursor>,
    win_length: i32,
}

impl MinimaxAgent {
    pub fn new(search: SearchConfig) -> Self {
        Self {
            search,
            cursor: None,
            win_length: 0,
        }
    }

    pub fn cursor(&self) -> Option<&MoveCursor> {
        self.cursor.as_ref()
    }
}

impl Agent for MinimaxAgent {
    fn configure(&mut self, _side: Side, config: &GameConfig) -> Result<()> {
        self.cursor = Some(MoveCursor::new(*config, self.search)?);
        self.win_length = config.win_length() as i32;
        Ok(())
    }

    fn play(&mut self, last_move: Option<usize>) -> Result<usize> {
        let verbose = self.search.verbose;
        let depth = self.search.depth;
        let win_length = self.win_length;
        let cursor = self.cursor.as_mut().ok_or(EngineError::NotConfigured)?;

        if let Some(column) = last_move {
            cursor.advance(column)?;
        }
        let node = cursor.current_node();
        // a completed run or a full board
        if node.heuristic().abs() >= win_length || node.depth() == node.encoding().len() {
            return Err(EngineError::GameOver.into());
        }

        let explored = cursor.explore(depth)?;
        if verbose {
            println!(
                "explored nodes: {}, total nodes: {}",
                explored,
                cursor.store().len()
            );
        }

        let column = cursor.best_column()?;
        cursor.advance(column)?;
        Ok(column)
    }

    fn name(&self) -> &str {
        "minimax"
    }
}

/// Plays a uniformly random column among those with a free cell
pub struct RandomAgent {
    rng: StdRng,
    board: Option<ArrayBoard>,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self { rng, board: None }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn configure(&mut self, _side: Side, config: &GameConfig) -> Result<()> {
        self.board = Some(ArrayBoard::new(*config));
        Ok(())
    }

    fn play(&mut self, last_move: Option<usize>) -> Result<usize> {
        let board = self.board.as_mut().ok_or(EngineError::NotConfigured)?;
        if let Some(column) = last_move {
            board.play_checked(column)?;
        }

        let columns = board.playable_columns();
        if columns.is_empty() || board.state.is_over() {
            return Err(EngineError::GameOver.into());
        }
        let column = columns[self.rng.gen_range(0..columns.len())];
        board.play_checked(column)?;
        Ok(column)
    }

    fn name(&self) -> &str {
        "random"
    }
}
