//! Tracks the actually-played position inside the search tree

use anyhow::Result;

use crate::{
    config::{GameConfig, SearchConfig},
    node_store::{Node, NodeId},
    solver::{SearchEngine, Value},
    EngineError,
};

/// The current game position as a node of a `SearchEngine`
///
/// Both the agent's own moves and the opponent's reported moves are applied
/// with [`advance`](Self::advance); [`explore`](Self::explore) extends the
/// search below the current node and [`best_column`](Self::best_column)
/// reads off its recommendation.
pub struct MoveCursor {
    engine: SearchEngine,
    current: NodeId,
    cols: usize,
}

impl MoveCursor {
    pub fn new(config: GameConfig, search: SearchConfig) -> Result<Self> {
        search.validate()?;
        let engine = SearchEngine::new(&config, search.leaf_sign);
        let current = engine.store().root();
        Ok(Self {
            engine,
            current,
            cols: config.cols(),
        })
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn current_node(&self) -> &Node {
        self.engine.store().node(self.current)
    }

    /// Plays `column` for the side to move and makes the resulting position current
    ///
    /// Out of range and full columns are rejected without touching the store.
    pub fn advance(&mut self, column: usize) -> Result<NodeId> {
        if column >= self.cols {
            return Err(EngineError::ColumnOutOfRange {
                column,
                cols: self.cols,
            }
            .into());
        }
        let mut created = 0;
        let current = self.current;
        self.current = self.engine.store_mut().child(current, column, &mut created)?;
        Ok(self.current)
    }

    /// Searches `depth` plies past the current position, returning the number of new nodes
    pub fn explore(&mut self, depth: usize) -> Result<usize> {
        self.engine.explore(self.current, depth)
    }

    /// Searches `depth` plies past the current position, returning its value
    pub fn search(&mut self, depth: usize) -> Result<Value> {
        self.engine.search(self.current, depth)
    }

    /// The column leading to the best child of the current position
    ///
    /// Fails if the current position has not been explored yet.
    pub fn best_column(&self) -> Result<usize> {
        let node = self.current_node();
        node.best_child()
            .map(|edge| edge.column)
            .ok_or_else(|| EngineError::Unexplored(node.encoding().to_string()).into())
    }
}

impl std::ops::Deref for MoveCursor {
    type Target = SearchEngine;

    fn deref(&self) -> &Self::Target {
        &self.engine
    }
}
