//! Content-addressed store of search nodes
//!
//! Nodes live in an arena and are looked up by their board encoding, so two
//! move orders reaching the same board share a single node together with its
//! children and any value already computed for it. Nodes are never removed:
//! the store grows for the whole game.

use anyhow::Result;
use rustc_hash::FxHashMap;

use crate::{
    codec::{Encoding, Side},
    config::GameConfig,
    evaluator::run_length,
    solver::Value,
    EngineError,
};

/// Index of a node in its `NodeStore`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
pub struct NodeId(usize);

/// A move from a parent node: the column played and the node it leads to
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Edge {
    pub column: usize,
    pub node: NodeId,
}

#[derive(Clone, Debug)]
pub struct Node {
    encoding: Encoding,
    depth: usize,
    // next open row of each column, None once the column is full
    free_rows: Vec<Option<usize>>,
    to_move: Side,
    heuristic: i32,
    children: Option<Vec<Edge>>,
    pub(crate) best_child: Option<Edge>,
    // value computed for a given absolute depth limit
    pub(crate) value: Option<(usize, Value)>,
}

impl Node {
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Plies played from the empty board
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn free_row(&self, column: usize) -> Option<usize> {
        self.free_rows.get(column).copied().flatten()
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Strongest run length seen on the path that created this node
    pub fn heuristic(&self) -> i32 {
        self.heuristic
    }

    /// The memoized children, if they have been generated
    pub fn children(&self) -> Option<&[Edge]> {
        self.children.as_deref()
    }

    /// The child realising this node's minimax value, once searched
    pub fn best_child(&self) -> Option<Edge> {
        self.best_child
    }
}

pub struct NodeStore {
    rows: usize,
    cols: usize,
    nodes: Vec<Node>,
    index: FxHashMap<Encoding, NodeId>,
    root: NodeId,
}

impl NodeStore {
    /// Creates a store holding only the empty board, with the first mover to play
    pub fn new(config: &GameConfig) -> Self {
        let (rows, cols) = (config.rows(), config.cols());
        let encoding = Encoding::empty(rows, cols);
        let root = Node {
            encoding: encoding.clone(),
            depth: 0,
            free_rows: vec![Some(rows - 1); cols],
            to_move: config.first(),
            heuristic: 0,
            children: None,
            best_child: None,
            value: None,
        };

        let mut index = FxHashMap::default();
        index.insert(encoding, NodeId(0));
        Self {
            rows,
            cols,
            nodes: vec![root],
            index,
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The node behind an id handed out by this store
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn lookup(&self, encoding: &Encoding) -> Option<NodeId> {
        self.index.get(encoding).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the node reached by playing `column` from `parent`, creating it if
    /// this board has never been seen. `created` is bumped for every new node
    pub fn child(&mut self, parent: NodeId, column: usize, created: &mut usize) -> Result<NodeId> {
        if column >= self.cols {
            return Err(EngineError::ColumnOutOfRange {
                column,
                cols: self.cols,
            }
            .into());
        }
        let node = &self.nodes[parent.0];
        let row = node
            .free_row(column)
            .ok_or(EngineError::ColumnFull { column })?;
        let encoding = node
            .encoding
            .with_mark(row * self.cols + column, node.to_move.mark());

        // transposition: reuse the existing node untouched
        if let Some(&id) = self.index.get(&encoding) {
            return Ok(id);
        }

        let mut free_rows = node.free_rows.clone();
        free_rows[column] = row.checked_sub(1);
        let move_score = run_length(&encoding.decode(self.rows, self.cols), column, row)? as i32;
        let heuristic = if move_score.abs() > node.heuristic.abs() {
            move_score
        } else {
            node.heuristic
        };
        let child = Node {
            encoding: encoding.clone(),
            depth: node.depth + 1,
            free_rows,
            to_move: node.to_move.opponent(),
            heuristic,
            children: None,
            best_child: None,
            value: None,
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(child);
        self.index.insert(encoding, id);
        *created += 1;
        Ok(id)
    }

    /// Returns one edge per non-full column of `parent`, in ascending column order
    ///
    /// The list is memoized on the node, so only the first call does any work.
    pub fn children_of(&mut self, parent: NodeId, created: &mut usize) -> Result<&[Edge]> {
        if self.nodes[parent.0].children.is_none() {
            let mut children = Vec::with_capacity(self.cols);
            for column in 0..self.cols {
                if self.nodes[parent.0].free_row(column).is_none() {
                    continue;
                }
                let node = self.child(parent, column, created)?;
                children.push(Edge { column, node });
            }
            self.nodes[parent.0].children = Some(children);
        }
        Ok(self.nodes[parent.0].children.as_deref().unwrap_or(&[]))
    }
}
