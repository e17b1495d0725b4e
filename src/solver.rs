//! Depth-limited minimax search over the node store

use anyhow::Result;

use crate::{
    codec::Side,
    config::{GameConfig, LeafSign},
    node_store::{Edge, NodeId, NodeStore},
};

/// The outcome of searching a node: a score, the depth of the position that
/// produced it and the node it was computed for
///
/// SIDE_A maximizes the score, SIDE_B minimizes it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Value {
    pub score: i32,
    pub depth: usize,
    pub node: NodeId,
}

/// Combines the best value so far with a new candidate for the maximizing side
///
/// A strictly greater score wins; on equal scores the shallower value is
/// preferred, and remaining ties keep the incumbent.
pub fn maximize(incumbent: Value, candidate: Value) -> Value {
    if candidate.score > incumbent.score {
        return candidate;
    }
    if candidate.score < incumbent.score {
        return incumbent;
    }
    if candidate.depth < incumbent.depth {
        return candidate;
    }
    incumbent
}

/// Mirror image of [`maximize`] for the minimizing side
pub fn minimize(incumbent: Value, candidate: Value) -> Value {
    if candidate.score < incumbent.score {
        return candidate;
    }
    if candidate.score > incumbent.score {
        return incumbent;
    }
    if candidate.depth < incumbent.depth {
        return candidate;
    }
    incumbent
}

/// A minimax searcher owning the node store of one game
///
/// # Notes
/// Each node carries the strongest run length found on the path that created
/// it. The search stops at the depth limit or as soon as that run reaches the
/// win length, signs the run according to [`LeafSign`] and passes the best
/// child value up unchanged. Children and values are memoized in the store,
/// so repeated searches from later positions only pay for the new frontier.
pub struct SearchEngine {
    store: NodeStore,
    win_length: i32,
    leaf_sign: LeafSign,

    /// The number of nodes created by the last `explore` call
    nodes_created: usize,
    /// The number of interior values computed by the last `explore` call
    evaluations: usize,
}

impl SearchEngine {
    pub fn new(config: &GameConfig, leaf_sign: LeafSign) -> Self {
        Self {
            store: NodeStore::new(config),
            win_length: config.win_length() as i32,
            leaf_sign,
            nodes_created: 0,
            evaluations: 0,
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    pub fn nodes_created(&self) -> usize {
        self.nodes_created
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Searches `max_additional_depth` plies below `from`, recording the best
    /// child of every interior node visited
    ///
    /// Returns the number of nodes newly created by this call
    pub fn explore(&mut self, from: NodeId, max_additional_depth: usize) -> Result<usize> {
        self.search(from, max_additional_depth)?;
        Ok(self.nodes_created)
    }

    /// Like [`explore`](Self::explore), returning the value of `from` instead
    pub fn search(&mut self, from: NodeId, max_additional_depth: usize) -> Result<Value> {
        self.nodes_created = 0;
        self.evaluations = 0;

        let limit = self.store.node(from).depth() + max_additional_depth;
        self.value(from, limit)
    }

    fn is_terminal(&self, id: NodeId, limit: usize) -> bool {
        let node = self.store.node(id);
        node.depth() >= limit || node.heuristic().abs() >= self.win_length
    }

    fn leaf(&self, id: NodeId) -> Value {
        let node = self.store.node(id);
        let positive = match self.leaf_sign {
            LeafSign::SideToMove => node.to_move() == Side::A,
            LeafSign::LastMover => node.to_move() == Side::B,
        };
        Value {
            score: if positive {
                node.heuristic()
            } else {
                -node.heuristic()
            },
            depth: node.depth(),
            node: id,
        }
    }

    fn value(&mut self, id: NodeId, limit: usize) -> Result<Value> {
        if let Some((searched_to, value)) = self.store.node(id).value {
            if searched_to == limit {
                return Ok(value);
            }
        }
        if self.is_terminal(id, limit) {
            return Ok(self.leaf(id));
        }

        let count = self.store.children_of(id, &mut self.nodes_created)?.len();
        // a full board is a leaf whatever the depth
        if count == 0 {
            return Ok(self.leaf(id));
        }
        self.evaluations += 1;

        let to_move = self.store.node(id).to_move();
        let worst = match to_move {
            Side::A => i32::MIN,
            Side::B => i32::MAX,
        };
        let mut best = Value {
            score: worst,
            depth: usize::MAX,
            node: id,
        };
        let mut best_child: Option<Edge> = None;

        for i in 0..count {
            let edge = match self.store.node(id).children() {
                Some(children) => children[i],
                None => break,
            };
            let value = self.value(edge.node, limit)?;
            let combined = match to_move {
                Side::A => maximize(best, value),
                Side::B => minimize(best, value),
            };
            if combined != best {
                best = combined;
                best_child = Some(edge);
            }
        }

        let value = Value {
            score: best.score,
            depth: best.depth,
            node: id,
        };
        let node = self.store.node_mut(id);
        node.best_child = best_child;
        node.value = Some((limit, value));
        Ok(value)
    }
}
