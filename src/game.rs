//! Refereeing games between two agents

use anyhow::{anyhow, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::{
    agent::Agent,
    arrayboard::{ArrayBoard, GameState},
    codec::{Encoding, Side},
    config::GameConfig,
    protocol::{Dispatcher, Message},
};

#[derive(Clone, Debug)]
pub struct MatchResult {
    pub state: GameState,
    /// Zero-indexed columns in the order they were played
    pub moves: Vec<usize>,
    pub final_board: Encoding,
}

/// Plays one game to completion, `agent_a` playing SIDE_A
///
/// Any illegal answer from an agent aborts the game with an error.
pub fn play_match(
    config: GameConfig,
    agent_a: Box<dyn Agent>,
    agent_b: Box<dyn Agent>,
) -> Result<MatchResult> {
    let mut board = ArrayBoard::new(config);
    let mut dispatchers = [Dispatcher::new(agent_a), Dispatcher::new(agent_b)];
    let index = |side: Side| match side {
        Side::A => 0,
        Side::B => 1,
    };

    let mut opening = None;
    for &side in [Side::A, Side::B].iter() {
        if let Some(column) =
            dispatchers[index(side)].handle(Message::Configure { side, config })?
        {
            opening = Some(column);
        }
    }
    let mut column = opening.ok_or_else(|| anyhow!("{} did not open the game", config.first()))?;

    loop {
        let side = board.to_move;
        let state = board.play_checked(column).with_context(|| {
            format!(
                "{} agent playing {} answered with an illegal move",
                dispatchers[index(side)].agent_name(),
                side
            )
        })?;
        if state.is_over() {
            break;
        }

        let next = &mut dispatchers[index(board.to_move)];
        column = next
            .handle(Message::Move {
                last_move: Some(column),
            })?
            .ok_or_else(|| anyhow!("{} agent did not answer a move request", next.agent_name()))?;
    }

    Ok(MatchResult {
        state: board.state,
        final_board: board.encoding(),
        moves: board.history,
    })
}

#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct SeriesSummary {
    pub side_a_wins: usize,
    pub side_b_wins: usize,
    pub draws: usize,
}

impl SeriesSummary {
    pub fn games(&self) -> usize {
        self.side_a_wins + self.side_b_wins + self.draws
    }
}

/// Plays `games` independent games in parallel
///
/// `agents` builds the SIDE_A and SIDE_B agents of each game from its index,
/// so every game owns its own agents and search trees.
pub fn play_series<F>(
    config: GameConfig,
    games: usize,
    agents: F,
    progress: Option<&ProgressBar>,
) -> Result<SeriesSummary>
where
    F: Fn(usize) -> (Box<dyn Agent>, Box<dyn Agent>) + Sync + Send,
{
    let results = (0..games)
        .into_par_iter()
        .map(|i| {
            let (agent_a, agent_b) = agents(i);
            let result = play_match(config, agent_a, agent_b)
                .with_context(|| format!("game {} failed", i))?;
            if let Some(progress) = progress {
                progress.inc(1);
            }
            Ok(result.state)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = SeriesSummary::default();
    for state in results {
        match state {
            GameState::SideAWin => summary.side_a_wins += 1,
            GameState::SideBWin => summary.side_b_wins += 1,
            GameState::Draw => summary.draws += 1,
            GameState::Playing => return Err(anyhow!("game ended while still playing")),
        }
    }
    Ok(summary)
}
