//! The synchronous request/response boundary between a referee and an agent
//!
//! An agent receives exactly one configuration message followed by move
//! requests, one at a time, and answers each request with a column.

use anyhow::Result;

use crate::{agent::Agent, codec::Side, config::GameConfig, EngineError};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Message {
    /// Sets the rules and the side the agent plays
    Configure { side: Side, config: GameConfig },
    /// The opponent's last column, or `None` if the agent moves first
    Move { last_move: Option<usize> },
}

/// Routes protocol messages to an agent and checks its answers
pub struct Dispatcher {
    agent: Box<dyn Agent>,
    setup: Option<(Side, GameConfig)>,
}

impl Dispatcher {
    pub fn new(agent: Box<dyn Agent>) -> Self {
        Self { agent, setup: None }
    }

    pub fn side(&self) -> Option<Side> {
        self.setup.map(|(side, _)| side)
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Handles one message, returning the agent's column if the message asked for one
    ///
    /// A configuration message is answered with a move straight away when the
    /// configured side opens the game.
    pub fn handle(&mut self, message: Message) -> Result<Option<usize>> {
        match message {
            Message::Configure { side, config } => {
                if let Some((configured, _)) = self.setup {
                    return Err(EngineError::AlreadyConfigured(configured).into());
                }
                self.agent.configure(side, &config)?;
                self.setup = Some((side, config));

                if config.first() == side {
                    self.request(None).map(Some)
                } else {
                    Ok(None)
                }
            }
            Message::Move { last_move } => self.request(last_move).map(Some),
        }
    }

    fn request(&mut self, last_move: Option<usize>) -> Result<usize> {
        let (_, config) = self.setup.ok_or(EngineError::NotConfigured)?;
        let column = self.agent.play(last_move)?;
        if column >= config.cols() {
            return Err(EngineError::ColumnOutOfRange {
                column,
                cols: config.cols(),
            }
            .into());
        }
        Ok(column)
    }
}
