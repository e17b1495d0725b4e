use anyhow::{anyhow, Result};
use indicatif::*;

use std::io::{stdin, stdout, Write};

use connect4_minimax::{
    agent::{Agent, MinimaxAgent, RandomAgent},
    arrayboard::{ArrayBoard, GameState},
    codec::Side,
    config::{GameConfig, SearchConfig},
    game::play_series,
    protocol::{Dispatcher, Message},
    DEFAULT_COLS, DEFAULT_ROWS, DEFAULT_SEARCH_DEPTH, DEFAULT_WIN_LENGTH,
};

#[derive(Copy, Clone, Eq, PartialEq)]
enum Controller {
    Human,
    Random,
    Minimax,
}

fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    stdout().flush().expect("failed to flush to stdout!");

    let mut buffer = String::new();
    stdin().read_line(&mut buffer)?;
    Ok(buffer.trim().to_lowercase())
}

fn ask_number(question: &str, default: usize) -> Result<usize> {
    loop {
        let answer = prompt(&format!("{} [{}]: ", question, default))?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<usize>() {
            Ok(number) if number > 0 => return Ok(number),
            _ => println!("Invalid number: {}", answer),
        }
    }
}

fn ask_controller(side: Side) -> Result<Controller> {
    loop {
        let answer = prompt(&format!(
            "Who controls {}? h(uman) / r(andom) / m(inimax): ",
            side
        ))?;
        match answer.chars().next() {
            Some('h') => return Ok(Controller::Human),
            Some('r') => return Ok(Controller::Random),
            Some('m') => return Ok(Controller::Minimax),
            _ => println!("Unknown answer given"),
        }
    }
}

fn build_agent(controller: Controller, search: SearchConfig, seed: Option<u64>) -> Box<dyn Agent> {
    match controller {
        Controller::Minimax => Box::new(MinimaxAgent::new(search)),
        _ => match seed {
            Some(seed) => Box::new(RandomAgent::seeded(seed)),
            None => Box::new(RandomAgent::new()),
        },
    }
}

fn main() -> Result<()> {
    println!("Welcome to Connect 4\n");

    // choose the rules
    let config = loop {
        let rows = ask_number("Rows", DEFAULT_ROWS)?;
        let cols = ask_number("Columns", DEFAULT_COLS)?;
        let win_length = ask_number("Pieces in a row to win", DEFAULT_WIN_LENGTH)?;
        match GameConfig::new(rows, cols, win_length, Side::A) {
            Ok(config) => break config,
            Err(err) => println!("{}", err),
        }
    };
    let depth = ask_number("Minimax search depth", DEFAULT_SEARCH_DEPTH)?;

    let controllers = (ask_controller(Side::A)?, ask_controller(Side::B)?);

    if controllers.0 != Controller::Human && controllers.1 != Controller::Human {
        let games = ask_number("Number of games to simulate", 1)?;
        if games > 1 {
            return simulate(config, depth, controllers, games);
        }
    }

    let search = SearchConfig {
        depth,
        verbose: true,
        ..SearchConfig::default()
    };
    let mut dispatchers: Vec<Option<Dispatcher>> = Vec::new();
    let mut opening = None;
    for &(side, controller) in [(Side::A, controllers.0), (Side::B, controllers.1)].iter() {
        if controller == Controller::Human {
            dispatchers.push(None);
            continue;
        }
        let mut dispatcher = Dispatcher::new(build_agent(controller, search, None));
        if let Some(column) = dispatcher.handle(Message::Configure { side, config })? {
            opening = Some(column);
        }
        dispatchers.push(Some(dispatcher));
    }

    let mut board = ArrayBoard::new(config);
    let mut last_move = None;

    // game loop
    loop {
        board.display().expect("Failed to draw board!");

        match board.state {
            GameState::Playing => {
                let side = board.to_move;
                let slot = match side {
                    Side::A => 0,
                    Side::B => 1,
                };
                let next_move = match dispatchers[slot].as_mut() {
                    // AI player
                    Some(dispatcher) => {
                        let spinner = ProgressBar::new_spinner();
                        spinner.set_message(&format!("{} agent is thinking...", dispatcher.agent_name()));
                        spinner.enable_steady_tick(100);

                        let column = match opening.take() {
                            Some(column) => column,
                            None => dispatcher
                                .handle(Message::Move { last_move })?
                                .ok_or_else(|| anyhow!("agent did not answer"))?,
                        };
                        spinner.finish_and_clear();

                        println!("{} plays column {}", side, column + 1);
                        // an AI has already committed to its move, so an illegal one ends the game
                        board.play_checked(column)?;
                        last_move = Some(column);
                        continue;
                    }

                    // human player
                    None => {
                        let input = prompt(&format!("{} move input > ", side))?;
                        match input.parse::<usize>() {
                            Ok(column) if column >= 1 => column - 1,
                            _ => {
                                println!("Invalid number: {}", input);
                                continue;
                            }
                        }
                    }
                };

                if let Err(err) = board.play_checked(next_move) {
                    println!("{}", err);
                    // try the move again
                    continue;
                }
                last_move = Some(next_move);
            }

            // end states
            GameState::SideAWin => {
                println!("{} wins!", Side::A);
                break;
            }
            GameState::SideBWin => {
                println!("{} wins!", Side::B);
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    Ok(())
}

fn simulate(
    config: GameConfig,
    depth: usize,
    controllers: (Controller, Controller),
    games: usize,
) -> Result<()> {
    let search = SearchConfig {
        depth,
        ..SearchConfig::default()
    };

    let progress = ProgressBar::new(games as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Simulating games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let summary = play_series(
        config,
        games,
        |i| {
            (
                build_agent(controllers.0, search, Some(2 * i as u64)),
                build_agent(controllers.1, search, Some(2 * i as u64 + 1)),
            )
        },
        Some(&progress),
    )?;
    progress.finish();

    println!(
        "{} games: {} wins {}, {} wins {}, {} draws",
        summary.games(),
        Side::A,
        summary.side_a_wins,
        Side::B,
        summary.side_b_wins,
        summary.draws
    );
    Ok(())
}
