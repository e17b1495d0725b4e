#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    use crate::{
        agent::{Agent, MinimaxAgent, RandomAgent},
        arrayboard::{ArrayBoard, GameState},
        codec::{Encoding, Grid, Mark, Side},
        config::{GameConfig, LeafSign, SearchConfig},
        cursor::MoveCursor,
        evaluator::run_length,
        game::{play_match, play_series},
        node_store::NodeStore,
        protocol::{Dispatcher, Message},
        solver::{maximize, minimize, SearchEngine, Value},
        EngineError,
    };

    fn small_config() -> Result<GameConfig> {
        GameConfig::new(3, 3, 3, Side::A)
    }

    fn search(depth: usize) -> SearchConfig {
        SearchConfig {
            depth,
            ..SearchConfig::default()
        }
    }

    fn engine_error(err: &anyhow::Error) -> Option<&EngineError> {
        err.downcast_ref::<EngineError>()
    }

    fn cursor_after(config: GameConfig, leaf_sign: LeafSign, moves: &[usize]) -> Result<MoveCursor> {
        let mut cursor = MoveCursor::new(
            config,
            SearchConfig {
                leaf_sign,
                ..SearchConfig::default()
            },
        )?;
        for &column in moves {
            cursor.advance(column)?;
        }
        Ok(cursor)
    }

    // exhaustive game value: 1 if SIDE_A wins, -1 if SIDE_B wins, 0 for a draw
    fn brute_force(board: &ArrayBoard) -> Result<i32> {
        match board.state {
            GameState::SideAWin => return Ok(1),
            GameState::SideBWin => return Ok(-1),
            GameState::Draw => return Ok(0),
            GameState::Playing => {}
        }
        let mut values = Vec::new();
        for column in board.playable_columns() {
            let mut next = board.clone();
            next.play_checked(column)?;
            values.push(brute_force(&next)?);
        }
        Ok(match board.to_move {
            Side::A => values.into_iter().max().unwrap_or(0),
            Side::B => values.into_iter().min().unwrap_or(0),
        })
    }

    fn outcome(score: i32, win_length: usize) -> i32 {
        let win_length = win_length as i32;
        if score >= win_length {
            1
        } else if score <= -win_length {
            -1
        } else {
            0
        }
    }

    fn grid_from(rows: usize, cols: usize, marks: &[Mark]) -> Grid {
        let mut grid = Grid::new(rows, cols);
        for (i, &mark) in marks.iter().enumerate() {
            grid.set(i / cols, i % cols, mark);
        }
        grid
    }

    fn mark_strategy() -> impl Strategy<Value = Mark> {
        prop_oneof![Just(Mark::Empty), Just(Mark::SideA), Just(Mark::SideB)]
    }

    proptest! {
        #[test]
        fn encoding_round_trips(marks in proptest::collection::vec(mark_strategy(), 20)) {
            let text: String = marks.iter().map(|m| m.to_char()).collect();
            let encoding = Encoding::parse(&text, 4, 5).unwrap();
            let grid = encoding.decode(4, 5);
            prop_assert_eq!(grid.encode(), encoding.clone());
            prop_assert_eq!(grid.encode().to_string(), text);
            for (i, mark) in marks.iter().enumerate() {
                prop_assert_eq!(grid.get(i / 5, i % 5), *mark);
            }
        }

        #[test]
        fn run_length_is_bounded_and_rotation_invariant(
            marks in proptest::collection::vec(mark_strategy(), 30)
        ) {
            let (rows, cols) = (5, 6);
            let grid = grid_from(rows, cols, &marks);
            let rotated_marks: Vec<Mark> = marks.iter().rev().copied().collect();
            let rotated = grid_from(rows, cols, &rotated_marks);

            for row in 0..rows {
                for col in 0..cols {
                    if grid.get(row, col).is_empty() {
                        continue;
                    }
                    let run = run_length(&grid, col, row).unwrap();
                    prop_assert!(run >= 1 && run <= rows.max(cols));
                    let turned = run_length(&rotated, cols - 1 - col, rows - 1 - row).unwrap();
                    prop_assert_eq!(run, turned);
                }
            }
        }
    }

    #[test]
    pub fn encoding_rejects_bad_input() -> Result<()> {
        let err = Encoding::parse("---", 2, 2).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::InvalidEncodingLength {
                expected: 4,
                got: 3
            })
        );

        let err = Encoding::parse("-O?X", 2, 2).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::InvalidMark {
                mark: '?',
                index: 2
            })
        );

        let encoding = Encoding::parse("-OX-", 2, 2)?;
        assert_eq!(encoding.with_mark(3, Mark::SideB).as_str(), "-OXX");
        assert_eq!(Encoding::empty(2, 3).as_str(), "------");
        Ok(())
    }

    #[test]
    pub fn run_length_on_empty_cell_fails() -> Result<()> {
        let grid = Encoding::parse("----O----", 3, 3)?.decode(3, 3);
        assert_eq!(run_length(&grid, 1, 1)?, 1);

        let err = run_length(&grid, 0, 0).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::EmptyCell { row: 0, col: 0 })
        );
        let err = run_length(&grid, 3, 0).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::CellOutOfBounds { row: 0, col: 3 })
        );
        Ok(())
    }

    #[test]
    pub fn run_length_counts_every_axis() -> Result<()> {
        // diagonal through the middle, with a gap breaking the row
        let grid = Encoding::parse(
            concat!(
                "O----", //
                "-O---", //
                "OXO-O", //
                "---O-",
            ),
            4,
            5,
        )?
        .decode(4, 5);
        assert_eq!(run_length(&grid, 2, 2)?, 4);
        assert_eq!(run_length(&grid, 4, 2)?, 2);
        assert_eq!(run_length(&grid, 1, 2)?, 1);
        assert_eq!(run_length(&grid, 0, 2)?, 2);
        Ok(())
    }

    #[test]
    pub fn vertical_run_grows_on_live_board() -> Result<()> {
        let config = GameConfig::default();
        let mut board = ArrayBoard::new(config);
        let bottom = config.rows() - 1;

        for expected in 1..=3 {
            assert_eq!(board.play_checked(3)?, GameState::Playing);
            assert_eq!(board.run_length_at(3, bottom)?, expected);
            assert_eq!(board.grid().get(bottom + 1 - expected, 3), Mark::SideA);
            // side B stays out of the way
            board.play_checked(0)?;
        }
        assert_eq!(board.play_checked(3)?, GameState::SideAWin);
        assert_eq!(board.run_length_at(3, bottom)?, 4);
        Ok(())
    }

    #[test]
    pub fn live_board_rejects_illegal_moves() -> Result<()> {
        let config = GameConfig::new(2, 2, 2, Side::A)?;
        let mut board = ArrayBoard::new(config);

        let err = board.play_checked(2).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::ColumnOutOfRange { column: 2, cols: 2 })
        );

        board.play_checked(0)?;
        board.play_checked(0)?;
        let err = board.play_checked(0).unwrap_err();
        assert_eq!(engine_error(&err), Some(&EngineError::ColumnFull { column: 0 }));
        assert_eq!(board.playable_columns(), vec![1]);
        assert_eq!(board.num_moves(), 2);

        let draw = ArrayBoard::from_moves(GameConfig::new(1, 2, 2, Side::A)?, &[0, 1])?;
        assert_eq!(draw.state, GameState::Draw);
        let err = ArrayBoard::from_moves(GameConfig::new(1, 2, 2, Side::A)?, &[0, 1, 0]).unwrap_err();
        assert_eq!(engine_error(&err), Some(&EngineError::GameOver));
        Ok(())
    }

    #[test]
    pub fn config_validation() -> Result<()> {
        let err = GameConfig::new(0, 7, 4, Side::A).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::InvalidDimensions { rows: 0, cols: 7 })
        );
        let err = GameConfig::new(3, 3, 4, Side::A).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::InvalidWinLength {
                win_length: 4,
                max: 3
            })
        );
        assert_eq!(GameConfig::with_dimensions(3, 3)?.win_length(), 3);

        let err = MoveCursor::new(GameConfig::default(), search(0)).err().unwrap();
        assert_eq!(engine_error(&err), Some(&EngineError::InvalidDepth(0)));
        Ok(())
    }

    #[test]
    pub fn transpositions_share_one_node() -> Result<()> {
        let config = small_config()?;
        let mut store = NodeStore::new(&config);
        let root = store.root();
        let mut created = 0;

        let a = store.child(root, 0, &mut created)?;
        let a = store.child(a, 1, &mut created)?;
        let a = store.child(a, 2, &mut created)?;
        assert_eq!(created, 3);

        let b = store.child(root, 2, &mut created)?;
        let b = store.child(b, 1, &mut created)?;
        let b = store.child(b, 0, &mut created)?;
        // the last move lands on the board the first line already reached
        assert_eq!(created, 5);
        assert_eq!(a, b);
        assert_eq!(store.node(a).encoding().as_str(), "------OXO");
        assert_eq!(store.node(a).depth(), 3);
        assert_eq!(store.node(a).to_move(), Side::B);
        assert_eq!(store.len(), 6);
        assert_eq!(store.lookup(store.node(a).encoding()), Some(a));
        Ok(())
    }

    #[test]
    pub fn children_are_ordered_and_memoized() -> Result<()> {
        let config = small_config()?;
        let mut store = NodeStore::new(&config);
        let root = store.root();
        let mut created = 0;

        let children = store.children_of(root, &mut created)?.to_vec();
        assert_eq!(created, 3);
        assert_eq!(
            children.iter().map(|e| e.column).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(store.node(children[1].node).encoding().as_str(), "-------O-");

        let again = store.children_of(root, &mut created)?;
        assert_eq!(again, &children[..]);
        assert_eq!(created, 3);
        assert_eq!(store.node(root).children(), Some(&children[..]));
        Ok(())
    }

    #[test]
    pub fn full_columns_are_never_children() -> Result<()> {
        let config = small_config()?;
        let mut cursor = cursor_after(config, LeafSign::LastMover, &[1, 1, 1])?;
        let nodes = cursor.store().len();

        let err = cursor.advance(1).unwrap_err();
        assert_eq!(engine_error(&err), Some(&EngineError::ColumnFull { column: 1 }));
        let err = cursor.advance(3).unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::ColumnOutOfRange { column: 3, cols: 3 })
        );
        assert_eq!(cursor.store().len(), nodes);
        assert_eq!(cursor.current_node().free_row(1), None);

        cursor.explore(1)?;
        let children = cursor.current_node().children().unwrap_or(&[]);
        assert_eq!(
            children.iter().map(|e| e.column).collect::<Vec<_>>(),
            vec![0, 2]
        );
        Ok(())
    }

    #[test]
    pub fn heuristic_keeps_the_strongest_run() -> Result<()> {
        let config = GameConfig::new(4, 4, 4, Side::A)?;
        // A A B B along the bottom, then A plays away from its pair
        let cursor = cursor_after(config, LeafSign::LastMover, &[0, 2, 1, 3])?;
        assert_eq!(cursor.current_node().heuristic(), 2);

        let cursor = cursor_after(config, LeafSign::LastMover, &[0, 2, 1, 3, 3])?;
        assert_eq!(cursor.current_node().heuristic(), 2);

        let cursor = cursor_after(config, LeafSign::LastMover, &[0, 3, 1, 3, 2])?;
        assert_eq!(cursor.current_node().heuristic(), 3);
        Ok(())
    }

    #[test]
    pub fn best_column_requires_exploration() -> Result<()> {
        let mut cursor = MoveCursor::new(GameConfig::default(), search(2))?;
        let err = cursor.best_column().unwrap_err();
        assert!(matches!(engine_error(&err), Some(EngineError::Unexplored(_))));

        // a one-ply search leaves the children of the root as leaves
        cursor.explore(1)?;
        let column = cursor.best_column()?;
        cursor.advance(column)?;
        let err = cursor.best_column().unwrap_err();
        assert!(matches!(engine_error(&err), Some(EngineError::Unexplored(_))));

        // two plies past the root reach one ply past its best child
        let mut cursor = MoveCursor::new(GameConfig::default(), search(2))?;
        cursor.explore(2)?;
        let column = cursor.best_column()?;
        cursor.advance(column)?;
        assert!(cursor.best_column()? < 7);
        cursor.advance(0)?;
        let err = cursor.best_column().unwrap_err();
        assert!(matches!(engine_error(&err), Some(EngineError::Unexplored(_))));
        Ok(())
    }

    #[test]
    pub fn exploration_is_incremental() -> Result<()> {
        let mut cursor = MoveCursor::new(GameConfig::default(), search(3))?;
        let created = cursor.explore(3)?;
        // transpositions appear from the third ply on
        assert!(created > 7 + 49 && created < 7 + 49 + 343);
        assert_eq!(cursor.store().len(), 1 + created);

        // everything three plies deep already exists
        cursor.advance(3)?;
        assert_eq!(cursor.explore(2)?, 0);
        assert!(cursor.explore(3)? > 0);
        Ok(())
    }

    #[test]
    pub fn each_node_is_evaluated_once_per_search() -> Result<()> {
        let config = small_config()?;
        let mut engine = SearchEngine::new(&config, LeafSign::LastMover);
        let root = engine.store().root();
        engine.explore(root, 4)?;

        // no side can complete three pieces before the fifth ply
        let interior = engine.store().iter().filter(|n| n.depth() < 4).count();
        assert_eq!(engine.evaluations(), interior);
        // transpositions make the store smaller than the full tree
        assert!(engine.store().len() < 1 + 3 + 9 + 27 + 81);

        // a repeated search is answered from memoized values
        engine.explore(root, 4)?;
        assert_eq!(engine.evaluations(), 0);
        assert_eq!(engine.nodes_created(), 0);
        Ok(())
    }

    #[test]
    pub fn tie_break_prefers_shallower_values() -> Result<()> {
        let config = small_config()?;
        let mut store = NodeStore::new(&config);
        let mut created = 0;
        let children = store.children_of(store.root(), &mut created)?.to_vec();
        let shallow = Value {
            score: 3,
            depth: 5,
            node: children[0].node,
        };
        let deep = Value {
            score: 3,
            depth: 7,
            node: children[1].node,
        };

        assert_eq!(maximize(shallow, deep), shallow);
        assert_eq!(maximize(deep, shallow), shallow);
        assert_eq!(minimize(shallow, deep), shallow);
        assert_eq!(minimize(deep, shallow), shallow);

        let better = Value { score: 4, ..deep };
        assert_eq!(maximize(shallow, better), better);
        assert_eq!(minimize(shallow, better), shallow);

        // equal in score and depth: the incumbent stays
        let twin = Value {
            node: children[2].node,
            ..shallow
        };
        assert_eq!(maximize(shallow, twin), shallow);
        assert_eq!(minimize(twin, shallow), twin);
        Ok(())
    }

    // every distinct position reachable without the game ending
    fn reachable(
        board: &ArrayBoard,
        seen: &mut FxHashSet<Encoding>,
        positions: &mut Vec<ArrayBoard>,
    ) -> Result<()> {
        if board.state.is_over() || !seen.insert(board.encoding()) {
            return Ok(());
        }
        positions.push(board.clone());
        for column in board.playable_columns() {
            let mut next = board.clone();
            next.play_checked(column)?;
            reachable(&next, seen, positions)?;
        }
        Ok(())
    }

    #[test]
    pub fn search_matches_brute_force() -> Result<()> {
        for &first in [Side::A, Side::B].iter() {
            let config = GameConfig::new(3, 3, 3, first)?;
            let mut positions = Vec::new();
            reachable(&ArrayBoard::new(config), &mut FxHashSet::default(), &mut positions)?;
            assert!(positions.len() > 1000);

            for board in positions {
                let moves = board.history.clone();
                let expected = brute_force(&board)?;

                let mut cursor = cursor_after(config, LeafSign::LastMover, &moves)?;
                let value = cursor.search(config.cells() - moves.len())?;
                assert_eq!(
                    outcome(value.score, config.win_length()),
                    expected,
                    "after moves {:?}",
                    moves
                );

                // the recommended move keeps the exhaustive value
                let mut next = board.clone();
                next.play_checked(cursor.best_column()?)?;
                assert_eq!(brute_force(&next)?, expected, "after moves {:?}", moves);
            }
        }
        Ok(())
    }

    #[test]
    pub fn side_to_move_leaf_sign_misses_immediate_win() -> Result<()> {
        let config = small_config()?;
        // O O _ on the bottom row, X X _ above it, O to move
        let moves = [0, 0, 1, 1];

        let mut cursor = cursor_after(config, LeafSign::LastMover, &moves)?;
        cursor.explore(1)?;
        assert_eq!(cursor.best_column()?, 2);

        let mut cursor = cursor_after(config, LeafSign::SideToMove, &moves)?;
        cursor.explore(1)?;
        assert_eq!(cursor.best_column()?, 0);
        Ok(())
    }

    #[test]
    pub fn minimax_takes_the_win_and_blocks_it() -> Result<()> {
        let config = GameConfig::default();

        // side A has three along the bottom and is to move
        let mut cursor = cursor_after(config, LeafSign::LastMover, &[0, 6, 1, 6, 2, 5])?;
        cursor.explore(3)?;
        assert_eq!(cursor.best_column()?, 3);
        let value = cursor.search(3)?;
        assert_eq!((value.score, value.depth), (4, 7));

        // one ply earlier side B has to stop the same threat
        let mut cursor = cursor_after(config, LeafSign::LastMover, &[0, 6, 1, 6, 2])?;
        cursor.explore(2)?;
        assert_eq!(cursor.best_column()?, 3);
        Ok(())
    }

    #[test]
    pub fn minimax_agent_follows_the_game() -> Result<()> {
        let config = GameConfig::default();
        let mut agent = MinimaxAgent::new(search(2));
        assert_eq!(
            engine_error(&agent.play(None).unwrap_err()),
            Some(&EngineError::NotConfigured)
        );

        agent.configure(Side::B, &config)?;
        let reply = agent.play(Some(3))?;
        assert!(reply < config.cols());
        let cursor = agent.cursor().ok_or(EngineError::NotConfigured)?;
        assert_eq!(cursor.current_node().depth(), 2);
        assert_eq!(cursor.current_node().to_move(), Side::A);
        Ok(())
    }

    #[test]
    pub fn random_agent_only_plays_open_columns() -> Result<()> {
        let config = GameConfig::new(2, 3, 3, Side::A)?;
        for seed in 0..20 {
            let mut board = ArrayBoard::new(config);
            let mut agent = RandomAgent::seeded(seed);
            agent.configure(Side::A, &config)?;

            // the opponent always takes the leftmost open column
            let mut last = None;
            loop {
                let column = agent.play(last)?;
                board.play_checked(column)?;
                if board.state.is_over() {
                    break;
                }
                let reply = board.playable_columns()[0];
                board.play_checked(reply)?;
                if board.state.is_over() {
                    break;
                }
                last = Some(reply);
            }
            assert_ne!(board.state, GameState::Playing);
        }
        Ok(())
    }

    struct OutOfRange;

    impl Agent for OutOfRange {
        fn configure(&mut self, _side: Side, _config: &GameConfig) -> Result<()> {
            Ok(())
        }
        fn play(&mut self, _last_move: Option<usize>) -> Result<usize> {
            Ok(99)
        }
        fn name(&self) -> &str {
            "out of range"
        }
    }

    #[test]
    pub fn dispatcher_enforces_the_protocol() -> Result<()> {
        let config = GameConfig::default();

        let mut first = Dispatcher::new(Box::new(MinimaxAgent::new(search(2))));
        let err = first
            .handle(Message::Move { last_move: None })
            .unwrap_err();
        assert_eq!(engine_error(&err), Some(&EngineError::NotConfigured));

        let opening = first.handle(Message::Configure {
            side: Side::A,
            config,
        })?;
        assert!(matches!(opening, Some(column) if column < config.cols()));
        assert_eq!(first.side(), Some(Side::A));
        let err = first
            .handle(Message::Configure {
                side: Side::B,
                config,
            })
            .unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::AlreadyConfigured(Side::A))
        );

        let mut second = Dispatcher::new(Box::new(RandomAgent::seeded(7)));
        assert_eq!(
            second.handle(Message::Configure {
                side: Side::B,
                config
            })?,
            None
        );
        assert!(second.handle(Message::Move { last_move: opening })?.is_some());

        let mut broken = Dispatcher::new(Box::new(OutOfRange));
        broken.handle(Message::Configure {
            side: Side::B,
            config,
        })?;
        let err = broken
            .handle(Message::Move { last_move: Some(0) })
            .unwrap_err();
        assert_eq!(
            engine_error(&err),
            Some(&EngineError::ColumnOutOfRange { column: 99, cols: 7 })
        );
        Ok(())
    }

    #[test]
    pub fn match_is_played_to_the_end() -> Result<()> {
        let config = GameConfig::default();
        let result = play_match(
            config,
            Box::new(MinimaxAgent::new(search(3))),
            Box::new(RandomAgent::seeded(1)),
        )?;
        assert!(result.state.is_over());
        let replay = ArrayBoard::from_moves(config, &result.moves)?;
        assert_eq!(replay.state, result.state);
        assert_eq!(replay.encoding(), result.final_board);

        let err = play_match(config, Box::new(OutOfRange), Box::new(RandomAgent::seeded(2)))
            .unwrap_err();
        assert!(err.chain().any(|cause| cause
            .downcast_ref::<EngineError>()
            .map_or(false, |e| matches!(e, EngineError::ColumnOutOfRange { .. }))));
        Ok(())
    }

    #[test]
    pub fn minimax_beats_random_in_a_series() -> Result<()> {
        let config = GameConfig::default();
        let summary = play_series(
            config,
            8,
            |i| {
                (
                    Box::new(MinimaxAgent::new(search(4))) as Box<dyn Agent>,
                    Box::new(RandomAgent::seeded(i as u64)) as Box<dyn Agent>,
                )
            },
            None,
        )?;
        assert_eq!(summary.games(), 8);
        assert!(summary.side_a_wins > summary.side_b_wins);
        Ok(())
    }
}
