//! End-to-end scenarios across the board and both engines.

use std::thread;
use std::time::{Duration, Instant};

use gomoku::config::{AlphaBetaConfig, MctsConfig};
use gomoku::{
    AlphaBetaEngine, Board, GameResult, GomokuError, Heuristic, MctsEngine, Move, Stone,
};

/// Black to move with a four on row 7 whose left end is blocked: (7, 7) is the only win
fn one_winning_move() -> Board {
    Board::from_moves(&[
        Move::black(7, 3),
        Move::white(7, 2),
        Move::black(7, 4),
        Move::white(3, 3),
        Move::black(7, 5),
        Move::white(3, 11),
        Move::black(7, 6),
        Move::white(11, 5),
    ])
    .unwrap()
}

#[test]
fn test_five_ends_game_exactly_on_fifth_stone() {
    let mut board = Board::new();
    for c in 7..11 {
        assert!(board.make_move(Move::black(7, c)));
        assert!(!board.is_end());
        assert!(board.make_move(Move::white(6, c)));
        assert!(!board.is_end());
    }
    assert!(board.make_move(Move::black(7, 11)));
    assert_eq!(board.result(), GameResult::BlackWin);
}

#[test]
fn test_alphabeta_zero_evaluator_finds_win() {
    let board = one_winning_move();
    for depth in [1, 2, 3] {
        let mut engine = AlphaBetaEngine::new(AlphaBetaConfig {
            threads: 2,
            max_depth: Some(depth),
            heuristic: Heuristic::Zero,
        });
        engine.set_evaluate_function(std::sync::Arc::new(|_: &Board| 0));
        engine.start_search(&board, true).unwrap();
        engine.wait();
        assert_eq!(engine.result(), Some(Move::black(7, 7)), "depth {depth}");
    }
}

#[test]
fn test_mcts_finds_single_winning_move() {
    let board = one_winning_move();
    let trials = 5;
    let mut hits = 0;
    for seed in 0..trials {
        let mut engine = MctsEngine::new(MctsConfig {
            threads: 3,
            max_playouts: Some(20_000),
            seed: Some(seed),
            ..MctsConfig::default()
        });
        engine.start_search(&board, true).unwrap();
        engine.wait();
        if engine.result() == Some(Move::black(7, 7)) {
            hits += 1;
        }
    }
    assert!(hits >= 4, "winning move chosen in {hits}/{trials} trials");
}

#[test]
fn test_mcts_commit_cycle_never_picks_occupied_cell() {
    let mut board = Board::from_moves(&[Move::black(7, 7)]).unwrap();
    let mut engine = MctsEngine::new(MctsConfig {
        threads: 3,
        seed: Some(17),
        ..MctsConfig::default()
    });
    engine.start_search(&board, false).unwrap();

    let mut side = Stone::White;
    for _ in 0..30 {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mv = loop {
            if let Some(mv) = engine.result() {
                break mv;
            }
            assert!(Instant::now() < deadline, "no result at {}", board.stone_count());
            thread::sleep(Duration::from_millis(2));
        };

        assert_eq!(mv.stone, side);
        assert!(board.is_empty(mv.pos), "{mv} is occupied");
        board.try_move(mv).unwrap();
        engine.action(mv).unwrap();
        assert_eq!(engine.root_board(), board);

        if board.is_end() {
            assert!(!engine.is_searching());
            assert_eq!(
                engine.action(Move::at(side.opponent(), mv.pos)),
                Err(GomokuError::GameOver)
            );
            break;
        }
        side = side.opponent();
    }
    engine.stop();
}

#[test]
fn test_engines_agree_on_blocking() {
    // White must block (7, 7) or lose immediately
    let board = one_winning_move();

    let mut alphabeta = AlphaBetaEngine::from_config(AlphaBetaConfig {
        threads: 1,
        max_depth: Some(2),
        heuristic: Heuristic::Shapes,
    });
    alphabeta.start_search(&board, false).unwrap();
    alphabeta.wait();
    assert_eq!(alphabeta.result(), Some(Move::white(7, 7)));
}
