//! Gomoku self-play demo
//!
//! MCTS plays Black against alpha-beta as White, each with a fixed think
//! time per move. Settings come from `gomoku.toml` / `GOMOKU_*` variables;
//! log verbosity from `RUST_LOG`.

use std::thread;
use std::time::{Duration, Instant};

use gomoku::config::{load_config, EngineConfig};
use gomoku::eval::strongest_shape;
use gomoku::{AlphaBetaEngine, Board, GameResult, GomokuError, MctsEngine, Move, Stone};
use tracing::{info, warn};

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gomoku=info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn mcts_move(engine: &MctsEngine, think: Duration) -> Option<Move> {
    thread::sleep(think);
    engine.result()
}

fn alphabeta_move(
    engine: &mut AlphaBetaEngine,
    board: &Board,
    think: Duration,
) -> Result<Option<Move>, GomokuError> {
    engine.start_search(board, false)?;
    thread::sleep(think);
    let mv = engine.result();
    engine.stop();
    Ok(mv)
}

fn play(config: &EngineConfig) -> Result<GameResult, GomokuError> {
    let think = Duration::from_millis(config.demo.think_ms);
    let mut board = Board::new();
    let mut mcts = MctsEngine::new(config.mcts.clone());
    let mut alphabeta = AlphaBetaEngine::from_config(config.alphabeta.clone());

    mcts.start_search(&board, true)?;

    for ply in 0..config.demo.max_plies {
        let started = Instant::now();
        let side = if ply % 2 == 0 { Stone::Black } else { Stone::White };
        let mv = match side {
            Stone::White => alphabeta_move(&mut alphabeta, &board, think)?,
            _ => mcts_move(&mcts, think),
        };
        let Some(mv) = mv else {
            warn!(ply, ?side, "engine produced no move, abandoning game");
            break;
        };

        board.try_move(mv)?;
        mcts.action(mv)?;
        info!(
            ply,
            mv = %mv,
            elapsed_ms = started.elapsed().as_millis() as u64,
            strongest_shape = strongest_shape(&board, side),
            mcts_root_visits = mcts.root_visits(),
            alphabeta_depth = alphabeta.completed_depth(),
            "move played"
        );

        if board.is_end() || board.is_full() {
            break;
        }
    }

    mcts.stop();
    Ok(board.result())
}

fn main() -> Result<(), GomokuError> {
    init_tracing();

    let config = load_config();
    info!(?config, "configuration loaded");

    let result = play(&config)?;
    match result.winner() {
        Some(Stone::Black) => info!("MCTS (Black) wins"),
        Some(_) => info!("alpha-beta (White) wins"),
        None => info!("no winner"),
    }
    Ok(())
}
