//! Gomoku search engines for the 15x15 five-in-a-row game
//!
//! Two background move pickers over a shared board representation:
//! - Standard 15x15 board, Black moves first
//! - 5 or more in a row wins, on any axis, whether or not the ends are blocked
//! - No captures and no forbidden moves
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - [`board`]: Bitboard-backed board with incremental win detection
//! - [`eval`]: Pluggable position evaluators
//! - [`search`]: Alpha-beta (iterative deepening) and concurrent MCTS engines
//! - [`config`]: TOML and environment configuration
//! - [`error`]: Crate error type
//!
//! # Quick Start
//!
//! ```
//! use gomoku::{Board, MctsEngine, Move};
//! use gomoku::config::MctsConfig;
//!
//! let board = Board::from_moves(&[Move::black(7, 7), Move::white(7, 8)]).unwrap();
//! let mut engine = MctsEngine::new(MctsConfig {
//!     threads: 2,
//!     max_playouts: Some(500),
//!     ..MctsConfig::default()
//! });
//!
//! engine.start_search(&board, true).unwrap();
//! engine.wait();
//! if let Some(mv) = engine.result() {
//!     println!("MCTS plays {mv} after {} playouts", engine.root_visits());
//! }
//! ```
//!
//! # Concurrency
//!
//! Both engines search on background threads and never block the caller
//! beyond `result()` waiting for a first answer. `stop()` is synchronous:
//! it returns only after every worker has exited.

pub mod board;
pub mod config;
pub mod error;
pub mod eval;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, GameResult, Move, Pos, Stone, BOARD_SIZE};
pub use error::{GomokuError, Result};
pub use eval::{EvaluateFn, Heuristic};
pub use search::{AlphaBetaEngine, MctsEngine, SearchReturn, SearchState};
