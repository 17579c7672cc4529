//! Error types for board replay, engine control and configuration.

use thiserror::Error;

use crate::board::{Pos, Stone};

/// Recoverable errors reported to callers.
///
/// Misuse of the undo discipline (withdrawing the wrong stone, moving on a
/// finished board through `Board::make_move`, evaluating without a registered
/// function) is not represented here: those are assertions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GomokuError {
    #[error("coordinates ({row}, {col}) are outside the board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("cell ({}, {}) is already occupied", .0.row, .0.col)]
    Occupied(Pos),

    #[error("the game has already ended")]
    GameOver,

    #[error("no evaluation function has been registered")]
    NoEvaluator,

    #[error("it is {expected:?}'s turn, got a {got:?} move")]
    WrongTurn { expected: Stone, got: Stone },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience Result type for gomoku operations
pub type Result<T> = std::result::Result<T, GomokuError>;
