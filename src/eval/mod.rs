//! Evaluation module for Gomoku positions
//!
//! Evaluation is pluggable: the alpha-beta engine takes any
//! [`EvaluateFn`], and [`Heuristic`] names the built-in variants so a
//! config file can pick one. All scores are from Black's perspective.
//! - Decaying run counter over open windows
//! - Shape table (fives, fours, threes) with a center bonus
//! - Line segment automaton
//! - Constant zero, for pure terminal search

pub mod heuristic;
pub mod patterns;

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::board::Board;
use crate::error::GomokuError;

pub use heuristic::{run_score, segment_score, shape_score, strongest_shape};
pub use patterns::ShapeScore;

/// Score of a board won by Black
pub const BLACK_WIN: i64 = i64::MAX;
/// Score of a board won by White
pub const WHITE_WIN: i64 = i64::MIN;

/// Shared, thread-safe evaluation function
pub type EvaluateFn = Arc<dyn Fn(&Board) -> i64 + Send + Sync>;

/// Built-in evaluators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    Runs,
    #[default]
    Shapes,
    Segments,
    Zero,
}

impl Heuristic {
    /// Score a non-terminal board with this variant
    pub fn evaluate(self, board: &Board) -> i64 {
        match self {
            Heuristic::Runs => run_score(board),
            Heuristic::Shapes => shape_score(board),
            Heuristic::Segments => segment_score(board),
            Heuristic::Zero => 0,
        }
    }

    pub fn evaluate_fn(self) -> EvaluateFn {
        Arc::new(move |board: &Board| self.evaluate(board))
    }
}

impl FromStr for Heuristic {
    type Err = GomokuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "runs" => Ok(Heuristic::Runs),
            "shapes" => Ok(Heuristic::Shapes),
            "segments" => Ok(Heuristic::Segments),
            "zero" => Ok(Heuristic::Zero),
            other => Err(GomokuError::Config(format!("unknown heuristic '{other}'"))),
        }
    }
}
