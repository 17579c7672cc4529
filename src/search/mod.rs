//! Search module for Gomoku AI
//!
//! Contains:
//! - Alpha-Beta search with iterative deepening and a Lazy SMP worker pool
//! - Move-ordering cache shared between alpha-beta passes
//! - Concurrent Monte Carlo Tree Search with root relocation

pub mod alphabeta;
pub mod mcts;
pub mod ordering;

pub use alphabeta::{AlphaBetaEngine, SearchContext, SearchReturn, SearchState};
pub use mcts::{MctsEngine, Node, Rollout};
pub use ordering::{OrderingCache, OrderingEntry};
