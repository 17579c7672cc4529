//! Alpha-Beta search with iterative deepening
//!
//! Minimax with alpha-beta pruning, scored from Black's perspective: Black
//! maximizes and White minimizes. The search runs in the background and the
//! caller reads the best move so far without interrupting it.
//!
//! # Features
//!
//! - Iterative deepening; each completed depth is recorded, interrupted passes are discarded
//! - **Lazy SMP**: worker k starts deepening at depth 1 + k, all workers share one cache
//! - Move-ordering cache keyed by (board hash, side) feeding the next, deeper pass
//! - Pluggable evaluator; terminal boards always score `i64::MAX` / `i64::MIN`
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Board, Move};
//! use gomoku::config::AlphaBetaConfig;
//! use gomoku::eval::Heuristic;
//! use gomoku::search::AlphaBetaEngine;
//!
//! let mut engine = AlphaBetaEngine::new(AlphaBetaConfig {
//!     threads: 1,
//!     max_depth: Some(2),
//!     ..AlphaBetaConfig::default()
//! });
//! engine.set_evaluate_function(Heuristic::Segments.evaluate_fn());
//!
//! let board = Board::from_moves(&[Move::black(7, 7), Move::white(7, 8)]).unwrap();
//! engine.start_search(&board, true).unwrap();
//! engine.wait();
//! let best = engine.result().unwrap();
//! assert!(board.is_empty(best.pos));
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::board::{Board, GameResult, Move, Stone, TOTAL_CELLS};
use crate::config::AlphaBetaConfig;
use crate::error::{GomokuError, Result};
use crate::eval::{EvaluateFn, BLACK_WIN, WHITE_WIN};

use super::ordering::{OrderingCache, OrderingEntry};

/// Outcome of searching one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReturn {
    /// Move played at the node that produced `score`; `None` at leaves
    pub mv: Option<Move>,
    /// Score from Black's perspective
    pub score: i64,
    /// Plies searched below the node
    pub depth: u32,
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Never started, or every worker reached `max_depth`
    Idle,
    Searching,
    /// Cancelled by [`AlphaBetaEngine::stop`]
    Stopped,
}

/// Per-pass search state owned by one worker.
///
/// The board is mutated in place with `make_move` / `withdraw_move`; the
/// history stack guarantees only the most recent move is ever withdrawn.
pub struct SearchContext {
    board: Board,
    history: Vec<Move>,
    current_depth: u32,
    depth_limit: u32,
    nodes: u64,
    leaves: u64,
    started: Instant,
}

impl SearchContext {
    pub fn new(board: Board, depth_limit: u32) -> Self {
        Self {
            board,
            history: Vec::with_capacity(depth_limit as usize),
            current_depth: 0,
            depth_limit,
            nodes: 0,
            leaves: 0,
            started: Instant::now(),
        }
    }

    fn push(&mut self, mv: Move) {
        let placed = self.board.make_move(mv);
        debug_assert!(placed, "candidate {mv} was not empty");
        self.history.push(mv);
        self.current_depth += 1;
    }

    /// # Panics
    ///
    /// Panics if there is no pushed move to withdraw.
    fn pop(&mut self) {
        let Some(mv) = self.history.pop() else {
            panic!("pop without a matching push");
        };
        self.board.withdraw_move(mv);
        self.current_depth -= 1;
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    #[inline]
    pub fn leaves(&self) -> u64 {
        self.leaves
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

// =============================================================================
// SharedState: thread-safe state shared across all workers
// =============================================================================

struct SharedState {
    evaluate: EvaluateFn,
    ordering: OrderingCache,
    /// Global stop signal, set by `stop()`
    stopped: AtomicBool,
    /// Completed depth -> result
    results: Mutex<BTreeMap<u32, SearchReturn>>,
    /// Signalled when a depth is recorded or a worker exits
    recorded: Condvar,
    active_workers: AtomicUsize,
    nodes: AtomicU64,
}

impl SharedState {
    fn new(evaluate: EvaluateFn, threads: usize) -> Self {
        Self {
            evaluate,
            ordering: OrderingCache::new(),
            stopped: AtomicBool::new(false),
            results: Mutex::new(BTreeMap::new()),
            recorded: Condvar::new(),
            active_workers: AtomicUsize::new(threads),
            nodes: AtomicU64::new(0),
        }
    }

    #[inline]
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    fn score(&self, board: &Board) -> i64 {
        match board.result() {
            GameResult::BlackWin => BLACK_WIN,
            GameResult::WhiteWin => WHITE_WIN,
            GameResult::NotEnded => (self.evaluate)(board),
        }
    }

    fn record(&self, depth: u32, ret: SearchReturn) {
        let mut results = self.results.lock();
        results.entry(depth).or_insert(ret);
        self.recorded.notify_all();
    }

    fn worker_exit(&self) {
        let _results = self.results.lock();
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
        self.recorded.notify_all();
    }

    /// Candidate moves for the side to move, best-first when cached.
    fn candidates(&self, board: &Board, hash: u64, maximizing: bool) -> Vec<Move> {
        if let Some(cached) = self.ordering.ordered(hash, maximizing) {
            // Hash collisions can surface moves that do not fit this board
            let stone = Stone::from_black(maximizing);
            let cached: Vec<Move> = cached
                .into_iter()
                .filter(|mv| mv.stone == stone && board.is_empty(mv.pos))
                .collect();
            if !cached.is_empty() {
                return cached;
            }
        }

        let all = board.moves(Stone::from_black(maximizing));
        let local: Vec<Move> = all
            .iter()
            .copied()
            .filter(|&mv| !board.is_cut_move(mv))
            .collect();
        if local.is_empty() {
            all
        } else {
            local
        }
    }

    /// Minimax with alpha-beta bounds over `ctx.board`.
    ///
    /// `alpha` is the score Black is already guaranteed, `beta` the score
    /// White is already guaranteed. The returned move is the one played at
    /// this node.
    fn dfs(
        &self,
        ctx: &mut SearchContext,
        maximizing: bool,
        mut alpha: i64,
        mut beta: i64,
    ) -> SearchReturn {
        ctx.nodes += 1;
        if ctx.current_depth >= ctx.depth_limit
            || ctx.board.is_end()
            || ctx.board.is_full()
            || self.is_stopped()
        {
            ctx.leaves += 1;
            return SearchReturn {
                mv: None,
                score: self.score(&ctx.board),
                depth: 0,
            };
        }

        let hash = ctx.board.hash();
        let candidates = self.candidates(&ctx.board, hash, maximizing);
        let mut explored: OrderingEntry = Vec::with_capacity(candidates.len());
        let mut best: Option<SearchReturn> = None;

        let mut remaining = candidates.into_iter();
        for mv in remaining.by_ref() {
            ctx.push(mv);
            let child = self.dfs(ctx, !maximizing, alpha, beta);
            ctx.pop();
            explored.push((mv, Some(child)));

            let improves = best.map_or(true, |b| {
                if maximizing {
                    child.score > b.score
                } else {
                    child.score < b.score
                }
            });
            if improves {
                best = Some(SearchReturn {
                    mv: Some(mv),
                    score: child.score,
                    depth: child.depth + 1,
                });
            }

            let score = best.map_or(child.score, |b| b.score);
            if maximizing {
                if score >= beta {
                    break;
                }
                alpha = alpha.max(score);
            } else {
                if score <= alpha {
                    break;
                }
                beta = beta.min(score);
            }
        }
        explored.extend(remaining.map(|mv| (mv, None)));

        if !self.is_stopped() {
            let draft = ctx.depth_limit - ctx.current_depth;
            self.ordering.store(hash, maximizing, draft, explored);
        }

        best.unwrap_or(SearchReturn {
            mv: None,
            score: self.score(&ctx.board),
            depth: 0,
        })
    }

    /// Iterative deepening loop for one worker.
    fn run_worker(
        &self,
        board: Board,
        black_to_move: bool,
        start_depth: u32,
        max_depth: Option<u32>,
    ) {
        let empty_cells = (TOTAL_CELLS as u32).saturating_sub(board.stone_count());
        let mut depth = start_depth;

        while !self.is_stopped()
            && max_depth.map_or(true, |max| depth <= max)
            && depth <= empty_cells
        {
            let mut ctx = SearchContext::new(board.clone(), depth);
            let ret = self.dfs(&mut ctx, black_to_move, i64::MIN, i64::MAX);
            self.nodes.fetch_add(ctx.nodes(), Ordering::Relaxed);

            // An interrupted pass saw a truncated tree
            if self.is_stopped() {
                break;
            }

            debug!(
                depth,
                score = ret.score,
                best = ?ret.mv.map(|m| m.to_string()),
                nodes = ctx.nodes(),
                leaves = ctx.leaves(),
                elapsed_ms = ctx.elapsed().as_millis() as u64,
                "depth completed"
            );
            self.record(depth, SearchReturn { depth, ..ret });
            depth += 1;
        }

        self.worker_exit();
    }
}

// =============================================================================
// AlphaBetaEngine: public API
// =============================================================================

/// Background alpha-beta searcher.
pub struct AlphaBetaEngine {
    config: AlphaBetaConfig,
    evaluate: Option<EvaluateFn>,
    shared: Option<Arc<SharedState>>,
    workers: Vec<JoinHandle<()>>,
}

impl AlphaBetaEngine {
    /// Create an engine with no evaluator registered.
    #[must_use]
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self {
            config,
            evaluate: None,
            shared: None,
            workers: Vec::new(),
        }
    }

    /// Create an engine with the config's heuristic already registered.
    #[must_use]
    pub fn from_config(config: AlphaBetaConfig) -> Self {
        let evaluate = config.heuristic.evaluate_fn();
        let mut engine = Self::new(config);
        engine.set_evaluate_function(evaluate);
        engine
    }

    /// Register the heuristic used at non-terminal leaves.
    ///
    /// Takes effect at the next `start_search`.
    pub fn set_evaluate_function(&mut self, evaluate: EvaluateFn) {
        self.evaluate = Some(evaluate);
    }

    /// Score `board` from Black's perspective.
    ///
    /// # Panics
    ///
    /// Panics if no evaluator has been registered.
    pub fn evaluate(&self, board: &Board) -> i64 {
        match board.result() {
            GameResult::BlackWin => BLACK_WIN,
            GameResult::WhiteWin => WHITE_WIN,
            GameResult::NotEnded => match &self.evaluate {
                Some(evaluate) => evaluate(board),
                None => panic!("evaluate called before an evaluator was registered"),
            },
        }
    }

    /// Start searching `board` in the background, stopping any earlier search.
    ///
    /// Fails with `NoEvaluator` if no evaluator is registered and with
    /// `GameOver` if the board is already won or full.
    pub fn start_search(&mut self, board: &Board, black_to_move: bool) -> Result<()> {
        self.stop();

        let evaluate = self.evaluate.clone().ok_or(GomokuError::NoEvaluator)?;
        if board.is_end() || board.is_full() {
            return Err(GomokuError::GameOver);
        }

        let threads = self.config.threads.max(1);
        let shared = Arc::new(SharedState::new(evaluate, threads));

        info!(
            threads,
            max_depth = ?self.config.max_depth,
            ordering_capacity = shared.ordering.capacity(),
            side = ?Stone::from_black(black_to_move),
            stones = board.stone_count(),
            "alpha-beta search started"
        );

        let max_depth = self.config.max_depth;
        self.workers = (0..threads)
            .map(|worker_id| {
                let shared = Arc::clone(&shared);
                let board = board.clone();
                let start_depth = 1 + worker_id as u32;
                std::thread::spawn(move || {
                    shared.run_worker(board, black_to_move, start_depth, max_depth);
                })
            })
            .collect();
        self.shared = Some(shared);
        Ok(())
    }

    /// Best move of the deepest completed pass.
    ///
    /// Waits until the first depth is recorded, without interrupting the
    /// search. Returns `None` only if the search ended before any depth
    /// completed, or if no search was ever started.
    pub fn result(&self) -> Option<Move> {
        self.best().and_then(|ret| ret.mv)
    }

    /// Deepest recorded result, waiting for the first one if necessary.
    pub fn best(&self) -> Option<SearchReturn> {
        let shared = self.shared.as_ref()?;
        let mut results = shared.results.lock();
        loop {
            if let Some((_, ret)) = results.iter().next_back() {
                return Some(*ret);
            }
            if shared.is_stopped() || shared.active_workers.load(Ordering::Acquire) == 0 {
                return None;
            }
            shared.recorded.wait(&mut results);
        }
    }

    /// Snapshot of every recorded depth
    pub fn results(&self) -> BTreeMap<u32, SearchReturn> {
        self.shared
            .as_ref()
            .map(|s| s.results.lock().clone())
            .unwrap_or_default()
    }

    /// Deepest completed depth, 0 if none yet
    pub fn completed_depth(&self) -> u32 {
        self.shared
            .as_ref()
            .and_then(|s| s.results.lock().keys().next_back().copied())
            .unwrap_or(0)
    }

    /// Nodes visited by completed and interrupted passes
    pub fn nodes(&self) -> u64 {
        self.shared
            .as_ref()
            .map_or(0, |s| s.nodes.load(Ordering::Relaxed))
    }

    pub fn state(&self) -> SearchState {
        match &self.shared {
            None => SearchState::Idle,
            Some(s) if s.is_stopped() => SearchState::Stopped,
            Some(s) if s.active_workers.load(Ordering::Acquire) > 0 => SearchState::Searching,
            Some(_) => SearchState::Idle,
        }
    }

    /// Cancel the search and join every worker.
    ///
    /// Recorded results stay readable afterwards.
    pub fn stop(&mut self) {
        let Some(shared) = &self.shared else {
            return;
        };
        if !shared.is_stopped() {
            let _results = shared.results.lock();
            shared.stopped.store(true, Ordering::Relaxed);
            shared.recorded.notify_all();
        }
        self.join_workers();
    }

    /// Join workers without cancelling; returns once every worker has hit `max_depth`.
    ///
    /// Blocks forever if `max_depth` is unset and nobody calls `stop`.
    pub fn wait(&mut self) {
        self.join_workers();
    }

    fn join_workers(&mut self) {
        let joined = self.workers.len();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        if joined > 0 {
            info!(
                depth = self.completed_depth(),
                nodes = self.nodes(),
                cached_positions = self.shared.as_ref().map_or(0, |s| s.ordering.len()),
                "alpha-beta search finished"
            );
        }
    }
}

impl Drop for AlphaBetaEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
