//! Concurrent Monte Carlo Tree Search
//!
//! Many workers grow one shared tree. Nodes are reference counted and their
//! statistics are relaxed atomics, so counts are approximate while workers
//! race. The only locks are the child list and the best-child cache of each
//! node, plus the (root node, root board) pair that [`MctsEngine::action`]
//! swaps when a real move is committed.
//!
//! A node expands its candidate moves in order, one per access, running a
//! random rollout from each new child. Once every candidate has a child,
//! accesses descend into a cached best child chosen by UCT; the cache is
//! recomputed every `refresh_interval` accesses.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::board::{Board, GameResult, Move, Pos, Stone, TOTAL_CELLS};
use crate::config::MctsConfig;
use crate::error::{GomokuError, Result};

// =============================================================================
// Rollouts
// =============================================================================

/// Per-worker random source and reusable coordinate buffer
pub struct Rollout {
    rng: ChaCha8Rng,
    coords: Vec<Pos>,
}

impl Rollout {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng,
            coords: (0..TOTAL_CELLS).map(Pos::from_index).collect(),
        }
    }

    /// Play uniformly random moves on a copy of `board` until it ends or fills.
    pub fn play(&mut self, board: &Board, black_to_move: bool) -> GameResult {
        let mut board = board.clone();
        let mut stone = Stone::from_black(black_to_move);
        self.coords.shuffle(&mut self.rng);
        for &pos in &self.coords {
            if board.is_end() {
                break;
            }
            if board.make_move(Move::at(stone, pos)) {
                stone = stone.opponent();
            }
        }
        board.result()
    }
}

// =============================================================================
// Node
// =============================================================================

/// State a worker carries down one descent
struct Descent<'a> {
    board: Board,
    rollout: &'a mut Rollout,
    root_visits: u64,
    exploration: f64,
    refresh_interval: u64,
}

type Child = (Move, Arc<Node>);

/// Shared tree node; `black_to_move` is the side to move at this node.
pub struct Node {
    black_to_move: bool,
    visits: AtomicU64,
    black_wins: AtomicU64,
    white_wins: AtomicU64,
    /// Claims expansion slots, then drives best-child refreshes
    access: AtomicU64,
    candidates: OnceCell<Vec<Move>>,
    children: RwLock<Vec<Child>>,
    best: RwLock<Option<Child>>,
}

impl Node {
    pub fn new(black_to_move: bool) -> Self {
        Self {
            black_to_move,
            visits: AtomicU64::new(0),
            black_wins: AtomicU64::new(0),
            white_wins: AtomicU64::new(0),
            access: AtomicU64::new(0),
            candidates: OnceCell::new(),
            children: RwLock::new(Vec::new()),
            best: RwLock::new(None),
        }
    }

    #[inline]
    pub fn black_to_move(&self) -> bool {
        self.black_to_move
    }

    #[inline]
    pub fn visits(&self) -> u64 {
        self.visits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn wins(&self, stone: Stone) -> u64 {
        match stone {
            Stone::Black => self.black_wins.load(Ordering::Relaxed),
            Stone::White => self.white_wins.load(Ordering::Relaxed),
            Stone::Empty => 0,
        }
    }

    /// Fraction of visits won by `stone`; 0 when unvisited
    pub fn win_rate(&self, stone: Stone) -> f64 {
        let n = self.visits();
        if n == 0 {
            return 0.0;
        }
        self.wins(stone) as f64 / n as f64
    }

    /// UCT value seen by the parent choosing this node.
    ///
    /// Wins are counted for the side that moved into this node.
    pub fn uct(&self, root_visits: u64, exploration: f64) -> f64 {
        let n = self.visits();
        if n == 0 {
            return 0.0;
        }
        let mover = Stone::from_black(!self.black_to_move);
        let exploit = self.wins(mover) as f64 / n as f64;
        let total = root_visits.max(1) as f64;
        exploit + exploration * (total.ln() / n as f64).sqrt()
    }

    /// Snapshot of materialized children
    pub fn children(&self) -> Vec<Child> {
        self.children.read().clone()
    }

    pub fn child(&self, mv: Move) -> Option<Arc<Node>> {
        self.children
            .read()
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, node)| Arc::clone(node))
    }

    fn record(&self, result: GameResult) {
        self.visits.fetch_add(1, Ordering::Relaxed);
        match result {
            GameResult::BlackWin => {
                self.black_wins.fetch_add(1, Ordering::Relaxed);
            }
            GameResult::WhiteWin => {
                self.white_wins.fetch_add(1, Ordering::Relaxed);
            }
            GameResult::NotEnded => {}
        }
    }

    /// Rollout from this node's position; records and returns the outcome.
    fn simulate(&self, board: &Board, rollout: &mut Rollout) -> GameResult {
        let result = rollout.play(board, self.black_to_move);
        self.record(result);
        result
    }

    /// Locally relevant moves; the center alone on an empty board.
    fn candidate_moves(&self, board: &Board) -> Vec<Move> {
        let stone = Stone::from_black(self.black_to_move);
        if board.is_initial() {
            return vec![Move::at(stone, Pos::center())];
        }
        let all = board.moves(stone);
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

    fn refresh_best(&self, root_visits: u64, exploration: f64) {
        let best = self
            .children
            .read()
            .iter()
            .max_by(|a, b| {
                a.1.uct(root_visits, exploration)
                    .total_cmp(&b.1.uct(root_visits, exploration))
            })
            .cloned();
        if let Some((mv, _)) = &best {
            trace!(best = %mv, "best child refreshed");
            *self.best.write() = best;
        }
    }

    /// One descent: expand an untried move or follow the cached best child.
    ///
    /// Statistics are recorded on the way back up, so every node on the path
    /// sees the outcome exactly once.
    fn expand(&self, ctx: &mut Descent<'_>) -> GameResult {
        if ctx.board.is_end() {
            let result = ctx.board.result();
            self.record(result);
            return result;
        }

        let candidates = self.candidates.get_or_init(|| self.candidate_moves(&ctx.board));
        if candidates.is_empty() {
            // Full board
            self.record(GameResult::NotEnded);
            return GameResult::NotEnded;
        }

        let index = self.access.fetch_add(1, Ordering::Relaxed);
        let expanded = candidates.len() as u64;

        if index < expanded {
            let mv = candidates[index as usize];
            let child = Arc::new(Node::new(!self.black_to_move));
            if index == 0 {
                *self.best.write() = Some((mv, Arc::clone(&child)));
            }
            self.children.write().push((mv, Arc::clone(&child)));

            let result = match ctx.board.apply(mv) {
                Some(board) => child.simulate(&board, ctx.rollout),
                None => GameResult::NotEnded,
            };
            self.record(result);
            return result;
        }

        if (index - expanded) % ctx.refresh_interval.max(1) == 0 {
            self.refresh_best(ctx.root_visits, ctx.exploration);
        }

        let best = self.best.read().clone();
        match best {
            Some((mv, child)) => {
                let placed = ctx.board.make_move(mv);
                debug_assert!(placed, "best child {mv} is occupied");
                let result = child.expand(ctx);
                ctx.board.withdraw_move(mv);
                self.record(result);
                result
            }
            // Slot 0 is claimed but its child is not published yet
            None => self.simulate(&ctx.board, ctx.rollout),
        }
    }

    fn dump(
        &self,
        out: &mut dyn Write,
        mv: Option<Move>,
        depth: usize,
        max_depth: usize,
        root_visits: u64,
        exploration: f64,
    ) -> io::Result<()> {
        let label = mv.map_or_else(|| "root".to_string(), |m| m.to_string());
        writeln!(
            out,
            "{}{} value:{:.4} b_rate:{:.4} w_rate:{:.4} bw:{} ww:{} n:{}",
            "  ".repeat(depth),
            label,
            self.uct(root_visits, exploration),
            self.win_rate(Stone::Black),
            self.win_rate(Stone::White),
            self.wins(Stone::Black),
            self.wins(Stone::White),
            self.visits(),
        )?;
        if depth < max_depth {
            for (child_mv, child) in self.children() {
                child.dump(
                    out,
                    Some(child_mv),
                    depth + 1,
                    max_depth,
                    root_visits,
                    exploration,
                )?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Engine
// =============================================================================

struct Root {
    node: Arc<Node>,
    board: Board,
}

struct SharedState {
    config: MctsConfig,
    root: RwLock<Root>,
    stopped: AtomicBool,
    playouts: AtomicU64,
    /// Workers that have not yet left `run_worker`
    active_workers: AtomicUsize,
}

impl SharedState {
    #[inline]
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    fn run_worker(&self, worker_id: u64) {
        let mut rollout = Rollout::new(self.config.seed.map(|s| s.wrapping_add(worker_id)));

        while !self.is_stopped() {
            if let Some(max) = self.config.max_playouts {
                if self.playouts.fetch_add(1, Ordering::Relaxed) >= max {
                    break;
                }
            }

            let (node, board) = {
                let root = self.root.read();
                (Arc::clone(&root.node), root.board.clone())
            };
            let mut descent = Descent {
                board,
                rollout: &mut rollout,
                root_visits: node.visits(),
                exploration: self.config.exploration,
                refresh_interval: self.config.refresh_interval,
            };
            node.expand(&mut descent);
        }
        self.active_workers.fetch_sub(1, Ordering::Release);
        debug!(worker_id, "mcts worker exited");
    }
}

/// Multi-threaded MCTS engine.
///
/// The tree survives committed moves: [`MctsEngine::action`] moves the root
/// to the matching child and keeps its statistics.
pub struct MctsEngine {
    shared: Arc<SharedState>,
    workers: Vec<JoinHandle<()>>,
}

impl MctsEngine {
    /// Create an idle engine rooted at the empty board with Black to move.
    #[must_use]
    pub fn new(config: MctsConfig) -> Self {
        Self {
            shared: Arc::new(SharedState {
                config,
                root: RwLock::new(Root {
                    node: Arc::new(Node::new(true)),
                    board: Board::new(),
                }),
                stopped: AtomicBool::new(true),
                playouts: AtomicU64::new(0),
                active_workers: AtomicUsize::new(0),
            }),
            workers: Vec::new(),
        }
    }

    /// Start searching from a fresh root, stopping any earlier search.
    pub fn start_search(&mut self, board: &Board, black_to_move: bool) -> Result<()> {
        self.stop();
        if board.is_end() || board.is_full() {
            return Err(GomokuError::GameOver);
        }

        *self.shared.root.write() = Root {
            node: Arc::new(Node::new(black_to_move)),
            board: board.clone(),
        };
        self.shared.playouts.store(0, Ordering::Relaxed);
        self.shared.stopped.store(false, Ordering::Relaxed);

        let threads = self.shared.config.threads.max(1);
        self.shared.active_workers.store(threads, Ordering::Relaxed);
        info!(
            threads,
            max_playouts = ?self.shared.config.max_playouts,
            side = ?Stone::from_black(black_to_move),
            hash = board.hash(),
            "mcts search started"
        );

        self.workers = (0..threads as u64)
            .map(|worker_id| {
                let shared = Arc::clone(&self.shared);
                std::thread::spawn(move || shared.run_worker(worker_id))
            })
            .collect();
        Ok(())
    }

    /// Commit a real move and relocate the root to its child.
    ///
    /// Works whether or not a search is running. Stops the engine if the
    /// move ends the game.
    pub fn action(&mut self, mv: Move) -> Result<()> {
        let finished = {
            let mut root = self.shared.root.write();
            let expected = Stone::from_black(root.node.black_to_move());
            if mv.stone != expected {
                return Err(GomokuError::WrongTurn {
                    expected,
                    got: mv.stone,
                });
            }

            let mut board = root.board.clone();
            board.try_move(mv)?;
            let node = root
                .node
                .child(mv)
                .unwrap_or_else(|| Arc::new(Node::new(!root.node.black_to_move())));

            info!(mv = %mv, reused_visits = node.visits(), "root relocated");
            *root = Root { node, board };
            root.board.is_end() || root.board.is_full()
        };

        if finished {
            self.stop();
        }
        Ok(())
    }

    /// Child of the root with the best win rate for the side to move.
    ///
    /// Equal rates go to the more visited child.
    /// Never pauses the search; `None` until some child has been visited.
    pub fn result(&self) -> Option<Move> {
        let root = self.shared.root.read();
        let side = Stone::from_black(root.node.black_to_move());
        let children = root.node.children.read();
        children
            .iter()
            .filter(|(_, node)| node.visits() > 0)
            .max_by(|a, b| {
                a.1.win_rate(side)
                    .total_cmp(&b.1.win_rate(side))
                    .then_with(|| a.1.visits().cmp(&b.1.visits()))
            })
            .map(|(mv, _)| *mv)
    }

    /// Visits recorded at the current root
    pub fn root_visits(&self) -> u64 {
        self.shared.root.read().node.visits()
    }

    /// Board at the current root
    pub fn root_board(&self) -> Board {
        self.shared.root.read().board.clone()
    }

    /// True while some worker is still running, including after the
    /// playout budget is spent but before the last worker has exited.
    pub fn is_searching(&self) -> bool {
        !self.shared.is_stopped() && self.shared.active_workers.load(Ordering::Acquire) > 0
    }

    /// Cancel the search and join every worker.
    pub fn stop(&mut self) {
        self.shared.stopped.store(true, Ordering::Relaxed);
        let joined = self.workers.len();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        if joined > 0 {
            info!(root_visits = self.root_visits(), "mcts search stopped");
        }
    }

    /// Join workers once the playout budget is spent.
    ///
    /// Blocks forever if `max_playouts` is unset and nobody calls `stop`.
    pub fn wait(&mut self) {
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        self.shared.stopped.store(true, Ordering::Relaxed);
    }

    /// Write node statistics down to `max_depth` levels below the root.
    pub fn dump_tree(&self, out: &mut dyn Write, max_depth: usize) -> io::Result<()> {
        let root = Arc::clone(&self.shared.root.read().node);
        let root_visits = root.visits();
        writeln!(out, "root_n:{root_visits}")?;
        root.dump(
            out,
            None,
            0,
            max_depth,
            root_visits,
            self.shared.config.exploration,
        )
    }
}

impl Drop for MctsEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
