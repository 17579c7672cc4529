//! Heuristic evaluation functions for Gomoku board positions
//!
//! Every function here scores a non-terminal board from Black's perspective:
//! positive values favour Black, negative values favour White. Terminal boards
//! are never passed in; the search maps them to `i64::MAX` / `i64::MIN` itself.
//!
//! - [`run_score`]: decaying run counter over each stone's open window
//! - [`shape_score`]: classic shape table (fives, fours, threes) plus center bonus
//! - [`segment_score`]: line automaton over every row, column and diagonal

use crate::board::{Board, Pos, Stone, BOARD_SIZE, WIN_LENGTH};

use super::patterns::{self, ShapeScore};

/// Direction vectors for line checking (4 directions)
const DIRECTIONS: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

#[inline]
fn signed(score: i64, color: Stone) -> i64 {
    if color == Stone::White {
        -score
    } else {
        score
    }
}

#[inline]
fn cell(board: &Board, r: i32, c: i32) -> Option<Stone> {
    if Pos::is_valid(r, c) {
        Some(board.get(Pos::new(r as u8, c as u8)))
    } else {
        None
    }
}

/// Score every stone by the window it can still grow into.
///
/// For each stone and axis, the window is the stretch of own stones and
/// empties around it, bounded by an opposing stone or the edge. Windows
/// shorter than five can never hold a win and score nothing. Longer windows
/// are scanned with a counter that rises on own stones and decays on empties.
#[must_use]
pub fn run_score(board: &Board) -> i64 {
    board
        .positions()
        .map(|(pos, color)| {
            let score: i64 = DIRECTIONS
                .iter()
                .map(|&(dr, dc)| window_run_score(board, pos, dr, dc, color))
                .sum();
            signed(score, color)
        })
        .sum()
}

fn window_run_score(board: &Board, pos: Pos, dr: i32, dc: i32, color: Stone) -> i64 {
    let open = |s: Option<Stone>| s == Some(color) || s == Some(Stone::Empty);

    // Walk back to the start of the window
    let (mut r, mut c) = (i32::from(pos.row), i32::from(pos.col));
    while open(cell(board, r - dr, c - dc)) {
        r -= dr;
        c -= dc;
    }

    let mut window = [false; BOARD_SIZE];
    let mut len = 0;
    while open(cell(board, r, c)) {
        window[len] = board.get(Pos::new(r as u8, c as u8)) == color;
        len += 1;
        r += dr;
        c += dc;
    }

    if len < WIN_LENGTH {
        return 0;
    }

    let mut total = 0i64;
    let mut run = 0i64;
    for &own in &window[..len] {
        run = if own { run + 1 } else { (run - 1).max(0) };
        total += run;
    }
    total
}

/// Shape-table evaluation with a center bonus.
///
/// Each contiguous run is scored once, from its first stone, by length and
/// by how many of its two ends are empty. Every stone also earns
/// `2^(distance to the nearest edge)`.
#[must_use]
pub fn shape_score(board: &Board) -> i64 {
    let mut result = 0i64;
    for (pos, color) in board.positions() {
        let mut score = patterns::position_score(pos.row, pos.col, BOARD_SIZE as u8);
        for &(dr, dc) in &DIRECTIONS {
            score += evaluate_line(board, pos, dr, dc, color);
        }
        result += signed(score, color);
    }
    result
}

/// Score the run starting at `pos` along (dr, dc); zero if `pos` is not its first stone.
fn evaluate_line(board: &Board, pos: Pos, dr: i32, dc: i32, color: Stone) -> i64 {
    let (row, col) = (i32::from(pos.row), i32::from(pos.col));
    let before = cell(board, row - dr, col - dc);
    if before == Some(color) {
        return 0;
    }

    let mut run = 1usize;
    let (mut r, mut c) = (row + dr, col + dc);
    while cell(board, r, c) == Some(color) {
        run += 1;
        r += dr;
        c += dc;
    }
    let after = cell(board, r, c);

    let open_ends =
        u8::from(before == Some(Stone::Empty)) + u8::from(after == Some(Stone::Empty));
    patterns::shape_score(run, open_ends)
}

/// Segment automaton state for one line
#[derive(Default)]
struct Segment {
    /// Empties before the current run
    before: i64,
    /// Stones in the current run
    run: i64,
    /// Empties after the current run
    after: i64,
    color: Option<Stone>,
}

impl Segment {
    /// Value of the segment seen so far
    fn value(&self) -> i64 {
        let Some(color) = self.color else {
            return 0;
        };
        if self.before + self.run + self.after < WIN_LENGTH as i64 {
            return 0;
        }
        let size = BOARD_SIZE as i64;
        signed(
            (size * self.run + self.before) * (size * self.run + self.after),
            color,
        )
    }

    fn push(&mut self, stone: Stone) -> i64 {
        if stone == Stone::Empty {
            if self.run == 0 {
                self.before += 1;
            } else {
                self.after += 1;
            }
            return 0;
        }
        if self.run == 0 {
            self.color = Some(stone);
            self.run = 1;
            return 0;
        }
        if self.after == 0 && self.color == Some(stone) {
            self.run += 1;
            return 0;
        }
        // A new run begins; the gap after the old run is the new run's lead-in
        let closed = self.value();
        *self = Segment {
            before: self.after,
            run: 1,
            after: 0,
            color: Some(stone),
        };
        closed
    }

    fn finish(&mut self) -> i64 {
        let closed = self.value();
        *self = Segment::default();
        closed
    }
}

/// Every line of the board: rows, columns and both diagonal families.
fn lines() -> impl Iterator<Item = (Pos, (i32, i32))> {
    let n = BOARD_SIZE as u8;
    let rows = (0..n).map(|r| (Pos::new(r, 0), (0, 1)));
    let cols = (0..n).map(|c| (Pos::new(0, c), (1, 0)));
    let diag = (0..n)
        .map(|c| Pos::new(0, c))
        .chain((1..n).map(|r| Pos::new(r, 0)))
        .map(|p| (p, (1, 1)));
    let anti = (0..n)
        .map(|r| Pos::new(r, 0))
        .chain((1..n).map(move |c| Pos::new(n - 1, c)))
        .map(|p| (p, (-1, 1)));
    rows.chain(cols).chain(diag).chain(anti)
}

/// Line automaton evaluation.
///
/// Each line is split into segments of one color's run with the empties
/// around it. A segment spanning at least five cells is worth
/// `(15·run + before) · (15·run + after)`.
#[must_use]
pub fn segment_score(board: &Board) -> i64 {
    let mut result = 0i64;
    let mut segment = Segment::default();
    for (start, (dr, dc)) in lines() {
        let (mut r, mut c) = (i32::from(start.row), i32::from(start.col));
        while let Some(stone) = cell(board, r, c) {
            result += segment.push(stone);
            r += dr;
            c += dc;
        }
        result += segment.finish();
    }
    result
}

/// Largest shape currently on the board for `color`; logged by the self-play demo.
#[must_use]
pub fn strongest_shape(board: &Board, color: Stone) -> i64 {
    board
        .positions()
        .filter(|&(_, s)| s == color)
        .flat_map(|(pos, _)| {
            DIRECTIONS
                .iter()
                .map(move |&(dr, dc)| evaluate_line(board, pos, dr, dc, color))
        })
        .max()
        .unwrap_or(0)
        .min(ShapeScore::FIVE)
}
