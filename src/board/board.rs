//! Board structure with incremental terminal detection

use std::ops::{Deref, DerefMut};

use super::bitboard::Bitboard;
use super::{GameResult, Move, Pos, Stone, BOARD_SIZE, TOTAL_CELLS, WIN_LENGTH};
use crate::error::{GomokuError, Result};

/// The four line axes through a cell; each is scanned both ways
const AXES: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal SW
];

/// Radius around existing stones inside which moves are considered relevant
const CUT_RADIUS: i32 = 2;

/// Game board with a cached terminal result.
///
/// The result is updated only from the most recently placed stone, so
/// `withdraw_move` is valid only for the last move applied. Search code
/// should prefer [`Board::apply`], whose guard enforces that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Black stones bitboard
    black: Bitboard,
    /// White stones bitboard
    white: Bitboard,
    move_count: u16,
    result: GameResult,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
            move_count: 0,
            result: GameResult::NotEnded,
        }
    }

    /// Replay a move list onto an empty board.
    pub fn from_moves(moves: &[Move]) -> Result<Self> {
        let mut board = Self::new();
        for &mv in moves {
            board.try_move(mv)?;
        }
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        BOARD_SIZE
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    /// Bounds-checked read by raw coordinates
    #[inline]
    pub fn stone_at(&self, row: usize, col: usize) -> Option<Stone> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(self.get(Pos::new(row as u8, col as u8)))
        } else {
            None
        }
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Place a stone and update the cached result from that stone only.
    ///
    /// Returns `false` without touching the board if the cell is occupied.
    ///
    /// # Panics
    ///
    /// Panics if the game has already ended.
    pub fn make_move(&mut self, mv: Move) -> bool {
        if !self.is_empty(mv.pos) {
            return false;
        }
        assert!(
            !self.result.is_end(),
            "move {mv} played on a finished board ({:?})",
            self.result
        );
        match mv.stone {
            Stone::Black => self.black.set(mv.pos),
            Stone::White => self.white.set(mv.pos),
            Stone::Empty => panic!("move {mv} places no stone"),
        }
        self.move_count += 1;
        if self.has_five_through(mv.pos, mv.stone) {
            self.result = GameResult::win_for(mv.stone);
        }
        true
    }

    /// Non-panicking variant of [`Board::make_move`] for external input.
    pub fn try_move(&mut self, mv: Move) -> Result<()> {
        if self.result.is_end() {
            return Err(GomokuError::GameOver);
        }
        if !self.make_move(mv) {
            return Err(GomokuError::Occupied(mv.pos));
        }
        Ok(())
    }

    /// Undo the most recently applied move.
    ///
    /// # Panics
    ///
    /// Panics if the stone at `mv.pos` is not `mv.stone`.
    pub fn withdraw_move(&mut self, mv: Move) {
        let current = self.get(mv.pos);
        assert_eq!(
            current, mv.stone,
            "withdrawing {mv} but the cell holds {current:?}"
        );
        match mv.stone {
            Stone::Black => self.black.clear(mv.pos),
            Stone::White => self.white.clear(mv.pos),
            Stone::Empty => unreachable!(),
        }
        self.move_count -= 1;
        self.result = GameResult::NotEnded;
    }

    /// Apply a move, returning a guard that withdraws it on drop.
    ///
    /// Returns `None` if the cell is occupied.
    pub fn apply(&mut self, mv: Move) -> Option<MoveGuard<'_>> {
        if self.make_move(mv) {
            Some(MoveGuard { board: self, mv })
        } else {
            None
        }
    }

    /// Every empty cell as a move for `stone`.
    ///
    /// # Panics
    ///
    /// Panics if the game has already ended.
    pub fn moves(&self, stone: Stone) -> Vec<Move> {
        assert!(!self.result.is_end(), "move generation on a finished board");
        (0..TOTAL_CELLS)
            .map(Pos::from_index)
            .filter(|&pos| self.is_empty(pos))
            .map(|pos| Move::at(stone, pos))
            .collect()
    }

    /// True if no stone lies within Chebyshev distance 2 of the move.
    ///
    /// Never true on an empty board, so the opening move is not pruned.
    pub fn is_cut_move(&self, mv: Move) -> bool {
        if self.move_count == 0 {
            return false;
        }
        let (row, col) = (i32::from(mv.pos.row), i32::from(mv.pos.col));
        for dr in -CUT_RADIUS..=CUT_RADIUS {
            for dc in -CUT_RADIUS..=CUT_RADIUS {
                let (r, c) = (row + dr, col + dc);
                if Pos::is_valid(r, c) && !self.is_empty(Pos::new(r as u8, c as u8)) {
                    return false;
                }
            }
        }
        true
    }

    /// Base-3 positional hash over every cell in row-major order.
    ///
    /// O(board size); meant for cache keys and logging.
    pub fn hash(&self) -> u64 {
        (0..TOTAL_CELLS).fold(0u64, |h, idx| {
            h.wrapping_mul(3)
                .wrapping_add(self.get(Pos::from_index(idx)).hash_digit())
        })
    }

    /// Occupied cells with their colors, row-major
    pub fn positions(&self) -> impl Iterator<Item = (Pos, Stone)> + '_ {
        self.black
            .union(&self.white)
            .iter_ones()
            .map(move |pos| (pos, self.get(pos)))
    }

    #[inline]
    pub fn result(&self) -> GameResult {
        self.result
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.result.is_end()
    }

    /// Number of stones placed
    #[inline]
    pub fn stone_count(&self) -> u32 {
        u32::from(self.move_count)
    }

    /// True before any stone has been placed
    #[inline]
    pub fn is_initial(&self) -> bool {
        self.move_count == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.move_count as usize == TOTAL_CELLS
    }

    /// Five-in-a-row check through `pos`, stopping as soon as a line reaches five.
    fn has_five_through(&self, pos: Pos, color: Stone) -> bool {
        AXES.iter().any(|&(dr, dc)| {
            let forward = self.run_length(pos, dr, dc, color, WIN_LENGTH - 1);
            forward + 1 >= WIN_LENGTH
                || forward + 1 + self.run_length(pos, -dr, -dc, color, WIN_LENGTH - 1 - forward)
                    >= WIN_LENGTH
        })
    }

    /// Contiguous `color` stones from `pos` (exclusive) along (dr, dc), capped at `limit`.
    #[inline]
    fn run_length(&self, pos: Pos, dr: i32, dc: i32, color: Stone, limit: usize) -> usize {
        let mut count = 0;
        let mut r = i32::from(pos.row) + dr;
        let mut c = i32::from(pos.col) + dc;
        while count < limit && Pos::is_valid(r, c) && self.get(Pos::new(r as u8, c as u8)) == color
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped move: the move is withdrawn when the guard is dropped.
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    mv: Move,
}

impl Deref for MoveGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.board.withdraw_move(self.mv);
    }
}
