//! Board representation for 15x15 five-in-a-row

pub mod bitboard;
pub mod board;

#[cfg(test)]
mod tests;

// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, MoveGuard};

use std::fmt;

use crate::error::{GomokuError, Result};

/// Board size (15x15)
pub const BOARD_SIZE: usize = 15;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 225

/// Stones in a row needed to win
pub const WIN_LENGTH: usize = 5;

/// Cell contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }

    /// Side to move from the `black_to_move` flag used by the engines
    #[inline]
    pub fn from_black(is_black: bool) -> Stone {
        if is_black {
            Stone::Black
        } else {
            Stone::White
        }
    }

    /// Digit used by the positional hash (Empty=0, Black=1, White=2)
    #[inline]
    pub fn hash_digit(self) -> u64 {
        match self {
            Stone::Empty => 0,
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

/// Terminal state cached by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameResult {
    #[default]
    NotEnded,
    BlackWin,
    WhiteWin,
}

impl GameResult {
    #[inline]
    pub fn is_end(self) -> bool {
        self != GameResult::NotEnded
    }

    /// Result for a five made by `stone`
    #[inline]
    pub fn win_for(stone: Stone) -> GameResult {
        match stone {
            Stone::Black => GameResult::BlackWin,
            Stone::White => GameResult::WhiteWin,
            Stone::Empty => GameResult::NotEnded,
        }
    }

    #[inline]
    pub fn winner(self) -> Option<Stone> {
        match self {
            GameResult::NotEnded => None,
            GameResult::BlackWin => Some(Stone::Black),
            GameResult::WhiteWin => Some(Stone::White),
        }
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    /// Bounds-checked constructor for coordinates coming from outside the crate
    pub fn try_new(row: i32, col: i32) -> Result<Self> {
        if Self::is_valid(row, col) {
            Ok(Self::new(row as u8, col as u8))
        } else {
            Err(GomokuError::OutOfBounds { row, col })
        }
    }

    /// Center of the board
    #[inline]
    pub fn center() -> Self {
        Self::new(BOARD_SIZE as u8 / 2, BOARD_SIZE as u8 / 2)
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Chebyshev distance: max(|dr|, |dc|)
    #[inline]
    pub fn chebyshev(self, other: Pos) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A stone placement: color plus position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub stone: Stone,
    pub pos: Pos,
}

impl Move {
    #[inline]
    pub fn new(stone: Stone, row: u8, col: u8) -> Self {
        debug_assert!(stone != Stone::Empty, "a move must place a stone");
        Self {
            stone,
            pos: Pos::new(row, col),
        }
    }

    #[inline]
    pub fn at(stone: Stone, pos: Pos) -> Self {
        debug_assert!(stone != Stone::Empty, "a move must place a stone");
        Self { stone, pos }
    }

    #[inline]
    pub fn black(row: u8, col: u8) -> Self {
        Self::new(Stone::Black, row, col)
    }

    #[inline]
    pub fn white(row: u8, col: u8) -> Self {
        Self::new(Stone::White, row, col)
    }

    #[inline]
    pub fn is_black(self) -> bool {
        self.stone == Stone::Black
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.stone {
            Stone::Black => 'B',
            Stone::White => 'W',
            Stone::Empty => '.',
        };
        write!(f, "{}{}", side, self.pos)
    }
}
