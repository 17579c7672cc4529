//! Shape weights for Gomoku evaluation
//!
//! Each tier must dominate any realistic sum of the tiers below it, so the
//! weights are spaced by powers of two.

/// Shape scores used by the shape heuristic
pub struct ShapeScore;

impl ShapeScore {
    /// Five in a row
    pub const FIVE: i64 = 1 << 30;
    /// Open four: _OOOO_ (cannot be stopped)
    pub const OPEN_FOUR: i64 = 1 << 25;
    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i64 = 1 << 20;
    /// Closed four: XOOOO_ or _OOOOX (one way to extend)
    pub const CLOSED_FOUR: i64 = 1 << 10;
    /// Closed three: XOOO_ or _OOOX
    pub const CLOSED_THREE: i64 = 1 << 5;
}

/// Shape of a contiguous run given its length and the number of open ends.
pub fn shape_score(run: usize, open_ends: u8) -> i64 {
    match (run, open_ends) {
        (r, _) if r >= 5 => ShapeScore::FIVE,
        (4, 2) => ShapeScore::OPEN_FOUR,
        (4, 1) => ShapeScore::CLOSED_FOUR,
        (3, 2) => ShapeScore::OPEN_THREE,
        (3, 1) => ShapeScore::CLOSED_THREE,
        _ => 0,
    }
}

/// Weight of a stone by its distance to the nearest edge (center stones count more).
pub fn position_score(row: u8, col: u8, size: u8) -> i64 {
    let last = size - 1;
    let edge_dist = row.min(col).min(last - row).min(last - col);
    1i64 << edge_dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_score_hierarchy() {
        assert!(ShapeScore::FIVE > ShapeScore::OPEN_FOUR);
        assert!(ShapeScore::OPEN_FOUR > ShapeScore::OPEN_THREE);
        assert!(ShapeScore::OPEN_THREE > ShapeScore::CLOSED_FOUR);
        assert!(ShapeScore::CLOSED_FOUR > ShapeScore::CLOSED_THREE);
    }

    #[test]
    fn test_shape_score_classification() {
        assert_eq!(shape_score(6, 0), ShapeScore::FIVE);
        assert_eq!(shape_score(4, 2), ShapeScore::OPEN_FOUR);
        assert_eq!(shape_score(4, 1), ShapeScore::CLOSED_FOUR);
        assert_eq!(shape_score(4, 0), 0);
        assert_eq!(shape_score(3, 2), ShapeScore::OPEN_THREE);
        assert_eq!(shape_score(2, 2), 0);
    }

    #[test]
    fn test_position_score() {
        assert_eq!(position_score(0, 7, 15), 1);
        assert_eq!(position_score(7, 7, 15), 128);
        assert_eq!(position_score(13, 2, 15), 2);
    }
}
