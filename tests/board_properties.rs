//! Property-based tests for the board.
//!
//! Random legal games are generated by replaying random cell indices, so
//! only reachable positions are tested.

use gomoku::board::{Board, GameResult, Move, Pos, Stone, BOARD_SIZE, TOTAL_CELLS};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// A board reached by alternating random moves (Black first), stopping at a win.
fn arb_board() -> impl Strategy<Value = Board> {
    proptest::collection::vec(0usize..TOTAL_CELLS, 0..120).prop_map(|cells| {
        let mut board = Board::new();
        let mut stone = Stone::Black;
        for idx in cells {
            if board.is_end() {
                break;
            }
            if board.make_move(Move::at(stone, Pos::from_index(idx))) {
                stone = stone.opponent();
            }
        }
        board
    })
}

fn arb_pos() -> impl Strategy<Value = Pos> {
    (0usize..TOTAL_CELLS).prop_map(Pos::from_index)
}

fn arb_stone() -> impl Strategy<Value = Stone> {
    prop_oneof![Just(Stone::Black), Just(Stone::White)]
}

/// Longest run of `color` through `pos` on any axis, by brute force
fn longest_run_through(board: &Board, pos: Pos, color: Stone) -> usize {
    let axes = [(0i32, 1i32), (1, 0), (1, 1), (1, -1)];
    axes.iter()
        .map(|&(dr, dc)| {
            let mut len = 1;
            for sign in [1, -1] {
                let (mut r, mut c) = (i32::from(pos.row), i32::from(pos.col));
                loop {
                    r += dr * sign;
                    c += dc * sign;
                    match board.stone_at(r as usize, c as usize) {
                        Some(s) if r >= 0 && c >= 0 && s == color => len += 1,
                        _ => break,
                    }
                }
            }
            len
        })
        .max()
        .unwrap_or(1)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn move_then_withdraw_restores_everything(board in arb_board(), pos in arb_pos(), stone in arb_stone()) {
        prop_assume!(!board.is_end() && board.is_empty(pos));

        let mut after = board.clone();
        let mv = Move::at(stone, pos);
        prop_assert!(after.make_move(mv));
        after.withdraw_move(mv);

        prop_assert_eq!(&after, &board);
        prop_assert_eq!(after.hash(), board.hash());
        prop_assert_eq!(after.stone_count(), board.stone_count());
        prop_assert_eq!(after.result(), GameResult::NotEnded);
    }

    #[test]
    fn stone_count_matches_occupied_cells(board in arb_board()) {
        prop_assert_eq!(board.positions().count() as u32, board.stone_count());
    }

    #[test]
    fn win_fires_exactly_at_five(board in arb_board(), pos in arb_pos(), stone in arb_stone()) {
        prop_assume!(!board.is_end() && board.is_empty(pos));

        let mut after = board.clone();
        after.make_move(Move::at(stone, pos));
        let run = longest_run_through(&after, pos, stone);
        prop_assert_eq!(after.result() == GameResult::win_for(stone), run >= 5);
        prop_assert_eq!(after.is_end(), run >= 5);
    }

    #[test]
    fn cut_move_iff_no_stone_within_two(board in arb_board(), pos in arb_pos()) {
        prop_assume!(!board.is_end());

        let near = board.positions().any(|(p, _)| p.chebyshev(pos) <= 2);
        let cut = board.is_cut_move(Move::at(Stone::Black, pos));
        if board.is_initial() {
            prop_assert!(!cut);
        } else {
            prop_assert_eq!(cut, !near);
        }
    }

    #[test]
    fn guard_restores_board(board in arb_board(), pos in arb_pos()) {
        prop_assume!(!board.is_end() && board.is_empty(pos));

        let mut work = board.clone();
        {
            let guard = work.apply(Move::at(Stone::White, pos));
            prop_assert!(guard.is_some());
        }
        prop_assert_eq!(work, board);
    }
}

#[test]
fn test_board_size_is_fifteen() {
    assert_eq!(Board::new().size(), BOARD_SIZE);
    assert_eq!(Pos::center(), Pos::new(7, 7));
}
