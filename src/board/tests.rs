use super::*;

#[test]
fn test_stone_opponent() {
    assert_eq!(Stone::Black.opponent(), Stone::White);
    assert_eq!(Stone::White.opponent(), Stone::Black);
    assert_eq!(Stone::Empty.opponent(), Stone::Empty);
}

#[test]
fn test_pos_conversion() {
    let pos = Pos::center();
    assert_eq!(pos, Pos::new(7, 7));
    assert_eq!(pos.to_index(), 7 * 15 + 7);
    assert_eq!(Pos::from_index(112), pos);
}

#[test]
fn test_pos_validity() {
    assert!(Pos::is_valid(0, 0));
    assert!(Pos::is_valid(14, 14));
    assert!(!Pos::is_valid(-1, 0));
    assert!(!Pos::is_valid(0, 15));
    assert!(Pos::try_new(3, 4).is_ok());
    assert_eq!(
        Pos::try_new(15, 0),
        Err(crate::error::GomokuError::OutOfBounds { row: 15, col: 0 })
    );
}

#[test]
fn test_board_constants() {
    assert_eq!(BOARD_SIZE, 15);
    assert_eq!(TOTAL_CELLS, 225);
}

#[test]
fn test_pos_corner_indices() {
    assert_eq!(Pos::new(0, 0).to_index(), 0);
    assert_eq!(Pos::new(0, 14).to_index(), 14);
    assert_eq!(Pos::new(14, 0).to_index(), 210);
    assert_eq!(Pos::new(14, 14).to_index(), 224);
}

#[test]
fn test_stone_at_bounds() {
    let mut board = Board::new();
    assert!(board.make_move(Move::black(3, 4)));
    assert_eq!(board.stone_at(3, 4), Some(Stone::Black));
    assert_eq!(board.stone_at(4, 3), Some(Stone::Empty));
    assert_eq!(board.stone_at(15, 0), None);
}

#[test]
fn test_move_into_occupied_cell_fails() {
    let mut board = Board::new();
    assert!(board.make_move(Move::black(7, 7)));
    let before = board.clone();
    assert!(!board.make_move(Move::white(7, 7)));
    assert_eq!(board, before);
    assert_eq!(board.stone_count(), 1);
}

#[test]
#[should_panic]
fn test_move_after_end_panics() {
    let mut board = Board::new();
    for c in 0..5 {
        board.make_move(Move::black(0, c));
    }
    assert!(board.is_end());
    board.make_move(Move::white(5, 5));
}

#[test]
#[should_panic]
fn test_withdraw_wrong_color_panics() {
    let mut board = Board::new();
    board.make_move(Move::black(7, 7));
    board.withdraw_move(Move::white(7, 7));
}

#[test]
fn test_withdraw_restores_board() {
    let mut board = Board::new();
    board.make_move(Move::black(7, 7));
    board.make_move(Move::white(6, 6));
    let before = board.clone();
    let hash = board.hash();

    let mv = Move::black(8, 8);
    assert!(board.make_move(mv));
    assert_ne!(board.hash(), hash);
    board.withdraw_move(mv);

    assert_eq!(board, before);
    assert_eq!(board.hash(), hash);
}

#[test]
fn test_withdraw_clears_win() {
    let mut board = Board::new();
    for c in 0..4 {
        board.make_move(Move::black(2, c));
    }
    let winning = Move::black(2, 4);
    board.make_move(winning);
    assert_eq!(board.result(), GameResult::BlackWin);
    board.withdraw_move(winning);
    assert_eq!(board.result(), GameResult::NotEnded);
    assert_eq!(board.stone_count(), 4);
}

#[test]
fn test_guard_withdraws_on_drop() {
    let mut board = Board::new();
    board.make_move(Move::black(7, 7));
    let before = board.clone();
    {
        let mut guard = board.apply(Move::white(7, 8)).expect("empty cell");
        assert_eq!(guard.get(Pos::new(7, 8)), Stone::White);
        let inner = guard.apply(Move::black(8, 8)).expect("empty cell");
        assert_eq!(inner.stone_count(), 3);
    }
    assert_eq!(board, before);
    assert!(board.apply(Move::white(7, 7)).is_none());
}

#[test]
fn test_win_detection_all_axes() {
    let lines: [[(u8, u8); 5]; 4] = [
        [(3, 3), (3, 4), (3, 5), (3, 6), (3, 7)],
        [(3, 3), (4, 3), (5, 3), (6, 3), (7, 3)],
        [(3, 3), (4, 4), (5, 5), (6, 6), (7, 7)],
        [(3, 7), (4, 6), (5, 5), (6, 4), (7, 3)],
    ];
    for line in lines {
        // Place the middle stone last so both directions contribute
        let mut board = Board::new();
        for &(r, c) in line.iter().filter(|&&p| p != line[2]) {
            board.make_move(Move::white(r, c));
            assert!(!board.is_end());
        }
        board.make_move(Move::white(line[2].0, line[2].1));
        assert_eq!(board.result(), GameResult::WhiteWin, "line {line:?}");
    }
}

#[test]
fn test_four_is_not_a_win_even_if_open() {
    let mut board = Board::new();
    for c in 5..9 {
        board.make_move(Move::black(7, c));
    }
    assert!(!board.is_end());
}

#[test]
fn test_blocked_five_still_wins() {
    let mut board = Board::new();
    board.make_move(Move::white(7, 4));
    board.make_move(Move::white(7, 10));
    for c in 5..10 {
        board.make_move(Move::black(7, c));
    }
    assert_eq!(board.result(), GameResult::BlackWin);
}

#[test]
fn test_win_at_edge() {
    let mut board = Board::new();
    for r in 10..15 {
        board.make_move(Move::black(r, 14));
    }
    assert_eq!(board.result(), GameResult::BlackWin);
}

#[test]
fn test_is_cut_move() {
    let mut board = Board::new();
    // Empty board: nothing is pruned, including the center
    assert!(!board.is_cut_move(Move::black(7, 7)));
    assert!(!board.is_cut_move(Move::black(0, 0)));

    board.make_move(Move::black(7, 7));
    assert!(!board.is_cut_move(Move::white(9, 9)));
    assert!(!board.is_cut_move(Move::white(5, 8)));
    assert!(board.is_cut_move(Move::white(10, 7)));
    assert!(board.is_cut_move(Move::white(7, 4)));
}

#[test]
fn test_moves_lists_empty_cells() {
    let mut board = Board::new();
    assert_eq!(board.moves(Stone::Black).len(), TOTAL_CELLS);
    board.make_move(Move::black(0, 0));
    let moves = board.moves(Stone::White);
    assert_eq!(moves.len(), TOTAL_CELLS - 1);
    assert!(moves.iter().all(|m| m.stone == Stone::White));
    assert!(!moves.iter().any(|m| m.pos == Pos::new(0, 0)));
}

#[test]
fn test_hash_base3() {
    let mut board = Board::new();
    assert_eq!(board.hash(), 0);
    board.make_move(Move::black(14, 14));
    assert_eq!(board.hash(), 1);
    board.make_move(Move::white(14, 13));
    assert_eq!(board.hash(), 2 * 3 + 1);
}

#[test]
fn test_positions_map() {
    let mut board = Board::new();
    board.make_move(Move::white(9, 1));
    board.make_move(Move::black(2, 2));
    let positions: Vec<_> = board.positions().collect();
    assert_eq!(
        positions,
        vec![(Pos::new(2, 2), Stone::Black), (Pos::new(9, 1), Stone::White)]
    );
}

#[test]
fn test_from_moves_errors() {
    let occupied = [Move::black(7, 7), Move::white(7, 7)];
    assert_eq!(
        Board::from_moves(&occupied),
        Err(crate::error::GomokuError::Occupied(Pos::new(7, 7)))
    );

    let mut finished: Vec<Move> = (0..5).map(|c| Move::black(0, c)).collect();
    finished.push(Move::white(4, 4));
    assert_eq!(
        Board::from_moves(&finished),
        Err(crate::error::GomokuError::GameOver)
    );

    let board = Board::from_moves(&[Move::black(7, 7), Move::white(7, 8)]).unwrap();
    assert_eq!(board.stone_count(), 2);
    assert!(!board.is_initial());
}
