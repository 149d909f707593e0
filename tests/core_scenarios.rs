//! Regression scenarios anchored to specific game lines rather than random
//! playouts: a castling sequence reaching a known final placement, and a
//! from-scratch Zobrist hash check after a short, real opening.

use chess_engine::board::{Castle, Color, Piece, Position, Square};

#[test]
fn kingside_castle_sequence_reaches_expected_placement() {
    let mut pos = Position::new();
    let moves = [
        "e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5", "b2b4", "c5b4", "c2c3", "b4a5", "d2d4",
        "e5d4", "e1g1",
    ];
    for mv in moves {
        pos.make_move_uci(mv)
            .unwrap_or_else(|e| panic!("{mv} should be legal here: {e:?}"));
    }

    assert_eq!(
        pos.piece_at(Square::new(0, 6), Color::White),
        Some(Piece::King)
    );
    assert_eq!(
        pos.piece_at(Square::new(0, 5), Color::White),
        Some(Piece::Rook)
    );
    assert_eq!(pos.piece_at(Square::new(0, 4), Color::White), None);
    assert_eq!(pos.piece_at(Square::new(0, 7), Color::White), None);

    let rights = pos.castling_rights();
    assert!(!rights.has(Color::White, Castle::Kingside));
    assert!(!rights.has(Color::White, Castle::Queenside));
}

#[test]
fn hash_after_two_plies_matches_a_from_scratch_position() {
    let mut pos = Position::new();
    pos.make_move_uci("e2e4").unwrap();
    pos.make_move_uci("e7e5").unwrap();

    let from_scratch = Position::from_fen(&pos.to_fen());
    assert_eq!(pos.hash(), from_scratch.hash());
}
