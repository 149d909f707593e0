//! Exercises the optional `serde` feature's derives on the wire-level move
//! and square types. Only compiled when the feature is enabled
//! (`cargo test --features serde`).

#![cfg(feature = "serde")]

use chess_engine::board::{Move, Position, Square};

#[test]
fn move_round_trips_through_json() {
    let mv = Position::new()
        .legal_moves()
        .get(0)
        .expect("starting position has legal moves");
    let json = serde_json::to_string(&mv).expect("move serializes");
    let back: Move = serde_json::from_str(&json).expect("move deserializes");
    assert_eq!(mv, back);
}

#[test]
fn square_round_trips_through_json() {
    let sq = Square::new(7, 0);
    let json = serde_json::to_string(&sq).expect("square serializes");
    let back: Square = serde_json::from_str(&json).expect("square deserializes");
    assert_eq!(sq, back);
}
