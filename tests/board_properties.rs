//! Property-based tests over random legal playouts, grounded on the
//! teacher's own proptest suite but narrowed to what the board module still
//! owns: make/unmake, hash incrementality, FEN round-tripping, and legality.

use proptest::prelude::*;
use rand::prelude::*;

use chess_engine::board::Position;

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=20usize
}

fn play_random_moves(pos: &mut Position, rng: &mut StdRng, count: usize) -> Vec<chess_engine::board::Move> {
    let mut played = Vec::new();
    for _ in 0..count {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..moves.len());
        let mv = moves.get(idx).expect("index in range");
        pos.make_move(mv);
        played.push(mv);
    }
    played
}

proptest! {
    #[test]
    fn make_unmake_restores_state(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_hash = pos.hash();
        let initial_fen = pos.to_fen();

        let mut history = Vec::new();
        for _ in 0..num_moves {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            let mv = moves.get(idx).expect("index in range");
            let undo = pos.make_move(mv);
            history.push(undo);
        }

        while let Some(undo) = history.pop() {
            pos.unmake_move(undo);
        }

        prop_assert_eq!(pos.hash(), initial_hash);
        prop_assert_eq!(pos.to_fen(), initial_fen);
    }

    #[test]
    fn hash_matches_from_scratch_recompute(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut pos, &mut rng, num_moves);

        let recomputed = Position::from_fen(&pos.to_fen());
        prop_assert_eq!(pos.hash(), recomputed.hash());
    }

    #[test]
    fn fen_roundtrip_preserves_position(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);
        play_random_moves(&mut pos, &mut rng, num_moves);

        let fen = pos.to_fen();
        let restored = Position::from_fen(&fen);

        prop_assert_eq!(pos.hash(), restored.hash());
        prop_assert_eq!(pos.side_to_move(), restored.side_to_move());
        prop_assert_eq!(pos.castling_rights(), restored.castling_rights());
        prop_assert_eq!(pos.en_passant_square(), restored.en_passant_square());
    }

    #[test]
    fn legal_moves_never_leave_the_mover_in_check(seed in seed_strategy()) {
        let mut pos = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..10 {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }

            for mv in moves.iter() {
                let undo = pos.make_move(*mv);
                prop_assert!(
                    !pos.their_king_attacked(),
                    "legal move {:?} left its own side in check",
                    mv
                );
                pos.unmake_move(undo);
            }

            let idx = rng.gen_range(0..moves.len());
            let mv = moves.get(idx).expect("index in range");
            pos.make_move(mv);
        }
    }
}
