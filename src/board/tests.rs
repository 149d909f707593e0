//! Cross-cutting integration tests: perft correctness across known
//! positions, and randomized make/unmake round-trips.

use super::*;

struct TestPosition {
    name: &'static str,
    fen: &'static str,
    depths: &'static [(usize, u64)],
}

const TEST_POSITIONS: &[TestPosition] = &[
    TestPosition {
        name: "Initial Position",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depths: &[(1, 20), (2, 400), (3, 8902), (4, 197_281)],
    },
    TestPosition {
        name: "Kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depths: &[(1, 48), (2, 2039), (3, 97_862)],
    },
    TestPosition {
        name: "Position 3",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depths: &[(1, 14), (2, 191), (3, 2812)],
    },
    TestPosition {
        name: "Position 4",
        fen: "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        depths: &[(1, 6), (2, 264), (3, 9467)],
    },
    TestPosition {
        name: "En Passant Capture",
        fen: "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        depths: &[(1, 31), (2, 707), (3, 21_637)],
    },
    TestPosition {
        name: "Promotion",
        fen: "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
        depths: &[(1, 24), (2, 496), (3, 9483)],
    },
    TestPosition {
        name: "Castling",
        fen: "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
        depths: &[(1, 26), (2, 568), (3, 13_744)],
    },
];

#[test]
fn perft_matches_known_positions() {
    for position in TEST_POSITIONS {
        let mut pos = Position::from_fen(position.fen);
        for &(depth, expected) in position.depths {
            let nodes = pos.perft(depth);
            assert_eq!(
                nodes, expected,
                "perft mismatch for '{}' at depth {depth}: expected {expected}, got {nodes}",
                position.name
            );
        }
    }
}

#[test]
fn fifty_move_rule_draw() {
    let pos = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 100 1");
    assert!(pos.is_theoretical_draw());
}

#[test]
fn halfmove_clock_resets_on_pawn_push() {
    let mut pos = Position::from_fen("8/8/8/8/8/8/4P3/K1k5 w - - 99 1");
    let mv = find_move(&mut pos, Square::new(1, 4), Square::new(3, 4), None);
    pos.make_move(mv);
    assert_eq!(pos.halfmove_clock(), 0);
    assert!(!pos.is_theoretical_draw());
}

#[test]
fn en_passant_make_then_unmake_restores_hash_and_ep() {
    let mut pos = Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let original_hash = pos.hash();
    let original_ep = pos.en_passant_square();
    let mv = find_move(&mut pos, Square::new(4, 4), Square::new(5, 5), None);
    let undo = pos.make_move(mv);
    pos.unmake_move(undo);
    assert_eq!(pos.hash(), original_hash);
    assert_eq!(pos.en_passant_square(), original_ep);
}

#[test]
fn promotion_make_then_unmake_restores_pawn() {
    let mut pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1");
    let original_hash = pos.hash();
    let mv = find_move(&mut pos, Square::new(6, 0), Square::new(7, 0), Some(Piece::Queen));
    let undo = pos.make_move(mv);
    pos.unmake_move(undo);
    assert_eq!(pos.hash(), original_hash);
    assert_eq!(pos.piece_at(Square::new(6, 0), Color::White), Some(Piece::Pawn));
}

#[test]
fn legal_moves_stable_after_full_make_unmake_sweep() {
    let mut pos = Position::new();
    let before = sorted_move_strings(&pos.legal_moves());
    for mv in pos.legal_moves().as_slice().to_vec() {
        let undo = pos.make_move(mv);
        pos.unmake_move(undo);
    }
    let after = sorted_move_strings(&pos.legal_moves());
    assert_eq!(before, after);
}

#[test]
fn hash_matches_recompute_across_a_random_playout() {
    use rand::prelude::*;

    let mut pos = Position::new();
    let mut rng = StdRng::seed_from_u64(0xC0FF_EE);
    let mut history = Vec::new();

    for _ in 0..80 {
        if pos.game_definitely_over() {
            break;
        }
        let Some(mv) = pos.fast_random_move(&mut rng) else {
            break;
        };
        let undo = pos.make_move(mv);
        history.push(undo);
        assert_eq!(pos.hash(), pos.compute_hash());
    }

    while let Some(undo) = history.pop() {
        pos.unmake_move(undo);
    }
    assert_eq!(pos.hash(), Position::new().hash());
}

fn find_move(pos: &mut Position, from: Square, to: Square, promotion: Option<Piece>) -> Move {
    pos.legal_moves()
        .as_slice()
        .iter()
        .copied()
        .find(|m| m.source() == from && m.target() == to && m.promotion() == promotion)
        .expect("expected move not found")
}

fn sorted_move_strings(moves: &MoveList) -> Vec<String> {
    let mut out: Vec<String> = moves.as_slice().iter().map(ToString::to_string).collect();
    out.sort();
    out
}
