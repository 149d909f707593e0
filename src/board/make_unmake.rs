//! Reversible move application: `make_move` and its exact inverse `unmake_move`.

use crate::error::CoreError;
use crate::zobrist::ZOBRIST;

use super::state::{Position, Undo};
use super::types::{bit_for_square, Castle, Color, Move, MoveType, Piece, Square};

impl Position {
    /// Applies `m`, which must be pseudolegal in this position, and returns an
    /// [`Undo`] record that [`Position::unmake_move`] can use to invert it.
    pub fn make_move(&mut self, m: Move) -> Undo {
        let keys = &*ZOBRIST;
        let us = self.us;
        let them = us.opponent();
        let source = m.source();
        let target = m.target();
        let moving_piece = self
            .piece_at(source, us)
            .expect("make_move called with a piece-less source square");

        let previous_halfmove_clock = self.halfmove_clock;
        let previous_en_passant_square = self.en_passant_square;
        let previous_castling_rights = self.castling_rights;
        let previous_their_attacks = self.their_attacks;

        // 1. Castling rights.
        if moving_piece == Piece::King {
            for castle in [Castle::Kingside, Castle::Queenside] {
                if self.castling_rights.has(us, castle) {
                    self.hash ^= keys.castle_key(us, castle);
                    self.castling_rights.remove(us, castle);
                }
            }
        } else if moving_piece == Piece::Rook {
            if let Some(castle) = Castle::involving_rook(source, us) {
                if self.castling_rights.has(us, castle) {
                    self.hash ^= keys.castle_key(us, castle);
                    self.castling_rights.remove(us, castle);
                }
            }
        }

        // 2. Our halfboard: remove from source, add at target (or promoted piece).
        self.remove_piece(source, us, moving_piece);
        self.hash ^= keys.piece_key(moving_piece, us, source);

        let placed_piece = m.promotion().unwrap_or(moving_piece);
        self.add_piece(target, us, placed_piece);
        self.hash ^= keys.piece_key(placed_piece, us, target);

        if m.is_castle() {
            let castle = match m.move_type() {
                MoveType::CastleKingside => Castle::Kingside,
                MoveType::CastleQueenside => Castle::Queenside,
                _ => unreachable!("is_castle implies a castle MoveType"),
            };
            let rook_source = Square::new(source.rank(), castle.rook_source_file());
            let rook_target = Square::new(source.rank(), castle.rook_target_file());
            self.remove_piece(rook_source, us, Piece::Rook);
            self.add_piece(rook_target, us, Piece::Rook);
            self.hash ^= keys.piece_key(Piece::Rook, us, rook_source);
            self.hash ^= keys.piece_key(Piece::Rook, us, rook_target);
        }

        // 3. Their halfboard: remove the captured piece, if any.
        let capture = if m.is_capture() {
            let capture_square = if moving_piece == Piece::Pawn
                && Some(target) == previous_en_passant_square
            {
                Square::new(source.rank(), target.file())
            } else {
                target
            };
            let captured_piece = self
                .piece_at(capture_square, them)
                .expect("capture move must have a piece on the capture square");
            self.remove_piece(capture_square, them, captured_piece);
            self.hash ^= keys.piece_key(captured_piece, them, capture_square);

            if captured_piece == Piece::Rook {
                if let Some(castle) = Castle::involving_rook(capture_square, them) {
                    if self.castling_rights.has(them, castle) {
                        self.hash ^= keys.castle_key(them, castle);
                        self.castling_rights.remove(them, castle);
                    }
                }
            }

            Some((captured_piece, capture_square))
        } else {
            None
        };

        // 4. Occupancies.
        self.recompute_occupancies();

        // 5. En-passant.
        if let Some(ep) = previous_en_passant_square {
            self.hash ^= keys.ep_key(ep.file());
        }
        self.en_passant_square = if m.is_double_push() {
            let ep_square = Square::new(source.rank(), source.file())
                .forward(us == Color::White)
                .expect("double push source always has a square ahead");
            self.hash ^= keys.ep_key(ep_square.file());
            Some(ep_square)
        } else {
            None
        };

        // 6. Swap side to move.
        self.us = them;
        self.hash ^= keys.black_to_move_key;

        // 7. Halfmove clock.
        self.halfmove_clock = if moving_piece == Piece::Pawn || capture.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };

        // 8. Recompute their_attacks (attacks by the side not to move, i.e. `us` before this move).
        self.their_attacks = self.compute_their_attacks();

        if Self::debug_invariants_enabled() {
            if let Err(err) = self.check_invariants() {
                panic!("{err}");
            }
        }

        Undo {
            mv: m,
            previous_halfmove_clock,
            previous_en_passant_square,
            previous_castling_rights,
            previous_their_attacks,
            capture,
        }
    }

    /// Inverts a previous `make_move(undo.mv)`, restoring this position to
    /// what it was beforehand, bit for bit.
    pub fn unmake_move(&mut self, undo: Undo) {
        let m = undo.mv;
        let them = self.us;
        let us = them.opponent();
        self.us = us;

        let source = m.source();
        let target = m.target();
        let placed_piece = m
            .promotion()
            .unwrap_or_else(|| self.piece_at(target, us).expect("moved piece is on target"));

        self.remove_piece(target, us, placed_piece);
        let restored_piece = if m.promotion().is_some() {
            Piece::Pawn
        } else {
            placed_piece
        };
        self.add_piece(source, us, restored_piece);

        if m.is_castle() {
            let castle = match m.move_type() {
                MoveType::CastleKingside => Castle::Kingside,
                MoveType::CastleQueenside => Castle::Queenside,
                _ => unreachable!("is_castle implies a castle MoveType"),
            };
            let rook_source = Square::new(source.rank(), castle.rook_source_file());
            let rook_target = Square::new(source.rank(), castle.rook_target_file());
            self.remove_piece(rook_target, us, Piece::Rook);
            self.add_piece(rook_source, us, Piece::Rook);
        }

        if let Some((captured_piece, capture_square)) = undo.capture {
            self.add_piece(capture_square, them, captured_piece);
        }

        self.castling_rights = undo.previous_castling_rights;
        self.en_passant_square = undo.previous_en_passant_square;
        self.halfmove_clock = undo.previous_halfmove_clock;

        self.recompute_occupancies();
        // Recomputed from scratch rather than restored from a cached value,
        // so an incremental bug in `make_move` can never propagate through
        // `unmake_move` undetected.
        self.hash = self.compute_hash();
        self.their_attacks = undo.previous_their_attacks;

        if Self::debug_invariants_enabled() {
            if let Err(err) = self.check_invariants() {
                panic!("{err}");
            }
        }
    }

    pub(crate) fn add_piece(&mut self, square: Square, color: Color, piece: Piece) {
        self.pieces[color.index()][piece.index()].0 |= bit_for_square(square).0;
    }

    pub(crate) fn remove_piece(&mut self, square: Square, color: Color, piece: Piece) {
        self.pieces[color.index()][piece.index()].0 &= !bit_for_square(square).0;
    }

    /// Re-derives occupancies, hash and `their_attacks` from the twelve piece
    /// bitboards and compares against the cached fields, surfacing the first
    /// mismatch. Called from `make_move`/`unmake_move` whenever
    /// [`Position::debug_invariants_enabled`] is true; also usable directly
    /// by tests and by callers that opt into extra safety.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        let mut scratch = self.clone();
        scratch.recompute_occupancies();
        if scratch.flat_occupancy.0 != self.flat_occupancy.0 {
            return Err(CoreError::InvariantViolation(
                "flat_occupancy diverged from piece bitboards".to_string(),
            ));
        }
        if self.compute_hash() != self.hash {
            return Err(CoreError::InvariantViolation(
                "hash diverged from from-scratch recomputation".to_string(),
            ));
        }
        if self.compute_their_attacks().0 != self.their_attacks.0 {
            return Err(CoreError::InvariantViolation(
                "their_attacks diverged from from-scratch recomputation".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_then_unmake_restores_starting_position() {
        let mut pos = Position::new();
        let before = pos.clone();
        let mv = Move::new(MoveType::DoublePush, Square::new(1, 4), Square::new(3, 4));
        let undo = pos.make_move(mv);
        assert_ne!(pos.hash(), before.hash());
        pos.unmake_move(undo);
        assert_eq!(pos.hash(), before.hash());
        assert_eq!(pos.flat_occupancy.0, before.flat_occupancy.0);
        assert_eq!(pos.their_attacks.0, before.their_attacks.0);
        assert_eq!(pos.castling_rights(), before.castling_rights());
        assert_eq!(pos.en_passant_square(), before.en_passant_square());
        assert_eq!(pos.halfmove_clock(), before.halfmove_clock());
    }

    #[test]
    fn double_push_sets_en_passant_square() {
        let mut pos = Position::new();
        let mv = Move::new(MoveType::DoublePush, Square::new(1, 4), Square::new(3, 4));
        pos.make_move(mv);
        assert_eq!(pos.en_passant_square(), Some(Square::new(2, 4)));
    }

    #[test]
    fn king_move_clears_both_castling_rights() {
        let mut pos = Position::new();
        // Clear the squares between king and the rest so this is a legal-shaped king step.
        pos.remove_piece(Square::new(0, 5), Color::White, Piece::Bishop);
        let mv = Move::new(MoveType::Normal, Square::new(0, 4), Square::new(0, 5));
        pos.make_move(mv);
        assert!(!pos.castling_rights().has(Color::White, Castle::Kingside));
        assert!(!pos.castling_rights().has(Color::White, Castle::Queenside));
    }

    #[test]
    fn rook_move_clears_only_that_sides_right() {
        let mut pos = Position::new();
        pos.remove_piece(Square::new(0, 1), Color::White, Piece::Knight);
        let mv = Move::new(MoveType::Normal, Square::new(0, 0), Square::new(0, 1));
        pos.make_move(mv);
        assert!(!pos.castling_rights().has(Color::White, Castle::Queenside));
        assert!(pos.castling_rights().has(Color::White, Castle::Kingside));
    }

    #[test]
    fn capture_resets_halfmove_clock() {
        let mut pos = Position::empty();
        pos.place(Square::new(0, 4), Color::White, Piece::King);
        pos.place(Square::new(7, 4), Color::Black, Piece::King);
        pos.place(Square::new(4, 3), Color::White, Piece::Knight);
        pos.place(Square::new(5, 5), Color::Black, Piece::Pawn);
        pos.recompute_occupancies();
        pos.hash = pos.compute_hash();
        pos.their_attacks = pos.compute_their_attacks();
        pos.halfmove_clock = 17;

        let mv = Move::new(MoveType::Capture, Square::new(4, 3), Square::new(5, 5));
        let undo = pos.make_move(mv);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(undo.capture, Some((Piece::Pawn, Square::new(5, 5))));

        pos.unmake_move(undo);
        assert_eq!(pos.halfmove_clock(), 17);
        assert!(pos
            .piece_at(Square::new(5, 5), Color::Black)
            .is_some_and(|p| p == Piece::Pawn));
    }

    #[test]
    fn check_invariants_passes_on_fresh_position() {
        let pos = Position::new();
        assert!(pos.check_invariants().is_ok());
    }
}
