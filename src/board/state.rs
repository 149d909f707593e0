//! Position: the reversible board state, and its Undo record.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::zobrist::ZOBRIST;

use super::attack_tables;
use super::types::{bit_for_square, Bitboard, Castle, CastlingRights, Color, Move, Piece, Square};

/// Process-wide override for [`Position::debug_invariants_enabled`], set from
/// [`crate::config::EngineConfig::debug_invariants`] when an agent is built.
/// Lets a release build opt into the same post-make/unmake invariant
/// checking a debug build gets for free.
static DEBUG_INVARIANTS_OVERRIDE: AtomicBool = AtomicBool::new(false);

/// Forces [`Position::debug_invariants_enabled`] to `enabled` regardless of
/// build profile. Debug builds check invariants either way; this is how a
/// release build can opt in via an explicit config flag instead.
pub fn set_debug_invariants(enabled: bool) {
    DEBUG_INVARIANTS_OVERRIDE.store(enabled, Ordering::Relaxed);
}

/// What `make_move` needs to remember to invert itself.
#[derive(Clone, Copy, Debug)]
pub struct Undo {
    pub(crate) mv: Move,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_en_passant_square: Option<Square>,
    pub(crate) previous_castling_rights: CastlingRights,
    pub(crate) previous_their_attacks: Bitboard,
    /// The captured piece and the square it sat on. Differs from `mv.target()`
    /// only for en-passant captures.
    pub(crate) capture: Option<(Piece, Square)>,
}

/// A chess position: twelve piece bitboards plus the incidental state needed
/// to make and unmake moves and to detect draws.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupancy: [Bitboard; 2],
    pub(crate) flat_occupancy: Bitboard,
    pub(crate) their_attacks: Bitboard,
    pub(crate) us: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_square: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) hash: u64,
}

impl Position {
    /// The standard chess starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut pos = Position::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            pos.place(Square::new(0, file), Color::White, *piece);
            pos.place(Square::new(7, file), Color::Black, *piece);
            pos.place(Square::new(1, file), Color::White, Piece::Pawn);
            pos.place(Square::new(6, file), Color::Black, Piece::Pawn);
        }
        pos.castling_rights = CastlingRights::all();
        pos.us = Color::White;
        pos.recompute_occupancies();
        pos.hash = pos.compute_hash();
        pos.their_attacks = pos.compute_their_attacks();
        pos
    }

    pub(crate) fn empty() -> Self {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupancy: [Bitboard::EMPTY; 2],
            flat_occupancy: Bitboard::EMPTY,
            their_attacks: Bitboard::EMPTY,
            us: Color::White,
            castling_rights: CastlingRights::none(),
            en_passant_square: None,
            halfmove_clock: 0,
            hash: 0,
        }
    }

    /// Directly sets a piece during setup (FEN parsing, the starting position).
    /// Does not touch the hash, occupancies or `their_attacks` — callers that
    /// build a position piece by piece must call `recompute_occupancies`,
    /// `compute_hash`, and `compute_their_attacks` once they're done.
    pub(crate) fn place(&mut self, square: Square, color: Color, piece: Piece) {
        self.pieces[color.index()][piece.index()].0 |= bit_for_square(square).0;
    }

    pub(crate) fn recompute_occupancies(&mut self) {
        for color in [Color::White, Color::Black] {
            let mut occ = 0u64;
            for piece in self.pieces[color.index()] {
                occ |= piece.0;
            }
            self.occupancy[color.index()] = Bitboard(occ);
        }
        self.flat_occupancy =
            Bitboard(self.occupancy[Color::White.index()].0 | self.occupancy[Color::Black.index()].0);
    }

    #[must_use]
    pub(crate) fn piece_arrays(&self, color: Color) -> [u64; 6] {
        self.pieces[color.index()].map(|bb| bb.0)
    }

    pub(crate) fn compute_their_attacks(&self) -> Bitboard {
        let them = self.us.opponent();
        Bitboard(attack_tables::attacks(
            them,
            self.flat_occupancy.0,
            &self.piece_arrays(them),
        ))
    }

    pub(crate) fn compute_hash(&self) -> u64 {
        let keys = &*ZOBRIST;
        let mut hash = 0u64;
        for color in [Color::White, Color::Black] {
            for piece in [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
                Piece::King,
            ] {
                self.pieces[color.index()][piece.index()]
                    .for_each_set_bit(|sq| hash ^= keys.piece_key(piece, color, sq));
            }
        }
        if self.us == Color::Black {
            hash ^= keys.black_to_move_key;
        }
        for color in [Color::White, Color::Black] {
            for castle in [Castle::Kingside, Castle::Queenside] {
                if self.castling_rights.has(color, castle) {
                    hash ^= keys.castle_key(color, castle);
                }
            }
        }
        if let Some(ep) = self.en_passant_square {
            hash ^= keys.ep_key(ep.file());
        }
        hash
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.us
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[must_use]
    pub fn their_attacks(&self) -> Bitboard {
        self.their_attacks
    }

    #[must_use]
    pub fn flat_occupancy(&self) -> Bitboard {
        self.flat_occupancy
    }

    #[must_use]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[must_use]
    pub fn piece_at(&self, square: Square, color: Color) -> Option<Piece> {
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            if self.pieces[color.index()][piece.index()].contains(square) {
                return Some(piece);
            }
        }
        None
    }

    #[must_use]
    pub fn color_on(&self, square: Square) -> Option<Color> {
        if self.occupancy[Color::White.index()].contains(square) {
            Some(Color::White)
        } else if self.occupancy[Color::Black.index()].contains(square) {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// True once the side to move's king has been removed from the board, or
    /// the position has already reached the 50-move draw threshold — the
    /// signal used by move generation to stop emitting moves entirely.
    #[must_use]
    pub fn game_definitely_over(&self) -> bool {
        self.halfmove_clock >= 100 || self.pieces[self.us.index()][Piece::King.index()].is_empty()
    }

    /// True iff the opponent's king sits on a square we attack (i.e. it's our
    /// move and a king capture is pseudolegally available).
    #[must_use]
    pub fn their_king_attacked(&self) -> bool {
        let them = self.us.opponent();
        let their_king = self.pieces[them.index()][Piece::King.index()];
        !their_king.is_disjoint(self.our_attacks())
    }

    pub(crate) fn our_attacks(&self) -> Bitboard {
        Bitboard(attack_tables::attacks(
            self.us,
            self.flat_occupancy.0,
            &self.piece_arrays(self.us),
        ))
    }

    /// True iff our own king is presently attacked by the side not to move's
    /// pieces, i.e. it's our move and we are in check.
    #[must_use]
    pub fn in_check(&self) -> bool {
        !self
            .their_attacks
            .is_disjoint(self.pieces[self.us.index()][Piece::King.index()])
    }

    /// Locate our king's square. Panics if the king is absent; callers must
    /// check `game_definitely_over` first.
    #[must_use]
    pub(crate) fn our_king_square(&self) -> Square {
        self.pieces[self.us.index()][Piece::King.index()]
            .lsb_index()
            .map(|idx| Square::from_index(idx as usize))
            .expect("our king is on the board when not game_definitely_over")
    }

    /// `color`'s king square, or `None` if it has been captured. Outside the
    /// king-capture rollout discipline this is always `Some`; MCTS rollouts
    /// run past that point and need to tell who won.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces[color.index()][Piece::King.index()]
            .lsb_index()
            .map(|idx| Square::from_index(idx as usize))
    }

    /// Bitboard of every square from which `attacker_color` attacks `target`.
    #[must_use]
    pub(crate) fn attackers_of(&self, target: Square, attacker_color: Color) -> Bitboard {
        Bitboard(attack_tables::attackers(
            target.as_index(),
            self.flat_occupancy.0,
            attacker_color,
            &self.piece_arrays(attacker_color),
            false,
        ))
    }

    /// The fifty-move rule: true once `halfmove_clock` reaches 100 plies
    /// without a pawn move or capture.
    #[must_use]
    pub fn is_theoretical_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Whether `make_move`/`unmake_move` should re-verify cached state
    /// against a from-scratch recomputation. Always true in a debug build;
    /// in release, true only if [`set_debug_invariants`] was called with
    /// `true` (wired to [`crate::config::EngineConfig::debug_invariants`]).
    pub(crate) fn debug_invariants_enabled() -> bool {
        cfg!(debug_assertions) || DEBUG_INVARIANTS_OVERRIDE.load(Ordering::Relaxed)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
