//! Pseudolegal and legal move generation.
//!
//! Dispatch follows the priority order a position can be in: game already
//! decided, opponent's king hanging (must be taken), our own king in check
//! (must evade), or the ordinary case.

mod kings;
mod knights;
mod pawns;
mod sliders;

use self::sliders::SliderType;
use super::attack_tables;
use super::state::Position;
use super::types::{Bitboard, Move, MoveList, MoveType, Piece, Square};

impl Position {
    /// Pseudolegal moves for the side to move, following the priority
    /// dispatch: nothing if the game is already decided, king-captures only
    /// if the opponent's king is hanging, evasions if in check, otherwise
    /// the ordinary per-piece generation plus castling.
    #[must_use]
    pub fn pseudolegal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        if self.game_definitely_over() {
            return moves;
        }
        if self.their_king_attacked() {
            self.generate_king_capture_moves(&mut moves);
            return moves;
        }
        if self.in_check() {
            self.generate_evasions(&mut moves);
            return moves;
        }
        self.generate_all_moves(&mut moves);
        moves
    }

    /// Legal moves: pseudolegal moves filtered to those that don't leave our
    /// king in check. Requires `&mut self` since it probes legality by
    /// actually making and unmaking each candidate.
    #[must_use]
    pub fn legal_moves(&mut self) -> MoveList {
        let candidates = self.pseudolegal_moves();
        let mut legal = MoveList::new();
        for m in &candidates {
            let undo = self.make_move(*m);
            let left_in_check = self.their_king_attacked();
            self.unmake_move(undo);
            if !left_in_check {
                legal.push(*m);
            }
        }
        legal
    }

    #[must_use]
    pub fn is_checkmate(&mut self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    #[must_use]
    pub fn is_stalemate(&mut self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    fn generate_all_moves(&self, moves: &mut MoveList) {
        let us = self.us;
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            for from in self.pieces[us.index()][piece.index()].iter() {
                self.generate_piece_moves_at(from, piece, moves);
            }
        }
    }

    fn generate_piece_moves_at(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        match piece {
            Piece::Pawn => self.generate_pawn_moves(from, moves),
            Piece::Knight => self.generate_knight_moves(from, moves),
            Piece::Bishop => self.generate_slider_moves(from, SliderType::Bishop, moves),
            Piece::Rook => self.generate_slider_moves(from, SliderType::Rook, moves),
            Piece::Queen => self.generate_slider_moves(from, SliderType::Queen, moves),
            Piece::King => self.generate_king_moves(from, moves),
        }
    }

    /// Every pseudolegal capture of the opponent's king. Used when
    /// [`Position::their_king_attacked`] holds: the rollout discipline that
    /// a hanging enemy king must be taken immediately.
    fn generate_king_capture_moves(&self, moves: &mut MoveList) {
        let them = self.us.opponent();
        let king_sq = self.pieces[them.index()][Piece::King.index()]
            .lsb_index()
            .map(|idx| Square::from_index(idx as usize))
            .expect("their_king_attacked implies their king is on the board");
        let attackers = self.attackers_of(king_sq, self.us);
        attackers.for_each_set_bit(|from| {
            moves.push(Move::new(MoveType::KingCapture, from, king_sq));
        });
    }

    /// Check-evasion moves: unrestricted king moves, plus — if exactly one
    /// piece gives check — captures of that attacker and moves onto the
    /// squares between it and our king. Double check allows only king moves.
    fn generate_evasions(&self, moves: &mut MoveList) {
        let king_sq = self.our_king_square();
        let them = self.us.opponent();
        let checkers = self.attackers_of(king_sq, them);

        let mut candidates = MoveList::new();
        self.generate_all_moves(&mut candidates);

        if checkers.popcount() >= 2 {
            for m in &candidates {
                if m.source() == king_sq {
                    moves.push(*m);
                }
            }
            return;
        }

        let checker_sq = checkers
            .lsb_index()
            .map(|idx| Square::from_index(idx as usize))
            .expect("in_check implies at least one checker");
        let blockable = Bitboard(attack_tables::between(king_sq.as_index(), checker_sq.as_index()));

        for m in &candidates {
            if m.source() == king_sq || m.target() == checker_sq || blockable.contains(m.target()) {
                moves.push(*m);
            }
        }
    }

    fn random_occupied_square(&self, rng: &mut impl rand::Rng) -> Option<Square> {
        let us_occ = self.occupancy[self.us.index()];
        let count = us_occ.popcount();
        if count == 0 {
            return None;
        }
        let k = rng.gen_range(0..count) as usize;
        us_occ.iter().nth(k)
    }

    /// Picks a random occupied square of ours and enumerates moves for the
    /// piece standing there, retrying up to three times before falling back
    /// to full generation. Used by MCTS rollouts, where most positions have
    /// many pieces and the fast path almost always succeeds on the first try.
    #[must_use]
    pub fn random_move(&self, rng: &mut impl rand::Rng) -> Option<Move> {
        if self.game_definitely_over() {
            return None;
        }
        if self.their_king_attacked() || self.in_check() {
            return self.fast_random_move(rng);
        }
        for _ in 0..3 {
            let Some(sq) = self.random_occupied_square(rng) else {
                break;
            };
            let piece = self
                .piece_at(sq, self.us)
                .expect("random_occupied_square returns an occupied square");
            let mut moves = MoveList::new();
            self.generate_piece_moves_at(sq, piece, &mut moves);
            if !moves.is_empty() {
                return pick_random(&moves, rng);
            }
        }
        self.fast_random_move(rng)
    }

    /// Full pseudolegal generation followed by a uniform pick. Slower than
    /// [`Position::random_move`]'s common case but always correct, and used
    /// as its fallback.
    #[must_use]
    pub fn fast_random_move(&self, rng: &mut impl rand::Rng) -> Option<Move> {
        let moves = self.pseudolegal_moves();
        pick_random(&moves, rng)
    }

    /// Count of leaf positions reachable in exactly `depth` plies, for move
    /// generator validation against known perft figures.
    #[must_use]
    pub fn perft(&mut self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0u64;
        for m in &moves {
            let undo = self.make_move(*m);
            nodes += self.perft(depth - 1);
            self.unmake_move(undo);
        }
        nodes
    }
}

fn pick_random(moves: &MoveList, rng: &mut impl rand::Rng) -> Option<Move> {
    if moves.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..moves.len());
    moves.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_has_twenty_legal_moves() {
        let mut pos = Position::new();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn perft_matches_known_values() {
        let mut pos = Position::new();
        assert_eq!(pos.perft(1), 20);
        assert_eq!(pos.perft(2), 400);
        assert_eq!(pos.perft(3), 8902);
    }

    #[test]
    fn random_move_is_always_legal_ish_from_start() {
        let pos = Position::new();
        let mut rng = rand::thread_rng();
        let mv = pos.random_move(&mut rng).expect("starting position has moves");
        let legal = {
            let mut p = pos.clone();
            p.legal_moves()
        };
        assert!(legal.contains(mv));
    }
}
