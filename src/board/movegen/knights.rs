use super::super::attack_tables::KNIGHT_ATTACKS;
use super::super::state::Position;
use super::super::types::{Bitboard, Move, MoveList, MoveType, Square};

impl Position {
    pub(crate) fn generate_knight_moves(&self, from: Square, moves: &mut MoveList) {
        let us = self.us;
        let own_occ = self.occupancy[us.index()].0;
        let them_occ = self.occupancy[us.opponent().index()].0;
        let reach = KNIGHT_ATTACKS[from.as_index()] & !own_occ;

        Bitboard(reach).for_each_set_bit(|to| {
            let move_type = if them_occ & (1u64 << to.as_index()) != 0 {
                MoveType::Capture
            } else {
                MoveType::Normal
            };
            moves.push(Move::new(move_type, from, to));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    #[test]
    fn knight_on_empty_board_has_eight_moves() {
        let mut pos = Position::empty();
        pos.place(Square::new(4, 4), Color::White, crate::board::Piece::Knight);
        pos.recompute_occupancies();
        let mut moves = MoveList::new();
        pos.generate_knight_moves(Square::new(4, 4), &mut moves);
        assert_eq!(moves.len(), 8);
    }

    #[test]
    fn knight_move_onto_enemy_is_a_capture() {
        let mut pos = Position::empty();
        pos.place(Square::new(4, 4), Color::White, crate::board::Piece::Knight);
        pos.place(Square::new(6, 5), Color::Black, crate::board::Piece::Pawn);
        pos.recompute_occupancies();
        let mut moves = MoveList::new();
        pos.generate_knight_moves(Square::new(4, 4), &mut moves);
        let capture = moves
            .as_slice()
            .iter()
            .find(|m| m.target() == Square::new(6, 5))
            .expect("knight reaches g7 from e5");
        assert_eq!(capture.move_type(), MoveType::Capture);
    }
}
