use super::super::state::Position;
use super::super::types::{Color, Move, MoveList, MoveType, Square};

impl Position {
    pub(crate) fn generate_pawn_moves(&self, from: Square, moves: &mut MoveList) {
        let us = self.us;
        let is_white = us == Color::White;
        let promotion_rank = if is_white { 7 } else { 0 };
        let start_rank = if is_white { 1 } else { 6 };

        if let Some(push_target) = from.forward(is_white) {
            if !self.flat_occupancy.contains(push_target) {
                if push_target.rank() == promotion_rank {
                    for m in Move::promotions(from, push_target) {
                        moves.push(m);
                    }
                } else {
                    moves.push(Move::new(MoveType::Normal, from, push_target));
                    if from.rank() == start_rank {
                        if let Some(double_target) = push_target.forward(is_white) {
                            if !self.flat_occupancy.contains(double_target) {
                                moves.push(Move::new(MoveType::DoublePush, from, double_target));
                            }
                        }
                    }
                }
            }

            for capture_target in diagonal_targets(push_target) {
                if let Some(them) = self.color_on(capture_target) {
                    if them != us {
                        if capture_target.rank() == promotion_rank {
                            for m in Move::capturing_promotions(from, capture_target) {
                                moves.push(m);
                            }
                        } else {
                            moves.push(Move::new(MoveType::Capture, from, capture_target));
                        }
                    }
                } else if Some(capture_target) == self.en_passant_square {
                    moves.push(Move::new(MoveType::Capture, from, capture_target));
                }
            }
        }
    }
}

fn diagonal_targets(push_target: Square) -> impl Iterator<Item = Square> {
    let file = push_target.file();
    let rank = push_target.rank();
    [-1i32, 1i32].into_iter().filter_map(move |df| {
        let f = file as i32 + df;
        (0..8).contains(&f).then(|| Square::new(rank, f as usize))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_pawn_has_two_pushes() {
        let pos = Position::new();
        let mut moves = MoveList::new();
        pos.generate_pawn_moves(Square::new(1, 4), &mut moves);
        assert_eq!(moves.len(), 2);
        assert!(moves.as_slice().iter().any(|m| m.move_type() == MoveType::DoublePush));
    }

    #[test]
    fn blocked_pawn_has_no_push() {
        let mut pos = Position::new();
        pos.place(Square::new(2, 4), Color::Black, crate::board::Piece::Knight);
        pos.recompute_occupancies();
        let mut moves = MoveList::new();
        pos.generate_pawn_moves(Square::new(1, 4), &mut moves);
        assert!(moves.is_empty());
    }
}
