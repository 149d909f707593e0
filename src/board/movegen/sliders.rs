use super::super::attack_tables::slider_attacks;
use super::super::state::Position;
use super::super::types::{Bitboard, Move, MoveList, MoveType, Square};

/// Which ray set a sliding piece moves along.
#[derive(Clone, Copy)]
pub(crate) enum SliderType {
    Bishop,
    Rook,
    Queen,
}

impl Position {
    pub(crate) fn generate_slider_moves(
        &self,
        from: Square,
        slider: SliderType,
        moves: &mut MoveList,
    ) {
        let us = self.us;
        let own_occ = self.occupancy[us.index()].0;
        let them_occ = self.occupancy[us.opponent().index()].0;
        let occ = self.flat_occupancy.0;
        let from_idx = from.as_index();

        let reach = match slider {
            SliderType::Bishop => slider_attacks(from_idx, occ, true),
            SliderType::Rook => slider_attacks(from_idx, occ, false),
            SliderType::Queen => slider_attacks(from_idx, occ, false) | slider_attacks(from_idx, occ, true),
        } & !own_occ;

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
