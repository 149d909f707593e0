//! Named partitions of the 64 squares: files, ranks, diagonals, antidiagonals.
//!
//! Each partition is built once at startup by iterating all 64 squares against
//! all parts, producing both the part bitboards and an inverse `by_square`
//! lookup. A const-generic `Partition<N>` replaces the macro-expanded
//! partition template of the pre-distillation source with a single ordinary
//! type parameterized on part count.

use std::sync::LazyLock;

/// An ordered sequence of `N` named, disjoint square sets covering the board,
/// plus the per-square lookup back to the covering part's index.
pub(crate) struct Partition<const N: usize> {
    pub(crate) masks: [u64; N],
    pub(crate) by_square: [u8; 64],
}

impl<const N: usize> Partition<N> {
    #[must_use]
    pub(crate) fn part_of(&self, square_index: usize) -> usize {
        self.by_square[square_index] as usize
    }

    #[must_use]
    pub(crate) fn mask(&self, part_index: usize) -> u64 {
        self.masks[part_index]
    }
}

fn build<const N: usize>(part_index_of: impl Fn(usize, usize) -> usize) -> Partition<N> {
    let mut masks = [0u64; N];
    let mut by_square = [0u8; 64];
    for sq in 0..64 {
        let rank = sq / 8;
        let file = sq % 8;
        let part = part_index_of(rank, file);
        masks[part] |= 1u64 << sq;
        by_square[sq] = part as u8;
    }
    Partition { masks, by_square }
}

/// The 64 squares, identity partition: `SQUARES.mask(i)` is the single-bit
/// board for square `i`.
pub(crate) static SQUARES: LazyLock<Partition<64>> = LazyLock::new(|| build(|r, f| r * 8 + f));

/// The 8 files, a through h.
pub(crate) static FILES: LazyLock<Partition<8>> = LazyLock::new(|| build(|_r, f| f));

/// The 8 ranks, 1 through 8.
pub(crate) static RANKS: LazyLock<Partition<8>> = LazyLock::new(|| build(|r, _f| r));

/// The 15 diagonals parallel to a1-h8, indexed by `file - rank + 7` so the
/// main diagonal (a1, b2, ..., h8) is index 7.
pub(crate) static DIAGONALS: LazyLock<Partition<15>> =
    LazyLock::new(|| build(|r, f| (f as isize - r as isize + 7) as usize));

/// The 15 antidiagonals parallel to a8-h1, indexed by `file + rank` so the
/// main antidiagonal (a8, b7, ..., h1) is index 7.
pub(crate) static ANTIDIAGONALS: LazyLock<Partition<15>> = LazyLock::new(|| build(|r, f| f + r));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_partition_the_board() {
        let union = FILES.masks.iter().fold(0u64, |a, b| a | b);
        assert_eq!(union, u64::MAX);
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_eq!(FILES.mask(i) & FILES.mask(j), 0);
            }
        }
    }

    #[test]
    fn ranks_partition_the_board() {
        let union = RANKS.masks.iter().fold(0u64, |a, b| a | b);
        assert_eq!(union, u64::MAX);
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_eq!(RANKS.mask(i) & RANKS.mask(j), 0);
            }
        }
    }

    #[test]
    fn main_diagonal_is_a1_through_h8() {
        let mut expected = 0u64;
        for i in 0..8 {
            expected |= 1u64 << (i * 8 + i);
        }
        assert_eq!(DIAGONALS.mask(7), expected);
    }

    #[test]
    fn main_antidiagonal_is_a8_through_h1() {
        let mut expected = 0u64;
        for i in 0..8 {
            let rank = 7 - i;
            let file = i;
            expected |= 1u64 << (rank * 8 + file);
        }
        assert_eq!(ANTIDIAGONALS.mask(7), expected);
    }

    #[test]
    fn by_square_lookup_agrees_with_masks() {
        for sq in 0..64 {
            let part = FILES.part_of(sq);
            assert_ne!(FILES.mask(part) & (1u64 << sq), 0);
        }
    }
}
