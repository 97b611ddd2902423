//! Mover-relative disc masks.

use crate::move_generation::mobility_dispatch;

/// Disc masks relative to the side to move.
///
/// Invariant: `mine & theirs == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard {
    pub mine: u64,
    pub theirs: u64,
}

/// d5 and e4 belong to the player who moves first; d4 and e5 to the other.
pub const CROSS_FIRST: u64 = (1u64 << 35) | (1u64 << 28);
pub const CROSS_SECOND: u64 = (1u64 << 27) | (1u64 << 36);

impl Bitboard {
    #[inline]
    pub const fn new(mine: u64, theirs: u64) -> Self {
        Self { mine, theirs }
    }

    /// Canonical cross start with the first player to move.
    #[inline]
    pub const fn cross() -> Self {
        Self::new(CROSS_FIRST, CROSS_SECOND)
    }

    #[inline]
    pub const fn empty(&self) -> u64 {
        !(self.mine | self.theirs)
    }

    #[inline]
    pub const fn occupied(&self) -> u64 {
        self.mine | self.theirs
    }

    #[inline]
    pub const fn empty_count(&self) -> u32 {
        self.empty().count_ones()
    }

    /// Same discs seen from the opponent's side.
    #[inline]
    pub const fn swapped(&self) -> Self {
        Self::new(self.theirs, self.mine)
    }

    /// Squares where the mover may place a disc.
    #[inline]
    pub fn mobility(&self) -> u64 {
        mobility_dispatch::mobility(self.mine, self.theirs)
    }

    /// Discs flipped by placing on `square`. Zero when the move flips nothing.
    #[inline]
    pub fn flips(&self, square: u8) -> u64 {
        mobility_dispatch::flips(self.mine, self.theirs, square)
    }

    pub const fn is_consistent(&self) -> bool {
        self.mine & self.theirs == 0
    }
}
