//! Portable fixed-width `u64` lane vectors.
//!
//! These mirror the handful of 256/128-bit integer operations the mobility
//! kernels need, so the same propagation code can run without vector
//! hardware. Shifts follow `vpsllvq`/`vpsrlvq` semantics: a count of 64 or
//! more yields zero instead of panicking.

use std::ops::{BitAnd, BitOr, Not};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Lanes<const N: usize>(pub [u64; N]);

/// Four lanes, one per direction pair in the wide kernel.
pub type U64x4 = Lanes<4>;

/// Two lanes, one per diagonal in the narrow kernel.
pub type U64x2 = Lanes<2>;

impl<const N: usize> Lanes<N> {
    #[inline(always)]
    pub const fn splat(value: u64) -> Self {
        Self([value; N])
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self([0; N])
    }

    /// Per-lane left shift by per-lane counts.
    #[inline(always)]
    pub fn shl(self, counts: Self) -> Self {
        let mut out = self.0;
        for (lane, count) in out.iter_mut().zip(counts.0) {
            *lane = lane.checked_shl(count as u32).unwrap_or(0);
        }
        Self(out)
    }

    /// Per-lane logical right shift by per-lane counts.
    #[inline(always)]
    pub fn shr(self, counts: Self) -> Self {
        let mut out = self.0;
        for (lane, count) in out.iter_mut().zip(counts.0) {
            *lane = lane.checked_shr(count as u32).unwrap_or(0);
        }
        Self(out)
    }

    /// All lanes shifted left by the same count.
    #[inline(always)]
    pub fn shl_all(self, count: u32) -> Self {
        Self(self.0.map(|lane| lane.checked_shl(count).unwrap_or(0)))
    }

    #[inline(always)]
    pub fn shr_all(self, count: u32) -> Self {
        Self(self.0.map(|lane| lane.checked_shr(count).unwrap_or(0)))
    }

    /// `!self & rhs`, lane by lane.
    #[inline(always)]
    pub fn andnot(self, rhs: Self) -> Self {
        !self & rhs
    }

    /// All-ones in every lane that is zero, zero elsewhere.
    #[inline(always)]
    pub fn eq_zero(self) -> Self {
        Self(self.0.map(|lane| 0u64.wrapping_sub((lane == 0) as u64)))
    }

    /// OR of every lane.
    #[inline(always)]
    pub fn or_reduce(self) -> u64 {
        self.0.iter().fold(0, |acc, lane| acc | lane)
    }

    /// Applies `f` to each lane.
    #[inline(always)]
    pub fn map_lanes(self, f: impl Fn(u64) -> u64) -> Self {
        Self(self.0.map(f))
    }
}

impl<const N: usize> BitAnd for Lanes<N> {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (lane, other) in out.iter_mut().zip(rhs.0) {
            *lane &= other;
        }
        Self(out)
    }
}

impl<const N: usize> BitOr for Lanes<N> {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (lane, other) in out.iter_mut().zip(rhs.0) {
            *lane |= other;
        }
        Self(out)
    }
}

impl<const N: usize> Not for Lanes<N> {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|lane| !lane))
    }
}

#[cfg(test)]
mod tests {
    use super::{Lanes, U64x2, U64x4};

    #[test]
    fn variable_shifts_saturate_to_zero() {
        let v = U64x4::splat(1);
        let shifted = v.shl(Lanes([1, 8, 63, 64]));
        assert_eq!(shifted.0, [2, 256, 1 << 63, 0]);
        let back = shifted.shr(Lanes([1, 8, 63, 70]));
        assert_eq!(back.0, [1, 1, 1, 0]);
    }

    #[test]
    fn zero_mask_and_reduction() {
        let v: U64x2 = Lanes([0, 5]);
        assert_eq!(v.eq_zero().0, [u64::MAX, 0]);
        assert_eq!(v.eq_zero().andnot(v).0, [0, 5]);
        let w: U64x4 = Lanes([1, 2, 4, 8]);
        assert_eq!(w.or_reduce(), 15);
    }
}
