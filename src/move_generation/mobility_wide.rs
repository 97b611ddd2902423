//! Wide mobility/flip kernel: all four direction pairs in one 4-lane vector.
//!
//! Lane layout is `(1, 8, 9, 7)`: horizontal, vertical, and the two
//! diagonals. Each lane runs a prefix-doubling propagation in both shift
//! directions. Opponent discs on the a/h files are masked out of every lane
//! except the vertical one so runs never wrap across ranks.
//!
//! The portable functions run on `U64x4`; on x86_64 the `avx2` module runs the
//! identical sequence on `__m256i` registers.

use crate::move_generation::lanes::{Lanes, U64x4};

/// Opponent mask for lanes whose shifts can wrap across files.
pub const EDGE_MASK: u64 = 0x7e7e_7e7e_7e7e_7e7e;

const SHIFT_1: U64x4 = Lanes([1, 8, 9, 7]);
const SHIFT_2: U64x4 = Lanes([2, 16, 18, 14]);
const LANE_MASK: U64x4 = Lanes([EDGE_MASK, u64::MAX, EDGE_MASK, EDGE_MASK]);

/// Squares where `p` can move against `o`.
pub fn mobility(p: u64, o: u64) -> u64 {
    let pp = U64x4::splat(p);
    let mo = U64x4::splat(o) & LANE_MASK;

    let mut fl = mo & pp.shl(SHIFT_1);
    let mut fr = mo & pp.shr(SHIFT_1);
    fl = fl | (mo & fl.shl(SHIFT_1));
    fr = fr | (mo & fr.shr(SHIFT_1));

    let pre_l = mo & mo.shl(SHIFT_1);
    let pre_r = mo & mo.shr(SHIFT_1);
    fl = fl | (pre_l & fl.shl(SHIFT_2));
    fr = fr | (pre_r & fr.shr(SHIFT_2));
    fl = fl | (pre_l & fl.shl(SHIFT_2));
    fr = fr | (pre_r & fr.shr(SHIFT_2));

    let moves = fl.shl(SHIFT_1) | fr.shr(SHIFT_1);
    moves.or_reduce() & !(p | o)
}

/// Discs of `o` flipped when `p` plays on `square`.
pub fn flips(p: u64, o: u64, square: u8) -> u64 {
    let pp = U64x4::splat(p);
    let mo = U64x4::splat(o) & LANE_MASK;
    let xx = U64x4::splat(1u64 << (square & 63));

    let mut fl = mo & xx.shl(SHIFT_1);
    let mut fr = mo & xx.shr(SHIFT_1);
    fl = fl | (mo & fl.shl(SHIFT_1));
    fr = fr | (mo & fr.shr(SHIFT_1));

    let pre_l = mo & mo.shl(SHIFT_1);
    let pre_r = mo & mo.shr(SHIFT_1);
    fl = fl | (pre_l & fl.shl(SHIFT_2));
    fr = fr | (pre_r & fr.shr(SHIFT_2));
    fl = fl | (pre_l & fl.shl(SHIFT_2));
    fr = fr | (pre_r & fr.shr(SHIFT_2));

    // Keep a run only when the square past its end holds a mover disc.
    let outflank_l = fl.shl(SHIFT_1) & pp;
    let outflank_r = fr.shr(SHIFT_1) & pp;
    let fl = outflank_l.eq_zero().andnot(fl);
    let fr = outflank_r.eq_zero().andnot(fr);

    (fl | fr).or_reduce()
}

#[cfg(target_arch = "x86_64")]
pub mod avx2 {
    //! 256-bit intrinsics version of the wide kernel.
    //!
    //! Callers must confirm AVX2 support before calling into this module.

    use std::arch::x86_64::*;

    use super::EDGE_MASK;

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn or_reduce(v: __m256i) -> u64 {
        let mut lanes = [0u64; 4];
        _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, v);
        lanes[0] | lanes[1] | lanes[2] | lanes[3]
    }

    #[inline]
    #[target_feature(enable = "avx2")]
    unsafe fn constants() -> (__m256i, __m256i, __m256i) {
        let shift1 = _mm256_set_epi64x(7, 9, 8, 1);
        let shift2 = _mm256_add_epi64(shift1, shift1);
        let edge = EDGE_MASK as i64;
        let mask = _mm256_set_epi64x(edge, edge, -1, edge);
        (shift1, shift2, mask)
    }

    /// # Safety
    /// The CPU must support AVX2.
    #[target_feature(enable = "avx2")]
    pub unsafe fn mobility(p: u64, o: u64) -> u64 {
        let (shift1, shift2, mask) = constants();
        let pp = _mm256_set1_epi64x(p as i64);
        let mo = _mm256_and_si256(_mm256_set1_epi64x(o as i64), mask);

        let mut fl = _mm256_and_si256(mo, _mm256_sllv_epi64(pp, shift1));
        let mut fr = _mm256_and_si256(mo, _mm256_srlv_epi64(pp, shift1));
        fl = _mm256_or_si256(fl, _mm256_and_si256(mo, _mm256_sllv_epi64(fl, shift1)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(mo, _mm256_srlv_epi64(fr, shift1)));

        let pre_l = _mm256_and_si256(mo, _mm256_sllv_epi64(mo, shift1));
        let pre_r = _mm256_and_si256(mo, _mm256_srlv_epi64(mo, shift1));
        fl = _mm256_or_si256(fl, _mm256_and_si256(pre_l, _mm256_sllv_epi64(fl, shift2)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(pre_r, _mm256_srlv_epi64(fr, shift2)));
        fl = _mm256_or_si256(fl, _mm256_and_si256(pre_l, _mm256_sllv_epi64(fl, shift2)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(pre_r, _mm256_srlv_epi64(fr, shift2)));

        let moves = _mm256_or_si256(
            _mm256_sllv_epi64(fl, shift1),
            _mm256_srlv_epi64(fr, shift1),
        );
        or_reduce(moves) & !(p | o)
    }

    /// # Safety
    /// The CPU must support AVX2.
    #[target_feature(enable = "avx2")]
    pub unsafe fn flips(p: u64, o: u64, square: u8) -> u64 {
        let (shift1, shift2, mask) = constants();
        let zero = _mm256_setzero_si256();
        let pp = _mm256_set1_epi64x(p as i64);
        let mo = _mm256_and_si256(_mm256_set1_epi64x(o as i64), mask);
        let xx = _mm256_set1_epi64x((1u64 << (square & 63)) as i64);

        let mut fl = _mm256_and_si256(mo, _mm256_sllv_epi64(xx, shift1));
        let mut fr = _mm256_and_si256(mo, _mm256_srlv_epi64(xx, shift1));
        fl = _mm256_or_si256(fl, _mm256_and_si256(mo, _mm256_sllv_epi64(fl, shift1)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(mo, _mm256_srlv_epi64(fr, shift1)));

        let pre_l = _mm256_and_si256(mo, _mm256_sllv_epi64(mo, shift1));
        let pre_r = _mm256_and_si256(mo, _mm256_srlv_epi64(mo, shift1));
        fl = _mm256_or_si256(fl, _mm256_and_si256(pre_l, _mm256_sllv_epi64(fl, shift2)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(pre_r, _mm256_srlv_epi64(fr, shift2)));
        fl = _mm256_or_si256(fl, _mm256_and_si256(pre_l, _mm256_sllv_epi64(fl, shift2)));
        fr = _mm256_or_si256(fr, _mm256_and_si256(pre_r, _mm256_srlv_epi64(fr, shift2)));

        let outflank_l = _mm256_and_si256(_mm256_sllv_epi64(fl, shift1), pp);
        let outflank_r = _mm256_and_si256(_mm256_srlv_epi64(fr, shift1), pp);
        fl = _mm256_andnot_si256(_mm256_cmpeq_epi64(outflank_l, zero), fl);
        fr = _mm256_andnot_si256(_mm256_cmpeq_epi64(outflank_r, zero), fr);

        or_reduce(_mm256_or_si256(fl, fr))
    }
}

#[cfg(test)]
mod tests {
    use super::{flips, mobility};
    use crate::board::bitboard::Bitboard;

    #[test]
    fn cross_mobility_is_d3_c4_f5_e6() {
        let b = Bitboard::cross();
        let expected = (1u64 << 19) | (1u64 << 26) | (1u64 << 37) | (1u64 << 44);
        assert_eq!(mobility(b.mine, b.theirs), expected);
    }

    #[test]
    fn flips_only_bounded_runs() {
        let b = Bitboard::cross();
        // f5 flips e5 only.
        assert_eq!(flips(b.mine, b.theirs, 37), 1u64 << 36);
        // a1 touches nothing.
        assert_eq!(flips(b.mine, b.theirs, 0), 0);
    }

    #[test]
    fn runs_do_not_wrap_across_files() {
        // Mover on a2, opponent on h1: placing g1 would only "flip" h1 by wrapping.
        let p = 1u64 << 8;
        let o = 1u64 << 7;
        assert_eq!(flips(p, o, 6), 0);
        assert_eq!(mobility(p, o) & (1u64 << 6), 0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn avx2_matches_portable_on_cross() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }
        let b = Bitboard::cross();
        let (m, f) = unsafe {
            (
                super::avx2::mobility(b.mine, b.theirs),
                super::avx2::flips(b.mine, b.theirs, 19),
            )
        };
        assert_eq!(m, mobility(b.mine, b.theirs));
        assert_eq!(f, flips(b.mine, b.theirs, 19));
    }
}
