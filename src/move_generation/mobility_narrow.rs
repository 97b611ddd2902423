//! Narrow mobility/flip kernel.
//!
//! The two diagonals share a 2-lane vector. Lane 1 holds the board mirrored
//! vertically (`swap_bytes`), which turns the `±7` anti-diagonal steps into
//! `∓9` steps, so both lanes propagate with the same shift of 9. Horizontal
//! and vertical runs are computed on plain `u64`s.

use crate::move_generation::lanes::{Lanes, U64x2};
use crate::move_generation::mobility_wide::EDGE_MASK;

const DIAGONAL_SHIFT: u32 = 9;

#[inline(always)]
fn mirrored(value: u64) -> U64x2 {
    Lanes([value, value.swap_bytes()])
}

#[inline(always)]
fn unmirror(lanes: U64x2) -> u64 {
    lanes.0[0] | lanes.0[1].swap_bytes()
}

/// Opponent runs adjacent to `seed` in both directions along `shift`.
#[inline(always)]
fn scalar_runs(seed: u64, mo: u64, shift: u32) -> (u64, u64) {
    let double = shift * 2;

    let mut fl = mo & (seed << shift);
    let mut fr = mo & (seed >> shift);
    fl |= mo & (fl << shift);
    fr |= mo & (fr >> shift);

    let pre_l = mo & (mo << shift);
    let pre_r = mo & (mo >> shift);
    fl |= pre_l & (fl << double);
    fr |= pre_r & (fr >> double);
    fl |= pre_l & (fl << double);
    fr |= pre_r & (fr >> double);
    (fl, fr)
}

#[inline(always)]
fn diagonal_runs(seed: U64x2, mo: U64x2) -> (U64x2, U64x2) {
    let mut fl = mo & seed.shl_all(DIAGONAL_SHIFT);
    let mut fr = mo & seed.shr_all(DIAGONAL_SHIFT);
    fl = fl | (mo & fl.shl_all(DIAGONAL_SHIFT));
    fr = fr | (mo & fr.shr_all(DIAGONAL_SHIFT));

    let pre_l = mo & mo.shl_all(DIAGONAL_SHIFT);
    let pre_r = mo & mo.shr_all(DIAGONAL_SHIFT);
    fl = fl | (pre_l & fl.shl_all(DIAGONAL_SHIFT * 2));
    fr = fr | (pre_r & fr.shr_all(DIAGONAL_SHIFT * 2));
    fl = fl | (pre_l & fl.shl_all(DIAGONAL_SHIFT * 2));
    fr = fr | (pre_r & fr.shr_all(DIAGONAL_SHIFT * 2));
    (fl, fr)
}

/// Keeps `run` when `outflank` is non-zero, without branching.
#[inline(always)]
fn bounded(run: u64, outflank: u64) -> u64 {
    run & 0u64.wrapping_sub((outflank != 0) as u64)
}

/// Squares where `p` can move against `o`.
pub fn mobility(p: u64, o: u64) -> u64 {
    let edge_o = o & EDGE_MASK;

    let (hl, hr) = scalar_runs(p, edge_o, 1);
    let (vl, vr) = scalar_runs(p, o, 8);
    let (dl, dr) = diagonal_runs(mirrored(p), mirrored(edge_o));

    let scalar = (hl << 1) | (hr >> 1) | (vl << 8) | (vr >> 8);
    let diagonal = unmirror(dl.shl_all(DIAGONAL_SHIFT) | dr.shr_all(DIAGONAL_SHIFT));
    (scalar | diagonal) & !(p | o)
}

/// Discs of `o` flipped when `p` plays on `square`.
pub fn flips(p: u64, o: u64, square: u8) -> u64 {
    let x = 1u64 << (square & 63);
    let edge_o = o & EDGE_MASK;

    let (hl, hr) = scalar_runs(x, edge_o, 1);
    let (vl, vr) = scalar_runs(x, o, 8);
    let mut flipped = bounded(hl, (hl << 1) & p)
        | bounded(hr, (hr >> 1) & p)
        | bounded(vl, (vl << 8) & p)
        | bounded(vr, (vr >> 8) & p);

    let pp = mirrored(p);
    let (dl, dr) = diagonal_runs(mirrored(x), mirrored(edge_o));
    let outflank_l = dl.shl_all(DIAGONAL_SHIFT) & pp;
    let outflank_r = dr.shr_all(DIAGONAL_SHIFT) & pp;
    let dl = outflank_l.eq_zero().andnot(dl);
    let dr = outflank_r.eq_zero().andnot(dr);
    flipped |= unmirror(dl | dr);
    flipped
}
