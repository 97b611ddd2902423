//! Canonical Reversi rule constants and terminal scoring.

use crate::board::bitboard::Bitboard;
use crate::board::board_types::GameResult;

/// Canonical cross start encoded from the first player's point of view.
pub const STARTING_POSITION_SFEN: &str =
    "---------------------------OX------XO---------------------------B1";

/// Empty squares at the canonical start.
pub const INITIAL_EMPTY_COUNT: u32 = 60;

/// Move number shown in position strings. Passes are not counted.
#[inline]
pub const fn move_number(empty_count: u32) -> u32 {
    INITIAL_EMPTY_COUNT.saturating_sub(empty_count) + 1
}

/// Result for the side to move, or `NotOver` while the game continues.
pub fn result_for_mover(bitboard: &Bitboard) -> GameResult {
    if bitboard.empty() != 0 && (bitboard.mobility() != 0 || bitboard.swapped().mobility() != 0) {
        return GameResult::NotOver;
    }

    let mine = bitboard.mine.count_ones();
    let theirs = bitboard.theirs.count_ones();
    match mine.cmp(&theirs) {
        std::cmp::Ordering::Greater => GameResult::Win,
        std::cmp::Ordering::Less => GameResult::Loss,
        std::cmp::Ordering::Equal => GameResult::Draw,
    }
}
