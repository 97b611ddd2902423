//! Core board state representation.
//!
//! `Board` keeps the mover-relative `Bitboard`, the absolute side to move, and
//! an undo stack so the arena can replay, validate and rewind games. All
//! mutation goes through `apply`/`undo`, apart from explicit setup with `put`.

use crate::board::bitboard::Bitboard;
use crate::board::board_types::{Coordinate, DiscColor, GameResult};
use crate::board::reversi_rules;
use crate::board::undo_record::MoveRecord;

#[derive(Debug, Clone)]
pub struct Board {
    bitboard: Bitboard,
    side_to_move: DiscColor,
    history: Vec<MoveRecord>,
}

impl Default for Board {
    fn default() -> Self {
        Self::cross()
    }
}

impl Board {
    /// Board with no discs and the first player to move.
    pub fn empty() -> Self {
        Self {
            bitboard: Bitboard::default(),
            side_to_move: DiscColor::First,
            history: Vec::new(),
        }
    }

    /// Canonical cross start.
    pub fn cross() -> Self {
        Self {
            bitboard: Bitboard::cross(),
            side_to_move: DiscColor::First,
            history: Vec::new(),
        }
    }

    /// Board from mover-relative masks. `side_to_move` must not be `Empty`.
    pub fn from_parts(bitboard: Bitboard, side_to_move: DiscColor) -> Self {
        let side_to_move = match side_to_move {
            DiscColor::Empty => DiscColor::First,
            side => side,
        };
        Self {
            bitboard,
            side_to_move,
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> DiscColor {
        self.side_to_move
    }

    #[inline]
    pub fn bitboard(&self) -> Bitboard {
        self.bitboard
    }

    /// Absolute color of the disc on `c`; `Empty` for vacant squares and sentinels.
    pub fn disc_color(&self, c: Coordinate) -> DiscColor {
        let bit = c.bit();
        if self.bitboard.mine & bit != 0 {
            self.side_to_move
        } else if self.bitboard.theirs & bit != 0 {
            self.side_to_move.opposite()
        } else {
            DiscColor::Empty
        }
    }

    /// Places (or clears, with `Empty`) a disc. Clears the move history.
    pub fn put(&mut self, c: Coordinate, color: DiscColor) -> bool {
        if !c.is_square() {
            return false;
        }
        let bit = c.bit();
        self.bitboard.mine &= !bit;
        self.bitboard.theirs &= !bit;
        if color == self.side_to_move {
            self.bitboard.mine |= bit;
        } else if color == self.side_to_move.opposite() {
            self.bitboard.theirs |= bit;
        }
        self.history.clear();
        true
    }

    pub fn disc_count(&self, color: DiscColor) -> u32 {
        if color == self.side_to_move {
            self.bitboard.mine.count_ones()
        } else if color == self.side_to_move.opposite() {
            self.bitboard.theirs.count_ones()
        } else {
            self.bitboard.empty_count()
        }
    }

    #[inline]
    pub fn empty_count(&self) -> u32 {
        self.bitboard.empty_count()
    }

    #[inline]
    pub fn mobility(&self) -> u64 {
        self.bitboard.mobility()
    }

    /// Every placement that flips at least one disc, or exactly `[PASS]`.
    pub fn legal_moves(&self) -> Vec<Coordinate> {
        let mobility = self.mobility();
        if mobility == 0 {
            return vec![Coordinate::PASS];
        }
        Coordinate::iter_mask(mobility).collect()
    }

    pub fn is_legal(&self, c: Coordinate) -> bool {
        let mobility = self.mobility();
        if c == Coordinate::PASS {
            return mobility == 0;
        }
        mobility & c.bit() != 0
    }

    /// Plays `c` for the side to move. Returns false, leaving the board
    /// untouched, when the move is illegal.
    #[must_use]
    pub fn apply(&mut self, c: Coordinate) -> bool {
        if c == Coordinate::PASS {
            if self.mobility() != 0 {
                return false;
            }
            self.history.push(MoveRecord::pass());
            self.swap_sides();
            return true;
        }

        if !c.is_square() {
            return false;
        }
        let bit = c.bit();
        if self.bitboard.occupied() & bit != 0 {
            return false;
        }
        let flipped = self.bitboard.flips(c.index());
        if flipped == 0 {
            return false;
        }

        self.bitboard.mine |= flipped | bit;
        self.bitboard.theirs ^= flipped;
        self.history.push(MoveRecord { coord: c, flipped });
        self.swap_sides();
        true
    }

    /// Reverts the most recent `apply`. False when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.pop() else {
            return false;
        };
        self.swap_sides();
        let placed = record.coord.bit();
        self.bitboard.mine &= !(record.flipped | placed);
        self.bitboard.theirs |= record.flipped;
        true
    }

    /// Game result from `for_color`'s point of view.
    pub fn result(&self, for_color: DiscColor) -> GameResult {
        let own = reversi_rules::result_for_mover(&self.bitboard);
        if for_color == self.side_to_move {
            own
        } else {
            -own
        }
    }

    #[inline]
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<Coordinate> {
        self.history.last().map(|r| r.coord)
    }

    /// Number of moves (including passes) applied since setup.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Same discs and side to move, ignoring history.
    pub fn same_position(&self, other: &Board) -> bool {
        self.bitboard == other.bitboard && self.side_to_move == other.side_to_move
    }

    #[inline]
    fn swap_sides(&mut self) {
        self.bitboard = self.bitboard.swapped();
        self.side_to_move = self.side_to_move.opposite();
    }
}

#[cfg(test)]
mod tests {
    use super::Board;
    use crate::board::board_types::{Coordinate, DiscColor, GameResult};
    use rand::prelude::IndexedRandom;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sq(name: &str) -> Coordinate {
        let bytes = name.as_bytes();
        Coordinate::from_file_rank(bytes[0] - b'a', bytes[1] - b'1').expect("valid square name")
    }

    #[test]
    fn canonical_start_moves_are_d3_c4_f5_e6() {
        let board = Board::cross();
        let mut moves = board.legal_moves();
        moves.sort();
        assert_eq!(moves, vec![sq("d3"), sq("c4"), sq("f5"), sq("e6")]);
        assert_eq!(board.disc_color(sq("e4")), DiscColor::First);
        assert_eq!(board.disc_color(sq("d4")), DiscColor::Second);
    }

    #[test]
    fn illegal_apply_leaves_board_untouched() {
        let mut board = Board::cross();
        let before = board.bitboard();
        assert!(!board.apply(sq("a1")));
        assert!(!board.apply(sq("e4")));
        assert!(!board.apply(Coordinate::PASS));
        assert!(!board.apply(Coordinate::RESIGN));
        assert!(!board.apply(Coordinate::NULL));
        assert_eq!(board.bitboard(), before);
        assert_eq!(board.ply(), 0);
    }

    #[test]
    fn apply_flips_and_swaps_side() {
        let mut board = Board::cross();
        assert!(board.apply(sq("f5")));
        assert_eq!(board.side_to_move(), DiscColor::Second);
        assert_eq!(board.disc_color(sq("e5")), DiscColor::First);
        assert_eq!(board.disc_count(DiscColor::First), 4);
        assert_eq!(board.disc_count(DiscColor::Second), 1);
        assert_eq!(board.last_move(), Some(sq("f5")));
    }

    #[test]
    fn random_playouts_undo_to_the_start() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut board = Board::cross();
            let start = board.clone();
            while board.result(DiscColor::First) == GameResult::NotOver {
                let moves = board.legal_moves();
                let candidates = (0..64u8)
                    .filter_map(Coordinate::square)
                    .chain([Coordinate::PASS, Coordinate::RESIGN, Coordinate::NULL]);
                for c in candidates {
                    assert_eq!(board.is_legal(c), moves.contains(&c), "square {c}");
                }
                let choice = *moves.choose(&mut rng).expect("at least one move");
                assert!(board.apply(choice));
            }
            assert_eq!(
                board.result(DiscColor::First),
                -board.result(DiscColor::Second)
            );
            while board.undo() {}
            assert!(board.same_position(&start));
        }
    }

    #[test]
    fn pass_is_legal_only_without_mobility() {
        let mut board = Board::empty();
        assert!(board.put(sq("a1"), DiscColor::Second));
        assert!(board.put(sq("b1"), DiscColor::First));
        assert!(board.put(sq("h8"), DiscColor::Second));
        assert!(board.put(sq("g8"), DiscColor::First));
        assert_eq!(board.legal_moves(), vec![Coordinate::PASS]);
        assert!(board.is_legal(Coordinate::PASS));
        assert!(board.apply(Coordinate::PASS));
        assert_eq!(board.side_to_move(), DiscColor::Second);
        assert!(board.undo());
        assert_eq!(board.side_to_move(), DiscColor::First);
        assert!(!board.undo());
    }

    #[test]
    fn clone_is_independent() {
        let mut board = Board::cross();
        let copy = board.clone();
        assert!(board.apply(sq("d3")));
        assert_eq!(copy.ply(), 0);
        assert!(copy.same_position(&Board::cross()));
    }
}
