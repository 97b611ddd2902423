/// Core value types shared by the board kernel, the codec and the arena.

use std::fmt;

pub use crate::board::board_state::Board;
pub use crate::board::undo_record::MoveRecord;

/// Number of files/ranks.
pub const BOARD_SIZE: u8 = 8;

/// Number of squares on the board.
pub const SQUARE_COUNT: u8 = BOARD_SIZE * BOARD_SIZE;

/// Disc color. `First` moves first from the canonical start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DiscColor {
    First,
    Second,
    Empty,
}

impl DiscColor {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            DiscColor::First => 0,
            DiscColor::Second => 1,
            DiscColor::Empty => 2,
        }
    }

    /// The other player. `Empty` stays `Empty`.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            DiscColor::First => DiscColor::Second,
            DiscColor::Second => DiscColor::First,
            DiscColor::Empty => DiscColor::Empty,
        }
    }
}

impl fmt::Display for DiscColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscColor::First => "black",
            DiscColor::Second => "white",
            DiscColor::Empty => "empty",
        };
        f.write_str(label)
    }
}

/// Outcome of a game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameResult {
    NotOver,
    Win,
    Loss,
    Draw,
}

impl GameResult {
    /// The same outcome seen from the other side.
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            other => other,
        }
    }

    /// Token used by the `gameover` command.
    pub const fn protocol_token(self) -> &'static str {
        match self {
            GameResult::Win => "win",
            GameResult::Loss => "loss",
            GameResult::Draw => "draw",
            GameResult::NotOver => "notover",
        }
    }
}

impl std::ops::Neg for GameResult {
    type Output = GameResult;

    fn neg(self) -> Self::Output {
        self.flipped()
    }
}

/// A square index (`0..=63`, `a1 = 0`, `h8 = 63`) or one of the
/// pass/resign/null sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate(u8);

impl Coordinate {
    pub const PASS: Coordinate = Coordinate(64);
    pub const RESIGN: Coordinate = Coordinate(65);
    pub const NULL: Coordinate = Coordinate(66);

    /// Square from a raw index; `None` when the index is off the board.
    #[inline]
    pub const fn square(index: u8) -> Option<Self> {
        if index < SQUARE_COUNT {
            Some(Coordinate(index))
        } else {
            None
        }
    }

    /// Square from zero-based file and rank.
    #[inline]
    pub const fn from_file_rank(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_SIZE && rank < BOARD_SIZE {
            Some(Coordinate(file + rank * BOARD_SIZE))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_square(self) -> bool {
        self.0 < SQUARE_COUNT
    }

    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % BOARD_SIZE
    }

    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / BOARD_SIZE
    }

    /// One-hot mask for a square, zero for sentinels.
    #[inline]
    pub const fn bit(self) -> u64 {
        if self.is_square() {
            1u64 << self.0
        } else {
            0
        }
    }

    /// Iterate the squares set in `mask`, lowest index first.
    pub fn iter_mask(mask: u64) -> impl Iterator<Item = Coordinate> {
        let mut rest = mask;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let idx = rest.trailing_zeros() as u8;
            rest &= rest - 1;
            Some(Coordinate(idx))
        })
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Coordinate::PASS => f.write_str("pass"),
            Coordinate::RESIGN => f.write_str("resign"),
            c if c.is_square() => write!(
                f,
                "{}{}",
                char::from(b'a' + c.file()),
                char::from(b'1' + c.rank())
            ),
            _ => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, GameResult};

    #[test]
    fn coordinate_layout_is_row_major_from_a1() {
        let e4 = Coordinate::from_file_rank(4, 3).expect("e4 should exist");
        assert_eq!(e4.index(), 28);
        assert_eq!(e4.to_string(), "e4");
        assert_eq!(Coordinate::square(64), None);
        assert_eq!(Coordinate::PASS.bit(), 0);
        assert_eq!(Coordinate::RESIGN.to_string(), "resign");
    }

    #[test]
    fn iter_mask_yields_each_set_bit() {
        let squares: Vec<u8> = Coordinate::iter_mask(0b1010_0001)
            .map(Coordinate::index)
            .collect();
        assert_eq!(squares, vec![0, 5, 7]);
    }

    #[test]
    fn negated_result_swaps_win_and_loss() {
        assert_eq!(-GameResult::Win, GameResult::Loss);
        assert_eq!(-GameResult::Loss, GameResult::Win);
        assert_eq!(-GameResult::Draw, GameResult::Draw);
        assert_eq!(-GameResult::NotOver, GameResult::NotOver);
    }
}
