use crate::board::board_types::Coordinate;

/// Single undo record for `Board::apply` / `Board::undo`.
///
/// `flipped` is empty for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub coord: Coordinate,
    pub flipped: u64,
}

impl MoveRecord {
    #[inline]
    pub const fn pass() -> Self {
        Self {
            coord: Coordinate::PASS,
            flipped: 0,
        }
    }

    #[inline]
    pub const fn is_pass(&self) -> bool {
        self.coord.index() == Coordinate::PASS.index()
    }
}
