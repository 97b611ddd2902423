//! Position-string-to-Board parser.
//!
//! Accepts the 64-square mover-relative layout followed by the side-to-move
//! char. Anything after the side char (the move number) is ignored.

use crate::arena_errors::SfenError;
use crate::board::bitboard::Bitboard;
use crate::board::board_state::Board;
use crate::board::board_types::DiscColor;

pub fn decode(text: &str) -> Result<Board, SfenError> {
    let chars: Vec<char> = text.chars().take(65).collect();
    if chars.len() < 65 {
        return Err(SfenError::TooShort {
            len: text.chars().count(),
        });
    }

    let mut bitboard = Bitboard::default();
    for (index, &ch) in chars[..64].iter().enumerate() {
        let bit = 1u64 << index;
        match ch {
            'X' => bitboard.mine |= bit,
            'O' => bitboard.theirs |= bit,
            '-' => {}
            _ => return Err(SfenError::InvalidDisc { index, ch }),
        }
    }

    let side_to_move = parse_side_to_move(chars[64])?;
    Ok(Board::from_parts(bitboard, side_to_move))
}

fn parse_side_to_move(ch: char) -> Result<DiscColor, SfenError> {
    match ch {
        'B' => Ok(DiscColor::First),
        'W' => Ok(DiscColor::Second),
        other => Err(SfenError::InvalidSideToMove(other)),
    }
}
