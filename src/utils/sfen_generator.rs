use crate::board::board_state::Board;
use crate::board::board_types::DiscColor;
use crate::board::reversi_rules::move_number;

/// Encode `board` as a position string.
///
/// Squares run `a1..h8`. `X` marks the side to move, `O` the opponent, `-` an
/// empty square. Then the side char (`B` first player, `W` second) and the
/// move number.
pub fn encode(board: &Board) -> String {
    let bitboard = board.bitboard();
    let mut out = String::with_capacity(67);

    for sq in 0..64u32 {
        let bit = 1u64 << sq;
        let ch = if bitboard.mine & bit != 0 {
            'X'
        } else if bitboard.theirs & bit != 0 {
            'O'
        } else {
            '-'
        };
        out.push(ch);
    }

    out.push(match board.side_to_move() {
        DiscColor::Second => 'W',
        _ => 'B',
    });
    out.push_str(&move_number(board.empty_count()).to_string());
    out
}
