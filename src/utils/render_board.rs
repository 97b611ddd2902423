//! Terminal-oriented board renderer for logs and diagnostics.

use crate::board::board_state::Board;
use crate::board::board_types::{Coordinate, DiscColor};

/// Render the board with `●` for the first player and `○` for the second.
///
/// Rank 8 is printed first, `a1` is bottom-left.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let ch = Coordinate::from_file_rank(file, rank)
                .map(|c| disc_char(board.disc_color(c)))
                .unwrap_or('?');
            out.push(ch);
            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h\n");
    out.push_str(&format!(
        "{} to move, ● {} ○ {}",
        board.side_to_move(),
        board.disc_count(DiscColor::First),
        board.disc_count(DiscColor::Second)
    ));

    out
}

fn disc_char(color: DiscColor) -> char {
    match color {
        DiscColor::First => '●',
        DiscColor::Second => '○',
        DiscColor::Empty => '·',
    }
}
