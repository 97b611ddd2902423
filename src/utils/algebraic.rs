//! Move token conversions.
//!
//! Tokens are a file letter plus a rank digit (`f5`, `D3`), or the words
//! `pass` and `resign`. Anything else parses to `Coordinate::NULL`.

use crate::board::board_types::Coordinate;

/// Parse a wire move token. Never fails; unparseable input gives `NULL`.
pub fn parse_move_token(token: &str) -> Coordinate {
    match token {
        "pass" => return Coordinate::PASS,
        "resign" => return Coordinate::RESIGN,
        _ => {}
    }

    let bytes = token.as_bytes();
    if bytes.len() != 2 {
        return Coordinate::NULL;
    }

    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Coordinate::NULL;
    }

    Coordinate::from_file_rank(file - b'a', rank - b'1').unwrap_or(Coordinate::NULL)
}

/// Wire token for a move. `RESIGN` and `NULL` have no move token.
pub fn format_move(c: Coordinate) -> Option<String> {
    if c == Coordinate::PASS || c.is_square() {
        Some(c.to_string())
    } else {
        None
    }
}

/// Space-separated tokens for a sequence of moves, skipping untokenizable ones.
pub fn format_moves(moves: impl IntoIterator<Item = Coordinate>) -> String {
    moves
        .into_iter()
        .filter_map(format_move)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{format_move, format_moves, parse_move_token};
    use crate::board::board_types::Coordinate;

    #[test]
    fn parses_squares_case_insensitively() {
        assert_eq!(parse_move_token("a1").index(), 0);
        assert_eq!(parse_move_token("h8").index(), 63);
        assert_eq!(parse_move_token("F5"), parse_move_token("f5"));
        assert_eq!(parse_move_token("f5").index(), 37);
    }

    #[test]
    fn parses_words_and_rejects_garbage() {
        assert_eq!(parse_move_token("pass"), Coordinate::PASS);
        assert_eq!(parse_move_token("resign"), Coordinate::RESIGN);
        for bad in ["", "i1", "a9", "a0", "f55", "xx", "passs", "ä1"] {
            assert_eq!(parse_move_token(bad), Coordinate::NULL, "token {bad:?}");
        }
    }

    #[test]
    fn formats_moves_and_pass() {
        assert_eq!(format_move(parse_move_token("d3")).as_deref(), Some("d3"));
        assert_eq!(format_move(Coordinate::PASS).as_deref(), Some("pass"));
        assert_eq!(format_move(Coordinate::RESIGN), None);
        assert_eq!(format_move(Coordinate::NULL), None);
        let line = format_moves([parse_move_token("f5"), Coordinate::PASS, Coordinate::NULL]);
        assert_eq!(line, "f5 pass");
    }
}
