//! Opening book used to randomize game starts.
//!
//! Each line of a book file is one game:
//!
//! ```text
//! [position] [sfen] <position-string | startpos> [moves <tok> <tok> ...]
//! ```
//!
//! Tokens are separated by single spaces. Blank lines and lines starting with
//! `#` are ignored. Every move is replayed through the board kernel when the
//! line is loaded, so a stored entry is always legal from its initial board.

use std::fs;
use std::path::{Path, PathBuf};

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::arena_errors::BookError;
use crate::board::board_state::Board;
use crate::board::board_types::Coordinate;
use crate::utils::algebraic::parse_move_token;
use crate::utils::sfen_parser::decode;

/// A validated initial position plus the moves of one book game.
#[derive(Debug, Clone)]
pub struct BookEntry {
    initial: Board,
    moves: Vec<Coordinate>,
}

impl BookEntry {
    pub fn initial(&self) -> &Board {
        &self.initial
    }

    pub fn moves(&self) -> &[Coordinate] {
        &self.moves
    }

    /// Initial board with the first `ply` moves applied.
    pub fn replay(&self, ply: usize) -> Board {
        let mut board = self.initial.clone();
        for &mv in self.moves.iter().take(ply) {
            // Entries are validated on load.
            let applied = board.apply(mv);
            debug_assert!(applied, "book entry move {mv} failed on replay");
        }
        board
    }
}

#[derive(Debug, Clone)]
pub struct OpeningBook {
    entries: Vec<BookEntry>,
    skipped_lines: usize,
}

impl OpeningBook {
    /// Single zero-move entry at the canonical start.
    pub fn canonical() -> Self {
        Self {
            entries: vec![BookEntry {
                initial: Board::cross(),
                moves: Vec::new(),
            }],
            skipped_lines: 0,
        }
    }

    /// Load the configured book, or the canonical start when none is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, BookError> {
        let Some(path) = path else {
            info!("no opening book configured; using the canonical start");
            return Ok(Self::canonical());
        };

        let text = fs::read_to_string(path).map_err(|source| BookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let book = Self::from_text(&text, path)?;
        info!(
            path = %path.display(),
            entries = book.entries.len(),
            skipped = book.skipped_lines,
            "loaded opening book"
        );
        Ok(book)
    }

    /// Parse a whole book. Bad lines are skipped and counted.
    pub fn from_text(text: &str, origin: &Path) -> Result<Self, BookError> {
        let mut entries = Vec::new();
        let mut skipped_lines = 0usize;

        for (line_idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match load_entry(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    skipped_lines += 1;
                    warn!(
                        book = %origin.display(),
                        line = line_idx + 1,
                        error = %err,
                        "skipping invalid book line"
                    );
                }
            }
        }

        if entries.is_empty() {
            return Err(BookError::NoValidEntries(PathBuf::from(origin)));
        }

        Ok(Self {
            entries,
            skipped_lines,
        })
    }

    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Pick a uniform entry and replay a uniform number of its moves.
    ///
    /// The ply count is drawn from `[min(min_ply, len), min(max_ply, len)]`;
    /// inverted bounds are swapped.
    pub fn select_opening<R: Rng + ?Sized>(&self, rng: &mut R, min_ply: usize, max_ply: usize) -> Board {
        let Some(entry) = self.entries.choose(rng) else {
            return Board::cross();
        };

        let len = entry.moves.len();
        let mut lo = min_ply.min(len);
        let mut hi = max_ply.min(len);
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let ply = rng.random_range(lo..=hi);
        entry.replay(ply)
    }
}

/// Parse and validate one book line.
pub fn load_entry(line: &str) -> Result<BookEntry, BookError> {
    let mut tokens = line
        .trim_end_matches(['\r', '\n'])
        .split(' ')
        .filter(|t| !t.is_empty())
        .peekable();

    if tokens.peek().is_none() {
        return Err(BookError::EmptyLine);
    }

    if tokens.peek() == Some(&"position") {
        tokens.next();
    }

    let mut board = match tokens.next() {
        Some("startpos") => Board::cross(),
        Some("sfen") => match tokens.next() {
            Some(text) if text != "moves" => decode(text)?,
            _ => return Err(BookError::MissingPosition),
        },
        Some("moves") | None => return Err(BookError::MissingPosition),
        Some(text) => decode(text)?,
    };

    match tokens.next() {
        None => {
            return Ok(BookEntry {
                initial: board,
                moves: Vec::new(),
            })
        }
        Some("moves") => {}
        Some(other) => return Err(BookError::UnexpectedToken(other.to_owned())),
    }

    let mut moves = Vec::new();
    for (idx, token) in tokens.enumerate() {
        let ply = idx + 1;
        let mv = parse_move_token(token);
        if mv == Coordinate::NULL || mv == Coordinate::RESIGN {
            return Err(BookError::InvalidMoveToken {
                ply,
                token: token.to_owned(),
            });
        }
        if !board.apply(mv) {
            return Err(BookError::IllegalMove {
                ply,
                token: token.to_owned(),
            });
        }
        moves.push(mv);
    }

    while board.undo() {}

    Ok(BookEntry {
        initial: board,
        moves,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{load_entry, OpeningBook};
    use crate::arena_errors::BookError;
    use crate::board::board_state::Board;
    use crate::board::reversi_rules::STARTING_POSITION_SFEN;
    use crate::utils::algebraic::parse_move_token;

    #[test]
    fn header_with_empty_moves_is_a_zero_move_entry() {
        let line = format!("position sfen {STARTING_POSITION_SFEN} moves");
        let entry = load_entry(&line).expect("zero-move line should load");
        assert!(entry.moves().is_empty());
        assert!(entry.initial().same_position(&Board::cross()));
    }

    #[test]
    fn optional_keywords_are_accepted() {
        for line in [
            "startpos moves f5 d6".to_owned(),
            "position startpos moves f5 d6".to_owned(),
            format!("{STARTING_POSITION_SFEN} moves f5 d6"),
            format!("sfen {STARTING_POSITION_SFEN} moves f5 d6"),
        ] {
            let entry = load_entry(&line).expect("line should load");
            assert_eq!(
                entry.moves(),
                &[parse_move_token("f5"), parse_move_token("d6")][..],
                "line {line:?}"
            );
        }
    }

    #[test]
    fn stored_board_is_rewound_to_the_initial_position() {
        let entry = load_entry("startpos moves f5 d6 c3 d3 c4").expect("line should load");
        assert_eq!(entry.initial().ply(), 0);
        assert!(entry.initial().same_position(&Board::cross()));
        assert_eq!(entry.replay(5).ply(), 5);
    }

    #[test]
    fn invalid_lines_are_rejected() {
        assert!(matches!(load_entry("   "), Err(BookError::EmptyLine)));
        assert!(matches!(load_entry("position moves f5"), Err(BookError::MissingPosition)));
        assert!(matches!(load_entry("startpos f5"), Err(BookError::UnexpectedToken(_))));
        assert!(matches!(
            load_entry("startpos moves f5 zz"),
            Err(BookError::InvalidMoveToken { ply: 2, .. })
        ));
        assert!(matches!(
            load_entry("startpos moves f5 f5"),
            Err(BookError::IllegalMove { ply: 2, .. })
        ));
        assert!(matches!(load_entry("XO moves"), Err(BookError::Position(_))));
    }

    #[test]
    fn comma_separated_moves_are_not_accepted() {
        assert!(load_entry("startpos moves f5,d6").is_err());
    }

    #[test]
    fn from_text_skips_and_counts_bad_lines() {
        let text = "# sample\n\nstartpos moves f5 d6\nstartpos moves a1\nstartpos moves f5 f6 e6\n";
        let book = OpeningBook::from_text(text, Path::new("inline")).expect("book should load");
        assert_eq!(book.entries().len(), 2);
        assert_eq!(book.skipped_lines(), 1);
    }

    #[test]
    fn book_without_valid_lines_is_an_error() {
        let err = OpeningBook::from_text("startpos moves a1\n", Path::new("inline"))
            .expect_err("no valid lines");
        assert!(matches!(err, BookError::NoValidEntries(_)));
    }

    #[test]
    fn missing_book_file_is_an_error() {
        let err = OpeningBook::load(Some(Path::new("/nonexistent/book.txt")))
            .expect_err("missing file");
        assert!(matches!(err, BookError::Io { .. }));
    }

    #[test]
    fn no_book_gives_the_canonical_start() {
        let book = OpeningBook::load(None).expect("canonical book");
        let mut rng = StdRng::seed_from_u64(1);
        let board = book.select_opening(&mut rng, 10, 21);
        assert!(board.same_position(&Board::cross()));
    }

    #[test]
    fn selected_ply_is_clamped_to_entry_length() {
        let book = OpeningBook::from_text("startpos moves f5 d6 c3 d3 c4\n", Path::new("inline"))
            .expect("book should load");
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let board = book.select_opening(&mut rng, 10, 21);
            assert_eq!(board.ply(), 5);
        }
        for _ in 0..50 {
            let board = book.select_opening(&mut rng, 4, 2);
            assert!((2..=4).contains(&board.ply()));
        }
    }

    #[test]
    fn bundled_sample_book_loads_cleanly() {
        let text = include_str!("../../configs/openings.txt");
        let book = OpeningBook::from_text(text, Path::new("configs/openings.txt"))
            .expect("sample book should load");
        assert_eq!(book.entries().len(), 8);
        assert_eq!(book.skipped_lines(), 0);
        assert!(book.entries().iter().all(|e| e.moves().len() == 21));

        let mut rng = StdRng::seed_from_u64(3);
        let board = book.select_opening(&mut rng, 10, 21);
        assert!((10..=21).contains(&board.ply()));
    }
}
