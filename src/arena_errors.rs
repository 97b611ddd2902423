//! Errors used throughout the arena.
//!
//! Each subsystem gets its own enum so callers can match on the failures that
//! are meaningful at their level:
//! - `SfenError` and `BookError` come from untrusted text (engine output, book
//!   files) and are always returned as values, never panics.
//! - `OptionError` is raised by the USI option store on the engine side.
//! - `EngineError` describes a single engine process misbehaving.
//! - `MatchError` is the reason a whole match was aborted.
//! - `ConfigError` covers loading JSON configuration files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::board::board_types::Coordinate;

/// Failure to decode a position string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SfenError {
    /// The string is shorter than 64 squares plus the side-to-move char.
    #[error("position string too short: {len} chars (need at least 65)")]
    TooShort { len: usize },

    /// A board character outside the `X`/`O`/`-` alphabet.
    #[error("invalid disc character '{ch}' at square {index}")]
    InvalidDisc { index: usize, ch: char },

    /// The side-to-move character is neither `B` nor `W`.
    #[error("invalid side-to-move character '{0}'")]
    InvalidSideToMove(char),
}

/// Failure to load one book line or the book as a whole.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book line is empty")]
    EmptyLine,

    #[error("missing position string in book line")]
    MissingPosition,

    #[error("invalid position in book line: {0}")]
    Position(#[from] SfenError),

    #[error("unexpected token '{0}' where 'moves' was expected")]
    UnexpectedToken(String),

    #[error("cannot parse move token '{token}' at ply {ply}")]
    InvalidMoveToken { ply: usize, token: String },

    #[error("move '{token}' at ply {ply} is illegal")]
    IllegalMove { ply: usize, token: String },

    #[error("failed reading book {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("book {0} contains no valid games")]
    NoValidEntries(PathBuf),
}

/// Failure to assign a USI option value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionError {
    #[error("no such option: {0}")]
    UnknownOption(String),

    #[error("option {name}: cannot parse '{value}' as {expected}")]
    TypeMismatch {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("option {name}: value {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: String,
        min: String,
        max: String,
    },
}

/// A single engine process failed to respond correctly.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{engine}: failed to launch {path}: {source}")]
    Launch {
        engine: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{engine}: i/o error on engine pipe: {source}")]
    Io {
        engine: String,
        #[source]
        source: io::Error,
    },

    #[error("{engine}: no response within {waited_ms} ms")]
    Timeout { engine: String, waited_ms: u64 },

    #[error("{engine}: process exited unexpectedly")]
    Exited { engine: String },
}

/// Reason a match was aborted before all games were played.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("engine {slot} did not reach the game-start state: {source}")]
    Startup {
        slot: usize,
        #[source]
        source: EngineError,
    },

    #[error("{engine} did not return a usable move")]
    NoMove { engine: String },

    #[error("{engine} played illegal move {coord}")]
    IllegalMove { engine: String, coord: Coordinate },

    #[error("opening book: {0}")]
    Book(#[from] BookError),
}

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed parsing {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
