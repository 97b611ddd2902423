//! JSON-lines game records.
//!
//! One `GameRecord` per finished (or aborted) game, written as a single JSON
//! object per line.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub timestamp: String,
    pub game_index: usize,
    /// Engine playing the first color (moves first from the cross start).
    pub black: String,
    pub white: String,
    pub root_sfen: String,
    pub opening_moves: Vec<String>,
    pub moves: Vec<String>,
    pub black_discs: u32,
    pub white_discs: u32,
    /// `black`, `white`, `draw` or `aborted`.
    pub outcome: String,
    pub reason: String,
}

impl GameRecord {
    pub fn stamped(game_index: usize, black: &str, white: &str) -> Self {
        Self {
            kind: "game",
            timestamp: Local::now().to_rfc3339(),
            game_index,
            black: black.to_owned(),
            white: white.to_owned(),
            root_sfen: String::new(),
            opening_moves: Vec::new(),
            moves: Vec::new(),
            black_discs: 0,
            white_discs: 0,
            outcome: String::new(),
            reason: String::new(),
        }
    }
}

pub struct GameRecorder {
    writer: BufWriter<File>,
}

impl GameRecorder {
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &GameRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
