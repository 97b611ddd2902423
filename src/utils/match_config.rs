//! JSON configuration for matches and engines.
//!
//! Every field has a default so partial files are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arena_errors::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub game_num: usize,
    /// Swap colors after every game.
    pub swap_player: bool,
    pub book_path: Option<PathBuf>,
    pub min_book_move_num: usize,
    pub max_book_move_num: usize,
    /// Added to each engine's budget before a search counts as timed out.
    pub byoyomi_tolerance_ms: u64,
    pub game_start_timeout_ms: u64,
    pub quit_timeout_ms: u64,
    /// Seed for opening selection; a fresh OS seed when absent.
    pub seed: Option<u64>,
    /// JSON-lines game record output.
    pub record_path: Option<PathBuf>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game_num: 10,
            swap_player: true,
            book_path: None,
            min_book_move_num: 10,
            max_book_move_num: 21,
            byoyomi_tolerance_ms: 10,
            game_start_timeout_ms: 100_000,
            quit_timeout_ms: 10_000,
            seed: None,
            record_path: None,
        }
    }
}

impl MatchConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Sent verbatim before every `isready`.
    pub setup_commands: Vec<String>,
    pub byoyomi_ms: u64,
    pub ponder: bool,
    pub label: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            args: Vec::new(),
            working_dir: None,
            setup_commands: Vec::new(),
            byoyomi_ms: 1000,
            ponder: false,
            label: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    /// Configured label, else the executable's file stem, else `engine{slot}`.
    pub fn display_label(&self, slot: usize) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_owned();
        }
        self.path
            .file_stem()
            .map(|stem| format!("{}#{}", stem.to_string_lossy(), slot))
            .unwrap_or_else(|| format!("engine{slot}"))
    }
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{EngineConfig, MatchConfig};
    use crate::arena_errors::ConfigError;

    #[test]
    fn partial_match_config_keeps_defaults() {
        let cfg: MatchConfig =
            serde_json::from_str(r#"{ "game_num": 4, "seed": 9 }"#).expect("config should parse");
        assert_eq!(cfg.game_num, 4);
        assert_eq!(cfg.seed, Some(9));
        assert!(cfg.swap_player);
        assert_eq!(cfg.min_book_move_num, 10);
        assert_eq!(cfg.max_book_move_num, 21);
        assert_eq!(cfg.byoyomi_tolerance_ms, 10);
        assert_eq!(cfg.game_start_timeout_ms, 100_000);
        assert_eq!(cfg.quit_timeout_ms, 10_000);
    }

    #[test]
    fn engine_config_parses_all_fields() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{
                "path": "bin/engine",
                "args": ["--quiet"],
                "working_dir": "/tmp",
                "setup_commands": ["setoption name rand_seed value 3"],
                "byoyomi_ms": 250,
                "ponder": true
            }"#,
        )
        .expect("config should parse");
        assert_eq!(cfg.path, PathBuf::from("bin/engine"));
        assert_eq!(cfg.byoyomi_ms, 250);
        assert!(cfg.ponder);
        assert_eq!(cfg.display_label(1), "engine#1");
    }

    #[test]
    fn label_wins_over_path() {
        let cfg = EngineConfig {
            label: Some("alpha".to_owned()),
            ..EngineConfig::default()
        };
        assert_eq!(cfg.display_label(0), "alpha");
        assert_eq!(EngineConfig::default().display_label(1), "engine1");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = MatchConfig::load(Path::new("/nonexistent/game.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
