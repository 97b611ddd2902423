//! Engine abstraction layer used by the USI client.
//!
//! Defines the search request and reply payloads so any move-picking strategy
//! can be hosted behind the same protocol loop.

use crate::arena_errors::OptionError;
use crate::board::board_state::Board;
use crate::board::board_types::{Coordinate, GameResult};
use crate::usi::usi_option::UsiOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub byoyomi_ms: Option<u64>,
    pub ponder: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub best_move: Option<Coordinate>,
    pub ponder_move: Option<Coordinate>,
    pub info_lines: Vec<String>,
}

pub trait Engine: Send {
    fn name(&self) -> &str;
    fn author(&self) -> &str;

    fn options(&self) -> &UsiOptions;
    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError>;

    fn new_game(&mut self) {}
    fn game_over(&mut self, _result: GameResult) {}

    fn choose_move(&mut self, board: &Board, params: &GoParams) -> Result<EngineOutput, String>;
}
