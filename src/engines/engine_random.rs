//! Random-move test engine.
//!
//! Picks uniformly among legal moves from a seeded RNG and predicts a random
//! reply for pondering. Used to exercise the arena end to end.

use std::thread;
use std::time::Duration;

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::arena_errors::OptionError;
use crate::board::board_state::Board;
use crate::board::board_types::Coordinate;
use crate::engines::engine_trait::{Engine, EngineOutput, GoParams};
use crate::usi::usi_option::{UsiOption, UsiOptions};

pub const DEFAULT_SEED: u64 = 1024;

/// Time kept back from the byoyomi when simulating a search.
const THINKING_MARGIN_MS: u64 = 100;

pub struct RandomEngine {
    options: UsiOptions,
    rng: StdRng,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self {
            options: UsiOptions::new(vec![
                UsiOption::spin("rand_seed", DEFAULT_SEED as i64, 0, i64::from(u32::MAX)),
                UsiOption::check("simulate_thinking", false),
            ]),
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    fn seed(&self) -> u64 {
        self.options
            .get("rand_seed")
            .and_then(UsiOption::as_i64)
            .map_or(DEFAULT_SEED, |s| s.unsigned_abs())
    }

    fn simulate_thinking(&self) -> bool {
        self.options
            .get("simulate_thinking")
            .and_then(UsiOption::as_bool)
            .unwrap_or(false)
    }
}

impl Default for RandomEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for RandomEngine {
    fn name(&self) -> &str {
        "RandomReversi"
    }

    fn author(&self) -> &str {
        "usi_reversi_arena"
    }

    fn options(&self) -> &UsiOptions {
        &self.options
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionError> {
        self.options.set(name, value)?;
        if name.eq_ignore_ascii_case("rand_seed") {
            self.rng = StdRng::seed_from_u64(self.seed());
            debug!(seed = self.seed(), "reseeded random engine");
        }
        Ok(())
    }

    fn choose_move(&mut self, board: &Board, params: &GoParams) -> Result<EngineOutput, String> {
        let legal_moves = board.legal_moves();

        let mut out = EngineOutput::default();
        out.info_lines.push(format!(
            "info string random_engine legal_moves {}",
            legal_moves.len()
        ));

        let picked = *legal_moves
            .choose(&mut self.rng)
            .ok_or("failed to choose a random move")?;

        let mut next = board.clone();
        if next.apply(picked) {
            let replies = next.legal_moves();
            out.ponder_move = replies.choose(&mut self.rng).copied();
        }
        out.best_move = Some(picked);

        if self.simulate_thinking() {
            if let Some(byoyomi) = params.byoyomi_ms {
                let pause = byoyomi.saturating_sub(THINKING_MARGIN_MS);
                if pause > 0 {
                    thread::sleep(Duration::from_millis(pause));
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::RandomEngine;
    use crate::board::board_state::Board;
    use crate::board::board_types::Coordinate;
    use crate::engines::engine_trait::{Engine, GoParams};

    #[test]
    fn picks_a_legal_move_and_a_legal_ponder_reply() {
        let mut engine = RandomEngine::new();
        let board = Board::cross();
        let out = engine
            .choose_move(&board, &GoParams::default())
            .expect("random engine should move");
        let best = out.best_move.expect("best move");
        assert!(board.is_legal(best));

        let mut next = board.clone();
        assert!(next.apply(best));
        let ponder = out.ponder_move.expect("ponder move");
        assert!(next.is_legal(ponder));
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let mut a = RandomEngine::new();
        let mut b = RandomEngine::new();
        a.set_option("rand_seed", "42").expect("seed option");
        b.set_option("rand_seed", "42").expect("seed option");

        let mut board = Board::cross();
        for _ in 0..10 {
            let ma = a.choose_move(&board, &GoParams::default()).expect("move");
            let mb = b.choose_move(&board, &GoParams::default()).expect("move");
            assert_eq!(ma.best_move, mb.best_move);
            assert!(board.apply(ma.best_move.unwrap_or(Coordinate::NULL)));
        }
    }

    #[test]
    fn passes_when_no_move_exists() {
        let mut board = Board::empty();
        let a1 = Coordinate::square(0).expect("a1");
        let b1 = Coordinate::square(1).expect("b1");
        assert!(board.put(a1, crate::board::board_types::DiscColor::Second));
        assert!(board.put(b1, crate::board::board_types::DiscColor::First));
        let out = RandomEngine::new()
            .choose_move(&board, &GoParams::default())
            .expect("engine should pass");
        assert_eq!(out.best_move, Some(Coordinate::PASS));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut engine = RandomEngine::new();
        assert!(engine.set_option("Hash", "16").is_err());
    }
}
