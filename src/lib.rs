//! Crate root module declarations for the USI Reversi arena.
//!
//! This file exposes the board kernel, SIMD move generation, the opening
//! book, the USI protocol pieces (engine-side client and arena-side session),
//! the bundled random engine, and the match orchestration helpers so binaries,
//! benches and tests can import stable module paths.

pub mod arena_errors;

pub mod board {
    pub mod bitboard;
    pub mod board_state;
    pub mod board_types;
    pub mod reversi_rules;
    pub mod undo_record;
}

pub mod move_generation {
    pub mod lanes;
    pub mod mobility_dispatch;
    pub mod mobility_narrow;
    pub mod mobility_wide;
    pub mod perft;
}

pub mod tables {
    pub mod opening_book;
}

pub mod usi {
    pub mod engine_channel;
    pub mod engine_session;
    pub mod usi_client;
    pub mod usi_option;
}

pub mod engines {
    pub mod engine_random;
    pub mod engine_trait;
}

pub mod utils {
    pub mod algebraic;
    pub mod engine_match_harness;
    pub mod game_record;
    pub mod match_config;
    pub mod render_board;
    pub mod sfen_generator;
    pub mod sfen_parser;
}

#[cfg(test)]
pub(crate) mod test_support;
