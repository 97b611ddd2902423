//! Random-move USI engine for exercising the match server.
//!
//! stdout carries the protocol, so logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use usi_reversi_arena::engines::engine_random::{RandomEngine, DEFAULT_SEED};
use usi_reversi_arena::engines::engine_trait::Engine;
use usi_reversi_arena::usi::usi_client::run_stdio_loop;

#[derive(Parser, Debug)]
#[command(author, version, about = "Random-move USI Reversi engine")]
struct Cli {
    /// Initial value of the `rand_seed` option
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Sleep for most of the byoyomi before answering
    #[arg(long, default_value_t = false)]
    simulate_thinking: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut engine = RandomEngine::new();
    engine
        .set_option("rand_seed", &cli.seed.to_string())
        .context("invalid --seed")?;
    engine
        .set_option("simulate_thinking", if cli.simulate_thinking { "true" } else { "false" })
        .context("invalid --simulate-thinking")?;

    run_stdio_loop(engine).context("USI loop failed")
}
