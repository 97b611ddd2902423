//! Engine-vs-engine match server.
//!
//! Run with:
//! `cargo run --release --bin usi_reversi_server -- --engine-config0 configs/engine0.json --engine-config1 configs/engine1.json`
//! Set `RUST_LOG=debug` to see every protocol line and final boards.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use usi_reversi_arena::usi::engine_channel::ProcessLauncher;
use usi_reversi_arena::utils::engine_match_harness::MatchRunner;
use usi_reversi_arena::utils::match_config::{EngineConfig, MatchConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "USI Reversi match server (engine vs engine)")]
struct Cli {
    /// Number of games; overrides `game_num` from the game config
    #[arg(long)]
    game_num: Option<usize>,

    /// Match settings (JSON); defaults apply when omitted
    #[arg(long)]
    game_config: Option<PathBuf>,

    /// First engine (JSON)
    #[arg(long)]
    engine_config0: PathBuf,

    /// Second engine (JSON)
    #[arg(long)]
    engine_config1: PathBuf,

    /// Seed for opening selection
    #[arg(long)]
    seed: Option<u64>,

    /// JSON-lines game record output
    #[arg(long)]
    record: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.game_config {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("failed to load game config {}", path.display()))?,
        None => MatchConfig::default(),
    };
    if let Some(games) = cli.game_num {
        config.game_num = games;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.record.is_some() {
        config.record_path = cli.record.clone();
    }

    let engines = [
        EngineConfig::load(&cli.engine_config0)
            .with_context(|| format!("failed to load engine config {}", cli.engine_config0.display()))?,
        EngineConfig::load(&cli.engine_config1)
            .with_context(|| format!("failed to load engine config {}", cli.engine_config1.display()))?,
    ];

    let games = config.game_num;
    let mut runner =
        MatchRunner::new(config, engines, ProcessLauncher).context("failed to prepare match")?;
    info!(games, black = %runner.labels()[0], white = %runner.labels()[1], "starting match");

    let report = runner.run_match(games);
    println!("{}", report.stats.report(runner.labels()));

    match report.abort {
        Some(err) => {
            error!(error = %err, games_played = report.stats.games_played, "match did not complete");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
