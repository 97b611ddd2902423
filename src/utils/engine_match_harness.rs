//! Match orchestrator for two external engines.
//!
//! Runs a series of games between two engine slots: brings both engines to a
//! ready state in parallel, picks a randomized opening from the book, asks the
//! side to move for a move within its time budget, validates every move
//! against the board kernel, and tallies results per configured slot. Colors
//! swap after every game when configured. Any engine failure aborts the match,
//! but a report with the statistics so far is always returned.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use crate::arena_errors::{EngineError, MatchError};
use crate::board::board_state::Board;
use crate::board::board_types::{Coordinate, DiscColor, GameResult};
use crate::tables::opening_book::OpeningBook;
use crate::usi::engine_channel::EngineLauncher;
use crate::usi::engine_session::EngineSession;
use crate::utils::algebraic::format_move;
use crate::utils::game_record::{GameRecord, GameRecorder};
use crate::utils::match_config::{EngineConfig, MatchConfig};
use crate::utils::render_board::render_board;
use crate::utils::sfen_generator::encode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchStats {
    pub games_played: u32,
    /// Wins per configured engine slot, regardless of color.
    pub wins: [u32; 2],
    pub draws: u32,
    pub moves: [u32; 2],
    pub think_time_ns: [u128; 2],
}

impl MatchStats {
    /// `(wins + 0.5 * draws) / games`, zero before the first game.
    pub fn win_rate(&self, slot: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        (f64::from(self.wins[slot]) + 0.5 * f64::from(self.draws)) / f64::from(self.games_played)
    }

    pub fn avg_move_time_ms(&self, slot: usize) -> f64 {
        if self.moves[slot] == 0 {
            return 0.0;
        }
        self.think_time_ns[slot] as f64 / f64::from(self.moves[slot]) / 1_000_000.0
    }

    pub fn report(&self, labels: &[String; 2]) -> String {
        format!(
            "games={} {}: wins={} rate={:.3} avg_ms={:.3} | {}: wins={} rate={:.3} avg_ms={:.3} | draws={}",
            self.games_played,
            labels[0],
            self.wins[0],
            self.win_rate(0),
            self.avg_move_time_ms(0),
            labels[1],
            self.wins[1],
            self.win_rate(1),
            self.avg_move_time_ms(1),
            self.draws
        )
    }

    /// Only accepted moves and resignations are timed.
    fn record_move(&mut self, slot: usize, elapsed: Duration) {
        self.moves[slot] += 1;
        self.think_time_ns[slot] += elapsed.as_nanos();
    }

    fn tally(&mut self, first_slot: usize, first_result: GameResult) {
        self.games_played += 1;
        match first_result {
            GameResult::Win => self.wins[first_slot] += 1,
            GameResult::Loss => self.wins[1 - first_slot] += 1,
            GameResult::Draw | GameResult::NotOver => self.draws += 1,
        }
    }
}

#[derive(Debug)]
pub struct MatchReport {
    pub stats: MatchStats,
    pub records: Vec<GameRecord>,
    /// Why the match stopped early, if it did.
    pub abort: Option<MatchError>,
}

impl MatchReport {
    pub fn is_complete(&self) -> bool {
        self.abort.is_none()
    }
}

/// How a finished game ended, from the first player's point of view.
struct GameEnd {
    first_result: GameResult,
    reason: &'static str,
}

pub struct MatchRunner<L: EngineLauncher> {
    config: MatchConfig,
    engines: [EngineConfig; 2],
    labels: [String; 2],
    launcher: L,
    book: OpeningBook,
    rng: StdRng,
    stats: MatchStats,
    recorder: Option<GameRecorder>,
}

impl<L: EngineLauncher> MatchRunner<L> {
    /// Load the configured book and set up the runner.
    pub fn new(config: MatchConfig, engines: [EngineConfig; 2], launcher: L) -> Result<Self, MatchError> {
        let book = OpeningBook::load(config.book_path.as_deref())?;
        Ok(Self::with_book(config, engines, launcher, book))
    }

    pub fn with_book(config: MatchConfig, engines: [EngineConfig; 2], launcher: L, book: OpeningBook) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let recorder = config.record_path.as_deref().and_then(|path| {
            GameRecorder::create(path)
                .map_err(|err| warn!(path = %path.display(), error = %err, "cannot create game record file"))
                .ok()
        });
        let labels = [engines[0].display_label(0), engines[1].display_label(1)];
        Self {
            config,
            engines,
            labels,
            launcher,
            book,
            rng,
            stats: MatchStats::default(),
            recorder,
        }
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn labels(&self) -> &[String; 2] {
        &self.labels
    }

    /// Play `games` games and shut both engines down.
    pub fn run_match(&mut self, games: usize) -> MatchReport {
        let mut records = Vec::with_capacity(games);
        if games == 0 {
            return self.report(records, None);
        }

        let tolerance = Duration::from_millis(self.config.byoyomi_tolerance_ms);
        let mut sessions = Vec::with_capacity(2);
        for slot in 0..2 {
            match self.launcher.launch(&self.engines[slot], &self.labels[slot]) {
                Ok(channel) => sessions.push(EngineSession::new(
                    &self.labels[slot],
                    channel,
                    &self.engines[slot],
                    tolerance,
                )),
                Err(source) => {
                    error!(engine = %self.labels[slot], error = %source, "failed to launch engine");
                    self.shutdown_all(&mut sessions);
                    return self.report(records, Some(MatchError::Startup { slot, source }));
                }
            }
        }

        let abort = self.play_games(&mut sessions, games, &mut records);
        if let Some(err) = &abort {
            error!(error = %err, "match aborted");
        }
        self.shutdown_all(&mut sessions);
        info!("{}", self.stats.report(&self.labels));
        self.report(records, abort)
    }

    fn report(&self, records: Vec<GameRecord>, abort: Option<MatchError>) -> MatchReport {
        MatchReport {
            stats: self.stats.clone(),
            records,
            abort,
        }
    }

    fn play_games(
        &mut self,
        sessions: &mut [EngineSession],
        games: usize,
        records: &mut Vec<GameRecord>,
    ) -> Option<MatchError> {
        let startup_timeout = Duration::from_millis(self.config.game_start_timeout_ms);
        let mut first_slot = 0usize;

        for game_index in 0..games {
            if let Err(err) = bring_up(sessions, startup_timeout) {
                return Some(err);
            }

            let root = self.book.select_opening(
                &mut self.rng,
                self.config.min_book_move_num,
                self.config.max_book_move_num,
            );
            let mut record = GameRecord::stamped(
                game_index,
                &self.labels[first_slot],
                &self.labels[1 - first_slot],
            );
            record.root_sfen = encode(&root);
            record.opening_moves = root
                .move_history()
                .iter()
                .filter_map(|r| format_move(r.coord))
                .collect();
            info!(
                game = game_index + 1,
                black = %record.black,
                black_engine = sessions[first_slot].display_name(),
                white = %record.white,
                white_engine = sessions[1 - first_slot].display_name(),
                root = %record.root_sfen,
                "game start"
            );

            let mut board = root.clone();
            let outcome = self.play_game(sessions, &root, &mut board, first_slot);

            record.moves = board.move_history()[root.ply()..]
                .iter()
                .filter_map(|r| format_move(r.coord))
                .collect();
            record.black_discs = board.disc_count(DiscColor::First);
            record.white_discs = board.disc_count(DiscColor::Second);

            let end = match outcome {
                Ok(end) => end,
                Err(err) => {
                    record.outcome = "aborted".to_owned();
                    record.reason = err.to_string();
                    self.write_record(record, records);
                    return Some(err);
                }
            };

            record.outcome = match end.first_result {
                GameResult::Win => "black",
                GameResult::Loss => "white",
                GameResult::Draw | GameResult::NotOver => "draw",
            }
            .to_owned();
            record.reason = end.reason.to_owned();

            self.stats.tally(first_slot, end.first_result);
            for (slot, result) in [
                (first_slot, end.first_result),
                (1 - first_slot, -end.first_result),
            ] {
                if let Err(err) = sessions[slot].notify_outcome(result) {
                    warn!(engine = %self.labels[slot], error = %err, "failed to send gameover");
                }
            }

            debug!("final position\n{}", render_board(&board));
            info!(
                game = game_index + 1,
                outcome = %record.outcome,
                reason = end.reason,
                black_discs = record.black_discs,
                white_discs = record.white_discs,
                "game over"
            );
            info!("{}", self.stats.report(&self.labels));
            self.write_record(record, records);

            if self.config.swap_player {
                first_slot = 1 - first_slot;
            }
        }

        None
    }

    fn play_game(
        &mut self,
        sessions: &mut [EngineSession],
        root: &Board,
        board: &mut Board,
        first_slot: usize,
    ) -> Result<GameEnd, MatchError> {
        loop {
            let result = board.result(DiscColor::First);
            if result != GameResult::NotOver {
                return Ok(GameEnd {
                    first_result: result,
                    reason: "board",
                });
            }

            let mover = board.side_to_move();
            let slot = if mover == DiscColor::First {
                first_slot
            } else {
                1 - first_slot
            };
            let limit = Duration::from_millis(self.engines[slot].byoyomi_ms);

            let started = Instant::now();
            let mv = sessions[slot].think(root, board, limit);
            let elapsed = started.elapsed();

            if mv == Coordinate::RESIGN {
                self.stats.record_move(slot, elapsed);
                info!(engine = %self.labels[slot], "engine resigned");
                let first_result = if mover == DiscColor::First {
                    GameResult::Loss
                } else {
                    GameResult::Win
                };
                return Ok(GameEnd {
                    first_result,
                    reason: "resign",
                });
            }
            if mv == Coordinate::NULL {
                return Err(MatchError::NoMove {
                    engine: self.labels[slot].clone(),
                });
            }
            if !board.apply(mv) {
                error!(engine = %self.labels[slot], coord = %mv, "illegal move");
                return Err(MatchError::IllegalMove {
                    engine: self.labels[slot].clone(),
                    coord: mv,
                });
            }
            self.stats.record_move(slot, elapsed);
        }
    }

    fn write_record(&mut self, record: GameRecord, records: &mut Vec<GameRecord>) {
        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(err) = recorder.write(&record) {
                warn!(error = %err, "failed to write game record");
            }
        }
        records.push(record);
    }

    fn shutdown_all(&self, sessions: &mut [EngineSession]) {
        let timeout = Duration::from_millis(self.config.quit_timeout_ms);
        thread::scope(|scope| {
            for session in sessions.iter_mut() {
                scope.spawn(move || {
                    if !session.shutdown(timeout) {
                        warn!(engine = %session.label(), "engine ignored quit; killing");
                        session.kill();
                    }
                    session.report_exit();
                });
            }
        });
    }
}

/// Bring every session to `GameActive` in parallel.
fn bring_up(sessions: &mut [EngineSession], timeout: Duration) -> Result<(), MatchError> {
    let results: Vec<Result<(), EngineError>> = thread::scope(|scope| {
        let handles: Vec<_> = sessions
            .iter_mut()
            .map(|session| scope.spawn(move || session.transition_to_active(timeout)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    for (slot, result) in results.into_iter().enumerate() {
        if let Err(source) = result {
            return Err(MatchError::Startup { slot, source });
        }
    }
    Ok(())
}
