//! Arena-side protocol state machine for one engine.
//!
//! States advance `StartUp -> WaitHandshakeAck -> Ready -> WaitSetupAck ->
//! GameActive -> GameOver`. After a game, `GameOver` goes back through `Ready`
//! so setup commands and the readiness probe are repeated, but the `usi`
//! handshake is not.
//!
//! A search that was stopped (timeout, ponder miss, game end while pondering)
//! still owes one `bestmove`. Those replies are counted and dropped as they
//! arrive so they can never be taken as the answer to a later request.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use crate::arena_errors::EngineError;
use crate::board::board_state::Board;
use crate::board::board_types::{Coordinate, GameResult};
use crate::usi::engine_channel::EngineChannel;
use crate::utils::algebraic::{format_moves, parse_move_token};
use crate::utils::match_config::EngineConfig;
use crate::utils::sfen_generator::encode;

/// Pause between polls when no line is buffered.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    StartUp,
    WaitHandshakeAck,
    Ready,
    WaitSetupAck,
    GameActive,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Running,
    Requested,
    Killed,
    Unexpected,
}

/// Speculative search started after our own move.
#[derive(Debug, Clone)]
struct PendingPonder {
    /// Board after our move and the predicted reply.
    expected: Board,
    predicted: Coordinate,
}

pub struct EngineSession {
    label: String,
    channel: Box<dyn EngineChannel>,
    state: SessionState,
    engine_name: Option<String>,
    engine_author: Option<String>,
    setup_commands: Vec<String>,
    tolerance: Duration,
    ponder_enabled: bool,
    pending_ponder: Option<PendingPonder>,
    stale_replies: usize,
    quit_requested: bool,
    killed: bool,
}

impl EngineSession {
    pub fn new(
        label: &str,
        channel: Box<dyn EngineChannel>,
        config: &EngineConfig,
        tolerance: Duration,
    ) -> Self {
        Self {
            label: label.to_owned(),
            channel,
            state: SessionState::StartUp,
            engine_name: None,
            engine_author: None,
            setup_commands: config.setup_commands.clone(),
            tolerance,
            ponder_enabled: config.ponder,
            pending_ponder: None,
            stale_replies: 0,
            quit_requested: false,
            killed: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name reported by `id name`, or the label.
    pub fn display_name(&self) -> &str {
        self.engine_name.as_deref().unwrap_or(&self.label)
    }

    pub fn engine_name(&self) -> Option<&str> {
        self.engine_name.as_deref()
    }

    pub fn engine_author(&self) -> Option<&str> {
        self.engine_author.as_deref()
    }

    pub fn is_pondering(&self) -> bool {
        self.pending_ponder.is_some()
    }

    pub fn stale_replies(&self) -> usize {
        self.stale_replies
    }

    /// Advance the state machine by at most one action.
    ///
    /// Returns whether anything happened, so callers can pause when idle.
    pub fn step(&mut self) -> Result<bool, EngineError> {
        match self.state {
            SessionState::StartUp => {
                self.send("usi")?;
                self.state = SessionState::WaitHandshakeAck;
                Ok(true)
            }
            SessionState::WaitHandshakeAck => {
                let Some(line) = self.next_line() else {
                    return Ok(false);
                };
                if line == "usiok" {
                    self.state = SessionState::Ready;
                } else if let Some(name) = line.strip_prefix("id name ") {
                    self.engine_name = Some(name.trim().to_owned());
                } else if let Some(author) = line.strip_prefix("id author ") {
                    self.engine_author = Some(author.trim().to_owned());
                } else {
                    trace!(engine = %self.label, line = %line, "ignored during handshake");
                }
                Ok(true)
            }
            SessionState::Ready => {
                let commands = self.setup_commands.clone();
                for command in &commands {
                    self.send(command)?;
                }
                self.send("isready")?;
                self.state = SessionState::WaitSetupAck;
                Ok(true)
            }
            SessionState::WaitSetupAck => {
                let Some(line) = self.next_line() else {
                    return Ok(false);
                };
                if line == "readyok" {
                    self.send("usinewgame")?;
                    self.state = SessionState::GameActive;
                } else {
                    trace!(engine = %self.label, line = %line, "ignored while waiting for readyok");
                }
                Ok(true)
            }
            SessionState::GameActive => Ok(false),
            SessionState::GameOver => {
                self.state = SessionState::Ready;
                Ok(true)
            }
        }
    }

    /// Poll `step` until the engine is ready for a game.
    pub fn transition_to_active(&mut self, timeout: Duration) -> Result<(), EngineError> {
        let started = Instant::now();
        loop {
            if self.state == SessionState::GameActive {
                debug!(engine = %self.label, "engine ready for a new game");
                return Ok(());
            }
            if self.channel.has_exited() {
                error!(engine = %self.label, state = ?self.state, "engine exited before the game started");
                return Err(EngineError::Exited {
                    engine: self.label.clone(),
                });
            }
            if started.elapsed() >= timeout {
                return Err(EngineError::Timeout {
                    engine: self.label.clone(),
                    waited_ms: duration_ms(timeout),
                });
            }
            if !self.step()? {
                thread::sleep(POLL_INTERVAL);
            }
        }
    }

    /// Ask for a move on `current`, the game started from `root`.
    ///
    /// Returns `NULL` on timeout, engine exit, unparseable replies or pipe
    /// errors; the caller treats that as fatal for the match.
    pub fn think(&mut self, root: &Board, current: &Board, limit: Duration) -> Coordinate {
        match self.think_inner(root, current, limit) {
            Ok(coord) => coord,
            Err(err) => {
                error!(engine = %self.label, error = %err, "search request failed");
                Coordinate::NULL
            }
        }
    }

    fn think_inner(
        &mut self,
        root: &Board,
        current: &Board,
        limit: Duration,
    ) -> Result<Coordinate, EngineError> {
        let limit_ms = duration_ms(limit);
        let ponder_hit = match self.pending_ponder.take() {
            Some(pending) => {
                let hit = current.last_move() == Some(pending.predicted)
                    && current.ply() == pending.expected.ply()
                    && current.same_position(&pending.expected);
                if hit {
                    debug!(engine = %self.label, predicted = %pending.predicted, "ponder hit");
                    self.send("ponderhit")?;
                } else {
                    debug!(engine = %self.label, predicted = %pending.predicted, "ponder miss");
                    self.send("stop")?;
                    self.stale_replies += 1;
                }
                hit
            }
            None => false,
        };

        if !ponder_hit {
            self.send(&position_command(root, current, &[]))?;
            self.send(&format!("go byoyomi {limit_ms}"))?;
        }

        let deadline = Instant::now() + limit + self.tolerance;
        let reply = loop {
            if let Some(line) = self.next_line() {
                if line.starts_with("info") {
                    trace!(engine = %self.label, line = %line, "search info");
                    continue;
                }
                if let Some(rest) = line.strip_prefix("bestmove") {
                    break rest.trim().to_owned();
                }
                debug!(engine = %self.label, line = %line, "ignored while thinking");
                continue;
            }

            if Instant::now() >= deadline {
                match self.send("stop") {
                    Ok(()) => self.stale_replies += 1,
                    Err(err) => warn!(engine = %self.label, error = %err, "failed to send stop"),
                }
                error!(
                    engine = %self.label,
                    limit_ms,
                    tolerance_ms = duration_ms(self.tolerance),
                    "engine did not answer in time"
                );
                return Ok(Coordinate::NULL);
            }
            if self.channel.has_exited() {
                error!(engine = %self.label, "engine exited unexpectedly while thinking");
                return Ok(Coordinate::NULL);
            }
            thread::sleep(POLL_INTERVAL);
        };

        let mut tokens = reply.split_whitespace();
        let best_token = tokens.next().unwrap_or_default();
        let best = parse_move_token(best_token);
        if best == Coordinate::NULL {
            error!(engine = %self.label, reply = %reply, "unparseable bestmove");
            return Ok(Coordinate::NULL);
        }

        if self.ponder_enabled && tokens.next() == Some("ponder") {
            if let Some(ponder_token) = tokens.next() {
                self.start_ponder(root, current, best, parse_move_token(ponder_token), limit_ms)?;
            }
        }

        Ok(best)
    }

    fn start_ponder(
        &mut self,
        root: &Board,
        current: &Board,
        best: Coordinate,
        predicted: Coordinate,
        limit_ms: u64,
    ) -> Result<(), EngineError> {
        let mut expected = current.clone();
        if !expected.apply(best) || !expected.apply(predicted) {
            trace!(engine = %self.label, %best, %predicted, "ponder line not playable; not pondering");
            return Ok(());
        }

        self.send(&position_command(root, current, &[best, predicted]))?;
        self.send(&format!("go ponder byoyomi {limit_ms}"))?;
        self.pending_ponder = Some(PendingPonder {
            expected,
            predicted,
        });
        Ok(())
    }

    /// Cancel pondering, report the result and move to `GameOver`.
    pub fn notify_outcome(&mut self, result: GameResult) -> Result<(), EngineError> {
        if self.pending_ponder.take().is_some() {
            self.send("stop")?;
            self.stale_replies += 1;
        }
        self.send(&format!("gameover {}", result.protocol_token()))?;
        self.state = SessionState::GameOver;
        Ok(())
    }

    /// Send `quit` and wait for the process to exit. False if it is still running.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        if !self.channel.has_exited() {
            match self.send("quit") {
                Ok(()) => self.quit_requested = true,
                Err(err) => warn!(engine = %self.label, error = %err, "failed to send quit"),
            }
        }
        self.channel.wait_exit(timeout)
    }

    pub fn kill(&mut self) {
        self.killed = true;
        if let Err(err) = self.channel.kill() {
            warn!(engine = %self.label, error = %err, "failed to kill engine");
        }
    }

    pub fn exit_kind(&mut self) -> ExitKind {
        if !self.channel.has_exited() {
            ExitKind::Running
        } else if self.killed {
            ExitKind::Killed
        } else if self.quit_requested {
            ExitKind::Requested
        } else {
            ExitKind::Unexpected
        }
    }

    /// Log how the engine ended.
    pub fn report_exit(&mut self) {
        match self.exit_kind() {
            ExitKind::Requested => info!(engine = %self.label, "engine exited after quit"),
            ExitKind::Killed => warn!(engine = %self.label, "engine was killed"),
            ExitKind::Unexpected => error!(engine = %self.label, "engine exited unexpectedly"),
            ExitKind::Running => warn!(engine = %self.label, "engine still running"),
        }
    }

    fn send(&mut self, line: &str) -> Result<(), EngineError> {
        trace!(engine = %self.label, line, "engine <");
        self.channel.send(line).map_err(|source| EngineError::Io {
            engine: self.label.clone(),
            source,
        })
    }

    /// Next line, dropping `bestmove` replies owed by stopped searches.
    fn next_line(&mut self) -> Option<String> {
        loop {
            let line = self.channel.try_receive_line()?;
            let line = line.trim_end().to_owned();
            if self.stale_replies > 0 && line.starts_with("bestmove") {
                self.stale_replies -= 1;
                debug!(engine = %self.label, line = %line, "dropped stale bestmove");
                continue;
            }
            return Some(line);
        }
    }
}

fn position_command(root: &Board, current: &Board, extra: &[Coordinate]) -> String {
    let played = current
        .move_history()
        .get(root.ply()..)
        .unwrap_or_default()
        .iter()
        .map(|record| record.coord);
    let moves = format_moves(played.chain(extra.iter().copied()));
    if moves.is_empty() {
        format!("position {} moves", encode(root))
    } else {
        format!("position {} moves {}", encode(root), moves)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
