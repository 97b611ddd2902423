//! USI protocol front-end for engines hosted by this crate.
//!
//! Parses arena commands, keeps the current position, routes `go` requests to
//! the engine and writes replies. Search is synchronous; the reply to a
//! `go ponder` is held back until `ponderhit` or `stop` arrives.

use std::io::{self, BufRead, Write};

use tracing::{debug, warn};

use crate::board::board_state::Board;
use crate::board::board_types::GameResult;
use crate::engines::engine_trait::{Engine, GoParams};
use crate::utils::algebraic::{format_move, parse_move_token};
use crate::utils::sfen_parser::decode;

pub fn run_stdio_loop<E: Engine>(engine: E) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut client = UsiClient::new(engine);

    for line in stdin.lock().lines() {
        let line = line?;
        let should_quit = client.handle_command(&line, &mut stdout)?;
        stdout.flush()?;
        if should_quit {
            break;
        }
    }

    Ok(())
}

pub struct UsiClient<E: Engine> {
    board: Board,
    engine: E,
    held_reply: Option<String>,
}

impl<E: Engine> UsiClient<E> {
    pub fn new(engine: E) -> Self {
        Self {
            board: Board::cross(),
            engine,
            held_reply: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Handle one command line. Returns `true` once `quit` was received.
    pub fn handle_command(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();
        debug!(command = trimmed, "usi client received");

        match cmd {
            "usi" => {
                writeln!(out, "id name {}", self.engine.name())?;
                writeln!(out, "id author {}", self.engine.author())?;
                for option in self.engine.options().iter() {
                    writeln!(out, "{}", option.declaration())?;
                }
                writeln!(out, "usiok")?;
            }
            "isready" => {
                writeln!(out, "readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    warn!(error = %err, "setoption failed");
                    writeln!(out, "info string setoption error: {}", err)?;
                }
            }
            "usinewgame" => {
                self.board = Board::cross();
                self.held_reply = None;
                self.engine.new_game();
            }
            "position" => {
                if let Err(err) = self.handle_position(trimmed) {
                    warn!(error = %err, "position failed");
                    writeln!(out, "info string position error: {}", err)?;
                }
            }
            "go" => {
                if let Err(err) = self.handle_go(trimmed, out) {
                    writeln!(out, "info string go error: {}", err)?;
                    writeln!(out, "bestmove resign")?;
                }
            }
            "stop" | "ponderhit" => {
                if let Some(reply) = self.held_reply.take() {
                    writeln!(out, "{}", reply)?;
                }
            }
            "gameover" => {
                let result = match parts.next().unwrap_or_default() {
                    "win" => GameResult::Win,
                    "loss" | "lose" => GameResult::Loss,
                    "draw" => GameResult::Draw,
                    _ => GameResult::NotOver,
                };
                self.engine.game_over(result);
            }
            "quit" => {
                return Ok(true);
            }
            _ => {
                // Unknown commands are ignored.
            }
        }

        Ok(false)
    }

    fn handle_setoption(&mut self, line: &str) -> Result<(), String> {
        let tokens = line.split_whitespace().skip(1);

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" if mode.is_empty() => mode = "name",
                "value" if mode == "name" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        if name.is_empty() {
            return Err("missing option name".to_owned());
        }
        let value = value_tokens.join(" ");
        self.engine
            .set_option(&name, &value)
            .map_err(|e| e.to_string())
    }

    fn handle_position(&mut self, line: &str) -> Result<(), String> {
        let mut tokens = line.split_whitespace().skip(1).peekable();

        if tokens.peek() == Some(&"sfen") {
            tokens.next();
        }
        let mut board = match tokens.next() {
            Some("startpos") => Board::cross(),
            Some(text) => decode(text).map_err(|e| e.to_string())?,
            None => return Err("incomplete position command".to_owned()),
        };

        if tokens.peek() == Some(&"moves") {
            tokens.next();
            for token in tokens {
                let mv = parse_move_token(token);
                if !board.apply(mv) {
                    return Err(format!("illegal or invalid move '{}'", token));
                }
            }
        }

        self.board = board;
        Ok(())
    }

    fn handle_go(&mut self, line: &str, out: &mut impl Write) -> Result<(), String> {
        let params = parse_go_params(line);
        let result = self.engine.choose_move(&self.board, &params)?;

        for info in &result.info_lines {
            writeln!(out, "{}", info).map_err(|e| e.to_string())?;
        }

        let best = result.best_move.and_then(format_move);
        let reply = match best {
            Some(best) => {
                let ponder = result.ponder_move.and_then(format_move);
                match ponder {
                    Some(ponder) => format!("bestmove {} ponder {}", best, ponder),
                    None => format!("bestmove {}", best),
                }
            }
            None => "bestmove resign".to_owned(),
        };

        if params.ponder {
            self.held_reply = Some(reply);
        } else {
            writeln!(out, "{}", reply).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

fn parse_go_params(line: &str) -> GoParams {
    let mut params = GoParams::default();
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let mut i = 0usize;
    while i < tokens.len() {
        match tokens[i] {
            "byoyomi" | "movetime" => {
                i += 1;
                params.byoyomi_ms = tokens.get(i).and_then(|x| x.parse::<u64>().ok());
            }
            "ponder" => {
                params.ponder = true;
            }
            _ => {}
        }
        i += 1;
    }
    params
}
