//! Line transport between the arena and one engine.
//!
//! The protocol state machine only sees `EngineChannel`. `ProcessChannel`
//! backs it with a child process: stdout is drained by a reader thread into
//! an unbounded queue so reads never block the arena.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use tracing::{debug, trace};

use crate::arena_errors::EngineError;
use crate::utils::match_config::EngineConfig;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

pub trait EngineChannel: Send {
    /// Write one line, newline-terminated, and flush.
    fn send(&mut self, line: &str) -> io::Result<()>;

    /// Next buffered line from the engine, without blocking.
    fn try_receive_line(&mut self) -> Option<String>;

    fn has_exited(&mut self) -> bool;

    /// Wait up to `timeout` for the engine to exit.
    fn wait_exit(&mut self, timeout: Duration) -> bool;

    fn kill(&mut self) -> io::Result<()>;
}

/// Creates channels for engine configs.
pub trait EngineLauncher: Sync {
    fn launch(&self, config: &EngineConfig, label: &str) -> Result<Box<dyn EngineChannel>, EngineError>;
}

/// Launches engines as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl EngineLauncher for ProcessLauncher {
    fn launch(&self, config: &EngineConfig, label: &str) -> Result<Box<dyn EngineChannel>, EngineError> {
        Ok(Box::new(ProcessChannel::spawn(config, label)?))
    }
}

pub struct ProcessChannel {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    rx: Receiver<String>,
}

impl ProcessChannel {
    pub fn spawn(config: &EngineConfig, label: &str) -> Result<Self, EngineError> {
        let launch_error = |source: io::Error| EngineError::Launch {
            engine: label.to_owned(),
            path: config.path.clone(),
            source,
        };

        let mut cmd = Command::new(&config.path);
        if !config.args.is_empty() {
            cmd.args(&config.args);
        }
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(launch_error)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| launch_error(io::Error::other("no stdin pipe")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| launch_error(io::Error::other("no stdout pipe")))?;

        let (tx, rx) = unbounded::<String>();
        let reader_label = label.to_owned();
        thread::Builder::new()
            .name(format!("{label}-stdout"))
            .spawn(move || {
                let reader = BufReader::new(stdout);
                for line in reader.lines() {
                    match line {
                        Ok(l) => {
                            trace!(engine = %reader_label, line = %l, "engine >");
                            if tx.send(l).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
                debug!(engine = %reader_label, "engine stdout closed");
            })
            .map_err(launch_error)?;

        debug!(engine = label, path = %config.path.display(), pid = child.id(), "engine launched");
        Ok(Self {
            child,
            stdin: BufWriter::new(stdin),
            rx,
        })
    }
}

impl EngineChannel for ProcessChannel {
    fn send(&mut self, line: &str) -> io::Result<()> {
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()
    }

    fn try_receive_line(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    fn has_exited(&mut self) -> bool {
        !matches!(self.child.try_wait(), Ok(None))
    }

    fn wait_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_exited() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(EXIT_POLL_INTERVAL);
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        if self.has_exited() {
            return Ok(());
        }
        self.child.kill()?;
        self.child.wait().map(|_| ())
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        if !self.has_exited() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
