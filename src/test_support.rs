//! In-memory engine channels for unit tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::arena_errors::EngineError;
use crate::engines::engine_random::RandomEngine;
use crate::engines::engine_trait::Engine;
use crate::usi::engine_channel::{EngineChannel, EngineLauncher};
use crate::usi::usi_client::UsiClient;
use crate::utils::match_config::EngineConfig;

type Responder = Box<dyn FnMut(&str) -> Vec<String> + Send>;

#[derive(Default)]
struct ScriptState {
    sent: Vec<String>,
    incoming: VecDeque<String>,
    exited: bool,
    broken: bool,
    ignore_quit: bool,
}

/// Test-side view of a `ScriptedChannel` after it was boxed.
#[derive(Clone)]
pub(crate) struct ScriptHandle(Arc<Mutex<ScriptState>>);

impl ScriptHandle {
    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    pub(crate) fn set_exited(&self) {
        self.lock().exited = true;
    }

    /// Make every later send fail while the engine still looks alive.
    pub(crate) fn break_pipe(&self) {
        self.lock().broken = true;
    }

    pub(crate) fn ignore_quit(&self) {
        self.lock().ignore_quit = true;
    }
}

/// Channel whose replies come from a closure called on every sent line.
pub(crate) struct ScriptedChannel {
    state: ScriptHandle,
    responder: Responder,
}

impl ScriptedChannel {
    pub(crate) fn new(
        responder: impl FnMut(&str) -> Vec<String> + Send + 'static,
    ) -> (Self, ScriptHandle) {
        let handle = ScriptHandle(Arc::new(Mutex::new(ScriptState::default())));
        (
            Self {
                state: handle.clone(),
                responder: Box::new(responder),
            },
            handle,
        )
    }
}

impl EngineChannel for ScriptedChannel {
    fn send(&mut self, line: &str) -> io::Result<()> {
        if self.state.lock().broken {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken"));
        }
        let replies = (self.responder)(line);
        let mut state = self.state.lock();
        if state.exited {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "engine exited"));
        }
        state.sent.push(line.to_owned());
        state.incoming.extend(replies);
        if line == "quit" && !state.ignore_quit {
            state.exited = true;
        }
        Ok(())
    }

    fn try_receive_line(&mut self) -> Option<String> {
        self.state.lock().incoming.pop_front()
    }

    fn has_exited(&mut self) -> bool {
        self.state.lock().exited
    }

    fn wait_exit(&mut self, _timeout: Duration) -> bool {
        self.has_exited()
    }

    fn kill(&mut self) -> io::Result<()> {
        self.state.lock().exited = true;
        Ok(())
    }
}

/// Channel that runs a `UsiClient` in-process.
pub(crate) struct LoopbackChannel<E: Engine> {
    client: UsiClient<E>,
    incoming: VecDeque<String>,
    exited: bool,
}

impl LoopbackChannel<RandomEngine> {
    pub(crate) fn random(seed: u64) -> Self {
        let mut engine = RandomEngine::new();
        let _ = engine.set_option("rand_seed", &seed.to_string());
        Self::new(engine)
    }
}

impl<E: Engine> LoopbackChannel<E> {
    pub(crate) fn new(engine: E) -> Self {
        Self {
            client: UsiClient::new(engine),
            incoming: VecDeque::new(),
            exited: false,
        }
    }
}

impl<E: Engine> EngineChannel for LoopbackChannel<E> {
    fn send(&mut self, line: &str) -> io::Result<()> {
        if self.exited {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "engine exited"));
        }
        let mut out = Vec::new();
        let quit = self.client.handle_command(line, &mut out)?;
        let text = String::from_utf8_lossy(&out);
        self.incoming.extend(text.lines().map(str::to_owned));
        if quit {
            self.exited = true;
        }
        Ok(())
    }

    fn try_receive_line(&mut self) -> Option<String> {
        self.incoming.pop_front()
    }

    fn has_exited(&mut self) -> bool {
        self.exited
    }

    fn wait_exit(&mut self, _timeout: Duration) -> bool {
        self.exited
    }

    fn kill(&mut self) -> io::Result<()> {
        self.exited = true;
        Ok(())
    }
}

/// Launches in-process engines chosen by the config path:
/// `silent` never answers, `illegal` always plays a1, `resign` resigns,
/// `broken` fails to launch, anything else is a seeded `RandomEngine`.
#[derive(Debug, Default)]
pub(crate) struct LoopbackLauncher;

impl EngineLauncher for LoopbackLauncher {
    fn launch(&self, config: &EngineConfig, label: &str) -> Result<Box<dyn EngineChannel>, EngineError> {
        let kind = config.path.to_string_lossy();
        let fixed_reply = |reply: &'static str| {
            ScriptedChannel::new(move |line: &str| match line {
                "usi" => vec!["id name Fixed".to_owned(), "usiok".to_owned()],
                "isready" => vec!["readyok".to_owned()],
                l if l.starts_with("go") => vec![reply.to_owned()],
                _ => Vec::new(),
            })
            .0
        };
        match kind.as_ref() {
            "silent" => Ok(Box::new(ScriptedChannel::new(|_| Vec::new()).0)),
            "illegal" => Ok(Box::new(fixed_reply("bestmove a1"))),
            "resign" => Ok(Box::new(fixed_reply("bestmove resign"))),
            "broken" => Err(EngineError::Launch {
                engine: label.to_owned(),
                path: config.path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such engine"),
            }),
            _ => {
                let seed = config.args.first().and_then(|s| s.parse().ok()).unwrap_or(1);
                Ok(Box::new(LoopbackChannel::random(seed)))
            }
        }
    }
}
