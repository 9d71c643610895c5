// Test doubles: a scripted command runner that records every invocation and
// a virtual clock that never really sleeps.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::command::{CommandError, CommandOutput, CommandRunner};
use crate::heating::StopHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok(String),
    Exit(i32, String),
    Missing,
}

impl Reply {
    pub fn ok(stdout: &str) -> Reply {
        Reply::Ok(stdout.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub line: String,
    pub at: Duration,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Reply>>,
    fallback: HashMap<String, Reply>,
    calls: Vec<Invocation>,
}

#[derive(Clone, Default)]
pub struct ScriptedRunner {
    script: Rc<RefCell<Script>>,
    clock: Option<VirtualClock>,
    latency: Duration,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    // Timestamps invocations and lets each one take `latency` of virtual time
    pub fn with_clock(mut self, clock: &VirtualClock, latency: Duration) -> Self {
        self.clock = Some(clock.clone());
        self.latency = latency;
        self
    }

    // Replies consumed in order for an exact command line
    pub fn queue(&self, line: &str, replies: impl IntoIterator<Item = Reply>) {
        self.script
            .borrow_mut()
            .queued
            .entry(line.to_string())
            .or_default()
            .extend(replies);
    }

    // Reply used once the queue for a line is empty
    pub fn always(&self, line: &str, reply: Reply) {
        self.script
            .borrow_mut()
            .fallback
            .insert(line.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.script.borrow().calls.clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.line).collect()
    }

    pub fn count(&self, line: &str) -> usize {
        self.script
            .borrow()
            .calls
            .iter()
            .filter(|call| call.line == line)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        if let Some(clock) = &self.clock {
            clock.advance(self.latency);
        }
        let at = self.clock.as_ref().map(VirtualClock::elapsed).unwrap_or_default();

        let mut script = self.script.borrow_mut();
        let script = &mut *script;
        script.calls.push(Invocation {
            line: line.clone(),
            at,
        });
        let reply = script
            .queued
            .get_mut(&line)
            .and_then(VecDeque::pop_front)
            .or_else(|| script.fallback.get(&line).cloned())
            .unwrap_or(Reply::Missing);

        match reply {
            Reply::Ok(stdout) => Ok(CommandOutput::new(true, Some(0), &stdout)),
            Reply::Exit(code, stdout) => Ok(CommandOutput::new(false, Some(code), &stdout)),
            Reply::Missing => Err(CommandError::Spawn {
                program: program.to_string(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}

#[derive(Default)]
struct ClockState {
    elapsed: Duration,
    sleeps: Vec<Duration>,
    stop_during_sleep: Option<(usize, StopHandle)>,
}

#[derive(Clone)]
pub struct VirtualClock {
    base: Instant,
    state: Rc<RefCell<ClockState>>,
}

#[allow(dead_code)]
impl VirtualClock {
    pub fn new() -> Self {
        VirtualClock {
            base: Instant::now(),
            state: Rc::default(),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.state.borrow_mut().elapsed += duration;
    }

    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.borrow().sleeps.clone()
    }

    // Delivers a stop request while the nth sleep (1-based) is in progress
    pub fn stop_during_sleep(&self, nth: usize, handle: StopHandle) {
        self.state.borrow_mut().stop_during_sleep = Some((nth, handle));
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.borrow_mut();
        state.sleeps.push(duration);
        if let Some((nth, handle)) = &state.stop_during_sleep {
            if state.sleeps.len() == *nth {
                handle.stop();
            }
        }
        state.elapsed += duration;
    }
}
