use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::*;
use thiserror::Error;

use crate::clock::Clock;
use crate::command::{CommandError, CommandRunner};

#[derive(Debug, Error)]
pub enum SensorError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("`{program}` exited with code {code:?}, output {output:?}")]
    Exit {
        program: String,
        code: Option<i32>,
        output: String,
    },
    #[error("unable to parse sensor output {raw:?}")]
    Parse { raw: String },
}

type Filter = Box<dyn Fn(&str) -> String>;

// Picks the value of `name=value` out of whitespace separated output such as
// `temp=22 hum=40`. Empty when the field is missing, which fails the parse.
pub fn field(name: &str) -> impl Fn(&str) -> String + 'static {
    let prefix = format!("{}=", name);
    move |raw| {
        raw.split_whitespace()
            .find_map(|word| word.strip_prefix(prefix.as_str()))
            .unwrap_or_default()
            .to_string()
    }
}

// Reads a value from an external command, never more often than
// `min_interval`. Faster callers are delayed, not rejected.
pub struct Sensor<T, R, C> {
    program: String,
    args: Vec<String>,
    filter: Option<Filter>,
    min_interval: Duration,
    last_read_at: Option<Instant>,
    runner: R,
    clock: C,
    target: PhantomData<fn() -> T>,
}

impl<T, R, C> Sensor<T, R, C>
where
    T: FromStr,
    R: CommandRunner,
    C: Clock,
{
    pub fn new(command: &str, min_interval: Duration, runner: R, clock: C) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        Sensor {
            program,
            args: words.collect(),
            filter: None,
            min_interval,
            last_read_at: None,
            runner,
            clock,
            target: PhantomData,
        }
    }

    pub fn with_filter(mut self, filter: impl Fn(&str) -> String + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn poll(&mut self) -> Result<T, SensorError> {
        if let Some(last_read_at) = self.last_read_at {
            let next_read_at = last_read_at + self.min_interval;
            let now = self.clock.now();
            if now < next_read_at {
                trace!("Sensor rate limited, waiting {:?}", next_read_at - now);
                self.clock.sleep(next_read_at - now);
            }
        }

        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let result = self.runner.run(&self.program, &args);
        self.last_read_at = Some(self.clock.now());
        let output = result?;

        if !output.success {
            return Err(SensorError::Exit {
                program: self.program.clone(),
                code: output.code,
                output: output.stdout,
            });
        }

        let value = match &self.filter {
            Some(filter) => filter(&output.stdout),
            None => output.stdout.clone(),
        };
        value
            .trim()
            .parse::<T>()
            .map_err(|_| SensorError::Parse { raw: output.stdout })
    }
}

impl<T, R, C> fmt::Debug for Sensor<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sensor")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("filtered", &self.filter.is_some())
            .field("min_interval", &self.min_interval)
            .field("last_read_at", &self.last_read_at)
            .finish()
    }
}
