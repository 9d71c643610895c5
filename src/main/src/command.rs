use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::*;
use thiserror::Error;

// How often a child is checked for exit while a timeout is armed
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    // Trailing newline and whitespace stripped
    pub stdout: String,
}

impl CommandOutput {
    pub fn new(success: bool, code: Option<i32>, stdout: &str) -> Self {
        CommandOutput {
            success,
            code,
            stdout: stdout.trim_end().to_string(),
        }
    }
}

// Transport used by the sensor and the relay to reach their external tools
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

// Reads a child pipe to the end on its own thread so a chatty child can
// never block on a full pipe while its exit is awaited.
fn drain<P>(pipe: Option<P>) -> JoinHandle<Vec<u8>>
where
    P: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        buffer
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        ProcessRunner { timeout }
    }

    fn wait(program: &str, child: &mut Child) -> Result<ExitStatus, CommandError> {
        child.wait().map_err(|source| CommandError::Wait {
            program: program.to_string(),
            source,
        })
    }

    fn wait_with_timeout(
        program: &str,
        child: &mut Child,
        timeout: Duration,
    ) -> Result<ExitStatus, CommandError> {
        let deadline = Instant::now() + timeout;
        loop {
            let exited = child.try_wait().map_err(|source| CommandError::Wait {
                program: program.to_string(),
                source,
            })?;
            if let Some(status) = exited {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                warn!("Killing `{}` after {:?}", program, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        debug!("Running `{} {}`", program, args.join(" "));
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Own process group, so a terminal Ctrl-C only reaches the thermostat
        // and the command in flight runs to completion
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(timeout) => Self::wait_with_timeout(program, &mut child, timeout)?,
            None => Self::wait(program, &mut child)?,
        };

        // A reader only panics if the allocation fails, treat it as no output
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        let stderr = String::from_utf8_lossy(&stderr);
        if !stderr.trim().is_empty() {
            debug!("`{}` stderr: {}", program, stderr.trim_end());
        }

        Ok(CommandOutput::new(
            status.success(),
            status.code(),
            &String::from_utf8_lossy(&stdout),
        ))
    }
}
