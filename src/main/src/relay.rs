use std::fmt;

use control::PowerState;
use log::*;
use thiserror::Error;

use crate::command::{CommandError, CommandRunner};

// Output of `<tool> state <relay>` when the relay is energized
const ENERGIZED: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    On,
    Off,
    Toggle,
    State,
}

impl RelayCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            RelayCommand::On => "on",
            RelayCommand::Off => "off",
            RelayCommand::Toggle => "toggle",
            RelayCommand::State => "state",
        }
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ActuationError {
    #[error("relay {relay}: `{command}` could not be run: {source}")]
    Command {
        relay: String,
        command: RelayCommand,
        #[source]
        source: CommandError,
    },
    #[error("relay {relay}: `{command}` exited with code {code:?}, output {output:?}")]
    Failed {
        relay: String,
        command: RelayCommand,
        code: Option<i32>,
        output: String,
    },
    #[error("relay {relay}: `{command}` produced no output")]
    NoOutput { relay: String, command: RelayCommand },
}

// Proxy over the external relay tool. Holds no state of its own, every call
// goes out to the tool.
#[derive(Debug, Clone)]
pub struct Relay<R> {
    tool: String,
    name: String,
    runner: R,
}

impl<R: CommandRunner> Relay<R> {
    pub fn new(tool: &str, name: &str, runner: R) -> Self {
        Relay {
            tool: tool.to_string(),
            name: name.to_string(),
            runner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, command: RelayCommand) -> Result<String, ActuationError> {
        let output = self
            .runner
            .run(&self.tool, &[command.as_str(), self.name.as_str()])
            .map_err(|source| ActuationError::Command {
                relay: self.name.clone(),
                command,
                source,
            })?;

        if !output.success {
            return Err(ActuationError::Failed {
                relay: self.name.clone(),
                command,
                code: output.code,
                output: output.stdout,
            });
        }
        debug!("Relay {} {}: {:?}", self.name, command, output.stdout);
        Ok(output.stdout)
    }

    pub fn on(&self) -> Result<String, ActuationError> {
        self.invoke(RelayCommand::On)
    }

    pub fn off(&self) -> Result<String, ActuationError> {
        self.invoke(RelayCommand::Off)
    }

    pub fn toggle(&self) -> Result<String, ActuationError> {
        self.invoke(RelayCommand::Toggle)
    }

    pub fn state(&self) -> Result<bool, ActuationError> {
        let output = self.invoke(RelayCommand::State)?;
        if output.is_empty() {
            return Err(ActuationError::NoOutput {
                relay: self.name.clone(),
                command: RelayCommand::State,
            });
        }
        Ok(output == ENERGIZED)
    }

    pub fn set_state(&self, power: PowerState) -> Result<String, ActuationError> {
        match power {
            PowerState::On => self.on(),
            PowerState::Off => self.off(),
        }
    }
}
