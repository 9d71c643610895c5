use control::Temperature;
use thiserror::Error;

use crate::relay::RelayCommand;

pub const USAGE: &str = "\
Usage: relay-thermostat [OPTIONS] [GOAL [THRESHOLD]]

Keeps the heater relay between GOAL-THRESHOLD and GOAL+THRESHOLD degrees C.
Without GOAL the configured limits are used.

Options:
  --low <C> --high <C>   Explicit limits instead of GOAL and THRESHOLD
  --exclusive            Only switch once a limit is passed, not when reached
  --relay <COMMAND>      Run one relay command (on, off, toggle, state) and exit
  -h, --help             Print this help
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("missing value for `{0}`")]
    MissingValue(String),
    #[error("`{value}` is not a valid temperature for {name}")]
    InvalidTemperature { name: &'static str, value: String },
    #[error("unknown relay command `{0}`")]
    InvalidRelayCommand(String),
    #[error("unexpected argument `{0}`")]
    Unexpected(String),
    #[error("--low and --high must be given together")]
    IncompletePair,
    #[error("GOAL cannot be combined with --low/--high")]
    ConflictingLimits,
    #[error("--relay cannot be combined with limits or --exclusive")]
    RelayWithLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limits {
    Configured,
    Goal {
        goal: Temperature,
        threshold: Option<Temperature>,
    },
    Pair {
        low: Temperature,
        high: Temperature,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub limits: Limits,
    pub exclusive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run(Options),
    Relay(RelayCommand),
    Help,
}

fn temperature(name: &'static str, value: &str) -> Result<Temperature, ArgsError> {
    value.parse().map_err(|_| ArgsError::InvalidTemperature {
        name,
        value: value.to_string(),
    })
}

fn relay_command(value: &str) -> Result<RelayCommand, ArgsError> {
    match value {
        "on" => Ok(RelayCommand::On),
        "off" => Ok(RelayCommand::Off),
        "toggle" => Ok(RelayCommand::Toggle),
        "state" => Ok(RelayCommand::State),
        other => Err(ArgsError::InvalidRelayCommand(other.to_string())),
    }
}

pub fn parse<I>(args: I) -> Result<Command, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut positional = Vec::new();
    let mut low = None;
    let mut high = None;
    let mut exclusive = false;
    let mut relay = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--exclusive" => exclusive = true,
            "--low" | "--high" | "--relay" => {
                let value = args.next().ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
                match arg.as_str() {
                    "--low" => low = Some(temperature("--low", &value)?),
                    "--high" => high = Some(temperature("--high", &value)?),
                    _ => relay = Some(relay_command(&value)?),
                }
            }
            // Negative temperatures are positional values, not options
            option if option.starts_with('-') && option.parse::<Temperature>().is_err() => {
                return Err(ArgsError::UnknownOption(option.to_string()));
            }
            _ => positional.push(arg),
        }
    }

    if let Some(relay) = relay {
        if !positional.is_empty() || low.is_some() || high.is_some() || exclusive {
            return Err(ArgsError::RelayWithLimits);
        }
        return Ok(Command::Relay(relay));
    }

    let limits = match (positional.as_slice(), low, high) {
        ([], None, None) => Limits::Configured,
        ([], Some(low), Some(high)) => Limits::Pair { low, high },
        ([], _, _) => return Err(ArgsError::IncompletePair),
        (_, Some(_), _) | (_, _, Some(_)) => return Err(ArgsError::ConflictingLimits),
        ([goal], None, None) => Limits::Goal {
            goal: temperature("GOAL", goal)?,
            threshold: None,
        },
        ([goal, threshold], None, None) => Limits::Goal {
            goal: temperature("GOAL", goal)?,
            threshold: Some(temperature("THRESHOLD", threshold)?),
        },
        ([_, _, extra, ..], None, None) => return Err(ArgsError::Unexpected(extra.clone())),
    };

    Ok(Command::Run(Options { limits, exclusive }))
}
