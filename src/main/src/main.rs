use std::env;

use anyhow::{anyhow, Context, Result};
use control::{Bounds, Hysteresis, Policy, Temperature};
use log::*;
use time::macros::format_description;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

mod args;
mod clock;
mod command;
mod config;
mod heating;
mod relay;
mod sensor;
mod signals;
#[cfg(test)]
mod testing;

use args::{Command, Options};
use clock::SystemClock;
use command::ProcessRunner;
use config::Config;
use heating::{Heater, HeaterSettings, StopHandle};
use relay::{Relay, RelayCommand};
use sensor::Sensor;
use signals::SignalWatcher;

fn init_logging() -> Result<()> {
    // Same stamp layout as the original shell logs: 2024-01-31_18:05:00
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]_[hour]:[minute]:[second]"
    ));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn run_relay_command(config: &Config, command: RelayCommand) -> Result<()> {
    let relay = Relay::new(
        &config.relay_tool,
        &config.relay_name,
        ProcessRunner::new(config.command_timeout),
    );
    let output = match command {
        RelayCommand::On => relay.on()?,
        RelayCommand::Off => relay.off()?,
        RelayCommand::Toggle => relay.toggle()?,
        RelayCommand::State => {
            if relay.state()? {
                "on".to_string()
            } else {
                "off".to_string()
            }
        }
    };
    println!("{}", output);
    Ok(())
}

fn maintain_temperature(config: &Config, options: Options) -> Result<()> {
    let thresholds = config
        .thresholds(&options.limits)
        .context("Invalid temperature limits")?;
    let bounds = if options.exclusive {
        Bounds::Exclusive
    } else {
        config.bounds
    };
    let policy = Policy::from(Hysteresis::new(thresholds, bounds));

    // Armed before the relay is first queried so an early signal is not lost
    let stop = StopHandle::new();
    let watcher = SignalWatcher::install(stop.clone())?;

    let runner = ProcessRunner::new(config.command_timeout);
    let mut sensor: Sensor<Temperature, _, _> = Sensor::new(
        &config.sensor_command,
        config.sensor_min_interval,
        runner,
        SystemClock,
    );
    if let Some(name) = &config.sensor_field {
        sensor = sensor.with_filter(sensor::field(name));
    }
    let relay = Relay::new(&config.relay_tool, &config.relay_name, runner);
    let settings = HeaterSettings {
        poll_interval: config.poll_interval,
        sensor_retries: config.sensor_retries,
    };

    let result = Heater::new(sensor, policy, relay, SystemClock, settings, stop)
        .context("Failed to create heater")
        .and_then(|heater| heater.start().context("Heater control loop failed"));

    watcher.close();
    result
}

fn main() -> Result<()> {
    init_logging()?;

    let command = args::parse(env::args().skip(1)).map_err(|e| anyhow!("{}\n\n{}", e, args::USAGE))?;
    let config = Config::read();

    match command {
        Command::Help => {
            print!("{}", args::USAGE);
            Ok(())
        }
        Command::Relay(relay_command) => run_relay_command(&config, relay_command),
        Command::Run(options) => {
            let result = maintain_temperature(&config, options);
            match &result {
                Ok(()) => info!("Shut down cleanly"),
                Err(e) => error!("{:#}", e),
            }
            result
        }
    }
}
