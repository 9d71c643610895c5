use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use control::{next_power_state, Policy, PowerState, Temperature};
use log::*;
use thiserror::Error;

use crate::clock::Clock;
use crate::command::CommandRunner;
use crate::relay::{ActuationError, Relay};
use crate::sensor::{Sensor, SensorError};

#[derive(Debug, Error)]
pub enum HeaterError {
    #[error("temperature read failed: {0}")]
    Sensor(#[from] SensorError),
    #[error("relay actuation failed: {0}")]
    Actuation(#[from] ActuationError),
}

#[derive(Debug, Clone, Copy)]
pub struct HeaterSettings {
    // Sleep between the end of one decision and the next poll
    pub poll_interval: Duration,
    // Consecutive failed reads tolerated before giving up
    pub sensor_retries: u32,
}

impl Default for HeaterSettings {
    fn default() -> Self {
        HeaterSettings {
            poll_interval: Duration::from_secs(30),
            sensor_retries: 0,
        }
    }
}

// Cooperative cancellation for a running heater loop. Only observed at the
// top of each iteration.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        StopHandle {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

struct LastKnown(Option<Temperature>);

impl fmt::Display for LastKnown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(temperature) => write!(f, "{} C", temperature),
            None => f.write_str("unknown"),
        }
    }
}

// Log label for a reading, None when it repeats the previous one
fn reading_label(previous: Option<Temperature>, current: Temperature) -> Option<&'static str> {
    match previous {
        None => Some("Starting temperature"),
        Some(previous) if previous != current => Some("Temperature"),
        Some(_) => None,
    }
}

pub struct Heater<R, C> {
    sensor: Sensor<Temperature, R, C>,
    policy: Policy,
    relay: Relay<R>,
    clock: C,
    settings: HeaterSettings,
    stop: StopHandle,
    // Last commanded state, the relay is only called when this changes
    state: PowerState,
    last_reading: Option<Temperature>,
    sensor_failures: u32,
}

impl<R, C> Heater<R, C>
where
    R: CommandRunner,
    C: Clock,
{
    pub fn new(
        sensor: Sensor<Temperature, R, C>,
        policy: Policy,
        relay: Relay<R>,
        clock: C,
        settings: HeaterSettings,
        stop: StopHandle,
    ) -> Result<Self, HeaterError> {
        let state = PowerState::from(relay.state()?);

        info!("Created heater on relay {}", relay.name());
        info!("Policy {}", policy);
        info!("Initialized with heater {}", state);

        Ok(Heater {
            sensor,
            policy,
            relay,
            clock,
            settings,
            stop,
            state,
            last_reading: None,
            sensor_failures: 0,
        })
    }

    // The binary stops the loop through the StopHandle it passed in
    #[cfg(test)]
    pub fn state(&self) -> PowerState {
        self.state
    }

    #[cfg(test)]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    #[cfg(test)]
    pub fn stop(&self) {
        self.stop.stop();
    }

    // One poll-decide-actuate cycle
    pub fn step(&mut self) -> Result<(), HeaterError> {
        let temperature = match self.sensor.poll() {
            Ok(temperature) => {
                self.sensor_failures = 0;
                temperature
            }
            Err(e) => {
                self.sensor_failures += 1;
                if self.sensor_failures > self.settings.sensor_retries {
                    error!(
                        "Temperature read failed with heater {}, last known temperature {}: {}",
                        self.state,
                        LastKnown(self.last_reading),
                        e
                    );
                    return Err(e.into());
                }
                warn!(
                    "Temperature read failed ({}/{}), keeping heater {}: {}",
                    self.sensor_failures, self.settings.sensor_retries, self.state, e
                );
                return Ok(());
            }
        };

        if let Some(label) = reading_label(self.last_reading, temperature) {
            info!("{}: {} C", label, temperature);
            self.last_reading = Some(temperature);
        }

        if let Some(next) = next_power_state(&self.policy, self.state, temperature) {
            if let Err(e) = self.relay.set_state(next) {
                error!(
                    "Failed to switch heater {} -> {} at {} C: {}",
                    self.state, next, temperature, e
                );
                return Err(e.into());
            }
            self.state = next;
            info!("temp is {} C, heater {}", temperature, next);
        }

        Ok(())
    }

    // Runs until stopped. Consumes the heater, a new one is needed for
    // another run.
    pub fn start(mut self) -> Result<(), HeaterError> {
        info!(
            "Starting control loop, polling every {:?}",
            self.settings.poll_interval
        );
        while self.stop.is_running() {
            self.step()?;
            self.clock.sleep(self.settings.poll_interval);
        }
        info!(
            "Control loop stopped with heater {}, last temperature {}",
            self.state,
            LastKnown(self.last_reading)
        );
        Ok(())
    }
}
