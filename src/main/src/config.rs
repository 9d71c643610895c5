use core::time::Duration;

use control::{Bounds, ConfigError, Temperature, Thresholds};

use crate::args::Limits;

#[toml_cfg::toml_config]
pub struct TomlConfig {
    #[default("dht11_c")]
    sensor_command: &'static str,
    // Read `<field>=<value>` out of the sensor output, empty uses it whole
    #[default("")]
    sensor_field: &'static str,
    #[default("relays")]
    relay_tool: &'static str,
    #[default("ext")]
    relay_name: &'static str,
    #[default(25.0)]
    limit_low: f32,
    #[default(27.0)]
    limit_high: f32,
    #[default(1.0)]
    default_threshold: f32,
    #[default(30)]
    poll_interval: u64,
    #[default(2)]
    sensor_min_interval: u64,
    // 0 waits for external commands indefinitely
    #[default(0)]
    command_timeout: u64,
    #[default(0)]
    sensor_retries: u32,
    #[default(true)]
    inclusive_bounds: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub sensor_command: String,
    pub sensor_field: Option<String>,
    pub relay_tool: String,
    pub relay_name: String,
    pub limit_low: Temperature,
    pub limit_high: Temperature,
    pub default_threshold: Temperature,
    pub poll_interval: Duration,
    pub sensor_min_interval: Duration,
    pub command_timeout: Option<Duration>,
    pub sensor_retries: u32,
    pub bounds: Bounds,
}

impl Config {
    pub fn read() -> Self {
        Config::from(TOML_CONFIG)
    }

    pub fn thresholds(&self, limits: &Limits) -> Result<Thresholds, ConfigError> {
        match *limits {
            Limits::Configured => Thresholds::new(self.limit_low, self.limit_high),
            Limits::Goal { goal, threshold } => {
                Thresholds::around(goal, threshold.unwrap_or(self.default_threshold))
            }
            Limits::Pair { low, high } => Thresholds::new(low, high),
        }
    }
}

impl From<TomlConfig> for Config {
    fn from(config: TomlConfig) -> Self {
        Config {
            sensor_command: config.sensor_command.to_string(),
            sensor_field: match config.sensor_field {
                "" => None,
                field => Some(field.to_string()),
            },
            relay_tool: config.relay_tool.to_string(),
            relay_name: config.relay_name.to_string(),
            limit_low: Temperature::new(config.limit_low),
            limit_high: Temperature::new(config.limit_high),
            default_threshold: Temperature::new(config.default_threshold),
            poll_interval: Duration::from_secs(config.poll_interval),
            sensor_min_interval: Duration::from_secs(config.sensor_min_interval),
            command_timeout: match config.command_timeout {
                0 => None,
                seconds => Some(Duration::from_secs(seconds)),
            },
            sensor_retries: config.sensor_retries,
            bounds: if config.inclusive_bounds {
                Bounds::Inclusive
            } else {
                Bounds::Exclusive
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sensor_command: "dht11_c".to_string(),
            sensor_field: None,
            relay_tool: "relays".to_string(),
            relay_name: "ext".to_string(),
            limit_low: Temperature::from_celsius(25),
            limit_high: Temperature::from_celsius(27),
            default_threshold: Temperature::from_celsius(1),
            poll_interval: Duration::from_secs(30),
            sensor_min_interval: Duration::from_secs(2),
            command_timeout: None,
            sensor_retries: 0,
            bounds: Bounds::Inclusive,
        }
    }
}
