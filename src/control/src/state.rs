use core::fmt;
use core::str::FromStr;

use fixed::types::I12F4;
use fixed::ParseFixedError;

// Temperature in degrees celcius, 1/16 degree resolution
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct Temperature(I12F4);

impl Temperature {
    pub fn new(value: f32) -> Self {
        Self(I12F4::saturating_from_num(value))
    }

    pub fn from_celsius(value: i16) -> Self {
        Self(I12F4::saturating_from_num(value))
    }

    // goal +/- threshold, clamped to the representable range
    pub fn offset_by(self, delta: Temperature) -> Self {
        Self(self.0.saturating_add(delta.0))
    }

    pub fn negate(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl From<Temperature> for I12F4 {
    fn from(value: Temperature) -> I12F4 {
        value.0
    }
}

impl From<Temperature> for f32 {
    fn from(value: Temperature) -> f32 {
        value.0.to_num()
    }
}

impl FromStr for Temperature {
    type Err = ParseFixedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I12F4::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        self == PowerState::On
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> PowerState {
        if on {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::On => f.write_str("ON"),
            PowerState::Off => f.write_str("OFF"),
        }
    }
}
