use core::fmt;

use crate::config::{Bounds, Thresholds};
use crate::state::Temperature;

// Bang-bang control with a dead band between the two thresholds.
// Thresholds guarantee low <= high, so both predicates never fire together
// for inclusive bounds unless low == high, where a reading on the single
// point is treated as "turn on".
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Hysteresis {
    thresholds: Thresholds,
    bounds: Bounds,
}

impl Hysteresis {
    pub fn new(thresholds: Thresholds, bounds: Bounds) -> Self {
        Hysteresis { thresholds, bounds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn should_turn_on(&self, temperature: Temperature) -> bool {
        match self.bounds {
            Bounds::Inclusive => temperature <= self.thresholds.low(),
            Bounds::Exclusive => temperature < self.thresholds.low(),
        }
    }

    pub fn should_turn_off(&self, temperature: Temperature) -> bool {
        if self.should_turn_on(temperature) {
            return false;
        }
        match self.bounds {
            Bounds::Inclusive => temperature >= self.thresholds.high(),
            Bounds::Exclusive => temperature > self.thresholds.high(),
        }
    }
}

impl fmt::Display for Hysteresis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.bounds {
            Bounds::Inclusive => ('[', ']'),
            Bounds::Exclusive => ('(', ')'),
        };
        write!(
            f,
            "hysteresis {}{}-{}{}",
            open,
            self.thresholds.low(),
            self.thresholds.high(),
            close
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Policy {
    Hysteresis(Hysteresis),
}

impl Policy {
    pub fn should_turn_on(&self, temperature: Temperature) -> bool {
        match self {
            Policy::Hysteresis(policy) => policy.should_turn_on(temperature),
        }
    }

    pub fn should_turn_off(&self, temperature: Temperature) -> bool {
        match self {
            Policy::Hysteresis(policy) => policy.should_turn_off(temperature),
        }
    }
}

impl From<Hysteresis> for Policy {
    fn from(policy: Hysteresis) -> Policy {
        Policy::Hysteresis(policy)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Hysteresis(policy) => fmt::Display::fmt(policy, f),
        }
    }
}
