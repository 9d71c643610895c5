use thiserror::Error;

use crate::state::Temperature;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("low threshold {low} C is above high threshold {high} C")]
    InvertedThresholds { low: Temperature, high: Temperature },
}

// How a reading exactly on a threshold is treated
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Bounds {
    // temp <= low turns on, temp >= high turns off
    #[default]
    Inclusive,
    // temp < low turns on, temp > high turns off
    Exclusive,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Thresholds {
    low: Temperature,
    high: Temperature,
}

impl Thresholds {
    pub fn new(low: Temperature, high: Temperature) -> Result<Self, ConfigError> {
        if low > high {
            return Err(ConfigError::InvertedThresholds { low, high });
        }
        Ok(Thresholds { low, high })
    }

    pub fn around(goal: Temperature, threshold: Temperature) -> Result<Self, ConfigError> {
        Thresholds::new(goal.offset_by(threshold.negate()), goal.offset_by(threshold))
    }

    pub fn low(&self) -> Temperature {
        self.low
    }

    pub fn high(&self) -> Temperature {
        self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_rejects_inverted_pair() {
        let result = Thresholds::new(Temperature::from_celsius(30), Temperature::from_celsius(20));
        assert_eq!(
            result,
            Err(ConfigError::InvertedThresholds {
                low: Temperature::from_celsius(30),
                high: Temperature::from_celsius(20),
            })
        );
    }

    #[test]
    fn test_thresholds_accepts_equal_pair() {
        let t = Temperature::from_celsius(22);
        let thresholds = Thresholds::new(t, t).unwrap();
        assert_eq!(thresholds.low(), thresholds.high());
    }

    #[test]
    fn test_thresholds_around_goal() {
        let thresholds =
            Thresholds::around(Temperature::from_celsius(26), Temperature::from_celsius(1)).unwrap();
        assert_eq!(thresholds.low(), Temperature::from_celsius(25));
        assert_eq!(thresholds.high(), Temperature::from_celsius(27));
    }

    #[test]
    fn test_thresholds_around_negative_threshold_fails() {
        let result = Thresholds::around(Temperature::from_celsius(26), Temperature::from_celsius(-2));
        assert!(matches!(result, Err(ConfigError::InvertedThresholds { .. })));
    }
}
