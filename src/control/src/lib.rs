#![no_std]

mod config;
mod policy;
mod state;

pub use config::{Bounds, ConfigError, Thresholds};
pub use policy::{Hysteresis, Policy};
pub use state::{PowerState, Temperature};

// Edge-triggered transition: returns the state to command, or None if the
// relay must be left alone because it already holds the decided state or the
// reading is inside the dead band.
pub fn next_power_state(
    policy: &Policy,
    current: PowerState,
    temperature: Temperature,
) -> Option<PowerState> {
    if policy.should_turn_on(temperature) {
        if current != PowerState::On {
            return Some(PowerState::On);
        }
    } else if policy.should_turn_off(temperature) && current != PowerState::Off {
        return Some(PowerState::Off);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(low: i16, high: i16) -> Policy {
        let thresholds =
            Thresholds::new(Temperature::from_celsius(low), Temperature::from_celsius(high))
                .unwrap();
        Policy::Hysteresis(Hysteresis::new(thresholds, Bounds::default()))
    }

    // Runs a reading sequence through the transition rule and collects the
    // commanded states
    fn run(policy: &Policy, start: PowerState, readings: &[i16]) -> [Option<PowerState>; 8] {
        let mut transitions = [None; 8];
        let mut state = start;
        for (i, celsius) in readings.iter().enumerate() {
            if let Some(next) = next_power_state(policy, state, Temperature::from_celsius(*celsius)) {
                transitions[i] = Some(next);
                state = next;
            }
        }
        transitions
    }

    #[test]
    fn test_turns_on_at_low_threshold() {
        let policy = settings(25, 27);
        let next = next_power_state(&policy, PowerState::Off, Temperature::from_celsius(25));
        assert_eq!(next, Some(PowerState::On));
    }

    #[test]
    fn test_turns_off_at_high_threshold() {
        let policy = settings(25, 27);
        let next = next_power_state(&policy, PowerState::On, Temperature::from_celsius(27));
        assert_eq!(next, Some(PowerState::Off));
    }

    #[test]
    fn test_no_transition_when_already_in_state() {
        let policy = settings(25, 27);
        assert_eq!(
            next_power_state(&policy, PowerState::On, Temperature::from_celsius(10)),
            None
        );
        assert_eq!(
            next_power_state(&policy, PowerState::Off, Temperature::from_celsius(40)),
            None
        );
    }

    #[test]
    fn test_dead_band_keeps_state() {
        let policy = settings(25, 27);
        for state in [PowerState::On, PowerState::Off] {
            assert_eq!(
                next_power_state(&policy, state, Temperature::from_celsius(26)),
                None
            );
        }
    }

    #[test]
    fn test_sequence_transitions_only_on_change() {
        let policy = settings(25, 27);
        let transitions = run(&policy, PowerState::Off, &[30, 26, 24, 20, 28]);
        assert_eq!(
            transitions,
            [None, None, Some(PowerState::On), None, Some(PowerState::Off), None, None, None]
        );
    }

    #[test]
    fn test_repeated_confirmation_is_silent() {
        let policy = settings(25, 27);
        let transitions = run(&policy, PowerState::On, &[20, 21, 22, 23, 24, 25, 26, 24]);
        assert_eq!(transitions, [None; 8]);
    }
}
