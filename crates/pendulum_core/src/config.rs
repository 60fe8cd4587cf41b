use crate::error::{PendulumError, Result};
use crate::solvers::DEFAULT_STEP_SIZE;
use crate::state::PendulumParams;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Largest number of pendulums a single config may request.
pub const MAX_PENDULUMS: usize = 10_000;

/// Settings for a simulation of one or more pendulums fanned out from a
/// common starting pose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub mass: f64,
    pub length: f64,
    pub step_size: f64,
    pub theta1: f64,
    pub theta2: f64,
    /// Number of pendulums to create.
    pub count: usize,
    /// Angle offset, in radians, added to both starting angles per instance.
    pub spread: f64,
    /// States kept per pendulum for trajectory drawing. Zero disables.
    pub trail_length: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mass: 0.1,
            length: 0.2,
            step_size: DEFAULT_STEP_SIZE,
            theta1: 0.7 * PI,
            theta2: 0.7 * PI,
            count: 1,
            spread: 1e-3,
            trail_length: 0,
        }
    }
}

impl SimulationConfig {
    pub fn params(&self) -> Result<PendulumParams> {
        PendulumParams::new(self.mass, self.length)
    }

    pub fn validate(&self) -> Result<()> {
        self.params()?;
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(PendulumError::InvalidStep(self.step_size));
        }
        if !(self.theta1.is_finite() && self.theta2.is_finite()) {
            return Err(PendulumError::InvalidConfig(format!(
                "starting angles must be finite, got ({}, {})",
                self.theta1, self.theta2
            )));
        }
        if !(self.spread.is_finite() && self.spread >= 0.0) {
            return Err(PendulumError::InvalidConfig(format!(
                "spread must be finite and non-negative, got {}",
                self.spread
            )));
        }
        if self.count > MAX_PENDULUMS {
            return Err(PendulumError::InvalidConfig(format!(
                "count must be at most {MAX_PENDULUMS}, got {}",
                self.count
            )));
        }
        // The offset grows with the index, so the last pendulum is the first
        // to overflow.
        let (theta1, theta2) = self.initial_angles(self.count.saturating_sub(1));
        if !(theta1.is_finite() && theta2.is_finite()) {
            return Err(PendulumError::InvalidConfig(format!(
                "fanned-out starting angles overflow: ({theta1}, {theta2})"
            )));
        }
        Ok(())
    }

    /// Starting angles of the `index`-th pendulum.
    pub fn initial_angles(&self, index: usize) -> (f64, f64) {
        let offset = self.spread * index as f64;
        (self.theta1 + offset, self.theta2 + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::{SimulationConfig, MAX_PENDULUMS};
    use crate::error::PendulumError;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.step_size, 0.005);
        assert_eq!(config.count, 1);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = SimulationConfig {
            length: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PendulumError::InvalidParameter { name: "length", .. })
        ));

        let config = SimulationConfig {
            step_size: -0.005,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(PendulumError::InvalidStep(_))));

        let config = SimulationConfig {
            theta2: f64::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(PendulumError::InvalidConfig(_))));

        let config = SimulationConfig {
            spread: -1.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(PendulumError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_overflowing_spread() {
        let config = SimulationConfig {
            count: 3,
            spread: 1e308,
            ..SimulationConfig::default()
        };
        assert!(config.spread.is_finite());
        assert!(matches!(config.validate(), Err(PendulumError::InvalidConfig(_))));

        let single = SimulationConfig {
            count: 1,
            ..config
        };
        single.validate().expect("first pendulum has no offset");
    }

    #[test]
    fn validate_limits_count() {
        let config = SimulationConfig {
            count: MAX_PENDULUMS,
            ..SimulationConfig::default()
        };
        config.validate().expect("limit itself is allowed");

        let config = SimulationConfig {
            count: MAX_PENDULUMS + 1,
            ..SimulationConfig::default()
        };
        let err = config.validate().expect_err("count above limit");
        assert!(err.to_string().contains("count must be at most"));
    }

    #[test]
    fn initial_angles_fan_out_by_spread() {
        let config = SimulationConfig {
            theta1: 1.0,
            theta2: 2.0,
            spread: 0.01,
            ..SimulationConfig::default()
        };
        assert_eq!(config.initial_angles(0), (1.0, 2.0));
        let (t1, t2) = config.initial_angles(3);
        assert!((t1 - 1.03).abs() < 1e-12);
        assert!((t2 - 2.03).abs() < 1e-12);
    }
}
