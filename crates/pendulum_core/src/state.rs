//! Plain data carried by every pendulum: the canonical state and the
//! physical parameters.

use crate::error::{PendulumError, Result};
use serde::{Deserialize, Serialize};

/// Number of components in a double-pendulum state vector.
pub const STATE_DIM: usize = 4;

/// Canonical state `(θ1, θ2, pθ1, pθ2)`.
///
/// Both angles are measured from the downward vertical; `theta2` is absolute,
/// not relative to `theta1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PendulumState {
    pub theta1: f64,
    pub theta2: f64,
    pub p_theta1: f64,
    pub p_theta2: f64,
}

impl PendulumState {
    /// A state with the given angles and both momenta zero.
    pub fn at_rest(theta1: f64, theta2: f64) -> Self {
        Self {
            theta1,
            theta2,
            p_theta1: 0.0,
            p_theta2: 0.0,
        }
    }

    /// Like [`at_rest`](Self::at_rest), rejecting non-finite angles.
    pub fn try_at_rest(theta1: f64, theta2: f64) -> Result<Self> {
        check_finite("theta1", theta1)?;
        check_finite("theta2", theta2)?;
        Ok(Self::at_rest(theta1, theta2))
    }

    pub fn to_array(self) -> [f64; STATE_DIM] {
        [self.theta1, self.theta2, self.p_theta1, self.p_theta2]
    }

    pub fn from_array(values: [f64; STATE_DIM]) -> Self {
        let [theta1, theta2, p_theta1, p_theta2] = values;
        Self {
            theta1,
            theta2,
            p_theta1,
            p_theta2,
        }
    }

    /// Builds a state from a slice produced by an integrator.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold exactly four components.
    pub fn from_slice(values: &[f64]) -> Self {
        assert_eq!(
            values.len(),
            STATE_DIM,
            "double pendulum state must have {STATE_DIM} components"
        );
        Self::from_array([values[0], values[1], values[2], values[3]])
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

impl From<[f64; STATE_DIM]> for PendulumState {
    fn from(values: [f64; STATE_DIM]) -> Self {
        Self::from_array(values)
    }
}

impl From<PendulumState> for [f64; STATE_DIM] {
    fn from(state: PendulumState) -> Self {
        state.to_array()
    }
}

/// Mass of each bob and length of each rod. Both rods share the same values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumParams {
    pub mass: f64,
    pub length: f64,
}

impl PendulumParams {
    pub fn new(mass: f64, length: f64) -> Result<Self> {
        let params = Self { mass, length };
        params.validate()?;
        Ok(params)
    }

    /// Checks that mass and length are finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        check_positive("mass", self.mass)?;
        check_positive("length", self.length)
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PendulumError::InvalidParameter { name, value })
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PendulumError::InvalidParameter { name, value })
    }
}
