//! Error types for pendulum construction and stepping.

use crate::state::PendulumState;
use thiserror::Error;

/// Errors surfaced synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PendulumError {
    /// Mass or length is zero, negative, or not finite.
    #[error("Invalid {name}: {value} (must be finite and positive)")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Step size is zero, negative, or not finite.
    #[error("Invalid step size: {0} (must be finite and positive)")]
    InvalidStep(f64),

    /// A step produced a non-finite state. The previous state is kept.
    #[error("Numeric divergence after {steps} steps: {state:?}")]
    NumericDivergence { steps: u64, state: [f64; 4] },

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No pendulum exists at the requested index.
    #[error("No pendulum at index {index} (simulation holds {len})")]
    UnknownPendulum { index: usize, len: usize },
}

impl PendulumError {
    pub(crate) fn divergence(steps: u64, state: &PendulumState) -> Self {
        Self::NumericDivergence {
            steps,
            state: state.to_array(),
        }
    }
}

/// Result type for pendulum operations.
pub type Result<T> = std::result::Result<T, PendulumError>;
