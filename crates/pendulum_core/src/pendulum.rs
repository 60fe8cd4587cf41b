//! A single simulated pendulum: state, bound dynamics, and trail history.

use crate::dynamics::{new_dynamics, DoublePendulum};
use crate::error::{PendulumError, Result};
use crate::solvers::rk4_step;
use crate::state::{PendulumParams, PendulumState};
use std::collections::VecDeque;
use tracing::debug;

/// Lifecycle of a pendulum instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Freshly constructed or reset; both momenta are zero.
    IdleAtRest,
    /// At least one step has been applied since the last reset.
    Integrating,
}

/// Bounded FIFO of past states, oldest first.
///
/// Presentation layers draw trajectory ribbons from it. A capacity of zero
/// disables recording.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<PendulumState>,
    capacity: usize,
}

impl Trail {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendulumState> + '_ {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    fn record(&mut self, state: PendulumState) {
        if self.capacity == 0 {
            return;
        }
        while self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(state);
    }
}

/// One independent double pendulum.
#[derive(Debug, Clone)]
pub struct Pendulum {
    dynamics: DoublePendulum,
    state: PendulumState,
    phase: Phase,
    steps: u64,
    elapsed: f64,
    trail: Trail,
}

/// Creates a pendulum at rest at `(theta1, theta2)`.
pub fn new_pendulum(mass: f64, length: f64, theta1: f64, theta2: f64) -> Result<Pendulum> {
    Pendulum::new(PendulumParams::new(mass, length)?, theta1, theta2)
}

impl Pendulum {
    pub fn new(params: PendulumParams, theta1: f64, theta2: f64) -> Result<Self> {
        let dynamics = DoublePendulum::new(params)?;
        let state = PendulumState::try_at_rest(theta1, theta2)?;
        debug!(?params, theta1, theta2, "created pendulum");
        Ok(Self {
            dynamics,
            state,
            phase: Phase::IdleAtRest,
            steps: 0,
            elapsed: 0.0,
            trail: Trail::default(),
        })
    }

    /// Enables trail recording with room for `capacity` states.
    pub fn with_trail(mut self, capacity: usize) -> Self {
        self.trail = Trail::with_capacity(capacity);
        self
    }

    pub fn state(&self) -> PendulumState {
        self.state
    }

    pub fn params(&self) -> PendulumParams {
        self.dynamics.params()
    }

    pub fn dynamics(&self) -> &DoublePendulum {
        &self.dynamics
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Steps applied since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated seconds since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn energy(&self) -> f64 {
        self.dynamics.energy(&self.state)
    }

    /// Puts the pendulum back at rest at `(theta1, theta2)` and drops the
    /// trail.
    ///
    /// Non-finite angles are rejected and leave the pendulum untouched.
    pub fn reset(&mut self, theta1: f64, theta2: f64) -> Result<()> {
        let state = PendulumState::try_at_rest(theta1, theta2)?;
        self.restart(state);
        debug!(theta1, theta2, "reset pendulum");
        Ok(())
    }

    /// Like [`reset`](Self::reset), also switching to new parameters.
    ///
    /// On invalid parameters or angles nothing changes.
    pub fn reset_with_params(
        &mut self,
        theta1: f64,
        theta2: f64,
        params: PendulumParams,
    ) -> Result<()> {
        let dynamics = DoublePendulum::new(params)?;
        let state = PendulumState::try_at_rest(theta1, theta2)?;
        self.dynamics = dynamics;
        self.restart(state);
        debug!(?params, theta1, theta2, "reset pendulum with new parameters");
        Ok(())
    }

    /// Rebuilds the dynamics for new `(mass, length)`, keeping the current
    /// angles and momenta.
    pub fn update_params(&mut self, mass: f64, length: f64) -> Result<()> {
        self.dynamics = new_dynamics(mass, length)?;
        debug!(mass, length, "updated pendulum parameters");
        Ok(())
    }

    fn restart(&mut self, state: PendulumState) {
        self.state = state;
        self.phase = Phase::IdleAtRest;
        self.steps = 0;
        self.elapsed = 0.0;
        self.trail.clear();
    }

    /// Advances the state by one RK4 step of size `h`.
    ///
    /// A non-finite result is reported as [`PendulumError::NumericDivergence`]
    /// and the previous state is kept.
    pub fn step(&mut self, h: f64) -> Result<PendulumState> {
        if !(h.is_finite() && h > 0.0) {
            return Err(PendulumError::InvalidStep(h));
        }

        let dynamics = self.dynamics;
        let next = rk4_step(|y: &[f64]| dynamics.derivative(y), &self.state.to_array(), h);
        let next = PendulumState::from_slice(&next);
        if !next.is_finite() {
            return Err(PendulumError::divergence(self.steps + 1, &next));
        }

        self.state = next;
        self.phase = Phase::Integrating;
        self.steps += 1;
        self.elapsed += h;
        self.trail.record(next);
        Ok(next)
    }
}
