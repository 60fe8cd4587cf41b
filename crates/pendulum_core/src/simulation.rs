//! Host-owned collection of independent pendulums sharing one step size.

use crate::config::SimulationConfig;
use crate::error::{PendulumError, Result};
use crate::pendulum::Pendulum;
use crate::state::{PendulumParams, PendulumState};
use tracing::{debug, warn};

/// Outcome of advancing every pendulum once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Pendulums that advanced.
    pub advanced: usize,
    /// Indices of pendulums whose step produced a non-finite state.
    pub diverged: Vec<usize>,
}

impl StepReport {
    pub fn all_advanced(&self) -> bool {
        self.diverged.is_empty()
    }
}

/// Simulation context driven once per frame by the host loop.
#[derive(Debug, Clone)]
pub struct Simulation {
    pendulums: Vec<Pendulum>,
    step_size: f64,
}

impl Simulation {
    pub fn new(step_size: f64) -> Result<Self> {
        check_step(step_size)?;
        Ok(Self {
            pendulums: Vec::new(),
            step_size,
        })
    }

    /// Builds `config.count` pendulums with starting angles fanned out by
    /// `config.spread`.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let params = config.params()?;
        let mut simulation = Self::new(config.step_size)?;
        for index in 0..config.count {
            let (theta1, theta2) = config.initial_angles(index);
            let pendulum =
                Pendulum::new(params, theta1, theta2)?.with_trail(config.trail_length);
            simulation.add(pendulum);
        }
        debug!(count = config.count, step_size = config.step_size, "built simulation");
        Ok(simulation)
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn set_step_size(&mut self, step_size: f64) -> Result<()> {
        check_step(step_size)?;
        self.step_size = step_size;
        Ok(())
    }

    /// Appends a pendulum, returning its index.
    pub fn add(&mut self, pendulum: Pendulum) -> usize {
        self.pendulums.push(pendulum);
        self.pendulums.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<Pendulum> {
        self.check_index(index)?;
        Ok(self.pendulums.remove(index))
    }

    pub fn clear(&mut self) {
        self.pendulums.clear();
    }

    pub fn len(&self) -> usize {
        self.pendulums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pendulums.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Pendulum> {
        let len = self.pendulums.len();
        self.pendulums
            .get(index)
            .ok_or(PendulumError::UnknownPendulum { index, len })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Pendulum> {
        let len = self.pendulums.len();
        self.pendulums
            .get_mut(index)
            .ok_or(PendulumError::UnknownPendulum { index, len })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pendulum> + '_ {
        self.pendulums.iter()
    }

    /// Advances every pendulum by one step, in insertion order.
    ///
    /// Diverged pendulums keep their last finite state and are listed in the
    /// report; the rest still advance.
    pub fn step_all(&mut self) -> StepReport {
        let mut report = StepReport::default();
        for (index, pendulum) in self.pendulums.iter_mut().enumerate() {
            match pendulum.step(self.step_size) {
                Ok(_) => report.advanced += 1,
                Err(err) => {
                    warn!(index, %err, "pendulum step failed");
                    report.diverged.push(index);
                }
            }
        }
        report
    }

    /// Resets every pendulum to rest at `(theta1, theta2)`.
    ///
    /// Angles are validated once up front, so either all pendulums reset or
    /// none do.
    pub fn reset_all(&mut self, theta1: f64, theta2: f64) -> Result<()> {
        PendulumState::try_at_rest(theta1, theta2)?;
        for pendulum in &mut self.pendulums {
            pendulum.reset(theta1, theta2)?;
        }
        Ok(())
    }

    /// Rebuilds every pendulum's dynamics, keeping their states.
    ///
    /// Parameters are validated once up front, so either all pendulums
    /// change or none do.
    pub fn update_params_all(&mut self, mass: f64, length: f64) -> Result<()> {
        PendulumParams::new(mass, length)?;
        for pendulum in &mut self.pendulums {
            pendulum.update_params(mass, length)?;
        }
        Ok(())
    }

    /// Current state of every pendulum, in order.
    pub fn states(&self) -> Vec<PendulumState> {
        self.pendulums.iter().map(Pendulum::state).collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.pendulums.len() {
            Ok(())
        } else {
            Err(PendulumError::UnknownPendulum {
                index,
                len: self.pendulums.len(),
            })
        }
    }
}

fn check_step(step_size: f64) -> Result<()> {
    if step_size.is_finite() && step_size > 0.0 {
        Ok(())
    } else {
        Err(PendulumError::InvalidStep(step_size))
    }
}
