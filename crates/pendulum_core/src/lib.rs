//! The `pendulum_core` crate simulates independent double pendulums for
//! visual chaos demos. Rendering is left to the host; this crate owns the
//! numbers.
//!
//! Key components:
//! - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (vector fields), `Steppable` (solvers).
//! - **Vector**: slice `scale`/`add` helpers that keep the integrator generic over length.
//! - **Dynamics**: the Hamiltonian double-pendulum vector field, energy, and bob kinematics.
//! - **Solvers**: the pure `rk4_step` and a buffered in-place `RK4` stepper.
//! - **Pendulum / Simulation**: per-instance lifecycle and the host-owned collection stepped each frame.
//! - **Analysis**: Lyapunov estimate, equilibrium eigenvalues, and energy drift.

pub mod analysis;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod pendulum;
pub mod simulation;
pub mod solvers;
pub mod state;
pub mod traits;
pub mod vector;

pub use config::{SimulationConfig, MAX_PENDULUMS};
pub use dynamics::{new_dynamics, DoublePendulum, GRAVITY};
pub use error::{PendulumError, Result};
pub use pendulum::{new_pendulum, Pendulum, Phase, Trail};
pub use simulation::{Simulation, StepReport};
pub use solvers::{rk4_step, DEFAULT_STEP_SIZE};
pub use state::{PendulumParams, PendulumState, STATE_DIM};
