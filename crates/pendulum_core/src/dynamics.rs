//! Hamiltonian equations of motion for a double pendulum.
//!
//! Two identical rods of length `l` and mass `m` swing in a vertical plane
//! under uniform gravity with frictionless pivots. The state is the
//! canonical vector `(θ1, θ2, pθ1, pθ2)` with both angles taken from the
//! downward vertical.

use crate::error::Result;
use crate::state::{PendulumParams, PendulumState, STATE_DIM};
use crate::traits::{constant, DynamicalSystem, Scalar};

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.8;

/// Denominator shared by both angular velocity terms, `16 - 9 cos²(Δ)`.
///
/// Bounded below by 7 for every real `Δ`, so the equations never divide
/// by zero.
pub fn coupling_denominator<T: Scalar>(delta: T) -> T {
    let cos = delta.cos();
    constant::<T>(16.0) - constant::<T>(9.0) * cos * cos
}

/// Immutable vector field of one double pendulum.
///
/// Holds the constants precomputed from `(m, l)`; rebuilding is the only way
/// to change them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoublePendulum {
    params: PendulumParams,
    /// `m l²`
    d: f64,
    /// `6 / (m l²)`
    a: f64,
    /// `g / l`
    gl: f64,
}

/// Builds the dynamics for mass `mass` and rod length `length`.
pub fn new_dynamics(mass: f64, length: f64) -> Result<DoublePendulum> {
    DoublePendulum::new(PendulumParams::new(mass, length)?)
}

impl DoublePendulum {
    pub fn new(params: PendulumParams) -> Result<Self> {
        params.validate()?;
        let d = params.mass * params.length * params.length;
        Ok(Self {
            params,
            d,
            a: 6.0 / d,
            gl: GRAVITY / params.length,
        })
    }

    pub fn params(&self) -> PendulumParams {
        self.params
    }

    /// Writes `d/dt (θ1, θ2, pθ1, pθ2)` for state `x` into `out`.
    pub fn derivative_into<T: Scalar>(&self, x: &[T], out: &mut [T]) {
        assert_eq!(x.len(), STATE_DIM, "state must have {STATE_DIM} components");
        let (theta1, theta2, p1, p2) = (x[0], x[1], x[2], x[3]);
        let d = constant::<T>(self.d);
        let a = constant::<T>(self.a);
        let gl = constant::<T>(self.gl);
        let half = constant::<T>(0.5);

        let delta = theta1 - theta2;
        let b = constant::<T>(3.0) * delta.cos();
        let c = coupling_denominator(delta);

        let theta1_dot = a * (constant::<T>(2.0) * p1 - b * p2) / c;
        let theta2_dot = a * (constant::<T>(8.0) * p2 - b * p1) / c;
        let e = theta1_dot * theta2_dot * delta.sin();

        out[0] = theta1_dot;
        out[1] = theta2_dot;
        out[2] = -(d * half) * (e + constant::<T>(3.0) * gl * theta1.sin());
        out[3] = -(d * half) * (-e + gl * theta2.sin());
    }

    /// Returns the time derivative of `x`.
    pub fn derivative<T: Scalar>(&self, x: &[T]) -> Vec<T> {
        let mut out = vec![T::zero(); STATE_DIM];
        self.derivative_into(x, &mut out);
        out
    }

    /// Angular velocities `(θ1', θ2')` implied by the momenta.
    pub fn angular_velocities(&self, state: &PendulumState) -> (f64, f64) {
        let dx = self.derivative(&state.to_array());
        (dx[0], dx[1])
    }

    /// Total mechanical energy `T + V`, the Hamiltonian the equations follow.
    pub fn energy(&self, state: &PendulumState) -> f64 {
        let (w1, w2) = self.angular_velocities(state);
        let delta = state.theta1 - state.theta2;
        let kinetic = self.d / 6.0 * (4.0 * w1 * w1 + w2 * w2 + 3.0 * w1 * w2 * delta.cos());
        let potential =
            -0.5 * self.d * self.gl * (3.0 * state.theta1.cos() + state.theta2.cos());
        kinetic + potential
    }

    /// Positions of the joint and the free end relative to the pivot, with
    /// `y` pointing up.
    pub fn bob_positions(&self, state: &PendulumState) -> [(f64, f64); 2] {
        let l = self.params.length;
        let joint = (l * state.theta1.sin(), -l * state.theta1.cos());
        let tip = (
            joint.0 + l * state.theta2.sin(),
            joint.1 - l * state.theta2.cos(),
        );
        [joint, tip]
    }
}

impl<T: Scalar> DynamicalSystem<T> for DoublePendulum {
    fn dimension(&self) -> usize {
        STATE_DIM
    }

    fn apply(&self, x: &[T], out: &mut [T]) {
        self.derivative_into(x, out);
    }
}
