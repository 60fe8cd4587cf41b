use crate::{
    dynamics::DoublePendulum,
    solvers::{RK4, DEFAULT_STEP_SIZE},
    state::{PendulumParams, PendulumState, STATE_DIM},
    traits::Steppable,
    vector::is_finite,
};
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::{Complex, DMatrix};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LyapunovSettings {
    pub steps: usize,
    pub step_size: f64,
    pub renormalize_every: usize,
    pub separation: f64,
}

impl Default for LyapunovSettings {
    fn default() -> Self {
        Self {
            steps: 20_000,
            step_size: DEFAULT_STEP_SIZE,
            renormalize_every: 10,
            separation: 1e-8,
        }
    }
}

/// Estimates the largest Lyapunov exponent (1/s) by following a reference
/// trajectory and a neighbour offset by `separation` in θ1, pulling the
/// neighbour back to that distance every `renormalize_every` steps.
pub fn largest_lyapunov_exponent(
    params: PendulumParams,
    initial: PendulumState,
    settings: LyapunovSettings,
) -> Result<f64> {
    if settings.steps == 0 {
        bail!("Lyapunov estimate requires at least one integration step.");
    }
    if !(settings.step_size.is_finite() && settings.step_size > 0.0) {
        bail!("Step size must be positive.");
    }
    if settings.renormalize_every == 0 {
        bail!("renormalize_every must be at least 1.");
    }
    if !(settings.separation.is_finite() && settings.separation > 0.0) {
        bail!("Initial separation must be positive.");
    }
    if !initial.is_finite() {
        bail!("Initial state must be finite.");
    }

    let dynamics = DoublePendulum::new(params).context("Invalid pendulum parameters.")?;
    let mut reference = initial.to_array();
    let mut neighbour = reference;
    neighbour[0] += settings.separation;

    let mut reference_stepper = RK4::<f64>::new(STATE_DIM);
    let mut neighbour_stepper = RK4::<f64>::new(STATE_DIM);
    let mut log_growth = 0.0;
    let mut since_last = 0usize;

    for step in 1..=settings.steps {
        reference_stepper.step(&dynamics, &mut reference, settings.step_size);
        neighbour_stepper.step(&dynamics, &mut neighbour, settings.step_size);
        since_last += 1;

        if since_last == settings.renormalize_every || step == settings.steps {
            since_last = 0;
            if !is_finite(&reference) || !is_finite(&neighbour) {
                bail!("Trajectory diverged after {} steps.", step);
            }
            let distance = separation(&reference, &neighbour);
            if distance <= f64::EPSILON * settings.separation {
                return Err(anyhow!(
                    "Trajectories collapsed onto each other after {} steps.",
                    step
                ));
            }
            log_growth += (distance / settings.separation).ln();
            let shrink = settings.separation / distance;
            for i in 0..STATE_DIM {
                neighbour[i] = reference[i] + (neighbour[i] - reference[i]) * shrink;
            }
        }
    }

    let total_time = settings.steps as f64 * settings.step_size;
    let exponent = log_growth / total_time;
    info!(exponent, total_time, "estimated largest Lyapunov exponent");
    Ok(exponent)
}

fn separation(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Row-major 4×4 Jacobian of the vector field at `state`, by central
/// differences.
pub fn jacobian(dynamics: &DoublePendulum, state: &PendulumState) -> Vec<f64> {
    let x = state.to_array();
    let mut jac = vec![0.0; STATE_DIM * STATE_DIM];
    for j in 0..STATE_DIM {
        let h = 1e-6 * x[j].abs().max(1.0);
        let mut plus = x;
        let mut minus = x;
        plus[j] += h;
        minus[j] -= h;
        let fp = dynamics.derivative(&plus);
        let fm = dynamics.derivative(&minus);
        for i in 0..STATE_DIM {
            jac[i * STATE_DIM + j] = (fp[i] - fm[i]) / (2.0 * h);
        }
    }
    jac
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eigenvalue {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for Eigenvalue {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

/// Eigenvalues of the linearized dynamics at an equilibrium.
///
/// Fails when `state` is not an equilibrium within `1e-9`.
pub fn equilibrium_eigenvalues(
    dynamics: &DoublePendulum,
    state: &PendulumState,
) -> Result<Vec<Eigenvalue>> {
    let residual = dynamics.derivative(&state.to_array());
    let norm = residual.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !norm.is_finite() || norm > 1e-9 {
        bail!("State is not an equilibrium (‖f(x)‖ = {}).", norm);
    }
    let matrix = DMatrix::from_row_slice(STATE_DIM, STATE_DIM, &jacobian(dynamics, state));
    Ok(matrix
        .complex_eigenvalues()
        .iter()
        .map(|&lambda| Eigenvalue::from(lambda))
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyDriftReport {
    pub steps: usize,
    pub initial_energy: f64,
    pub final_energy: f64,
    /// Largest `|E(t) - E(0)| / |E(0)|` seen during the run.
    pub max_relative_drift: f64,
}

/// Integrates `steps` fixed RK4 steps and records how far the energy wanders.
pub fn energy_drift(
    params: PendulumParams,
    initial: PendulumState,
    step_size: f64,
    steps: usize,
) -> Result<EnergyDriftReport> {
    if !(step_size.is_finite() && step_size > 0.0) {
        bail!("Step size must be positive.");
    }
    let dynamics = DoublePendulum::new(params).context("Invalid pendulum parameters.")?;
    let initial_energy = dynamics.energy(&initial);
    if initial_energy.abs() <= f64::EPSILON {
        bail!("Relative drift is undefined for zero initial energy.");
    }

    let mut state = initial.to_array();
    let mut stepper = RK4::<f64>::new(STATE_DIM);
    let mut max_relative_drift = 0.0_f64;
    let mut energy = initial_energy;
    for step in 1..=steps {
        stepper.step(&dynamics, &mut state, step_size);
        if !is_finite(&state) {
            bail!("Trajectory diverged after {} steps.", step);
        }
        energy = dynamics.energy(&PendulumState::from_array(state));
        let drift = ((energy - initial_energy) / initial_energy).abs();
        max_relative_drift = max_relative_drift.max(drift);
    }

    Ok(EnergyDriftReport {
        steps,
        initial_energy,
        final_energy: energy,
        max_relative_drift,
    })
}

#[cfg(test)]
mod tests {
    use super::{
        energy_drift, equilibrium_eigenvalues, jacobian, largest_lyapunov_exponent,
        LyapunovSettings,
    };
    use crate::dynamics::new_dynamics;
    use crate::solvers::DEFAULT_STEP_SIZE;
    use crate::state::{PendulumParams, PendulumState};
    use std::f64::consts::PI;

    fn params() -> PendulumParams {
        PendulumParams::new(0.1, 0.2).expect("params")
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn lyapunov_rejects_invalid_inputs() {
        let start = PendulumState::at_rest(1.0, 1.0);
        let base = LyapunovSettings::default();
        assert_err_contains(
            largest_lyapunov_exponent(params(), start, LyapunovSettings { steps: 0, ..base }),
            "at least one integration step",
        );
        assert_err_contains(
            largest_lyapunov_exponent(
                params(),
                start,
                LyapunovSettings {
                    step_size: 0.0,
                    ..base
                },
            ),
            "Step size must be positive",
        );
        assert_err_contains(
            largest_lyapunov_exponent(
                params(),
                start,
                LyapunovSettings {
                    renormalize_every: 0,
                    ..base
                },
            ),
            "renormalize_every",
        );
        assert_err_contains(
            largest_lyapunov_exponent(
                params(),
                start,
                LyapunovSettings {
                    separation: -1.0,
                    ..base
                },
            ),
            "separation",
        );
        assert_err_contains(
            largest_lyapunov_exponent(
                PendulumParams {
                    mass: 0.0,
                    length: 0.2,
                },
                start,
                base,
            ),
            "Invalid mass",
        );
    }

    #[test]
    fn lyapunov_positive_for_high_energy_start() {
        let exponent = largest_lyapunov_exponent(
            params(),
            PendulumState::at_rest(0.7 * PI, 0.7 * PI),
            LyapunovSettings::default(),
        )
        .expect("lyapunov exponent should compute");
        assert!(exponent > 1.0, "expected chaos, got {exponent}");
    }

    #[test]
    fn lyapunov_near_zero_for_small_oscillations() {
        let exponent = largest_lyapunov_exponent(
            params(),
            PendulumState::at_rest(0.05, 0.05),
            LyapunovSettings::default(),
        )
        .expect("lyapunov exponent should compute");
        assert!(exponent.abs() < 0.3, "expected regular motion, got {exponent}");
    }

    #[test]
    fn jacobian_at_rest_has_block_structure() {
        let dynamics = new_dynamics(0.1, 0.2).expect("dynamics");
        let jac = jacobian(&dynamics, &PendulumState::at_rest(0.0, 0.0));
        // Angle rates depend only on momenta, momentum rates only on angles.
        for i in 0..2 {
            for j in 0..2 {
                assert!(jac[i * 4 + j].abs() < 1e-9);
                assert!(jac[(i + 2) * 4 + (j + 2)].abs() < 1e-9);
            }
        }
        // ∂ṗθ1/∂θ1 = -(3/2) m g l at the bottom.
        let expected = -1.5 * 0.1 * 9.8 * 0.2;
        assert!((jac[2 * 4] - expected).abs() < 1e-6);
    }

    #[test]
    fn hanging_equilibrium_is_a_center() {
        let dynamics = new_dynamics(0.1, 0.2).expect("dynamics");
        let eigenvalues = equilibrium_eigenvalues(&dynamics, &PendulumState::at_rest(0.0, 0.0))
            .expect("eigenvalues");
        assert_eq!(eigenvalues.len(), 4);
        for lambda in &eigenvalues {
            assert!(lambda.re.abs() < 1e-6, "unexpected growth {lambda:?}");
            assert!(lambda.im.abs() > 1.0);
        }
    }

    #[test]
    fn inverted_equilibrium_is_unstable() {
        let dynamics = new_dynamics(0.1, 0.2).expect("dynamics");
        let eigenvalues = equilibrium_eigenvalues(&dynamics, &PendulumState::at_rest(PI, PI))
            .expect("eigenvalues");
        let max_re = eigenvalues
            .iter()
            .map(|lambda| lambda.re)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(max_re > 1.0, "expected an unstable direction, got {max_re}");
    }

    #[test]
    fn eigenvalues_require_an_equilibrium() {
        let dynamics = new_dynamics(0.1, 0.2).expect("dynamics");
        assert_err_contains(
            equilibrium_eigenvalues(&dynamics, &PendulumState::at_rest(1.0, 0.0)),
            "not an equilibrium",
        );
    }

    #[test]
    fn energy_drift_is_small_for_default_step() {
        let report = energy_drift(
            params(),
            PendulumState::at_rest(0.7 * PI, 0.7 * PI),
            DEFAULT_STEP_SIZE,
            2000,
        )
        .expect("drift report");
        assert_eq!(report.steps, 2000);
        assert!(report.max_relative_drift < 1e-2);
        let final_drift =
            ((report.final_energy - report.initial_energy) / report.initial_energy).abs();
        assert!(final_drift <= report.max_relative_drift);
    }

    #[test]
    fn energy_drift_rejects_bad_step() {
        assert_err_contains(
            energy_drift(params(), PendulumState::at_rest(1.0, 1.0), -1.0, 10),
            "Step size must be positive",
        );
    }
}
