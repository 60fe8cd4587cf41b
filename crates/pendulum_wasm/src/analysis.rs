//! Analysis runners exposed to the host.

use crate::system::{to_js_error, WasmSimulation};
use pendulum_core::analysis::{
    energy_drift, equilibrium_eigenvalues, largest_lyapunov_exponent, LyapunovSettings,
};
use pendulum_core::{new_dynamics, PendulumState};
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

impl WasmSimulation {
    pub(crate) fn lyapunov_settings(&self, steps: u32, renormalize_every: u32) -> LyapunovSettings {
        LyapunovSettings {
            steps: steps as usize,
            step_size: self.simulation.step_size(),
            renormalize_every: renormalize_every as usize,
            ..LyapunovSettings::default()
        }
    }
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Largest Lyapunov exponent (1/s) starting from the pendulum's current
    /// state, using the simulation step size.
    pub fn lyapunov_exponent(
        &self,
        idx: u32,
        steps: u32,
        renormalize_every: u32,
    ) -> Result<f64, JsValue> {
        let pendulum = self.pendulum(idx)?;
        let settings = self.lyapunov_settings(steps, renormalize_every);
        largest_lyapunov_exponent(pendulum.params(), pendulum.state(), settings)
            .map_err(|e| JsValue::from_str(&format!("Lyapunov computation failed: {e:#}")))
    }

    /// Energy drift of `steps` further steps from the pendulum's current
    /// state. The pendulum itself is not advanced.
    pub fn energy_drift(&self, idx: u32, steps: u32) -> Result<JsValue, JsValue> {
        let pendulum = self.pendulum(idx)?;
        let report = energy_drift(
            pendulum.params(),
            pendulum.state(),
            self.simulation.step_size(),
            steps as usize,
        )
        .map_err(|e| JsValue::from_str(&format!("Energy drift failed: {e:#}")))?;
        to_value(&report).map_err(to_js_error)
    }

    /// Eigenvalues `{re, im}` of the linearization at a resting pose.
    pub fn equilibrium_eigenvalues(
        mass: f64,
        length: f64,
        theta1: f64,
        theta2: f64,
    ) -> Result<JsValue, JsValue> {
        let dynamics = new_dynamics(mass, length).map_err(to_js_error)?;
        let eigenvalues =
            equilibrium_eigenvalues(&dynamics, &PendulumState::at_rest(theta1, theta2))
                .map_err(|e| JsValue::from_str(&format!("Eigenvalue computation failed: {e:#}")))?;
        to_value(&eigenvalues).map_err(to_js_error)
    }
}
