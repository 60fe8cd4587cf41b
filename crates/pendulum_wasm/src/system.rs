//! WASM wrapper around the simulation context and its per-frame API.

use pendulum_core::{Pendulum, PendulumError, PendulumParams, Simulation, SimulationConfig};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSimulation {
    pub(crate) simulation: Simulation,
    trail_length: usize,
}

pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn index(value: u32) -> usize {
    value as usize
}

impl WasmSimulation {
    pub(crate) fn with_config(config: &SimulationConfig) -> Result<Self, PendulumError> {
        Ok(Self {
            simulation: Simulation::from_config(config)?,
            trail_length: config.trail_length,
        })
    }

    pub(crate) fn pendulum(&self, idx: u32) -> Result<&Pendulum, JsValue> {
        self.simulation.get(index(idx)).map_err(to_js_error)
    }
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Builds a simulation from a config object; `undefined` or `null`
    /// selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmSimulation, JsValue> {
        console_error_panic_hook::set_once();

        let config: SimulationConfig = if config.is_undefined() || config.is_null() {
            SimulationConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| JsValue::from_str(&format!("Invalid simulation config: {err}")))?
        };
        Self::with_config(&config).map_err(to_js_error)
    }

    pub fn len(&self) -> usize {
        self.simulation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulation.is_empty()
    }

    pub fn step_size(&self) -> f64 {
        self.simulation.step_size()
    }

    pub fn set_step_size(&mut self, step_size: f64) -> Result<(), JsValue> {
        self.simulation.set_step_size(step_size).map_err(to_js_error)
    }

    pub fn add_pendulum(
        &mut self,
        mass: f64,
        length: f64,
        theta1: f64,
        theta2: f64,
    ) -> Result<u32, JsValue> {
        let idx = u32::try_from(self.simulation.len())
            .map_err(|_| JsValue::from_str("Simulation is full"))?;
        let params = PendulumParams::new(mass, length).map_err(to_js_error)?;
        let pendulum = Pendulum::new(params, theta1, theta2)
            .map_err(to_js_error)?
            .with_trail(self.trail_length);
        self.simulation.add(pendulum);
        Ok(idx)
    }

    pub fn remove_pendulum(&mut self, idx: u32) -> Result<(), JsValue> {
        self.simulation
            .remove(index(idx))
            .map(|_| ())
            .map_err(to_js_error)
    }

    /// Advances every pendulum once. Returns the indices that diverged.
    pub fn step(&mut self) -> Vec<u32> {
        self.simulation
            .step_all()
            .diverged
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }

    pub fn reset(&mut self, idx: u32, theta1: f64, theta2: f64) -> Result<(), JsValue> {
        let pendulum = self.simulation.get_mut(index(idx)).map_err(to_js_error)?;
        pendulum.reset(theta1, theta2).map_err(to_js_error)
    }

    pub fn reset_all(&mut self, theta1: f64, theta2: f64) -> Result<(), JsValue> {
        self.simulation
            .reset_all(theta1, theta2)
            .map_err(to_js_error)
    }

    pub fn update_params(&mut self, idx: u32, mass: f64, length: f64) -> Result<(), JsValue> {
        let pendulum = self.simulation.get_mut(index(idx)).map_err(to_js_error)?;
        pendulum.update_params(mass, length).map_err(to_js_error)
    }

    pub fn update_params_all(&mut self, mass: f64, length: f64) -> Result<(), JsValue> {
        self.simulation
            .update_params_all(mass, length)
            .map_err(to_js_error)
    }

    /// `[θ1, θ2, pθ1, pθ2]` per pendulum, flattened.
    pub fn states(&self) -> Vec<f64> {
        self.simulation
            .iter()
            .flat_map(|p| p.state().to_array())
            .collect()
    }

    /// `[x1, y1, x2, y2]` per pendulum, flattened, relative to the pivot.
    pub fn positions(&self) -> Vec<f64> {
        self.simulation
            .iter()
            .flat_map(|p| {
                let [joint, tip] = p.dynamics().bob_positions(&p.state());
                [joint.0, joint.1, tip.0, tip.1]
            })
            .collect()
    }

    pub fn energies(&self) -> Vec<f64> {
        self.simulation.iter().map(Pendulum::energy).collect()
    }

    /// Free-end positions `[x, y]` of the recorded trail, oldest first.
    pub fn trail(&self, idx: u32) -> Result<Vec<f64>, JsValue> {
        let pendulum = self.pendulum(idx)?;
        Ok(pendulum
            .trail()
            .iter()
            .flat_map(|state| {
                let [_, tip] = pendulum.dynamics().bob_positions(state);
                [tip.0, tip.1]
            })
            .collect())
    }
}
