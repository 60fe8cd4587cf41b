//! Browser bridge for `pendulum_core`. The host's animation callback calls
//! `step` once per frame and reads `positions` back for drawing.

mod analysis;
mod system;

pub use system::WasmSimulation;
