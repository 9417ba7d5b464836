//! Developer tooling: simulation inspector and frame timing.
//!
//! # Invariants
//! - Tools only read simulation state.

mod inspector;
mod timing;

pub use inspector::{SimulationInspector, SimulationSummary};
pub use timing::{FrameTimer, MAX_FRAME_DELTA};

pub fn crate_info() -> &'static str {
    concat!("labyrinth-tools v", env!("CARGO_PKG_VERSION"))
}
