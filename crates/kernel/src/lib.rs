//! Simulation kernel: character movement, chase camera and the win/restart state machine.
//!
//! # Invariants
//! - All state mutations flow through `SimulationState::step`, `apply` and `restart`.
//! - A committed character position never has a collision probe inside a wall.
//! - While won or terminated, per-frame movement and camera updates are skipped.
//! - Rendering reads state and never mutates it.

pub mod camera;
pub mod follow;
pub mod movement;
pub mod simulation;

pub use camera::Camera;
pub use follow::FollowResult;
pub use movement::MoveOutcome;
pub use simulation::{EVENT_LOG_CAPACITY, GameStatus, KernelError, SimEvent, SimulationState};

pub fn crate_info() -> &'static str {
    concat!("labyrinth-kernel v", env!("CARGO_PKG_VERSION"))
}
