//! Input: movement key state, mouse look and discrete game actions.
//!
//! # Invariants
//! - No windowing types here; backends translate their events into these.
//! - Mouse look y offsets are positive when looking up.

mod action;

pub use action::{Action, Direction, MouseLook, MoveInput};

pub fn crate_info() -> &'static str {
    concat!("labyrinth-input v", env!("CARGO_PKG_VERSION"))
}
