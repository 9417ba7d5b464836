//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers cannot mutate simulation state.
//! - Render state derives from the simulation state and its camera.
//!
//! A text renderer draws a top-down map for the CLI and logs; the wgpu
//! backend lives in its own crate behind the same view type.

mod renderer;

pub use renderer::{AsciiMapRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    concat!("labyrinth-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
