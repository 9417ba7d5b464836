//! wgpu render backend for the maze.
//!
//! Draws floor lines along the cell boundaries, one instanced block per wall
//! cell, the character and a marker on the exit cell. Lighting is a single
//! point light that follows the character.
//!
//! The renderer only reads [`labyrinth_kernel::SimulationState`]; frame rate
//! and simulation ticks are independent.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
