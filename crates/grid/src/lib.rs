//! Maze grid: occupancy table, world-to-cell mapping, line-of-sight raycasting.
//!
//! # Invariants
//! - The grid is immutable after construction; every row has the same length.
//! - Positions outside the grid are blocked.
//! - Cell size is strictly positive.

mod maze;
mod raycast;

pub use maze::{GridError, GridMapping, Maze, MazeGrid, Occupancy};
pub use raycast::{MAX_RAY_SAMPLES, RayParams, cast_ray};

pub fn crate_info() -> &'static str {
    concat!("labyrinth-grid v", env!("CARGO_PKG_VERSION"))
}
