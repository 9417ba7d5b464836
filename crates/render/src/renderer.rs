use glam::Vec3;
use labyrinth_common::CellCoord;
use labyrinth_kernel::{Camera, GameStatus, SimulationState};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl RenderView {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            eye: camera.position,
            target: camera.position + camera.front(),
            fov_degrees: camera.zoom(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads simulation state and a view, then produces output.
/// It never mutates the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given state and view.
    fn render(&self, state: &SimulationState, view: &RenderView) -> Self::Output;
}

/// Top-down text map of the maze.
///
/// `#` wall, `.` open, `E` win cell, `@` character, `c` camera.
/// Row 0 is printed first.
#[derive(Debug, Default)]
pub struct AsciiMapRenderer {
    /// Omit the header lines and print only the map.
    pub map_only: bool,
}

impl AsciiMapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn glyph(
        state: &SimulationState,
        cell: CellCoord,
        character: CellCoord,
        camera: CellCoord,
    ) -> char {
        if cell == character {
            '@'
        } else if cell == camera {
            'c'
        } else if cell == state.config().maze.win_cell {
            'E'
        } else if state.maze().grid().occupancy(cell).is_blocked() {
            '#'
        } else {
            '.'
        }
    }
}

impl Renderer for AsciiMapRenderer {
    type Output = String;

    fn render(&self, state: &SimulationState, view: &RenderView) -> String {
        let maze = state.maze();
        let grid = maze.grid();
        let character = maze.cell_of(state.character());
        let camera = maze.cell_of(view.eye);

        let mut out = String::new();
        if !self.map_only {
            let status = match state.status() {
                GameStatus::Playing => "playing",
                GameStatus::Won => "won",
                GameStatus::Terminated => "terminated",
            };
            let p = state.character();
            out.push_str(&format!(
                "=== Maze {}x{} (tick={}, status={status}) ===\n",
                grid.rows(),
                grid.cols(),
                state.tick()
            ));
            out.push_str(&format!(
                "Character: pos=({:.2}, {:.2}, {:.2}) cell={character}\n",
                p.x, p.y, p.z
            ));
            out.push_str(&format!(
                "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}\n",
                view.eye.x,
                view.eye.y,
                view.eye.z,
                view.target.x,
                view.target.y,
                view.target.z,
                view.fov_degrees
            ));
        }

        tracing::trace!(tick = state.tick(), %character, %camera, "ascii map");
        for row in 0..grid.rows() as i32 {
            for col in 0..grid.cols() as i32 {
                out.push(Self::glyph(state, CellCoord::new(col, row), character, camera));
            }
            out.push('\n');
        }
        out
    }
}
