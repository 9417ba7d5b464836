use glam::Vec3;
use labyrinth_grid::Maze;
use labyrinth_input::MoveInput;

use crate::camera::Camera;

/// Result of resolving one frame of movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No movement keys held, or the held keys cancel out.
    Idle,
    Moved { from: Vec3, to: Vec3 },
    /// At least one collision probe around `attempted` hit a wall.
    Blocked { attempted: Vec3 },
}

/// Unit movement direction from held keys, relative to the camera.
///
/// Forward/back use the camera front vector and left/right its right vector.
/// With `planar`, the front vector is flattened onto the XZ plane so looking
/// up or down never changes the character's height. Returns zero when no keys
/// are held or they cancel.
pub fn movement_direction(input: &MoveInput, camera: &Camera, planar: bool) -> Vec3 {
    let front = if planar {
        Vec3::new(camera.front().x, 0.0, camera.front().z).normalize_or_zero()
    } else {
        camera.front()
    };
    let right = camera.right();

    let mut dir = Vec3::ZERO;
    if input.forward {
        dir += front;
    }
    if input.back {
        dir -= front;
    }
    if input.left {
        dir -= right;
    }
    if input.right {
        dir += right;
    }
    dir.normalize_or_zero()
}

/// The four collision probes around `center`: +-X and +-Z at `radius`.
///
/// A cross rather than a circle; corners between probes are not tested.
pub fn probe_points(center: Vec3, radius: f32) -> [Vec3; 4] {
    [
        center + Vec3::new(radius, 0.0, 0.0),
        center - Vec3::new(radius, 0.0, 0.0),
        center + Vec3::new(0.0, 0.0, radius),
        center - Vec3::new(0.0, 0.0, radius),
    ]
}

/// True when any probe around `center` is blocked.
pub fn collides(maze: &Maze, center: Vec3, radius: f32) -> bool {
    probe_points(center, radius)
        .into_iter()
        .any(|p| maze.is_wall(p))
}

/// Try to move `position` by `direction * distance`.
///
/// The whole move is rejected if the destination collides; there is no
/// sliding along walls.
pub fn resolve_move(
    maze: &Maze,
    position: Vec3,
    direction: Vec3,
    distance: f32,
    radius: f32,
) -> MoveOutcome {
    if direction == Vec3::ZERO || distance <= 0.0 {
        return MoveOutcome::Idle;
    }
    let next = position + direction * distance;
    if collides(maze, next, radius) {
        MoveOutcome::Blocked { attempted: next }
    } else {
        MoveOutcome::Moved {
            from: position,
            to: next,
        }
    }
}
