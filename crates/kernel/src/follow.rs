use glam::Vec3;
use labyrinth_common::{ClampOrigin, FollowConfig};
use labyrinth_grid::{Maze, RayParams, cast_ray};

/// Where the chase camera ends up for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowResult {
    pub position: Vec3,
    /// Unobstructed distance from the anchor toward the desired position.
    pub clear_distance: f32,
    /// Distance from the clamp origin to the desired position.
    pub desired_distance: f32,
}

impl FollowResult {
    pub fn clamped(&self) -> bool {
        self.clear_distance < self.desired_distance
    }
}

/// Point the chase camera orbits: the character raised by the vertical offset.
pub fn anchor(character: Vec3, cfg: &FollowConfig) -> Vec3 {
    character + Vec3::Y * cfg.vertical_offset
}

/// Desired camera position: `follow_distance` behind the character along the
/// camera front vector, raised by the vertical offset.
pub fn desired_position(character: Vec3, front: Vec3, cfg: &FollowConfig) -> Vec3 {
    anchor(character, cfg) - front * cfg.follow_distance
}

/// Place the camera behind the character, pulled in front of any wall on the
/// line of sight from the anchor. No smoothing; the camera snaps each frame.
///
/// With [`ClampOrigin::Character`] the pulled-in position is measured from the
/// character instead of the anchor.
pub fn follow(maze: &Maze, character: Vec3, front: Vec3, cfg: &FollowConfig) -> FollowResult {
    let ray_from = anchor(character, cfg);
    let desired = desired_position(character, front, cfg);
    let clear_distance = cast_ray(maze, ray_from, desired, RayParams::from(cfg));

    let from = match cfg.clamp_origin {
        ClampOrigin::Anchor => ray_from,
        ClampOrigin::Character => character,
    };
    let desired_distance = (desired - from).length();
    let position = if clear_distance < desired_distance {
        from + (desired - from).normalize_or_zero() * clear_distance
    } else {
        desired
    };
    FollowResult {
        position,
        clear_distance,
        desired_distance,
    }
}
