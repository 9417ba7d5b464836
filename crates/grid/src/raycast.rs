use glam::Vec3;
use labyrinth_common::FollowConfig;

use crate::maze::Maze;

/// Upper bound on samples per ray; smaller steps are widened to fit.
pub const MAX_RAY_SAMPLES: u32 = 1 << 16;

/// Sampling parameters for [`cast_ray`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayParams {
    /// Distance between consecutive samples.
    pub step: f32,
    /// How far the result is pulled back from the first blocked sample.
    pub backoff: f32,
    /// Segments shorter than this are returned as-is without sampling.
    pub epsilon: f32,
}

impl Default for RayParams {
    fn default() -> Self {
        Self {
            step: 0.1,
            backoff: 0.2,
            epsilon: 1e-3,
        }
    }
}

impl From<&FollowConfig> for RayParams {
    fn from(cfg: &FollowConfig) -> Self {
        Self {
            step: cfg.ray_step,
            backoff: cfg.ray_backoff,
            epsilon: cfg.ray_epsilon,
        }
    }
}

/// Distance that can be travelled from `start` toward `end` before reaching a wall.
///
/// Samples the segment every `params.step` units, starting at `start` itself.
/// At the first blocked sample (distance `d`) returns `max(d - backoff, 0)`;
/// if no sample is blocked, returns the full segment length.
///
/// This is a fixed-step approximation, not an exact grid traversal: a wall
/// thinner than `step` along the ray can be skipped between two samples.
/// At most [`MAX_RAY_SAMPLES`] samples are taken.
pub fn cast_ray(maze: &Maze, start: Vec3, end: Vec3, params: RayParams) -> f32 {
    let delta = end - start;
    let total = delta.length();
    if total < params.epsilon {
        return total;
    }

    let dir = delta / total;
    // Sample i sits at i * step. Deriving it from the index avoids drift and
    // keeps the loop finite when step is tiny next to the distance travelled.
    let step = params.step.max(total / MAX_RAY_SAMPLES as f32);
    let samples = (total / step).ceil() as u32;
    for i in 0..samples {
        let dist = i as f32 * step;
        if dist >= total {
            break;
        }
        if maze.is_wall(start + dir * dist) {
            let clear = (dist - params.backoff).max(0.0);
            tracing::trace!(hit = dist, clear, total, "ray blocked");
            return clear;
        }
    }
    total
}
