use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::CellCoord;

/// Errors from loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedExtension(String),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        value: f32,
        min: f32,
    },
    #[error("win cell {cell} lies outside the {rows}x{cols} maze")]
    InvalidWinCell { cell: CellCoord, rows: usize, cols: usize },
}

/// Which world-to-cell mapping the win check uses.
///
/// `GridOffset` is the mapping used by every occupancy query. `ExtentCentered`
/// buckets positions relative to the grid extent centered on the world origin,
/// with truncation instead of floor; it reproduces the sample demo's win check
/// exactly, which disagrees with the occupancy mapping by `offset_z` drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinMapping {
    #[default]
    GridOffset,
    ExtentCentered,
}

/// Where the chase camera is pulled in from when its line of sight is blocked.
///
/// The line-of-sight ray is always cast from the anchor (character raised by
/// the vertical offset). `Anchor` clamps along that same ray, so an unblocked
/// ray leaves the camera at its desired position. `Character` clamps along the
/// direction from the character itself and compares against the distance from
/// the character; since that distance includes the vertical offset, the camera
/// is pulled in on every frame, as in the sample demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampOrigin {
    #[default]
    Anchor,
    Character,
}

/// Maze layout and its placement in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Row-major occupancy, `0` open and `1` wall. Row index grows along +Z.
    pub rows: Vec<Vec<u8>>,
    pub offset_x: f32,
    pub offset_z: f32,
    pub cell_size: f32,
    pub win_cell: CellCoord,
    pub win_mapping: WinMapping,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            rows: sample_rows(),
            offset_x: -19.55,
            offset_z: -18.95,
            cell_size: 2.3,
            win_cell: CellCoord::new(8, 0),
            win_mapping: WinMapping::GridOffset,
        }
    }
}

/// Character movement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Units per second.
    pub base_speed: f32,
    /// Distance of the four collision probes from the character center.
    pub probe_radius: f32,
    /// Project camera vectors onto the XZ plane before moving.
    pub planar: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            base_speed: 2.5,
            probe_radius: 0.3,
            planar: true,
        }
    }
}

/// Chase camera, line-of-sight ray and mouse look tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowConfig {
    pub follow_distance: f32,
    pub vertical_offset: f32,
    /// Camera offset from the spawn point applied on restart.
    pub respawn_offset: [f32; 3],
    pub ray_step: f32,
    pub ray_backoff: f32,
    pub ray_epsilon: f32,
    pub clamp_origin: ClampOrigin,
    /// Degrees of yaw/pitch per pixel of mouse travel.
    pub sensitivity: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub initial_yaw_deg: f32,
    pub initial_pitch_deg: f32,
    pub initial_zoom: f32,
}

impl Default for FollowConfig {
    fn default() -> Self {
        Self {
            follow_distance: 2.25,
            vertical_offset: 0.45,
            respawn_offset: [0.0, 0.5, 2.25],
            ray_step: 0.1,
            ray_backoff: 0.2,
            ray_epsilon: 1e-3,
            clamp_origin: ClampOrigin::Anchor,
            sensitivity: 0.1,
            zoom_min: 1.0,
            zoom_max: 45.0,
            initial_yaw_deg: -90.0,
            initial_pitch_deg: 0.0,
            initial_zoom: 45.0,
        }
    }
}

/// Every tunable constant of the game, grouped by concern.
///
/// `GameConfig::default()` is the hand-authored sample level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub maze: MazeConfig,
    pub movement: MovementConfig,
    pub camera: FollowConfig,
    pub spawn: [f32; 3],
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            maze: MazeConfig::default(),
            movement: MovementConfig::default(),
            camera: FollowConfig::default(),
            spawn: [0.0, 1.5, 19.5],
        }
    }
}

impl GameConfig {
    /// Load a config from a `.yaml`/`.yml` or `.json` file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            _ => return Err(ConfigError::UnsupportedExtension(ext)),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    /// Check scalar parameters and the win cell.
    ///
    /// Grid shape (equal row lengths, cell values) is checked when the grid
    /// is built from `maze.rows`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("maze.cell_size", self.maze.cell_size),
            ("movement.base_speed", self.movement.base_speed),
            ("movement.probe_radius", self.movement.probe_radius),
            ("camera.follow_distance", self.camera.follow_distance),
            ("camera.ray_step", self.camera.ray_step),
            ("camera.ray_epsilon", self.camera.ray_epsilon),
            ("camera.zoom_min", self.camera.zoom_min),
        ];
        for (field, value) in positives {
            // Written so NaN fails too.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        // A step below the epsilon would need millions of samples per ray, or
        // stop advancing the sample distance altogether.
        if !(self.camera.ray_step >= self.camera.ray_epsilon) {
            return Err(ConfigError::TooSmall {
                field: "camera.ray_step",
                value: self.camera.ray_step,
                min: self.camera.ray_epsilon,
            });
        }
        if !(self.camera.ray_backoff >= 0.0) {
            return Err(ConfigError::Negative {
                field: "camera.ray_backoff",
                value: self.camera.ray_backoff,
            });
        }
        if !(self.camera.zoom_max >= self.camera.zoom_min) {
            return Err(ConfigError::NonPositive {
                field: "camera.zoom_max - camera.zoom_min",
                value: self.camera.zoom_max - self.camera.zoom_min,
            });
        }

        let rows = self.maze.rows.len();
        let cols = self.maze.rows.first().map_or(0, Vec::len);
        let cell = self.maze.win_cell;
        let inside = cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < rows
            && (cell.col as usize) < cols;
        if !inside {
            return Err(ConfigError::InvalidWinCell { cell, rows, cols });
        }
        Ok(())
    }
}

/// The 17x17 sample maze. Entrance at the bottom (row 16), exit at the top (row 0).
fn sample_rows() -> Vec<Vec<u8>> {
    #[rustfmt::skip]
    let rows: [[u8; 17]; 17] = [
        [1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1],
        [1,0,0,0,0,0,0,0,0,0,0,1,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,1,0,1,0,1,1,0,1],
        [1,1,1,0,0,0,0,0,1,0,0,1,0,0,1,0,1],
        [1,0,0,0,1,1,1,1,1,0,1,1,0,1,1,0,1],
        [1,1,1,1,1,0,0,0,0,0,0,0,0,1,0,0,1],
        [1,0,0,0,0,0,1,1,1,1,1,1,1,1,1,1,1],
        [1,0,1,1,1,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,0,1,1,1,1,1,1,1,1,1,1,1,0,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1],
        [1,0,0,1,0,0,0,0,0,0,0,0,1,0,0,0,1],
        [1,0,1,1,0,1,1,1,1,1,1,0,1,1,1,1,1],
        [1,0,1,0,0,0,0,0,0,0,1,0,0,0,0,0,1],
        [1,0,1,1,0,1,1,1,1,1,1,1,1,1,1,0,1],
        [1,0,0,0,0,0,0,1,0,0,0,0,0,0,0,0,1],
        [1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1],
    ];
    rows.iter().map(|r| r.to_vec()).collect()
}
