//! Shared types and configuration for the labyrinth workspace.
//!
//! # Invariants
//! - Configuration is plain data; nothing here touches simulation state.
//! - `GameConfig::default()` is always valid.

mod config;
mod types;

pub use config::{
    ClampOrigin, ConfigError, FollowConfig, GameConfig, MazeConfig, MovementConfig,
    WinMapping,
};
pub use types::{CellCoord, Transform};
