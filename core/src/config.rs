//! Engine configuration shared by adapters and systems.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable parameters of the renderer, the simulation clock and enemy pursuit.
///
/// Every field has a default, so configuration files only need to name the
/// values they override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the 3D view in pixels.
    pub screen_width: u32,
    /// Height of the 3D view in pixels.
    pub screen_height: u32,
    /// Number of rays cast per frame, i.e. the horizontal resolution of the depth buffer.
    pub ray_count: u32,
    /// Horizontal field of view in degrees.
    pub fov_degrees: f32,
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Distance, in tiles, after which a ray gives up and renders background.
    pub max_distance_tiles: f32,
    /// Upper bound applied to frame deltas so stalls do not teleport entities.
    pub max_frame_delta_ms: u64,
    /// Enemy pursuit tuning.
    pub pursuit: PursuitConfig,
}

impl EngineConfig {
    /// Distance in world units after which rays stop stepping.
    #[must_use]
    pub fn max_distance(&self) -> f32 {
        self.tile_size * self.max_distance_tiles
    }

    /// Upper bound applied to frame deltas.
    #[must_use]
    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }

    /// Checks that the configuration describes a drawable view.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::EmptyScreen {
                width: self.screen_width,
                height: self.screen_height,
            });
        }
        if self.ray_count == 0 {
            return Err(ConfigError::NoRays);
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::InvalidFov(self.fov_degrees));
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if !(self.max_distance_tiles > 0.0) {
            return Err(ConfigError::InvalidMaxDistance(self.max_distance_tiles));
        }
        self.pursuit.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 600,
            ray_count: 400,
            fov_degrees: 60.0,
            tile_size: 32.0,
            max_distance_tiles: 500.0,
            max_frame_delta_ms: 100,
            pursuit: PursuitConfig::default(),
        }
    }
}

/// Distances and timings that drive the enemy pursuit state machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Distance in tiles at or below which an enemy engages the player.
    pub engage_tiles: f32,
    /// Distance in tiles at or beyond which an enemy loses interest.
    pub disengage_tiles: f32,
    /// Minimum time between two path searches of the same enemy.
    pub replan_interval_ms: u64,
}

impl PursuitConfig {
    /// Interval between path searches of the same enemy.
    #[must_use]
    pub fn replan_interval(&self) -> Duration {
        Duration::from_millis(self.replan_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.engage_tiles >= 0.0 && self.engage_tiles < self.disengage_tiles) {
            return Err(ConfigError::InvalidPursuitRange {
                engage: self.engage_tiles,
                disengage: self.disengage_tiles,
            });
        }
        Ok(())
    }
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            engage_tiles: 0.6,
            disengage_tiles: 10.0,
            replan_interval_ms: 400,
        }
    }
}

/// Reasons an [`EngineConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The view has no pixels.
    #[error("screen must be at least 1x1 (received {width}x{height})")]
    EmptyScreen {
        /// Configured screen width.
        width: u32,
        /// Configured screen height.
        height: u32,
    },
    /// No rays would be cast.
    #[error("ray_count must be positive")]
    NoRays,
    /// The field of view is not strictly between 0 and 180 degrees.
    #[error("fov_degrees must lie in (0, 180) (received {0})")]
    InvalidFov(f32),
    /// The tile size is not positive.
    #[error("tile_size must be positive (received {0})")]
    InvalidTileSize(f32),
    /// The ray distance limit is not positive.
    #[error("max_distance_tiles must be positive (received {0})")]
    InvalidMaxDistance(f32),
    /// The engage range does not sit below the disengage range.
    #[error("engage range {engage} must be non-negative and below disengage range {disengage}")]
    InvalidPursuitRange {
        /// Configured engage range in tiles.
        engage: f32,
        /// Configured disengage range in tiles.
        disengage: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();

        assert_eq!(config.validate(), Ok(()));
        assert!((config.max_distance() - 16_000.0).abs() < f32::EPSILON);
        assert_eq!(config.max_frame_delta(), Duration::from_millis(100));
        assert_eq!(config.pursuit.replan_interval(), Duration::from_millis(400));
    }

    #[test]
    fn rejects_degenerate_views() {
        let config = EngineConfig {
            ray_count: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoRays));

        let config = EngineConfig {
            fov_degrees: 180.0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidFov(180.0)));
    }

    #[test]
    fn rejects_inverted_pursuit_ranges() {
        let config = EngineConfig {
            pursuit: PursuitConfig {
                engage_tiles: 4.0,
                disengage_tiles: 2.0,
                ..PursuitConfig::default()
            },
            ..EngineConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPursuitRange { .. })
        ));
    }

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"ray_count": 120, "pursuit": {"engage_tiles": 1.0}}"#)
                .expect("valid config");

        assert_eq!(config.ray_count, 120);
        assert_eq!(config.screen_width, 800);
        assert!((config.pursuit.engage_tiles - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.pursuit.replan_interval_ms, 400);
    }
}
