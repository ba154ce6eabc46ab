//! Engine Configuration
//!
//! Every heuristic constant used by detection, tracking, collision and
//! placement lives here with its default. Configs deserialize from JSON;
//! missing fields fall back to the defaults below.

use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::error::ConfigError;

/// Two observations of the same cast merge below this direction difference (degrees).
pub const MERGE_ANGLE_TOLERANCE_DEG: f32 = 5.0;

/// Best-circle search enumerates subsets exhaustively up to this many candidates.
pub const EXHAUSTIVE_CIRCLE_CUTOFF: usize = 9;

/// Largest accepted exhaustive cutoff. The subset search is exponential.
pub const MAX_EXHAUSTIVE_CIRCLE_CUTOFF: usize = 20;

/// Number of equal steps used to sample a path against terrain.
pub const TERRAIN_SAMPLE_STEPS: u32 = 20;

/// Upper lifetime of accelerating missiles (ms).
pub const ACCELERATING_MISSILE_TIMEOUT_MS: f32 = 4000.0;

/// Segments used to approximate circles and arcs.
pub const CIRCLE_QUALITY: u32 = 22;

/// Configuration for the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Track casts from the local team as well (useful for testing)
    pub track_allies: bool,
    /// Ticks to wait before resolving a spawned projectile
    pub projectile_defer_ticks: u64,
    /// Hard lifetime for accelerating missiles (ms)
    pub accelerating_missile_timeout_ms: f32,
    /// Segments used to approximate round shapes
    pub circle_quality: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            track_allies: false,
            projectile_defer_ticks: 1,
            accelerating_missile_timeout_ms: ACCELERATING_MISSILE_TIMEOUT_MS,
            circle_quality: CIRCLE_QUALITY,
        }
    }
}

/// Configuration for the tracker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Direction difference below which two detections merge (degrees)
    pub merge_angle_tolerance_deg: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            merge_angle_tolerance_deg: MERGE_ANGLE_TOLERANCE_DEG,
        }
    }
}

/// Configuration for collision queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Extra clearance added to every unit/hero test
    pub slack: f32,
    /// Candidates farther than path length plus this are ignored
    pub validity_extension: f32,
    /// Samples along a segment for terrain tests
    pub terrain_samples: u32,
    /// Thickness of the paired-marker wall rectangle
    pub wall_thickness: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            slack: 10.0,
            validity_extension: 200.0,
            terrain_samples: TERRAIN_SAMPLE_STEPS,
            wall_thickness: 60.0,
        }
    }
}

/// Configuration for best-fit AoE placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Exhaustive subset search is used up to this candidate count
    pub exhaustive_cutoff: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            exhaustive_cutoff: EXHAUSTIVE_CIRCLE_CUTOFF,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Detector settings
    pub detector: DetectorConfig,
    /// Tracker settings
    pub tracker: TrackerConfig,
    /// Collision settings
    pub collision: CollisionConfig,
    /// Placement settings
    pub placement: PlacementConfig,
}

impl EngineConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placement.exhaustive_cutoff > MAX_EXHAUSTIVE_CIRCLE_CUTOFF {
            return Err(ConfigError::Invalid(format!(
                "placement.exhaustive_cutoff {} exceeds {}",
                self.placement.exhaustive_cutoff, MAX_EXHAUSTIVE_CIRCLE_CUTOFF
            )));
        }
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
