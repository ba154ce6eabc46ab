//! Error Types
//!
//! Every failure in this crate is scoped to a single entity or a single
//! load operation. None of them abort the per-tick loop.

use crate::catalog::ShapeKind;
use crate::core::EntityId;

/// Failure to load the spell catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog file could not be read.
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog contents are not valid records.
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to load engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config contents are not valid.
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its accepted range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Per-detection failures. Logged and isolated to the one skillshot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectionError {
    /// Neither a spawn object, an observed start nor the caster resolved.
    #[error("Start position unresolved for {spell}")]
    StartUnresolved {
        /// Ability name
        spell: String,
    },

    /// A missile handle was attached to a shape that does not fly.
    #[error("Missile handle attached to non-missile {kind:?} shot {spell}")]
    MissileOnNonMissile {
        /// Ability name
        spell: String,
        /// Shape of the receiving shot
        kind: ShapeKind,
    },
}

/// Failure to predict an obstacle's position during a collision query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// Obstacle died or despawned mid-query.
    #[error("Obstacle {0} is no longer valid")]
    ObstacleInvalid(EntityId),

    /// Obstacle speed or path cannot be extrapolated.
    #[error("Obstacle {0} has no usable movement data")]
    NoMovementData(EntityId),
}
