//! Core primitives.
//!
//! World-space vector math and deterministic state hashing. Everything
//! above this module builds on these types.

pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::{Vec2, Projection, segment_intersection};
pub use hash::{StateDigest, StateHasher, compute_state_digest};

/// Game time in milliseconds.
pub type GameTime = f32;

/// Network identifier of a game entity (hero, minion, missile, effect object).
pub type EntityId = u32;
