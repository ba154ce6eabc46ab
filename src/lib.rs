//! # Skillshot Core
//!
//! Skillshot detection, threat tracking and path collision for a real-time
//! combat client.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SKILLSHOT CORE                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - 2D vector and segment math                │
//! │  └── hash.rs     - Tracker state digest                      │
//! │                                                              │
//! │  catalog/        - Ability metadata (load once, read-only)   │
//! │  geometry/       - Polygons, union clipping, AoE placement   │
//! │                                                              │
//! │  skillshot/      - Detected ability instances                │
//! │  ├── shapes.rs   - Footprints                                │
//! │  ├── missile.rs  - Missile kinematics                        │
//! │  └── overrides.rs- Per-ability variant registry              │
//! │                                                              │
//! │  detection/      - Event classification and tracking         │
//! │  ├── detector.rs - Events -> skillshots                      │
//! │  └── tracker.rs  - Active threat set                         │
//! │                                                              │
//! │  collision.rs    - Path vs obstacle queries                  │
//! │  engine.rs       - Per-tick pipeline                         │
//! │  world.rs        - Host world interface                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! Everything runs synchronously inside the host's per-tick callback.
//! Deferred work is scheduled by tick number, never by waiting. The
//! tracked set is only mutated inside [`Engine::tick`]; readers borrow it
//! between ticks.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod catalog;
pub mod collision;
pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod skillshot;
pub mod world;

// Re-export commonly used types
pub use core::{EntityId, GameTime, Vec2};
pub use catalog::{SpellCatalog, SpellMetadata, ShapeKind};
pub use collision::{CollisionEngine, CollisionQuery, WaypointCollision};
pub use config::EngineConfig;
pub use detection::{InboundEvent, ThreatEvent, ThreatEventKind};
pub use engine::{Engine, TickResult};
pub use geometry::Polygon;
pub use skillshot::Skillshot;
pub use world::{GameWorld, WorldSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
