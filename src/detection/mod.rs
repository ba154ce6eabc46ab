//! Detection and tracking.
//!
//! The detector classifies collaborator events into skillshots; the
//! tracker owns the resulting threat set.

pub mod events;
pub mod detector;
pub mod tracker;

pub use events::{InboundEvent, ProjectileInfo, ShotSummary, ThreatEvent, ThreatEventKind};
pub use detector::Detector;
pub use tracker::Tracker;
