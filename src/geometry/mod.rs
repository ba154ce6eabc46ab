//! Geometry
//!
//! Polygon construction, union clipping and best-fit placement search.
//! Used by skillshot footprints and by downstream decision logic.

pub mod polygon;
pub mod clipper;
pub mod placement;

pub use polygon::Polygon;
pub use clipper::{union, union_area, IntPoint, CLIP_SCALE};
pub use placement::{
    best_circle_position, best_line_position, min_enclosing_circle,
    CirclePlacement, LinePlacement,
};
