//! Skillshot Footprints
//!
//! Analytic effect regions. Containment tests run on the exact shape; the
//! polygon form is only built for union clipping and consumers that want
//! vertices.

use serde::{Serialize, Deserialize};

use crate::core::Vec2;
use crate::geometry::polygon::{self, Polygon};

/// Effect region of a skillshot at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Disc
    Circle {
        /// Center
        center: Vec2,
        /// Radius
        radius: f32,
    },
    /// Rectangle around a segment
    Rectangle {
        /// Segment start
        start: Vec2,
        /// Segment end
        end: Vec2,
        /// Distance to each side
        half_width: f32,
    },
    /// Circular sector
    Sector {
        /// Apex
        apex: Vec2,
        /// Unit facing direction
        direction: Vec2,
        /// Full opening angle (degrees)
        angle_deg: f32,
        /// Length
        radius: f32,
    },
    /// Annulus
    Ring {
        /// Center
        center: Vec2,
        /// Inner radius
        inner: f32,
        /// Outer radius
        outer: f32,
    },
    /// Band around a polyline (curved missiles)
    Band {
        /// Path, in flight order
        path: Vec<Vec2>,
        /// Distance to each side
        half_width: f32,
    },
    /// Nothing left to hit (missile past its end)
    Empty,
}

impl Shape {
    /// Is `point` inside the region?
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle { center, radius } => point.distance_squared(*center) <= radius * radius,
            Shape::Rectangle { start, end, half_width } => {
                let proj = point.project_on(*start, *end);
                proj.on_segment && point.distance_squared(proj.segment_point) <= half_width * half_width
            }
            Shape::Sector { apex, direction, angle_deg, radius } => {
                let offset = point - *apex;
                if offset.length_squared() > radius * radius {
                    return false;
                }
                offset.is_zero() || direction.angle_between(offset) <= angle_deg * 0.5
            }
            Shape::Ring { center, inner, outer } => {
                let d2 = point.distance_squared(*center);
                d2 >= inner * inner && d2 <= outer * outer
            }
            Shape::Band { path, half_width } => {
                let hw2 = half_width * half_width;
                path.windows(2)
                    .any(|seg| point.distance_to_segment_squared(seg[0], seg[1]) <= hw2)
            }
            Shape::Empty => false,
        }
    }

    /// Polygon approximation with `quality` segments per round edge.
    pub fn to_polygon(&self, quality: u32) -> Polygon {
        match self {
            Shape::Circle { center, radius } => polygon::circle(*center, *radius, quality),
            Shape::Rectangle { start, end, half_width } => polygon::rectangle(*start, *end, *half_width),
            Shape::Sector { apex, direction, angle_deg, radius } => {
                polygon::sector(*apex, *direction, *angle_deg, *radius, quality)
            }
            Shape::Ring { center, inner, outer } => polygon::ring(*center, *inner, *outer, quality),
            Shape::Band { path, half_width } => polygon::path_band(path, *half_width),
            Shape::Empty => Polygon::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_contains() {
        let shape = Shape::Rectangle {
            start: Vec2::ZERO,
            end: Vec2::new(1000.0, 0.0),
            half_width: 70.0,
        };
        assert!(shape.contains(Vec2::new(500.0, 60.0)));
        assert!(!shape.contains(Vec2::new(500.0, 80.0)));
        assert!(!shape.contains(Vec2::new(-10.0, 0.0)));
    }

    #[test]
    fn test_sector_contains() {
        let shape = Shape::Sector {
            apex: Vec2::ZERO,
            direction: Vec2::RIGHT,
            angle_deg: 50.0,
            radius: 600.0,
        };
        assert!(shape.contains(Vec2::new(300.0, 100.0)));
        assert!(!shape.contains(Vec2::new(300.0, 300.0)));
        assert!(!shape.contains(Vec2::new(700.0, 0.0)));
        assert!(shape.contains(Vec2::ZERO));
    }

    #[test]
    fn test_ring_contains() {
        let shape = Shape::Ring {
            center: Vec2::ZERO,
            inner: 300.0,
            outer: 380.0,
        };
        assert!(shape.contains(Vec2::new(0.0, 350.0)));
        assert!(!shape.contains(Vec2::new(0.0, 100.0)));
    }

    #[test]
    fn test_band_contains() {
        let shape = Shape::Band {
            path: vec![Vec2::ZERO, Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0)],
            half_width: 20.0,
        };
        assert!(shape.contains(Vec2::new(150.0, 110.0)));
        assert!(!shape.contains(Vec2::new(150.0, 50.0)));
        assert!(!Shape::Empty.contains(Vec2::ZERO));
    }

    #[test]
    fn test_polygon_agrees_with_analytic() {
        let shape = Shape::Circle { center: Vec2::new(100.0, 100.0), radius: 200.0 };
        let poly = shape.to_polygon(22);
        for p in [Vec2::new(100.0, 290.0), Vec2::new(250.0, 100.0), Vec2::new(100.0, 100.0)] {
            assert!(shape.contains(p));
            assert!(poly.contains(p));
        }
    }
}
