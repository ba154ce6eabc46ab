//! Polygons
//!
//! Closed polygons built from ordered point sequences, plus builders for
//! every area-effect footprint. Builders emit counter-clockwise vertices.

use std::f32::consts::TAU;
use serde::{Serialize, Deserialize};

use crate::core::vec2::{segment_intersection, Vec2};

/// Closed polygon. The last vertex connects back to the first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices in order
    pub points: Vec<Vec2>,
}

impl Polygon {
    /// Build a closed polygon from an ordered point sequence.
    ///
    /// A repeated closing vertex is dropped.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut points: Vec<Vec2> = points.into_iter().collect();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the polygon has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edges as `(from, to)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Signed area (positive for counter-clockwise).
    pub fn signed_area(&self) -> f32 {
        self.edges().map(|(a, b)| a.cross(b)).sum::<f32>() * 0.5
    }

    /// Unsigned area.
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// Even-odd point containment. Points on an edge count as inside.
    pub fn contains(&self, point: Vec2) -> bool {
        if self.points.len() < 3 {
            return false;
        }

        let mut inside = false;
        for (a, b) in self.edges() {
            if point.distance_to_segment_squared(a, b) <= 1e-6 {
                return true;
            }
            if (a.y > point.y) != (b.y > point.y) {
                let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Negation of [`Polygon::contains`].
    #[inline]
    pub fn is_outside(&self, point: Vec2) -> bool {
        !self.contains(point)
    }

    /// Does any edge cross the segment `a -> b`?
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        self.edges()
            .any(|(p, q)| segment_intersection(p, q, a, b).is_some())
    }
}

// =============================================================================
// FOOTPRINT BUILDERS
// =============================================================================

/// Rectangle around the segment `start -> end`, `half_width` to each side.
pub fn rectangle(start: Vec2, end: Vec2, half_width: f32) -> Polygon {
    let dir = (end - start).normalize();
    let dir = if dir.is_zero() { Vec2::RIGHT } else { dir };
    let side = dir.perpendicular().scale(half_width);
    Polygon::from_points([start - side, end - side, end + side, start + side])
}

/// Regular polygon approximating a circle. The polygon circumscribes the
/// circle so no point of the true area falls outside it.
pub fn circle(center: Vec2, radius: f32, quality: u32) -> Polygon {
    let quality = quality.max(3);
    let outer = radius / (std::f32::consts::PI / quality as f32).cos();
    Polygon::from_points((0..quality).map(|i| {
        let angle = i as f32 * TAU / quality as f32;
        center + Vec2::new(angle.cos(), angle.sin()).scale(outer)
    }))
}

/// Annulus between `inner` and `outer`, as one keyhole polygon: the outer
/// loop counter-clockwise, a bridge, then the inner loop clockwise.
pub fn ring(center: Vec2, inner: f32, outer: f32, quality: u32) -> Polygon {
    let quality = quality.max(3);
    let step = TAU / quality as f32;
    let outer_r = outer / (std::f32::consts::PI / quality as f32).cos();

    let mut points = Vec::with_capacity(2 * quality as usize + 2);
    for i in 0..=quality {
        let angle = i as f32 * step;
        points.push(center + Vec2::new(angle.cos(), angle.sin()).scale(outer_r));
    }
    for i in (0..=quality).rev() {
        let angle = i as f32 * step;
        points.push(center + Vec2::new(angle.cos(), angle.sin()).scale(inner));
    }
    Polygon { points }
}

/// Circular sector with apex at `center`, opening `angle_deg` around `direction`.
pub fn sector(center: Vec2, direction: Vec2, angle_deg: f32, radius: f32, quality: u32) -> Polygon {
    let quality = quality.max(3);
    let half = angle_deg.to_radians() * 0.5;
    let dir = if direction.is_zero() { Vec2::RIGHT } else { direction.normalize() };
    let outer = radius / (std::f32::consts::PI / quality as f32).cos();

    let mut points = vec![center];
    for i in 0..=quality {
        let t = -half + 2.0 * half * i as f32 / quality as f32;
        points.push(center + dir.rotated(t).scale(outer));
    }
    Polygon { points }
}

/// Circular arc through `start` and `end`, bulging left of the chord by a
/// central angle of `bend_deg`. Returns the arc as a point sequence.
pub fn arc_points(start: Vec2, end: Vec2, bend_deg: f32, quality: u32) -> Vec<Vec2> {
    let quality = quality.max(2);
    let chord = end - start;
    let chord_len = chord.length();
    let bend = bend_deg.to_radians();

    if bend.abs() <= 1e-4 || chord_len <= 1e-4 {
        return (0..=quality)
            .map(|i| start.lerp(end, i as f32 / quality as f32))
            .collect();
    }

    // Circle through start and end with central angle |bend|; the sign
    // picks the side of the chord the arc bulges to.
    let side = bend.signum();
    let bend = bend.abs();
    let radius = chord_len / (2.0 * (bend * 0.5).sin());
    let mid = start.lerp(end, 0.5);
    let apothem = radius * (bend * 0.5).cos();
    let normal = chord.normalize().perpendicular().scale(side);
    let center = mid - normal.scale(apothem);

    let a0 = (start - center).polar();
    (0..=quality)
        .map(|i| {
            let a = a0 - side * bend * i as f32 / quality as f32;
            center + Vec2::new(a.cos(), a.sin()).scale(radius)
        })
        .collect()
}

/// Band of `half_width` around a polyline path.
pub fn path_band(path: &[Vec2], half_width: f32) -> Polygon {
    if path.len() < 2 {
        return path
            .first()
            .map(|p| circle(*p, half_width, 8))
            .unwrap_or_default();
    }

    let normal_at = |i: usize| {
        let before = if i == 0 { path[0] } else { path[i - 1] };
        let after = if i + 1 == path.len() { path[i] } else { path[i + 1] };
        (after - before).normalize().perpendicular()
    };

    let mut left = Vec::with_capacity(path.len());
    let mut right = Vec::with_capacity(path.len());
    for (i, p) in path.iter().enumerate() {
        let n = normal_at(i).scale(half_width);
        left.push(*p + n);
        right.push(*p - n);
    }

    right.extend(left.into_iter().rev());
    Polygon { points: right }
}
