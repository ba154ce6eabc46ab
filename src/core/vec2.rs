//! 2D Vector
//!
//! Float 2D vector used for every world-space quantity in the crate:
//! positions, directions, polygon vertices. Includes the segment helpers
//! shared by skillshot geometry and collision queries.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// Tolerance used when comparing lengths against zero.
pub const EPSILON: f32 = 1e-6;

/// 2D vector in world units.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    /// Unit vector pointing up (+Y)
    pub const UP: Self = Self { x: 0.0, y: 1.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Squared length (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Length (magnitude). Prefer `length_squared` when possible.
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> f32 {
        (self - other).length_squared()
    }

    /// Distance to another point. Prefer `distance_squared` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// True if the vector has (near) zero length.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.length_squared() <= EPSILON * EPSILON
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::ZERO;
        }
        self.scale(1.0 / len)
    }

    /// Dot product with another vector.
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (returns scalar z-component).
    /// Positive if other is counter-clockwise from self.
    #[inline]
    pub fn cross(self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Rotate 90 degrees counter-clockwise.
    #[inline]
    pub fn perpendicular(self) -> Self {
        Self { x: -self.y, y: self.x }
    }

    /// Rotate counter-clockwise by `radians`.
    #[inline]
    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Move `distance` units from `self` towards `to`.
    #[inline]
    pub fn extend(self, to: Self, distance: f32) -> Self {
        self + (to - self).normalize().scale(distance)
    }

    /// Linear interpolation. `t = 0` returns self, `t = 1` returns other.
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self).scale(t)
    }

    /// Unsigned angle to another vector, in degrees.
    ///
    /// A zero vector has no direction; the angle to it is 0.
    pub fn angle_between(self, other: Self) -> f32 {
        if self.is_zero() || other.is_zero() {
            return 0.0;
        }
        let (ax, ay) = (self.x as f64, self.y as f64);
        let (bx, by) = (other.x as f64, other.y as f64);
        let cross = ax * by - ay * bx;
        let dot = ax * bx + ay * by;
        cross.abs().atan2(dot).to_degrees() as f32
    }

    /// Polar angle of the vector, in radians.
    #[inline]
    pub fn polar(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Project onto the segment `a -> b`.
    pub fn project_on(self, a: Self, b: Self) -> Projection {
        let ab = b - a;
        let len_sq = ab.length_squared();
        if len_sq <= EPSILON {
            return Projection {
                on_segment: true,
                segment_point: a,
                line_point: a,
            };
        }
        let t = (self - a).dot(ab) / len_sq;
        let line_point = a + ab.scale(t);
        let on_segment = (0.0..=1.0).contains(&t);
        let segment_point = if on_segment {
            line_point
        } else if t < 0.0 {
            a
        } else {
            b
        };
        Projection {
            on_segment,
            segment_point,
            line_point,
        }
    }

    /// Squared distance from this point to the segment `a -> b`.
    #[inline]
    pub fn distance_to_segment_squared(self, a: Self, b: Self) -> f32 {
        self.distance_squared(self.project_on(a, b).segment_point)
    }
}

/// Result of projecting a point onto a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Whether the perpendicular foot lies within the segment
    pub on_segment: bool,
    /// Closest point on the segment
    pub segment_point: Vec2,
    /// Perpendicular foot on the infinite line
    pub line_point: Vec2,
}

/// Intersection point of segments `a1 -> a2` and `b1 -> b2`, if any.
///
/// Collinear overlaps report no single point and return `None`.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() <= EPSILON {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r.scale(t))
    } else {
        None
    }
}

// Operator overloads for ergonomics
impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a + b, Vec2::new(4.0, 6.0));
        assert_eq!(a - b, Vec2::new(2.0, 2.0));
        assert_eq!(a * 2.0, Vec2::new(6.0, 8.0));
        assert_eq!(-a, Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_vec2_length() {
        // 3-4-5 triangle
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.length_squared(), 25.0);
        assert!((v.length() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_vec2_normalize() {
        let norm = Vec2::new(3.0, 4.0).normalize();
        assert!((norm.length() - 1.0).abs() < 1e-5);

        // Zero vector normalizes to zero
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_angle_between() {
        assert!((Vec2::RIGHT.angle_between(Vec2::UP) - 90.0).abs() < 1e-3);
        assert!(Vec2::RIGHT.angle_between(Vec2::RIGHT) < 1e-3);
        assert_eq!(Vec2::RIGHT.angle_between(Vec2::ZERO), 0.0);
        assert!((Vec2::RIGHT.angle_between(Vec2::new(-1.0, 0.0)) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_project_on_segment() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        let inside = Vec2::new(5.0, 3.0).project_on(a, b);
        assert!(inside.on_segment);
        assert_eq!(inside.segment_point, Vec2::new(5.0, 0.0));

        let past = Vec2::new(15.0, 3.0).project_on(a, b);
        assert!(!past.on_segment);
        assert_eq!(past.segment_point, b);
        assert_eq!(past.line_point, Vec2::new(15.0, 0.0));

        assert_eq!(Vec2::new(5.0, 3.0).distance_to_segment_squared(a, b), 9.0);
    }

    #[test]
    fn test_segment_intersection() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        let p = hit.unwrap();
        assert!((p.x - 5.0).abs() < 1e-4 && (p.y - 5.0).abs() < 1e-4);

        // Parallel segments never intersect
        assert!(segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn test_rotated() {
        let r = Vec2::RIGHT.rotated(std::f32::consts::FRAC_PI_2);
        assert!((r.x).abs() < 1e-5 && (r.y - 1.0).abs() < 1e-5);
    }
}
