//! Best-Fit AoE Placement
//!
//! Given candidate positions and a caster, find where an area ability
//! should be aimed to cover the most candidates.

use crate::config::{PlacementConfig, MAX_EXHAUSTIVE_CIRCLE_CUTOFF};
use crate::core::vec2::{Vec2, EPSILON};

/// Slack when testing points against an enclosing circle.
const ENCLOSE_TOLERANCE: f32 = 1e-3;

/// Result of a circular placement search.
#[derive(Clone, Debug, PartialEq)]
pub struct CirclePlacement {
    /// Circle center to aim at
    pub center: Vec2,
    /// Candidates covered by the circle
    pub hits: Vec<Vec2>,
}

impl CirclePlacement {
    /// Number of covered candidates.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }
}

/// Result of a line placement search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePlacement {
    /// End point of the line to aim at
    pub end: Vec2,
    /// Augmented points inside the end window
    pub hit_count: usize,
}

/// Circle through three points, or `None` if they are collinear.
fn circumcircle(a: Vec2, b: Vec2, c: Vec2) -> Option<(Vec2, f32)> {
    let ab = b - a;
    let ac = c - a;
    let d = 2.0 * ab.cross(ac);
    if d.abs() <= EPSILON {
        return None;
    }
    let ab2 = ab.length_squared();
    let ac2 = ac.length_squared();
    let offset = Vec2::new(
        (ac.y * ab2 - ab.y * ac2) / d,
        (ab.x * ac2 - ac.x * ab2) / d,
    );
    Some((a + offset, offset.length()))
}

fn diameter_circle(a: Vec2, b: Vec2) -> (Vec2, f32) {
    (a.lerp(b, 0.5), a.distance(b) * 0.5)
}

#[inline]
fn encloses(circle: (Vec2, f32), p: Vec2) -> bool {
    circle.0.distance(p) <= circle.1 + ENCLOSE_TOLERANCE
}

/// Smallest circle containing every point (incremental construction).
///
/// Returns `None` for an empty slice.
pub fn min_enclosing_circle(points: &[Vec2]) -> Option<(Vec2, f32)> {
    let first = *points.first()?;
    let mut circle = (first, 0.0);

    for i in 1..points.len() {
        if encloses(circle, points[i]) {
            continue;
        }
        circle = (points[i], 0.0);
        for j in 0..i {
            if encloses(circle, points[j]) {
                continue;
            }
            circle = diameter_circle(points[i], points[j]);
            for k in 0..j {
                if encloses(circle, points[k]) {
                    continue;
                }
                circle = circumcircle(points[i], points[j], points[k]).unwrap_or_else(|| {
                    // Collinear: the farthest pair spans the circle
                    let pairs = [
                        (points[i], points[j]),
                        (points[i], points[k]),
                        (points[j], points[k]),
                    ];
                    let (a, b) = pairs
                        .into_iter()
                        .fold(pairs[0], |best, pair| {
                            if pair.0.distance_squared(pair.1) > best.0.distance_squared(best.1) {
                                pair
                            } else {
                                best
                            }
                        });
                    diameter_circle(a, b)
                });
            }
        }
    }

    Some(circle)
}

/// Point that, used as a circle center of radius `width`, covers the most
/// candidates while staying within `range` of `caster`.
///
/// Up to `config.exhaustive_cutoff` candidates (never more than
/// [`MAX_EXHAUSTIVE_CIRCLE_CUTOFF`]), every subset is tried in
/// descending size order and the first subset whose enclosing circle fits
/// wins, so the answer maximizes coverage. Larger inputs fall back to an
/// O(n^2) density scan over in-range candidates.
pub fn best_circle_position(
    caster: Vec2,
    candidates: &[Vec2],
    width: f32,
    range: f32,
    config: &PlacementConfig,
) -> Option<CirclePlacement> {
    if candidates.is_empty() {
        return None;
    }
    let cutoff = config.exhaustive_cutoff.min(MAX_EXHAUSTIVE_CIRCLE_CUTOFF);
    if candidates.len() <= cutoff {
        exhaustive_circle(caster, candidates, width, range)
    } else {
        density_circle(caster, candidates, width, range)
    }
}

fn exhaustive_circle(
    caster: Vec2,
    candidates: &[Vec2],
    width: f32,
    range: f32,
) -> Option<CirclePlacement> {
    let n = candidates.len();
    let mut subset = Vec::with_capacity(n);

    for size in (1..=n).rev() {
        for mask in 1u32..(1u32 << n) {
            if mask.count_ones() as usize != size {
                continue;
            }
            subset.clear();
            subset.extend((0..n).filter(|i| mask & (1 << i) != 0).map(|i| candidates[i]));

            let Some((center, radius)) = min_enclosing_circle(&subset) else {
                continue;
            };
            if radius <= width && center.distance(caster) <= range {
                return Some(CirclePlacement {
                    center,
                    hits: subset.clone(),
                });
            }
        }
    }
    None
}

fn density_circle(
    caster: Vec2,
    candidates: &[Vec2],
    width: f32,
    range: f32,
) -> Option<CirclePlacement> {
    let width_sq = width * width;
    let range_sq = range * range;

    let mut best: Option<(Vec2, usize)> = None;
    for center in candidates {
        if center.distance_squared(caster) > range_sq {
            continue;
        }
        let count = candidates
            .iter()
            .filter(|p| p.distance_squared(*center) <= width_sq)
            .count();
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((*center, count));
        }
    }

    best.map(|(center, _)| CirclePlacement {
        center,
        hits: candidates
            .iter()
            .copied()
            .filter(|p| p.distance_squared(center) <= width_sq)
            .collect(),
    })
}

/// Endpoint of a `range`-long line from `caster` that gathers the most
/// candidates within `width` of it.
///
/// Pairwise midpoints are added to the candidate set so placements between
/// two candidates are considered too; counts are over that augmented set.
pub fn best_line_position(
    caster: Vec2,
    candidates: &[Vec2],
    width: f32,
    range: f32,
) -> Option<LinePlacement> {
    let mut points: Vec<Vec2> = candidates.to_vec();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            points.push(candidates[i].lerp(candidates[j], 0.5));
        }
    }

    let width_sq = width * width;
    let range_sq = range * range;
    let mut best: Option<LinePlacement> = None;

    for p in &points {
        if p.distance_squared(caster) > range_sq || p.distance_squared(caster) <= EPSILON {
            continue;
        }
        let end = caster.extend(*p, range);
        let hit_count = points
            .iter()
            .filter(|q| q.distance_squared(end) <= width_sq)
            .count();
        if best.map_or(true, |b| hit_count > b.hit_count) {
            best = Some(LinePlacement { end, hit_count });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<Vec2> {
        let h = 100.0 * 3f32.sqrt() / 2.0;
        vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(50.0, h)]
    }

    #[test]
    fn test_mec_equilateral() {
        let (center, radius) = min_enclosing_circle(&triangle()).unwrap();
        let centroid = Vec2::new(50.0, 100.0 * 3f32.sqrt() / 6.0);
        assert!(center.distance(centroid) < 1e-2);
        assert!((radius - 100.0 / 3f32.sqrt()).abs() < 1e-2);
    }

    #[test]
    fn test_mec_obtuse_uses_diameter() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(50.0, 5.0)];
        let (center, radius) = min_enclosing_circle(&points).unwrap();
        assert!(center.distance(Vec2::new(50.0, 0.0)) < 1e-3);
        assert!((radius - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_mec_collinear_and_trivial() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0)];
        let (_, radius) = min_enclosing_circle(&points).unwrap();
        assert!((radius - 50.0).abs() < 1e-3);
        assert_eq!(min_enclosing_circle(&[Vec2::new(3.0, 4.0)]), Some((Vec2::new(3.0, 4.0), 0.0)));
        assert!(min_enclosing_circle(&[]).is_none());
    }

    #[test]
    fn test_best_circle_triangle_exhaustive() {
        let caster = Vec2::new(50.0, -300.0);
        let placement =
            best_circle_position(caster, &triangle(), 120.0, 1000.0, &PlacementConfig::default())
                .unwrap();
        let centroid = Vec2::new(50.0, 100.0 * 3f32.sqrt() / 6.0);
        assert_eq!(placement.hit_count(), 3);
        assert!(placement.center.distance(centroid) < 1e-2);
    }

    #[test]
    fn test_best_circle_prefers_larger_cluster() {
        let candidates = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(600.0, 0.0),
            Vec2::new(620.0, 10.0),
            Vec2::new(610.0, -15.0),
        ];
        let placement = best_circle_position(
            Vec2::ZERO,
            &candidates,
            50.0,
            1000.0,
            &PlacementConfig::default(),
        )
        .unwrap();
        assert_eq!(placement.hit_count(), 3);
        assert!(placement.center.x > 590.0);
    }

    #[test]
    fn test_best_circle_respects_range() {
        let candidates = vec![
            Vec2::new(100.0, 0.0),
            Vec2::new(2000.0, 0.0),
            Vec2::new(2010.0, 0.0),
        ];
        let placement = best_circle_position(
            Vec2::ZERO,
            &candidates,
            50.0,
            500.0,
            &PlacementConfig::default(),
        )
        .unwrap();
        assert_eq!(placement.hits, vec![Vec2::new(100.0, 0.0)]);
    }

    #[test]
    fn test_best_circle_density_fallback() {
        // Twelve candidates: above the cutoff
        let mut candidates: Vec<Vec2> = (0..8).map(|i| Vec2::new(500.0 + i as f32 * 5.0, 0.0)).collect();
        candidates.extend((0..4).map(|i| Vec2::new(-500.0, i as f32 * 300.0)));
        let placement = best_circle_position(
            Vec2::ZERO,
            &candidates,
            60.0,
            800.0,
            &PlacementConfig::default(),
        )
        .unwrap();
        assert_eq!(placement.hit_count(), 8);
    }

    #[test]
    fn test_oversized_cutoff_falls_back_to_density() {
        // 32 candidates with a hand-built config past the accepted limit
        let candidates: Vec<Vec2> = (0..32).map(|i| Vec2::new(400.0 + i as f32 * 2.0, 0.0)).collect();
        let config = PlacementConfig { exhaustive_cutoff: 40 };
        let placement = best_circle_position(Vec2::ZERO, &candidates, 80.0, 800.0, &config).unwrap();
        assert_eq!(placement.hit_count(), 32);
    }

    #[test]
    fn test_best_line_position() {
        let candidates = vec![
            Vec2::new(500.0, 0.0),
            Vec2::new(520.0, 30.0),
            Vec2::new(0.0, -500.0),
        ];
        let placement = best_line_position(Vec2::ZERO, &candidates, 60.0, 520.0).unwrap();
        // The first two candidates and their midpoint sit around the endpoint
        assert_eq!(placement.hit_count, 3);
        assert!(placement.end.x > 450.0);
        assert!((placement.end.length() - 520.0).abs() < 1e-2);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(best_circle_position(Vec2::ZERO, &[], 100.0, 100.0, &PlacementConfig::default()).is_none());
        assert!(best_line_position(Vec2::ZERO, &[], 100.0, 100.0).is_none());
    }
}
