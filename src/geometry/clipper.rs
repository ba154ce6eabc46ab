//! Polygon Union
//!
//! Boolean union of area-effect footprints on fixed-precision integer
//! coordinates.
//!
//! ## Algorithm
//!
//! 1. Snap every vertex to the integer grid (`CLIP_SCALE` steps per world
//!    unit, round half away from zero) and orient every input
//!    counter-clockwise.
//! 2. Sweep all edges in ascending x. Each edge is tested only against the
//!    edges whose x-interval is still open, and every crossing is computed
//!    once and recorded on both edges.
//! 3. Split every edge at its recorded points. A piece survives if its
//!    midpoint lies outside every other input, or lies on another input's
//!    boundary running the same way (kept once, by lowest input index).
//!    Pieces shared with an input running the opposite way are internal
//!    seams and are dropped.
//! 4. Chain the surviving pieces head to tail into closed loops. Outer
//!    boundaries come out counter-clockwise, holes clockwise.
//!
//! All arithmetic after snapping is exact (`i64` coordinates, `i128`
//! products), so the output depends only on the input.
//!
//! Inputs are expected to be simple polygons. Keyhole polygons (rings) are
//! accepted; their bridge survives as a zero-width slit.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::vec2::Vec2;
use super::polygon::Polygon;

/// Integer grid steps per world unit.
pub const CLIP_SCALE: f32 = 10.0;

/// Vertex on the integer grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntPoint {
    /// X on the grid
    pub x: i64,
    /// Y on the grid
    pub y: i64,
}

impl IntPoint {
    /// Create a grid point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Snap a world-space point to the grid.
    pub fn from_world(p: Vec2) -> Self {
        Self {
            x: (p.x * CLIP_SCALE).round() as i64,
            y: (p.y * CLIP_SCALE).round() as i64,
        }
    }

    /// Back to world space.
    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32 / CLIP_SCALE, self.y as f32 / CLIP_SCALE)
    }

    fn sub(self, o: Self) -> (i128, i128) {
        ((self.x - o.x) as i128, (self.y - o.y) as i128)
    }
}

#[inline]
fn cross(a: (i128, i128), b: (i128, i128)) -> i128 {
    a.0 * b.1 - a.1 * b.0
}

#[inline]
fn dot(a: (i128, i128), b: (i128, i128)) -> i128 {
    a.0 * b.0 + a.1 * b.1
}

/// Integer division rounding half away from zero.
#[inline]
fn round_div(num: i128, den: i128) -> i128 {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (num + den / 2) / den
    } else {
        -((-num + den / 2) / den)
    }
}

/// Input edge with its recorded split points.
struct Edge {
    poly: usize,
    a: IntPoint,
    b: IntPoint,
    splits: Vec<IntPoint>,
}

impl Edge {
    fn min_x(&self) -> i64 {
        self.a.x.min(self.b.x)
    }

    fn max_x(&self) -> i64 {
        self.a.x.max(self.b.x)
    }

    fn y_overlaps(&self, other: &Edge) -> bool {
        let (lo, hi) = (self.a.y.min(self.b.y), self.a.y.max(self.b.y));
        let (olo, ohi) = (other.a.y.min(other.b.y), other.a.y.max(other.b.y));
        lo <= ohi && olo <= hi
    }
}

/// Is `p` on the closed segment `a -> b`? (`p` already collinear)
#[inline]
fn within_box(p: (i128, i128), a: (i128, i128), b: (i128, i128)) -> bool {
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Snap, clean and orient one input path.
fn prepare(polygon: &Polygon) -> Option<Vec<IntPoint>> {
    let mut path: Vec<IntPoint> = Vec::with_capacity(polygon.len());
    for p in &polygon.points {
        let q = IntPoint::from_world(*p);
        if path.last() != Some(&q) {
            path.push(q);
        }
    }
    while path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    if path.len() < 3 {
        return None;
    }

    let area2 = doubled_area(&path);
    if area2 == 0 {
        return None;
    }
    if area2 < 0 {
        path.reverse();
    }
    Some(path)
}

fn doubled_area(path: &[IntPoint]) -> i128 {
    let n = path.len();
    (0..n)
        .map(|i| {
            let a = path[i];
            let b = path[(i + 1) % n];
            a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128
        })
        .sum()
}

/// Record the crossing(s) of edges `i` and `j` on both edges.
fn record_crossings(edges: &mut [Edge], i: usize, j: usize) {
    let (p, p2, q, q2) = (edges[i].a, edges[i].b, edges[j].a, edges[j].b);
    let r = p2.sub(p);
    let s = q2.sub(q);
    let qp = q.sub(p);
    let denom = cross(r, s);

    if denom == 0 {
        if cross(qp, r) != 0 {
            return; // parallel, disjoint
        }
        // Collinear: each endpoint lying on the other edge splits it
        let (po, p2o) = ((0, 0), r);
        for pt in [q, q2] {
            let rel = pt.sub(p);
            if within_box(rel, po, p2o) && pt != p && pt != p2 {
                edges[i].splits.push(pt);
            }
        }
        for pt in [p, p2] {
            let rel = pt.sub(q);
            if within_box(rel, (0, 0), s) && pt != q && pt != q2 {
                edges[j].splits.push(pt);
            }
        }
        return;
    }

    let t_num = cross(qp, s);
    let u_num = cross(qp, r);
    let in_range = |num: i128| {
        if denom > 0 {
            num >= 0 && num <= denom
        } else {
            num <= 0 && num >= denom
        }
    };
    if !in_range(t_num) || !in_range(u_num) {
        return;
    }

    let point = IntPoint::new(
        p.x + round_div(r.0 * t_num, denom) as i64,
        p.y + round_div(r.1 * t_num, denom) as i64,
    );
    edges[i].splits.push(point);
    edges[j].splits.push(point);
}

/// Boundary relation of a doubled point to one polygon.
enum Relation {
    Outside,
    Inside,
    BoundarySame,
    BoundaryOpposite,
}

/// Classify the doubled midpoint `m2` of piece `dir` against `path`.
fn classify(m2: (i128, i128), dir: (i128, i128), path: &[IntPoint]) -> Relation {
    let n = path.len();
    let mut inside = false;

    for k in 0..n {
        let a = path[k];
        let b = path[(k + 1) % n];
        let a2 = (2 * a.x as i128, 2 * a.y as i128);
        let b2 = (2 * b.x as i128, 2 * b.y as i128);
        let ab = (b2.0 - a2.0, b2.1 - a2.1);
        let am = (m2.0 - a2.0, m2.1 - a2.1);

        if cross(ab, am) == 0 && within_box(m2, a2, b2) {
            return if dot(ab, dir) > 0 {
                Relation::BoundarySame
            } else {
                Relation::BoundaryOpposite
            };
        }

        if (a2.1 > m2.1) != (b2.1 > m2.1) {
            // m2.x < a2.x + (m2.y - a2.y) * ab.x / ab.y, sign-corrected
            let lhs = (m2.0 - a2.0) * ab.1;
            let rhs = (m2.1 - a2.1) * ab.0;
            let left_of = if ab.1 > 0 { lhs < rhs } else { lhs > rhs };
            if left_of {
                inside = !inside;
            }
        }
    }

    if inside {
        Relation::Inside
    } else {
        Relation::Outside
    }
}

/// Boolean union of `polygons`.
///
/// Disjoint inputs come back as separate polygons; overlapping inputs merge
/// into one. Holes enclosed by the union are returned clockwise.
pub fn union(polygons: &[Polygon]) -> Vec<Polygon> {
    let paths: Vec<Vec<IntPoint>> = polygons.iter().filter_map(prepare).collect();
    if paths.is_empty() {
        return Vec::new();
    }

    // Edge list
    let mut edges: Vec<Edge> = Vec::new();
    for (poly, path) in paths.iter().enumerate() {
        for k in 0..path.len() {
            let a = path[k];
            let b = path[(k + 1) % path.len()];
            edges.push(Edge { poly, a, b, splits: vec![a, b] });
        }
    }

    // Sweep in ascending min-x, testing only open x-intervals
    let mut order: Vec<usize> = (0..edges.len()).collect();
    order.sort_by_key(|&i| (edges[i].min_x(), i));
    let mut open: Vec<usize> = Vec::new();
    for &i in &order {
        let x = edges[i].min_x();
        open.retain(|&j| edges[j].max_x() >= x);
        for &j in &open {
            if edges[j].poly != edges[i].poly && edges[i].y_overlaps(&edges[j]) {
                record_crossings(&mut edges, i, j);
            }
        }
        open.push(i);
    }

    // Split and classify
    let bboxes: Vec<(i64, i64, i64, i64)> = paths.iter().map(|p| bbox(p)).collect();
    let mut pieces: Vec<(IntPoint, IntPoint)> = Vec::new();
    for edge in &mut edges {
        let origin = edge.a;
        let dir = edge.b.sub(edge.a);
        edge.splits.sort_by_key(|p| dot(p.sub(origin), dir));
        edge.splits.dedup();

        for w in edge.splits.windows(2) {
            let (s, e) = (w[0], w[1]);
            if s == e {
                continue;
            }
            let m2 = ((s.x + e.x) as i128, (s.y + e.y) as i128);
            let piece_dir = e.sub(s);
            if keep_piece(edge.poly, m2, piece_dir, &paths, &bboxes) {
                pieces.push((s, e));
            }
        }
    }

    chain(pieces)
}

fn bbox(path: &[IntPoint]) -> (i64, i64, i64, i64) {
    path.iter().fold(
        (i64::MAX, i64::MAX, i64::MIN, i64::MIN),
        |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
    )
}

fn keep_piece(
    owner: usize,
    m2: (i128, i128),
    dir: (i128, i128),
    paths: &[Vec<IntPoint>],
    bboxes: &[(i64, i64, i64, i64)],
) -> bool {
    for (other, path) in paths.iter().enumerate() {
        if other == owner {
            continue;
        }
        let (x0, y0, x1, y1) = bboxes[other];
        if m2.0 < 2 * x0 as i128 || m2.0 > 2 * x1 as i128 || m2.1 < 2 * y0 as i128 || m2.1 > 2 * y1 as i128 {
            continue;
        }
        match classify(m2, dir, path) {
            Relation::Outside => {}
            Relation::Inside | Relation::BoundaryOpposite => return false,
            Relation::BoundarySame => {
                if other < owner {
                    return false;
                }
            }
        }
    }
    true
}

/// Chain directed pieces into closed loops.
fn chain(pieces: Vec<(IntPoint, IntPoint)>) -> Vec<Polygon> {
    let mut outgoing: BTreeMap<IntPoint, Vec<usize>> = BTreeMap::new();
    for (i, (s, _)) in pieces.iter().enumerate() {
        outgoing.entry(*s).or_default().push(i);
    }

    let mut used = vec![false; pieces.len()];
    let mut result = Vec::new();

    for first in 0..pieces.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let start = pieces[first].0;
        let mut loop_points = vec![start];
        let mut cursor = pieces[first].1;

        let closed = loop {
            if cursor == start {
                break true;
            }
            loop_points.push(cursor);
            let next = outgoing
                .get(&cursor)
                .and_then(|list| list.iter().copied().find(|&i| !used[i]));
            match next {
                Some(i) => {
                    used[i] = true;
                    cursor = pieces[i].1;
                }
                None => break false,
            }
        };

        if !closed {
            debug!("Union dropped an open chain of {} points", loop_points.len());
            continue;
        }

        let simplified = drop_collinear(loop_points);
        if simplified.len() >= 3 && doubled_area(&simplified) != 0 {
            result.push(Polygon {
                points: simplified.into_iter().map(IntPoint::to_world).collect(),
            });
        }
    }

    result
}

fn drop_collinear(mut points: Vec<IntPoint>) -> Vec<IntPoint> {
    let mut changed = true;
    while changed && points.len() >= 3 {
        changed = false;
        let n = points.len();
        for i in 0..n {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            if cross(cur.sub(prev), next.sub(cur)) == 0 {
                points.remove(i);
                changed = true;
                break;
            }
        }
    }
    points
}

/// Total area covered by the union of `polygons`.
pub fn union_area(polygons: &[Polygon]) -> f32 {
    union(polygons).iter().map(Polygon::signed_area).sum()
}
