//! Triangulation of a single region.
//!
//! ## Overview
//!
//! A region is one counter-clockwise outer boundary with clockwise holes. It goes through
//! the following steps:
//!
//! 1. Validation. Regions that are too small or whose holes touch the outer boundary
//!    are rejected with [`TessellationError::DegenerateRegion`].
//! 2. Bridging. Each hole is connected to the outer boundary with a pair of coincident
//!    edges, turning the region into a single weakly simple polygon. Holes are processed
//!    by decreasing maximum x and bridged to the closest visible vertex.
//! 3. Monotone decomposition. A sweep line moving up inserts diagonals at split and
//!    merge vertices so that every face of the polygon becomes y-monotone.
//! 4. Each monotone face is triangulated with a stack based algorithm.
//!
//! The area of the triangles is compared with the area of the region. If they disagree,
//! or if an internal error happens in steps 3 or 4, the region is triangulated again with
//! ear clipping, which is slower but does not depend on the sweep status being consistent.
//!
//! Triangles are only handed to the [`TriangleSink`] once the whole region has been
//! triangulated, so a failing region never leaves partial output behind.

use crate::arrangement;
use crate::error::{DegenerateReason, InternalError, TessellationError};
use crate::math::*;
use crate::math_utils::{
    clockwise_angle, compare_positions, cross, in_wedge, orient, segments_touch,
    signed_area_f64,
};
use crate::monotone::MonotoneTessellator;
use crate::winding::{contour_winding_number, is_on_boundary, Region};
use crate::VertexId;

use core::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Regions with a smaller outer area are rejected as degenerate. Holes with a smaller
/// area are ignored.
pub const MIN_REGION_AREA: f32 = 1e-6;

/// Triangles with an area at or below this value are not emitted.
pub const TRIANGLE_AREA_EPSILON: f64 = 1e-10;

/// Maximum relative difference between the triangulated area and the region's area
/// before falling back to ear clipping.
const AREA_MISMATCH_TOLERANCE: f64 = 1e-3;

/// Receives the triangles of a region.
pub trait TriangleSink {
    /// Called once per triangle, with the vertices in counter-clockwise order.
    fn triangle(&mut self, a: Point, b: Point, c: Point);
}

impl TriangleSink for Vec<[Point; 3]> {
    fn triangle(&mut self, a: Point, b: Point, c: Point) {
        self.push([a, b, c]);
    }
}

/// Information about the triangulation of a region.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TriangulationStats {
    pub triangles: usize,
    /// Sum of the areas of the emitted triangles.
    pub area: f32,
    /// Whether the region had to be triangulated with ear clipping.
    pub used_fallback: bool,
}

/// A hole after validation: clockwise points and the contour it originates from.
struct Hole {
    points: Vec<Point>,
    source: usize,
}

/// Triangulates regions.
///
/// Holds the scratch buffers of the algorithm so that they can be reused across regions.
pub struct Triangulator {
    positions: Vec<Point>,
    order: Vec<usize>,
    rank: Vec<usize>,
    diagonals: Vec<(usize, usize)>,
    raw_triangles: Vec<[VertexId; 3]>,
    triangles: Vec<[usize; 3]>,
    monotone: MonotoneTessellator,
    log: bool,
}

impl Default for Triangulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Triangulator {
    pub fn new() -> Self {
        Triangulator {
            positions: Vec::new(),
            order: Vec::new(),
            rank: Vec::new(),
            diagonals: Vec::new(),
            raw_triangles: Vec::new(),
            triangles: Vec::new(),
            monotone: MonotoneTessellator::new(),
            log: false,
        }
    }

    /// Enable/disable some verbose logging during the triangulation, for
    /// debugging purposes.
    pub fn set_logging(&mut self, is_enabled: bool) {
        self.log = is_enabled;
    }

    /// Triangulates a region and sends the triangles to `output`.
    ///
    /// On error nothing is sent to `output`.
    pub fn triangulate(
        &mut self,
        region: &Region,
        output: &mut dyn TriangleSink,
    ) -> Result<TriangulationStats, TessellationError> {
        let (outer, holes, expected_area) = validate(region)?;

        self.bridge_holes(outer, &holes)?;

        tess_log!(
            self,
            "Triangulating region {} ({} vertices after bridging {} holes)",
            region.source,
            self.positions.len(),
            holes.len()
        );

        let mut used_fallback = false;
        let area = match self.monotone_triangulation() {
            Ok(()) => self.collect_triangles(),
            Err(e) => {
                log::debug!(
                    "Monotone triangulation of region {} failed: {}",
                    region.source,
                    e
                );
                f64::NAN
            }
        };

        let mismatch = (area - expected_area).abs() / expected_area;
        let area = if mismatch.is_nan() || mismatch > AREA_MISMATCH_TOLERANCE {
            log::debug!(
                "Falling back to ear clipping for region {} (expected area {}, got {})",
                region.source,
                expected_area,
                area
            );
            used_fallback = true;
            self.ear_clipping();
            self.collect_triangles()
        } else {
            area
        };

        for &[a, b, c] in &self.triangles {
            output.triangle(self.positions[a], self.positions[b], self.positions[c]);
        }

        Ok(TriangulationStats {
            triangles: self.triangles.len(),
            area: area as f32,
            used_fallback,
        })
    }

    /// Connects the holes to the outer boundary, writing the resulting polygon into
    /// `self.positions`.
    fn bridge_holes(&mut self, outer: Vec<Point>, holes: &[Hole]) -> Result<(), TessellationError> {
        self.positions = outer;

        let max_x = |points: &[Point]| points.iter().fold(f32::MIN, |m, p| m.max(p.x));
        let mut order: Vec<usize> = (0..holes.len()).collect();
        order.sort_by(|&a, &b| {
            max_x(&holes[b].points)
                .partial_cmp(&max_x(&holes[a].points))
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut candidates = Vec::new();
        for (k, &h) in order.iter().enumerate() {
            let hole = &holes[h].points;
            let remaining: Vec<&[Point]> = order[k + 1..]
                .iter()
                .map(|&o| &holes[o].points[..])
                .collect();

            // Squared distances are finite and not negative, so their bit patterns order
            // like the values. Candidates are popped lazily.
            candidates.clear();
            for (i, p) in self.positions.iter().enumerate() {
                for (j, q) in hole.iter().enumerate() {
                    candidates.push(Reverse(((*q - *p).square_length().to_bits(), i, j)));
                }
            }
            let mut heap = BinaryHeap::from(core::mem::take(&mut candidates));

            let mut bridge = None;
            while let Some(Reverse((_, i, j))) = heap.pop() {
                if is_valid_bridge(&self.positions, i, hole, j, &remaining) {
                    bridge = Some((i, j));
                    break;
                }
            }
            candidates = heap.into_vec();

            let (i, j) = match bridge {
                Some(bridge) => bridge,
                None => return Err(InternalError::Bridge(holes[h].source).into()),
            };

            tess_log!(
                self,
                "Bridge {:?} -> {:?} for hole {}",
                self.positions[i],
                hole[j],
                holes[h].source
            );

            let mut merged = Vec::with_capacity(self.positions.len() + hole.len() + 2);
            merged.extend_from_slice(&self.positions[..=i]);
            merged.extend_from_slice(&hole[j..]);
            merged.extend_from_slice(&hole[..=j]);
            merged.extend_from_slice(&self.positions[i..]);
            self.positions = merged;
        }

        Ok(())
    }

    fn monotone_triangulation(&mut self) -> Result<(), InternalError> {
        let n = self.positions.len();
        self.raw_triangles.clear();

        let positions = &self.positions;
        self.order.clear();
        self.order.extend(0..n);
        self.order.sort_by(|&a, &b| compare_positions(positions[a], positions[b]).then(a.cmp(&b)));
        self.rank.clear();
        self.rank.resize(n, 0);
        for (r, &v) in self.order.iter().enumerate() {
            self.rank[v] = r;
        }

        self.diagonals.clear();
        let mut sweep = MonotoneDecomposition {
            positions,
            rank: &self.rank,
            status: Vec::new(),
            is_merge: vec![false; n],
            diagonals: &mut self.diagonals,
            log: self.log,
        };
        for &v in &self.order {
            sweep.vertex(v)?;
        }

        self.trace_pieces()?;
        self.monotone.flush(&mut self.raw_triangles);

        Ok(())
    }

    /// Walks the faces of the polygon split by the diagonals and triangulates each of them.
    fn trace_pieces(&mut self) -> Result<(), InternalError> {
        let n = self.positions.len();
        let mut diagonals = Vec::with_capacity(self.diagonals.len());
        for &(a, b) in &self.diagonals {
            let from = self.attach_to_copy(a, self.positions[b]);
            let to = self.attach_to_copy(b, self.positions[a]);
            match (from, to) {
                (Some(from), Some(to)) => diagonals.push((from.min(to), from.max(to))),
                _ => {
                    tess_log!(self, "Dropping diagonal {} - {}", a, b);
                }
            }
        }
        diagonals.sort_unstable();
        diagonals.dedup();

        let mut half_edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        for &(a, b) in &diagonals {
            half_edges.push((a, b));
            half_edges.push((b, a));
        }

        let mut outgoing = vec![Vec::new(); n];
        for (e, &(from, _)) in half_edges.iter().enumerate() {
            outgoing[from].push(e);
        }

        let positions = &self.positions;
        let next_edge = |e: usize| -> Option<usize> {
            let (from, v) = half_edges[e];
            let back = positions[from] - positions[v];
            let mut best: Option<(f64, usize)> = None;
            for &o in &outgoing[v] {
                let angle = clockwise_angle(back, positions[half_edges[o].1] - positions[v]);
                match best {
                    Some((a, _)) if a <= angle => {}
                    _ => best = Some((angle, o)),
                }
            }

            best.map(|(_, o)| o)
        };

        let mut used = vec![false; half_edges.len()];
        let mut piece = Vec::new();
        for start in 0..half_edges.len() {
            if used[start] {
                continue;
            }

            piece.clear();
            let mut e = start;
            loop {
                if used[e] || piece.len() > half_edges.len() {
                    return Err(InternalError::FaceTracing);
                }
                used[e] = true;
                piece.push(half_edges[e].0);
                e = next_edge(e).ok_or(InternalError::FaceTracing)?;
                if e == start {
                    break;
                }
            }

            tess_log!(self, "Monotone piece {:?}", piece);
            self.monotone.tessellate_piece(&piece, positions, &self.rank)?;
        }

        Ok(())
    }

    /// Bridging duplicates vertices. The sweep connects a diagonal to whichever copy it
    /// reaches first, which may not be the one whose interior wedge contains the diagonal.
    ///
    /// Returns the copy of `v` from which `target` is inside of the polygon, or `None`
    /// if there is no such copy.
    fn attach_to_copy(&self, v: usize, target: Point) -> Option<usize> {
        let positions = &self.positions;
        let n = positions.len();
        let pos = positions[v];

        let mut start = self.rank[v];
        while start > 0 && positions[self.order[start - 1]] == pos {
            start -= 1;
        }
        let mut end = self.rank[v] + 1;
        while end < n && positions[self.order[end]] == pos {
            end += 1;
        }
        if end - start == 1 {
            return Some(v);
        }

        self.order[start..end]
            .iter()
            .copied()
            .find(|&c| in_wedge(positions[(c + n - 1) % n], pos, positions[(c + 1) % n], target))
    }

    /// Fallback triangulation.
    ///
    /// Only reflex vertices can be inside of an ear, so they are the only ones tested.
    /// If a whole turn around the polygon finds no ear, the containment test is skipped,
    /// then the convexity test, which guarantees termination on any input.
    fn ear_clipping(&mut self) {
        self.raw_triangles.clear();
        let positions = &self.positions;
        let n = positions.len();
        if n < 3 {
            return;
        }

        let mut prev: Vec<usize> = (0..n).map(|i| (i + n - 1) % n).collect();
        let mut next: Vec<usize> = (0..n).map(|i| (i + 1) % n).collect();
        let mut remaining = n;
        let mut failures = 0;
        let mut v = 0;

        while remaining > 3 {
            let p = prev[v];
            let nx = next[v];
            let relaxed = failures >= remaining;
            let forced = failures >= 2 * remaining;

            if forced || is_ear(positions, &prev, &next, p, v, nx, relaxed) {
                self.raw_triangles.push([
                    VertexId::from_usize(p),
                    VertexId::from_usize(v),
                    VertexId::from_usize(nx),
                ]);
                next[p] = nx;
                prev[nx] = p;
                remaining -= 1;
                failures = 0;
                v = p;
            } else {
                failures += 1;
                v = nx;
            }
        }

        self.raw_triangles.push([
            VertexId::from_usize(prev[v]),
            VertexId::from_usize(v),
            VertexId::from_usize(next[v]),
        ]);
    }

    /// Turns the raw triangles into counter-clockwise, non-degenerate triangles and
    /// returns their total area.
    fn collect_triangles(&mut self) -> f64 {
        self.triangles.clear();
        let mut area = 0.0;
        for &[a, b, c] in &self.raw_triangles {
            let (a, b, c) = (a.to_usize(), b.to_usize(), c.to_usize());
            let signed = orient(self.positions[a], self.positions[b], self.positions[c]) * 0.5;
            if signed.abs() <= TRIANGLE_AREA_EPSILON {
                continue;
            }

            if signed > 0.0 {
                self.triangles.push([a, b, c]);
            } else {
                self.triangles.push([a, c, b]);
            }
            area += signed.abs();
        }

        area
    }
}

/// Triangulates a region with a temporary [`Triangulator`].
pub fn triangulate_region(
    region: &Region,
    output: &mut dyn TriangleSink,
) -> Result<TriangulationStats, TessellationError> {
    Triangulator::new().triangulate(region, output)
}

/// Checks the region and returns its counter-clockwise outer boundary, its clockwise
/// holes and its expected area.
fn validate(region: &Region) -> Result<(Vec<Point>, Vec<Hole>, f64), TessellationError> {
    let degenerate = |contour_index, reason| TessellationError::DegenerateRegion {
        contour_index,
        reason,
    };

    let mut outer = region.outer.points.clone();
    let mut outer_area = signed_area_f64(&outer);
    if outer_area < 0.0 {
        outer.reverse();
        outer_area = -outer_area;
    }

    if outer.len() < 3 || outer_area < MIN_REGION_AREA as f64 {
        return Err(degenerate(region.source, DegenerateReason::TooSmall));
    }

    let mut holes = Vec::with_capacity(region.holes.len());
    let mut expected_area = outer_area;
    for (i, hole) in region.holes.iter().enumerate() {
        let source = region.hole_sources.get(i).copied().unwrap_or(region.source);
        let mut points = hole.points.clone();
        let mut area = signed_area_f64(&points);
        if area.abs() < MIN_REGION_AREA as f64 {
            log::debug!("Ignoring the degenerate hole of contour {}", source);
            continue;
        }

        if area > 0.0 {
            points.reverse();
            area = -area;
        }

        let first = points[0];
        if is_on_boundary(first, &outer) || contour_winding_number(first, &outer) == 0 {
            return Err(degenerate(source, DegenerateReason::HoleTouchesBoundary));
        }

        expected_area += area;
        holes.push(Hole { points, source });
    }

    if !holes.is_empty() {
        let mut polygons: Vec<&[Point]> = vec![&outer];
        polygons.extend(holes.iter().map(|h| &h.points[..]));

        let mut offending = None;
        arrangement::for_each_intersection(&polygons, &mut |a, b| {
            if a.contour == b.contour {
                return true;
            }
            offending = Some(a.contour.max(b.contour));
            false
        });

        if let Some(contour) = offending {
            return Err(degenerate(
                holes[contour - 1].source,
                DegenerateReason::HoleTouchesBoundary,
            ));
        }
    }

    Ok((outer, holes, expected_area))
}

/// Whether the segment between `polygon[i]` and `hole[j]` can connect them.
fn is_valid_bridge(
    polygon: &[Point],
    i: usize,
    hole: &[Point],
    j: usize,
    remaining: &[&[Point]],
) -> bool {
    let n = polygon.len();
    let m = hole.len();
    let p = polygon[i];
    let q = hole[j];
    if p == q {
        return false;
    }

    if !in_wedge(polygon[(i + n - 1) % n], p, polygon[(i + 1) % n], q) {
        return false;
    }
    // Holes are clockwise, so their interior side is the outside of the hole.
    if !in_wedge(hole[(j + m - 1) % m], q, hole[(j + 1) % m], p) {
        return false;
    }

    let (min, max) = (p.min(q), p.max(q));
    let blocked = |points: &[Point]| {
        let len = points.len();
        (0..len).any(|k| {
            let a = points[k];
            let b = points[(k + 1) % len];
            if a.x.max(b.x) < min.x
                || a.x.min(b.x) > max.x
                || a.y.max(b.y) < min.y
                || a.y.min(b.y) > max.y
            {
                return false;
            }
            if a == p || b == p || a == q || b == q {
                return false;
            }
            segments_touch(p, q, a, b)
        })
    };

    !blocked(polygon) && !blocked(hole) && !remaining.iter().any(|r| blocked(r))
}

fn is_ear(
    positions: &[Point],
    prev: &[usize],
    next: &[usize],
    p: usize,
    v: usize,
    n: usize,
    relaxed: bool,
) -> bool {
    let (a, b, c) = (positions[p], positions[v], positions[n]);
    if orient(a, b, c) <= 0.0 {
        return false;
    }
    if relaxed {
        return true;
    }

    let mut w = next[n];
    while w != p {
        let pos = positions[w];
        let reflex = orient(positions[prev[w]], pos, positions[next[w]]) <= 0.0;
        if reflex
            && pos != a
            && pos != b
            && pos != c
            && orient(a, b, pos) >= 0.0
            && orient(b, c, pos) >= 0.0
            && orient(c, a, pos) >= 0.0
        {
            return false;
        }
        w = next[w];
    }

    true
}

/// A left boundary edge crossed by the sweep line, going down from `prev(lower)` to
/// `lower`. The interior of the polygon is on its right.
#[derive(Copy, Clone, Debug)]
struct StatusEdge {
    lower: usize,
    helper: usize,
}

/// The sweep inserting the diagonals that split a polygon into y-monotone pieces.
struct MonotoneDecomposition<'l> {
    positions: &'l [Point],
    rank: &'l [usize],
    status: Vec<StatusEdge>,
    is_merge: Vec<bool>,
    diagonals: &'l mut Vec<(usize, usize)>,
    log: bool,
}

impl<'l> MonotoneDecomposition<'l> {
    fn prev(&self, v: usize) -> usize {
        let n = self.positions.len();
        (v + n - 1) % n
    }

    fn next(&self, v: usize) -> usize {
        (v + 1) % self.positions.len()
    }

    fn vertex(&mut self, v: usize) -> Result<(), InternalError> {
        let p = self.prev(v);
        let n = self.next(v);
        let prev_later = self.rank[p] > self.rank[v];
        let next_later = self.rank[n] > self.rank[v];
        let convex = orient(self.positions[p], self.positions[v], self.positions[n]) > 0.0;

        match (prev_later, next_later, convex) {
            (true, true, true) => {
                tess_log!(self, "start vertex {} {:?}", v, self.positions[v]);
                self.status.push(StatusEdge { lower: v, helper: v });
            }
            (true, true, false) => {
                tess_log!(self, "split vertex {} {:?}", v, self.positions[v]);
                let e = self.left_edge(v)?;
                let helper = self.status[e].helper;
                self.add_diagonal(v, helper);
                self.status[e].helper = v;
                self.status.push(StatusEdge { lower: v, helper: v });
            }
            (false, false, true) => {
                tess_log!(self, "end vertex {} {:?}", v, self.positions[v]);
                self.finish_edge(v, n)?;
            }
            (false, false, false) => {
                tess_log!(self, "merge vertex {} {:?}", v, self.positions[v]);
                self.finish_edge(v, n)?;
                self.update_left_helper(v)?;
                self.is_merge[v] = true;
            }
            (true, false, _) => {
                // On a left chain.
                self.finish_edge(v, n)?;
                self.status.push(StatusEdge { lower: v, helper: v });
            }
            (false, true, _) => {
                // On a right chain.
                self.update_left_helper(v)?;
            }
        }

        Ok(())
    }

    /// Removes the edge ending at `lower` from the status.
    fn finish_edge(&mut self, v: usize, lower: usize) -> Result<(), InternalError> {
        let idx = self
            .status
            .iter()
            .position(|e| e.lower == lower)
            .ok_or(InternalError::SweepStatus(v))?;

        let helper = self.status[idx].helper;
        if self.is_merge[helper] {
            self.add_diagonal(v, helper);
        }
        self.status.swap_remove(idx);

        Ok(())
    }

    fn update_left_helper(&mut self, v: usize) -> Result<(), InternalError> {
        let e = self.left_edge(v)?;
        let helper = self.status[e].helper;
        if self.is_merge[helper] {
            self.add_diagonal(v, helper);
        }
        self.status[e].helper = v;

        Ok(())
    }

    fn add_diagonal(&mut self, a: usize, b: usize) {
        if self.positions[a] == self.positions[b] {
            return;
        }
        tess_log!(self, "diagonal {} - {}", a, b);
        self.diagonals.push((a, b));
    }

    /// Finds the status edge directly on the left of `v`.
    fn left_edge(&self, v: usize) -> Result<usize, InternalError> {
        let pos = self.positions[v];
        let p = self.positions[self.prev(v)];
        let n = self.positions[self.next(v)];
        let left_normal = |d: Vector| vector(-d.y, d.x);
        // Points into the polygon at `v`, used when `v` is on the line of an edge.
        let inward = left_normal(n - pos) + left_normal(pos - p);

        let mut best: Option<(usize, f64, f64)> = None;
        for (idx, edge) in self.status.iter().enumerate() {
            let w = self.positions[edge.lower];
            let u = self.positions[self.prev(edge.lower)];
            let side = orient(u, w, pos);
            let is_left = side > 0.0 || (side == 0.0 && cross(w - u, inward) > 0.0);
            if !is_left {
                continue;
            }

            let x = x_at(u, w, pos.y);
            let slope = if u.y == w.y {
                0.0
            } else {
                (u.x as f64 - w.x as f64) / (u.y as f64 - w.y as f64)
            };

            let better = match best {
                None => true,
                Some((b, bx, bslope)) => {
                    x > bx
                        || (x == bx && slope > bslope)
                        || (x == bx
                            && slope == bslope
                            && self.rank[edge.lower] > self.rank[self.status[b].lower])
                }
            };
            if better {
                best = Some((idx, x, slope));
            }
        }

        best.map(|(idx, _, _)| idx).ok_or(InternalError::SweepStatus(v))
    }
}

/// The x coordinate of the segment `uw` at height `y`, clamped to the segment.
fn x_at(u: Point, w: Point, y: f32) -> f64 {
    if u.y == w.y {
        return u.x.max(w.x) as f64;
    }

    let t = ((y as f64 - w.y as f64) / (u.y as f64 - w.y as f64)).max(0.0).min(1.0);
    w.x as f64 + t * (u.x as f64 - w.x as f64)
}

#[cfg(test)]
use crate::path::Contour;

#[cfg(test)]
fn contour(points: &[(f32, f32)]) -> Contour {
    Contour::new(points.iter().map(|&(x, y)| point(x, y)).collect())
}

#[cfg(test)]
fn check_triangles(triangles: &[[Point; 3]], expected_area: f64) {
    let mut area = 0.0;
    for t in triangles {
        let a = orient(t[0], t[1], t[2]);
        assert!(a > 0.0, "clockwise triangle {:?}", t);
        area += a * 0.5;
    }
    assert!(
        (area - expected_area).abs() < 1e-4 * expected_area.max(1.0),
        "area {} expected {}",
        area,
        expected_area
    );
}

#[test]
fn square() {
    let region = Region::new(contour(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]), 0);
    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert_eq!(stats.triangles, 2);
    assert!(!stats.used_fallback);
    check_triangles(&triangles, 1.0);
}

#[test]
fn clockwise_outer_boundary() {
    let region = Region::new(contour(&[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)]), 0);
    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert_eq!(stats.triangles, 2);
    check_triangles(&triangles, 6.0);
}

#[test]
fn square_with_hole() {
    let mut region = Region::new(
        contour(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]),
        0,
    );
    region.add_hole(contour(&[(4.0, 4.0), (4.0, 6.0), (6.0, 6.0), (6.0, 4.0)]), 1);

    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert!(!stats.used_fallback);
    assert_eq!(stats.triangles, 8);
    check_triangles(&triangles, 96.0);

    // No triangle covers the hole.
    for t in &triangles {
        let center = point(
            (t[0].x + t[1].x + t[2].x) / 3.0,
            (t[0].y + t[1].y + t[2].y) / 3.0,
        );
        assert!(!(center.x > 4.0 && center.x < 6.0 && center.y > 4.0 && center.y < 6.0));
    }
}

#[test]
fn several_holes() {
    let mut region = Region::new(
        contour(&[(0.0, 0.0), (20.0, 0.0), (20.0, 10.0), (0.0, 10.0)]),
        0,
    );
    region.add_hole(contour(&[(2.0, 2.0), (2.0, 8.0), (8.0, 8.0), (8.0, 2.0)]), 1);
    region.add_hole(contour(&[(12.0, 2.0), (12.0, 8.0), (18.0, 8.0), (18.0, 2.0)]), 2);
    region.add_hole(contour(&[(9.0, 4.0), (10.0, 6.0), (11.0, 4.0)]), 3);

    let mut triangles = Vec::new();
    triangulate_region(&region, &mut triangles).unwrap();
    check_triangles(&triangles, 200.0 - 36.0 - 36.0 - 2.0);
}

#[test]
fn diagonals_at_bridge_vertices() {
    // Holes flattened from circles. Bridging duplicates some of their vertices and the
    // sweep then ends diagonals on them.
    let mut region = Region::new(
        contour(&[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 20.0)]),
        0,
    );
    region.add_hole(
        contour(&[
            (4.4889717, 2.5),
            (2.9270306, 3.2396388),
            (2.1824825, 3.0499563),
            (1.9734132, 2.5),
            (1.9855986, 1.6090302),
            (3.3057036, 1.1044799),
        ]),
        1,
    );
    region.add_hole(
        contour(&[
            (8.808684, 1.1913164),
            (7.5, 1.4725006),
            (6.3880396, 1.3880395),
            (6.7484975, 2.5),
            (6.2046514, 3.7953486),
            (7.5, 3.1124916),
            (8.557866, 3.5578659),
            (9.3504095, 2.5),
        ]),
        2,
    );
    region.add_hole(
        contour(&[
            (8.16183, 6.8381705),
            (7.5, 6.017772),
            (6.7002506, 6.7002506),
            (6.304408, 7.5),
            (6.623544, 8.376456),
            (7.5, 8.910567),
            (8.21055, 8.21055),
            (8.322426, 7.5),
        ]),
        3,
    );

    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert!(!stats.used_fallback);
    check_triangles(&triangles, 387.7173);
}

#[cfg(test)]
fn regular_polygon(center: (f32, f32), radius: f32, sides: usize) -> Contour {
    let points: Vec<(f32, f32)> = (0..sides)
        .map(|i| {
            let angle = core::f32::consts::PI * 2.0 * i as f32 / sides as f32;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect();
    contour(&points)
}

#[test]
fn grid_of_holes() {
    let size = 8;
    let extent = 10.0 * size as f32;
    let mut region = Region::new(
        contour(&[(0.0, 0.0), (extent, 0.0), (extent, extent), (0.0, extent)]),
        0,
    );
    let mut holes_area = 0.0;
    for i in 0..size * size {
        let center = (10.0 * (i % size) as f32 + 5.0, 10.0 * (i / size) as f32 + 5.0);
        let hole = regular_polygon(center, 3.0, 12);
        holes_area += signed_area_f64(&hole.points);
        region.add_hole(hole, i + 1);
    }

    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert!(!stats.used_fallback);
    check_triangles(&triangles, (extent * extent) as f64 - holes_area.abs());
}

#[test]
fn comb() {
    // Teeth pointing up and down create split and merge vertices.
    let region = Region::new(
        contour(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.5, -2.0),
            (2.0, 0.0),
            (3.0, 0.0),
            (3.5, -2.0),
            (4.0, 0.0),
            (5.0, 0.0),
            (5.0, 2.0),
            (4.0, 2.0),
            (3.5, 4.0),
            (3.0, 2.0),
            (2.0, 2.0),
            (1.5, 4.0),
            (1.0, 2.0),
            (0.0, 2.0),
        ]),
        0,
    );
    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert!(!stats.used_fallback);
    assert_eq!(stats.triangles, 14);
    check_triangles(&triangles, 10.0 + 4.0);
}

#[test]
fn notches() {
    // Reflex vertices whose neighbors are both above (split) or below (merge).
    let region = Region::new(
        contour(&[
            (0.0, 0.0),
            (2.0, 1.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (2.0, 3.0),
            (0.0, 4.0),
        ]),
        0,
    );
    let mut triangles = Vec::new();
    let stats = triangulate_region(&region, &mut triangles).unwrap();
    assert!(!stats.used_fallback);
    check_triangles(&triangles, 16.0 - 2.0 - 2.0);

    let region = Region::new(
        contour(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (3.0, 1.0),
            (2.0, 4.0),
            (1.0, 1.0),
            (0.0, 4.0),
        ]),
        0,
    );
    let mut triangles = Vec::new();
    triangulate_region(&region, &mut triangles).unwrap();
    check_triangles(&triangles, signed_area_f64(&region.outer.points));
}

#[test]
fn collinear_vertices() {
    let region = Region::new(
        contour(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ]),
        0,
    );
    let mut triangles = Vec::new();
    triangulate_region(&region, &mut triangles).unwrap();
    check_triangles(&triangles, 4.0);
}

#[test]
fn pinched_polygon() {
    // A hole touching the outer boundary at (2, 0), traced as a single cycle.
    let region = Region::new(
        contour(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (3.0, 1.0),
            (2.0, 0.0),
            (4.0, 0.0),
            (4.0, 4.0),
            (0.0, 4.0),
        ]),
        0,
    );
    let mut triangles = Vec::new();
    triangulate_region(&region, &mut triangles).unwrap();
    check_triangles(&triangles, 14.0);
}

#[test]
fn degenerate_regions() {
    let region = Region::new(contour(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]), 3);
    let mut triangles = Vec::new();
    assert_eq!(
        triangulate_region(&region, &mut triangles),
        Err(TessellationError::DegenerateRegion {
            contour_index: 3,
            reason: DegenerateReason::TooSmall
        })
    );
    assert!(triangles.is_empty());

    // Hole sharing a vertex with the outer boundary.
    let mut region = Region::new(contour(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]), 0);
    region.add_hole(contour(&[(0.0, 0.0), (1.0, 2.0), (2.0, 1.0)]), 5);
    assert_eq!(
        triangulate_region(&region, &mut triangles),
        Err(TessellationError::DegenerateRegion {
            contour_index: 5,
            reason: DegenerateReason::HoleTouchesBoundary
        })
    );

    // Hole crossing the outer boundary.
    let mut region = Region::new(contour(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]), 0);
    region.add_hole(contour(&[(3.0, 1.0), (3.0, 2.0), (5.0, 2.0), (5.0, 1.0)]), 2);
    assert_eq!(
        triangulate_region(&region, &mut triangles),
        Err(TessellationError::DegenerateRegion {
            contour_index: 2,
            reason: DegenerateReason::HoleTouchesBoundary
        })
    );
    assert!(triangles.is_empty());
}

#[test]
fn ear_clipping_fallback() {
    let points = [
        point(0.0, 0.0),
        point(1.0, 0.0),
        point(1.5, -2.0),
        point(2.0, 0.0),
        point(5.0, 0.0),
        point(5.0, 2.0),
        point(3.5, 4.0),
        point(3.0, 2.0),
        point(0.0, 2.0),
    ];
    let mut tess = Triangulator::new();
    tess.positions = points.to_vec();
    tess.ear_clipping();
    assert_eq!(tess.raw_triangles.len(), points.len() - 2);
    let area = tess.collect_triangles();
    assert!((area - signed_area_f64(&points)).abs() < 1e-6);

    // Terminates on garbage.
    tess.positions = vec![
        point(0.0, 0.0),
        point(1.0, 1.0),
        point(0.0, 1.0),
        point(1.0, 0.0),
        point(0.5, 0.5),
    ];
    tess.ear_clipping();
    assert_eq!(tess.raw_triangles.len(), 3);
}
