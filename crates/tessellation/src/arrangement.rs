//! Decomposition of crossing and touching contours into simple boundary cycles.
//!
//! When contours intersect, the containment forest of the winding resolver is not enough
//! to classify them. The arrangement splits every edge at every intersection, merges
//! the sub-edges that coincide, evaluates the winding number on both sides of each of them
//! and keeps those that separate filled from unfilled space. The kept edges are oriented
//! with the filled side on their left and traced into cycles, taking the tightest turn at
//! vertices shared by several cycles. Outer cycles are counter-clockwise, hole cycles are
//! clockwise. A hole touching its outer boundary at a vertex is traced as part of the outer
//! cycle, which then visits that vertex twice.

use crate::math::*;
use crate::math_utils::{
    clockwise_angle, compare_positions, line_intersection, on_segment, orient, segments_touch,
};
use crate::path::{Contour, FillRule};
use crate::winding::{position_key, Boundary};

use std::collections::HashMap;

/// Identifies the edge going from `points[edge]` to `points[edge + 1]` of a contour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeRef {
    pub contour: usize,
    pub edge: usize,
}

/// A pair of edges that cross, touch or overlap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeIntersection {
    pub a: EdgeRef,
    pub b: EdgeRef,
}

struct SweepEdge {
    from: Point,
    to: Point,
    min_y: f32,
    max_y: f32,
    id: EdgeRef,
    contour_len: usize,
}

/// Finds all pairs of edges that cross, touch or overlap.
///
/// Two consecutive edges of a contour only count if they fold back onto each other.
/// Pairs are reported with `a < b`, in sweep order.
pub fn find_intersections(contours: &[Contour]) -> Vec<EdgeIntersection> {
    let polygons: Vec<&[Point]> = contours.iter().map(|c| &c.points[..]).collect();
    let mut result = Vec::new();
    for_each_intersection(&polygons, &mut |a, b| {
        result.push(EdgeIntersection { a, b });
        true
    });

    result
}

pub(crate) fn has_intersections(polygons: &[&[Point]]) -> bool {
    let mut found = false;
    for_each_intersection(polygons, &mut |_, _| {
        found = true;
        false
    });

    found
}

fn sweep_edges(polygons: &[&[Point]]) -> Vec<SweepEdge> {
    let mut edges = Vec::new();
    for (contour, points) in polygons.iter().enumerate() {
        let n = points.len();
        for edge in 0..n {
            let from = points[edge];
            let to = points[(edge + 1) % n];
            edges.push(SweepEdge {
                from,
                to,
                min_y: from.y.min(to.y),
                max_y: from.y.max(to.y),
                id: EdgeRef { contour, edge },
                contour_len: n,
            });
        }
    }

    edges.sort_by(|a, b| {
        a.min_y
            .partial_cmp(&b.min_y)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });

    edges
}

/// Sweeps the edges by increasing lower y, testing each edge against the edges whose
/// y range overlaps. Stops as soon as the callback returns false.
pub(crate) fn for_each_intersection(
    polygons: &[&[Point]],
    callback: &mut dyn FnMut(EdgeRef, EdgeRef) -> bool) {
    let edges = sweep_edges(polygons);
    let mut active: Vec<usize> = Vec::new();

    for (i, edge) in edges.iter().enumerate() {
        active.retain(|&j| edges[j].max_y >= edge.min_y);

        for &j in &active {
            if edges_interact(&edges[j], edge) {
                let (a, b) = if edges[j].id < edge.id {
                    (edges[j].id, edge.id)
                } else {
                    (edge.id, edges[j].id)
                };

                if !callback(a, b) {
                    return;
                }
            }
        }

        active.push(i);
    }
}

fn edges_interact(a: &SweepEdge, b: &SweepEdge) -> bool {
    if a.id.contour == b.id.contour {
        let n = a.contour_len;
        let shared = if (a.id.edge + 1) % n == b.id.edge {
            Some((a.from, a.to, b.to))
        } else if (b.id.edge + 1) % n == a.id.edge {
            Some((b.from, b.to, a.to))
        } else {
            None
        };

        if let Some((before, vertex, after)) = shared {
            // Consecutive edges only meet at their shared vertex, unless they fold back.
            let d1 = before - vertex;
            let d2 = after - vertex;
            return orient(before, vertex, after) == 0.0 && d1.dot(d2) > 0.0;
        }
    }

    segments_touch(a.from, a.to, b.from, b.to)
}

struct SplitEdge {
    from: Point,
    to: Point,
    weight: i32,
    source: usize,
    splits: Vec<Point>,
}

/// A sub-edge stored from its lower to its upper end point in sweep order.
struct CanonicalEdge {
    lower: Point,
    upper: Point,
    /// Sum of the weights of the coinciding sub-edges, counted positively when they go
    /// from `lower` to `upper`.
    weight: i32,
    source: usize,
}

/// Computes the boundary cycles of the area filled according to the fill rule.
///
/// Each cycle has weight 1: the filled area is where the sum of the cycles' winding
/// numbers is not zero.
pub(crate) fn boundary_cycles(boundaries: &[Boundary], fill_rule: FillRule) -> Vec<Boundary> {
    let mut edges = Vec::new();
    let mut polygons: Vec<&[Point]> = Vec::new();
    let mut first_edge = Vec::new();
    for boundary in boundaries {
        first_edge.push(edges.len());
        polygons.push(&boundary.points);
        let n = boundary.points.len();
        for i in 0..n {
            edges.push(SplitEdge {
                from: boundary.points[i],
                to: boundary.points[(i + 1) % n],
                weight: boundary.weight,
                source: boundary.source,
                splits: Vec::new(),
            });
        }
    }

    for_each_intersection(&polygons, &mut |a, b| {
        let ea = first_edge[a.contour] + a.edge;
        let eb = first_edge[b.contour] + b.edge;
        add_splits(&mut edges, ea, eb);
        true
    });

    let canonical = merge_sub_edges(&mut edges);
    let directed = filled_boundary(&canonical, fill_rule);

    trace_cycles(&directed)
}

fn add_splits(edges: &mut [SplitEdge], a: usize, b: usize) {
    let (p1, p2) = (edges[a].from, edges[a].to);
    let (q1, q2) = (edges[b].from, edges[b].to);

    let o1 = orient(p1, p2, q1);
    let o2 = orient(p1, p2, q2);
    let o3 = orient(q1, q2, p1);
    let o4 = orient(q1, q2, p2);
    let proper = o1 * o2 < 0.0 && o3 * o4 < 0.0;

    if proper {
        if let Some(x) = line_intersection(p1, p2, q1, q2) {
            edges[a].splits.push(x);
            edges[b].splits.push(x);
        }
        return;
    }

    for &q in &[q1, q2] {
        if on_segment(p1, p2, q) {
            edges[a].splits.push(q);
        }
    }
    for &p in &[p1, p2] {
        if on_segment(q1, q2, p) {
            edges[b].splits.push(p);
        }
    }
}

/// Splits the edges at their intersections and merges the coinciding sub-edges.
fn merge_sub_edges(edges: &mut [SplitEdge]) -> Vec<CanonicalEdge> {
    let mut canonical: Vec<CanonicalEdge> = Vec::new();
    let mut lookup: HashMap<((u32, u32), (u32, u32)), usize> = HashMap::new();
    let mut points = Vec::new();

    for edge in edges.iter_mut() {
        let from = edge.from;
        let dir = edge.to - edge.from;
        edge.splits.sort_by(|a, b| {
            let ta = (*a - from).dot(dir);
            let tb = (*b - from).dot(dir);
            ta.partial_cmp(&tb).unwrap_or(core::cmp::Ordering::Equal)
        });

        points.clear();
        points.push(edge.from);
        points.extend(edge.splits.iter().copied());
        points.push(edge.to);
        points.dedup();

        for pair in points.windows(2) {
            let (lower, upper, sign) = if compare_positions(pair[0], pair[1]).is_lt() {
                (pair[0], pair[1], 1)
            } else {
                (pair[1], pair[0], -1)
            };

            let key = (position_key(lower), position_key(upper));
            let idx = *lookup.entry(key).or_insert_with(|| {
                canonical.push(CanonicalEdge {
                    lower,
                    upper,
                    weight: 0,
                    source: edge.source,
                });
                canonical.len() - 1
            });

            let c = &mut canonical[idx];
            c.weight += sign * edge.weight;
            c.source = c.source.min(edge.source);
        }
    }

    canonical.retain(|edge| edge.weight != 0);

    canonical
}

/// Contribution of an edge to the winding number, casting a ray towards positive x.
fn horizontal_crossing(p: Point, a: Point, b: Point, weight: i32) -> i32 {
    if a.y <= p.y {
        if b.y > p.y && orient(a, b, p) > 0.0 {
            return weight;
        }
    } else if b.y <= p.y && orient(a, b, p) < 0.0 {
        return -weight;
    }

    0
}

/// Contribution of an edge to the winding number, casting a ray towards positive y.
fn vertical_crossing(p: Point, a: Point, b: Point, weight: i32) -> i32 {
    if b.x <= p.x && p.x < a.x {
        if orient(a, b, p) > 0.0 {
            return weight;
        }
    } else if a.x <= p.x && p.x < b.x && orient(a, b, p) < 0.0 {
        return -weight;
    }

    0
}

/// Keeps the sub-edges separating filled from unfilled space, oriented with the filled
/// side on their left. Returns `(from, to, source)` triples.
fn filled_boundary(edges: &[CanonicalEdge], fill_rule: FillRule) -> Vec<(Point, Point, usize)> {
    let mut result = Vec::new();

    for (i, edge) in edges.iter().enumerate() {
        let mid = edge.lower.lerp(edge.upper, 0.5);
        let horizontal = edge.lower.y == edge.upper.y;

        // The winding number along the ray from the midpoint, ignoring the edge itself.
        let mut base = 0;
        for (j, other) in edges.iter().enumerate() {
            if i == j {
                continue;
            }
            base += if horizontal {
                vertical_crossing(mid, other.lower, other.upper, other.weight)
            } else {
                horizontal_crossing(mid, other.lower, other.upper, other.weight)
            };
        }

        // Canonical edges go up, or go towards positive x when horizontal. Their left side
        // is towards negative x in the former case and positive y in the latter.
        let (left, right) = if horizontal {
            (base, base - edge.weight)
        } else {
            (base + edge.weight, base)
        };

        let left_in = fill_rule.is_in(left);
        if left_in == fill_rule.is_in(right) {
            continue;
        }

        if left_in {
            result.push((edge.lower, edge.upper, edge.source));
        } else {
            result.push((edge.upper, edge.lower, edge.source));
        }
    }

    result
}

fn trace_cycles(edges: &[(Point, Point, usize)]) -> Vec<Boundary> {
    let mut vertex_ids: HashMap<(u32, u32), usize> = HashMap::new();
    let mut outgoing: Vec<Vec<usize>> = Vec::new();
    let mut ends: Vec<(usize, usize)> = Vec::with_capacity(edges.len());
    let mut positions: Vec<Point> = Vec::new();

    let mut vertex = |p: Point, outgoing: &mut Vec<Vec<usize>>, positions: &mut Vec<Point>| {
        *vertex_ids.entry(position_key(p)).or_insert_with(|| {
            outgoing.push(Vec::new());
            positions.push(p);
            positions.len() - 1
        })
    };

    for (i, &(from, to, _)) in edges.iter().enumerate() {
        let a = vertex(from, &mut outgoing, &mut positions);
        let b = vertex(to, &mut outgoing, &mut positions);
        outgoing[a].push(i);
        ends.push((a, b));
    }

    // Arriving at a vertex, leave through the outgoing edge that makes the tightest
    // clockwise turn from the edge we came from.
    let next_edge = |e: usize| -> Option<usize> {
        let (u, v) = ends[e];
        let back = positions[u] - positions[v];
        let mut best: Option<(f64, usize)> = None;
        for &o in &outgoing[v] {
            let angle = clockwise_angle(back, positions[ends[o].1] - positions[v]);
            match best {
                Some((a, _)) if a <= angle => {}
                _ => best = Some((angle, o)),
            }
        }

        best.map(|(_, o)| o)
    };

    let mut used = vec![false; edges.len()];
    let mut cycles = Vec::new();
    for start in 0..edges.len() {
        if used[start] {
            continue;
        }

        used[start] = true;
        let mut cycle = vec![start];
        let mut current = start;
        let closed = loop {
            match next_edge(current) {
                Some(e) if e == start => break true,
                Some(e) if !used[e] && cycle.len() <= edges.len() => {
                    used[e] = true;
                    cycle.push(e);
                    current = e;
                }
                _ => break false,
            }
        };

        if !closed {
            log::debug!("Dropping an open boundary chain of {} edges.", cycle.len());
            continue;
        }

        let points: Vec<Point> = cycle.iter().map(|&e| edges[e].0).collect();
        if points.len() < 3 {
            continue;
        }

        let source = cycle.iter().map(|&e| edges[e].2).min().unwrap_or(0);
        cycles.push(Boundary {
            points,
            weight: 1,
            source,
        });
    }

    cycles
}

#[cfg(test)]
fn cycle_area(cycle: &Boundary) -> f64 {
    crate::math_utils::signed_area_f64(&cycle.points)
}

#[cfg(test)]
fn boundary(points: &[(f32, f32)], source: usize) -> Boundary {
    Boundary {
        points: points.iter().map(|&(x, y)| point(x, y)).collect(),
        weight: 1,
        source,
    }
}

#[test]
fn crossing_squares_intersections() {
    let contours = vec![
        Contour::new(vec![
            point(0.0, 0.0),
            point(2.0, 0.0),
            point(2.0, 2.0),
            point(0.0, 2.0),
        ]),
        Contour::new(vec![
            point(1.0, 1.0),
            point(3.0, 1.0),
            point(3.0, 3.0),
            point(1.0, 3.0),
        ]),
    ];

    let intersections = find_intersections(&contours);
    assert_eq!(intersections.len(), 2);
    for i in &intersections {
        assert_eq!(i.a.contour, 0);
        assert_eq!(i.b.contour, 1);
    }

    assert!(find_intersections(&contours[..1]).is_empty());
}

#[test]
fn folded_edges_intersect() {
    // Goes back along its first edge.
    let contours = vec![Contour::new(vec![
        point(0.0, 0.0),
        point(2.0, 0.0),
        point(1.0, 0.0),
        point(1.0, 1.0),
    ])];

    assert!(!find_intersections(&contours).is_empty());
}

#[test]
fn bowtie_cycles() {
    let bowtie = vec![boundary(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)], 0)];

    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let cycles = boundary_cycles(&bowtie, rule);
        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert_eq!(cycle.points.len(), 3);
            assert_eq!(cycle_area(cycle), 1.0);
        }
    }
}

#[test]
fn overlapping_squares_cycles() {
    let squares = vec![
        boundary(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)], 0),
        boundary(&[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)], 1),
    ];

    // The union.
    let cycles = boundary_cycles(&squares, FillRule::NonZero);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycle_area(&cycles[0]), 7.0);

    // The union minus the intersection: a pinched cycle and the hole-free other half,
    // touching at two corners.
    let cycles = boundary_cycles(&squares, FillRule::EvenOdd);
    let total: f64 = cycles.iter().map(cycle_area).sum();
    assert_eq!(total, 6.0);
    assert!(cycles.iter().all(|c| cycle_area(c) > 0.0));
}

#[test]
fn hole_touching_outer_is_pinched() {
    let shapes = vec![
        boundary(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 0),
        boundary(&[(2.0, 0.0), (3.0, 2.0), (1.0, 2.0)], 1),
    ];

    let cycles = boundary_cycles(&shapes, FillRule::EvenOdd);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].points.len(), 8);
    assert_eq!(cycle_area(&cycles[0]), 14.0);
    let pinch = point(2.0, 0.0);
    assert_eq!(cycles[0].points.iter().filter(|p| **p == pinch).count(), 2);
}
