//! Winding numbers, fill rule membership and the partition of contours into regions.
//!
//! The entry point is [`resolve_regions`]. Contours that neither cross nor touch each
//! other are classified directly through a containment forest. Otherwise the contours
//! are first decomposed into simple boundary cycles by the [arrangement](../arrangement/index.html).

use crate::arrangement;
use crate::error::Diagnostic;
use crate::math::*;
use crate::math_utils::{compare_positions, on_segment, orient, signed_area_f64};
use crate::path::{Contour, FillRule, Winding};

use std::collections::HashMap;

/// The winding number of a closed polygon around a point.
///
/// A ray is cast towards positive x. Edges are counted with the half-open rule
/// (`min_y <= y < max_y`) so that a ray going through a vertex is counted once.
/// The result is positive for counter-clockwise polygons.
pub fn contour_winding_number(p: Point, points: &[Point]) -> i32 {
    let n = points.len();
    let mut winding = 0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && orient(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && orient(a, b, p) < 0.0 {
            winding -= 1;
        }
    }

    winding
}

/// The sum of the winding numbers of all contours around a point.
pub fn winding_number(p: Point, contours: &[Contour]) -> i32 {
    contours
        .iter()
        .map(|contour| contour_winding_number(p, &contour.points))
        .sum()
}

/// Returns true if the point lies exactly on one of the edges of the polygon.
pub fn is_on_boundary(p: Point, points: &[Point]) -> bool {
    let n = points.len();
    (0..n).any(|i| on_segment(points[i], points[(i + 1) % n], p))
}

/// A set of contours interpreted with a fill rule.
#[derive(Copy, Clone, Debug)]
pub struct Shape<'l> {
    pub contours: &'l [Contour],
    pub fill_rule: FillRule,
}

impl<'l> Shape<'l> {
    pub fn new(contours: &'l [Contour], fill_rule: FillRule) -> Self {
        Shape {
            contours,
            fill_rule,
        }
    }

    #[inline]
    pub fn winding_number(&self, p: Point) -> i32 {
        winding_number(p, self.contours)
    }

    /// Whether a point is inside the filled area.
    ///
    /// Points lying exactly on an edge may be classified either way.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.fill_rule.is_in(self.winding_number(p))
    }
}

/// A filled area: one outer boundary and the holes inside of it.
///
/// The outer boundary is counter-clockwise, holes are clockwise, strictly inside the
/// outer boundary and disjoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub outer: Contour,
    pub holes: Vec<Contour>,
    /// Index of the contour the outer boundary originates from.
    pub source: usize,
    /// Index of the contour each hole originates from.
    pub hole_sources: Vec<usize>,
}

impl Region {
    pub fn new(outer: Contour, source: usize) -> Self {
        Region {
            outer,
            holes: Vec::new(),
            source,
            hole_sources: Vec::new(),
        }
    }

    pub fn add_hole(&mut self, hole: Contour, source: usize) {
        self.holes.push(hole);
        self.hole_sources.push(source);
    }

    /// The area of the outer boundary minus the area of the holes.
    pub fn area(&self) -> f32 {
        let holes: f32 = self.holes.iter().map(Contour::area).sum();
        self.outer.area() - holes
    }
}

/// The result of [`resolve_regions`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedRegions {
    pub regions: Vec<Region>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A contour along with how many times it counts in the winding number.
///
/// Exactly overlapping contours are merged into a single boundary whose weight is the
/// sum of their directions relative to the first of them.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Boundary {
    pub points: Vec<Point>,
    pub weight: i32,
    pub source: usize,
}

/// Applies the fill rule to a set of contours and partitions the filled area into regions.
///
/// Regions are produced in a deterministic order: by decreasing area of their outer
/// boundary, then by contour index.
pub fn resolve_regions(contours: &[Contour], fill_rule: FillRule) -> ResolvedRegions {
    let mut diagnostics = Vec::new();
    let boundaries = merge_duplicates(contours, &mut diagnostics);

    let polygons: Vec<&[Point]> = boundaries.iter().map(|b| &b.points[..]).collect();
    let regions = if arrangement::has_intersections(&polygons) {
        log::debug!("Resolving intersecting contours through an arrangement.");
        let cycles = arrangement::boundary_cycles(&boundaries, fill_rule);
        // The cycles separate filled and unfilled space with the filled side on their left.
        build_regions(&cycles, FillRule::NonZero)
    } else {
        build_regions(&boundaries, fill_rule)
    };

    ResolvedRegions {
        regions,
        diagnostics,
    }
}

/// Hashable identity of a position, `-0.0` and `0.0` being the same.
#[inline]
pub(crate) fn position_key(p: Point) -> (u32, u32) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

fn lowest_point(points: &[Point]) -> usize {
    let mut lowest = 0;
    for (i, p) in points.iter().enumerate().skip(1) {
        if compare_positions(*p, points[lowest]).is_lt() {
            lowest = i;
        }
    }

    lowest
}

/// Returns `Some(true)` if both polygons visit the same points in the same cyclic order,
/// `Some(false)` if they do in opposite orders and `None` otherwise.
fn same_cycle(a: &[Point], b: &[Point]) -> Option<bool> {
    let n = a.len();
    if b.len() != n {
        return None;
    }

    let sa = lowest_point(a);
    let sb = lowest_point(b);

    if (0..n).all(|i| a[(sa + i) % n] == b[(sb + i) % n]) {
        return Some(true);
    }
    if (0..n).all(|i| a[(sa + i) % n] == b[(sb + n - i) % n]) {
        return Some(false);
    }

    None
}

fn merge_duplicates(contours: &[Contour], diagnostics: &mut Vec<Diagnostic>) -> Vec<Boundary> {
    let mut boundaries: Vec<Boundary> = Vec::with_capacity(contours.len());
    let mut candidates: HashMap<(usize, (u32, u32)), Vec<usize>> = HashMap::new();

    'contours: for (idx, contour) in contours.iter().enumerate() {
        if contour.len() < 3 {
            continue;
        }

        let key = (
            contour.len(),
            position_key(contour.points[lowest_point(&contour.points)]),
        );

        if let Some(others) = candidates.get(&key) {
            for &b in others {
                if let Some(same_direction) = same_cycle(&boundaries[b].points, &contour.points) {
                    let boundary = &mut boundaries[b];
                    boundary.weight += if same_direction { 1 } else { -1 };
                    log::debug!(
                        "Contour {} exactly overlaps contour {}, merging them.",
                        idx,
                        boundary.source,
                    );
                    diagnostics.push(Diagnostic::AmbiguousContainment {
                        contour: idx,
                        other: boundary.source,
                    });
                    continue 'contours;
                }
            }
        }

        candidates.entry(key).or_default().push(boundaries.len());
        boundaries.push(Boundary {
            points: contour.points.clone(),
            weight: 1,
            source: idx,
        });
    }

    boundaries
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Role {
    Discarded,
    Outer(usize),
    Hole,
}

fn contains_box(outer: &Box2D, inner: &Box2D) -> bool {
    outer.min.x <= inner.min.x
        && outer.min.y <= inner.min.y
        && outer.max.x >= inner.max.x
        && outer.max.y >= inner.max.y
}

/// Builds the containment forest of non-intersecting boundaries and walks it from the
/// roots to find which of them separate filled from unfilled space.
pub(crate) fn build_regions(boundaries: &[Boundary], fill_rule: FillRule) -> Vec<Region> {
    let n = boundaries.len();
    let areas: Vec<f64> = boundaries
        .iter()
        .map(|b| signed_area_f64(&b.points))
        .collect();
    let bounds: Vec<Box2D> = boundaries
        .iter()
        .map(|b| Box2D::from_points(b.points.iter()))
        .collect();

    let mut order: Vec<usize> = (0..n)
        .filter(|&i| areas[i] != 0.0 && boundaries[i].weight != 0)
        .collect();
    order.sort_by(|&a, &b| {
        areas[b]
            .abs()
            .partial_cmp(&areas[a].abs())
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut parent: Vec<Option<usize>> = vec![None; n];
    for (k, &i) in order.iter().enumerate() {
        let mut best: Option<usize> = None;
        for &j in &order[..k] {
            if areas[j].abs() <= areas[i].abs() || !contains_box(&bounds[j], &bounds[i]) {
                continue;
            }

            let representative = boundaries[i]
                .points
                .iter()
                .copied()
                .find(|p| !is_on_boundary(*p, &boundaries[j].points));

            let contained = match representative {
                Some(p) => contour_winding_number(p, &boundaries[j].points) != 0,
                None => false,
            };

            if !contained {
                continue;
            }

            best = match best {
                Some(b) if areas[b].abs() <= areas[j].abs() => Some(b),
                _ => Some(j),
            };
        }
        parent[i] = best;
    }

    let mut inside = vec![0i32; n];
    let mut roles = vec![Role::Discarded; n];
    let mut regions: Vec<Region> = Vec::new();

    for &i in &order {
        let boundary = &boundaries[i];
        let outside = parent[i].map(|p| inside[p]).unwrap_or(0);
        let sign = if areas[i] > 0.0 { 1 } else { -1 };
        inside[i] = outside + boundary.weight * sign;

        let filled_inside = fill_rule.is_in(inside[i]);
        if filled_inside == fill_rule.is_in(outside) {
            continue;
        }

        let mut contour = Contour::new(boundary.points.clone());
        if filled_inside {
            contour.set_winding(Winding::Positive);
            roles[i] = Role::Outer(regions.len());
            regions.push(Region::new(contour, boundary.source));
            continue;
        }

        roles[i] = Role::Hole;
        let mut ancestor = parent[i];
        while let Some(a) = ancestor {
            if let Role::Outer(region) = roles[a] {
                contour.set_winding(Winding::Negative);
                regions[region].add_hole(contour, boundary.source);
                break;
            }
            ancestor = parent[a];
        }

        if ancestor.is_none() {
            log::debug!("Contour {} bounds an unfilled area outside of any region.", boundary.source);
        }
    }

    regions
}

#[cfg(test)]
fn square(x0: f32, y0: f32, x1: f32, y1: f32) -> Contour {
    Contour::new(vec![
        point(x0, y0),
        point(x1, y0),
        point(x1, y1),
        point(x0, y1),
    ])
}

#[test]
fn square_winding_number() {
    let ccw = square(0.0, 0.0, 1.0, 1.0);
    let cw = ccw.reversed();

    assert_eq!(contour_winding_number(point(0.5, 0.5), &ccw.points), 1);
    assert_eq!(contour_winding_number(point(0.5, 0.5), &cw.points), -1);
    assert_eq!(contour_winding_number(point(1.5, 0.5), &ccw.points), 0);
    // The ray goes exactly through the vertices at y = 1 and y = 0.
    assert_eq!(contour_winding_number(point(-1.0, 1.0), &ccw.points), 0);
    assert_eq!(contour_winding_number(point(-1.0, 0.0), &ccw.points), 0);

    assert!(is_on_boundary(point(0.5, 0.0), &ccw.points));
    assert!(is_on_boundary(point(1.0, 1.0), &ccw.points));
    assert!(!is_on_boundary(point(0.5, 0.5), &ccw.points));
}

#[test]
fn shape_contains() {
    let contours = vec![square(0.0, 0.0, 4.0, 4.0), square(1.0, 1.0, 3.0, 3.0)];

    let even_odd = Shape::new(&contours, FillRule::EvenOdd);
    assert!(even_odd.contains(point(0.5, 0.5)));
    assert!(!even_odd.contains(point(2.0, 2.0)));
    assert!(!even_odd.contains(point(5.0, 2.0)));

    let non_zero = Shape::new(&contours, FillRule::NonZero);
    assert!(non_zero.contains(point(2.0, 2.0)));
    assert_eq!(non_zero.winding_number(point(2.0, 2.0)), 2);
}

#[test]
fn nested_squares_classification() {
    let outer = square(0.0, 0.0, 4.0, 4.0);
    let inner = square(1.0, 1.0, 3.0, 3.0);

    // Same direction: a hole with even-odd, filled with non-zero.
    let same = vec![outer.clone(), inner.clone()];
    let resolved = resolve_regions(&same, FillRule::EvenOdd);
    assert_eq!(resolved.regions.len(), 1);
    assert_eq!(resolved.regions[0].holes.len(), 1);
    assert_eq!(resolved.regions[0].hole_sources, vec![1]);
    assert_eq!(resolved.regions[0].area(), 12.0);

    let resolved = resolve_regions(&same, FillRule::NonZero);
    assert_eq!(resolved.regions.len(), 1);
    assert!(resolved.regions[0].holes.is_empty());
    assert_eq!(resolved.regions[0].area(), 16.0);

    // Opposite directions: a hole with both rules.
    let opposite = vec![outer, inner.reversed()];
    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let resolved = resolve_regions(&opposite, rule);
        assert_eq!(resolved.regions.len(), 1);
        assert_eq!(resolved.regions[0].holes.len(), 1);
    }
}

#[test]
fn region_orientation() {
    let contours = vec![square(0.0, 0.0, 4.0, 4.0).reversed(), square(1.0, 1.0, 3.0, 3.0)];
    let resolved = resolve_regions(&contours, FillRule::EvenOdd);

    let region = &resolved.regions[0];
    assert_eq!(region.source, 0);
    assert_eq!(region.outer.winding(), Some(Winding::Positive));
    assert_eq!(region.holes[0].winding(), Some(Winding::Negative));
}

#[test]
fn island_inside_hole() {
    let contours = vec![
        square(0.0, 0.0, 10.0, 10.0),
        square(1.0, 1.0, 9.0, 9.0),
        square(2.0, 2.0, 8.0, 8.0),
        square(3.0, 3.0, 7.0, 7.0),
    ];

    let resolved = resolve_regions(&contours, FillRule::EvenOdd);
    assert_eq!(resolved.regions.len(), 2);
    assert_eq!(resolved.regions[0].source, 0);
    assert_eq!(resolved.regions[0].hole_sources, vec![1]);
    assert_eq!(resolved.regions[1].source, 2);
    assert_eq!(resolved.regions[1].hole_sources, vec![3]);
}

#[test]
fn disjoint_contours() {
    let contours = vec![square(0.0, 0.0, 1.0, 1.0), square(2.0, 0.0, 4.0, 2.0)];
    let resolved = resolve_regions(&contours, FillRule::NonZero);

    // Larger areas first.
    assert_eq!(resolved.regions.len(), 2);
    assert_eq!(resolved.regions[0].source, 1);
    assert_eq!(resolved.regions[1].source, 0);
    assert!(resolved.diagnostics.is_empty());
}

#[test]
fn exactly_overlapping_contours() {
    let a = square(0.0, 0.0, 2.0, 2.0);
    let mut b = a.clone();
    b.points.rotate_left(2);

    // Same direction, counted twice.
    let contours = vec![a.clone(), b.clone()];
    let resolved = resolve_regions(&contours, FillRule::EvenOdd);
    assert!(resolved.regions.is_empty());
    assert_eq!(
        resolved.diagnostics,
        vec![Diagnostic::AmbiguousContainment {
            contour: 1,
            other: 0
        }]
    );

    let resolved = resolve_regions(&contours, FillRule::NonZero);
    assert_eq!(resolved.regions.len(), 1);
    assert_eq!(resolved.regions[0].source, 0);

    // Opposite directions cancel out.
    let contours = vec![a, b.reversed()];
    let resolved = resolve_regions(&contours, FillRule::NonZero);
    assert!(resolved.regions.is_empty());
    assert_eq!(resolved.diagnostics.len(), 1);
}
