//! Various geometric predicates that are mostly useful for the tessellators.
//!
//! Orientation tests are evaluated in f64: the differences of f32 coordinates and their
//! products are exact in double precision, which keeps the sign of the result reliable
//! for all but the most pathological inputs.

use crate::math::*;

use core::cmp::Ordering;
use core::f64::consts::PI;

/// Twice the signed area of the triangle `abc`, positive if counter-clockwise.
#[inline]
pub fn orient(a: Point, b: Point, c: Point) -> f64 {
    let abx = b.x as f64 - a.x as f64;
    let aby = b.y as f64 - a.y as f64;
    let acx = c.x as f64 - a.x as f64;
    let acy = c.y as f64 - a.y as f64;

    abx * acy - aby * acx
}

#[inline]
pub fn cross(u: Vector, v: Vector) -> f64 {
    u.x as f64 * v.y as f64 - u.y as f64 * v.x as f64
}

/// Sweep order: increasing y, then increasing x.
#[inline]
pub fn compare_positions(a: Point, b: Point) -> Ordering {
    a.y.partial_cmp(&b.y)
        .unwrap_or(Ordering::Equal)
        .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
}

#[inline]
fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Returns true if `p` lies on the closed segment `ab`.
#[inline]
pub fn on_segment(a: Point, b: Point, p: Point) -> bool {
    orient(a, b, p) == 0.0 && within_box(a, b, p)
}

/// Returns true if the closed segments `p1p2` and `q1q2` share at least one point.
pub fn segments_touch(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let o1 = orient(p1, p2, q1);
    let o2 = orient(p1, p2, q2);
    let o3 = orient(q1, q2, p1);
    let o4 = orient(q1, q2, p2);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }

    (o1 == 0.0 && within_box(p1, p2, q1))
        || (o2 == 0.0 && within_box(p1, p2, q2))
        || (o3 == 0.0 && within_box(q1, q2, p1))
        || (o4 == 0.0 && within_box(q1, q2, p2))
}

/// The crossing point of two segments that properly intersect.
///
/// Returns `None` if the segments are parallel.
pub fn line_intersection(p1: Point, p2: Point, q1: Point, q2: Point) -> Option<Point> {
    let d = cross(p2 - p1, q2 - q1);
    if d == 0.0 {
        return None;
    }

    let t = (cross(q1 - p1, q2 - q1) / d).max(0.0).min(1.0);
    let x = p1.x as f64 + (p2.x as f64 - p1.x as f64) * t;
    let y = p1.y as f64 + (p2.y as f64 - p1.y as f64) * t;

    Some(point(x as f32, y as f32))
}

/// Whether the direction from `v` towards `target` points strictly into the wedge on the
/// left side of the polyline `prev -> v -> next`.
///
/// For a counter-clockwise polygon this is the interior side at vertex `v`.
pub fn in_wedge(prev: Point, v: Point, next: Point, target: Point) -> bool {
    let to_next = next - v;
    let to_prev = prev - v;
    let d = target - v;

    if cross(to_next, to_prev) > 0.0 {
        cross(to_next, d) > 0.0 && cross(d, to_prev) > 0.0
    } else {
        !(cross(to_prev, d) >= 0.0 && cross(d, to_next) >= 0.0)
    }
}

/// Angle in `(0, 2π]` swept when turning clockwise from the direction `from` to the
/// direction `to`. Turning back onto `from` itself gives `2π`.
pub fn clockwise_angle(from: Vector, to: Vector) -> f64 {
    let a = (from.y as f64).atan2(from.x as f64);
    let b = (to.y as f64).atan2(to.x as f64);
    let mut angle = a - b;
    while angle <= 0.0 {
        angle += 2.0 * PI;
    }
    while angle > 2.0 * PI {
        angle -= 2.0 * PI;
    }

    angle
}

/// Half of the shoelace sum, in f64.
pub fn signed_area_f64(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 1..(n - 1) {
        area += orient(points[0], points[i], points[i + 1]);
    }

    area * 0.5
}

#[test]
fn test_orient() {
    assert!(orient(point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0)) > 0.0);
    assert!(orient(point(0.0, 0.0), point(0.0, 1.0), point(1.0, 0.0)) < 0.0);
    assert_eq!(orient(point(0.0, 0.0), point(1.0, 1.0), point(3.0, 3.0)), 0.0);
}

#[test]
fn test_segments_touch() {
    let a = point(0.0, 0.0);
    let b = point(2.0, 2.0);
    // Proper crossing.
    assert!(segments_touch(a, b, point(0.0, 2.0), point(2.0, 0.0)));
    // T junction.
    assert!(segments_touch(a, b, point(1.0, 1.0), point(2.0, 0.0)));
    // Shared end point.
    assert!(segments_touch(a, b, b, point(3.0, 0.0)));
    // Collinear overlap.
    assert!(segments_touch(a, b, point(1.0, 1.0), point(3.0, 3.0)));
    // Collinear, disjoint.
    assert!(!segments_touch(a, b, point(3.0, 3.0), point(4.0, 4.0)));
    // Parallel.
    assert!(!segments_touch(a, b, point(1.0, 0.0), point(3.0, 2.0)));
}

#[test]
fn test_line_intersection() {
    let p = line_intersection(
        point(0.0, 0.0),
        point(2.0, 2.0),
        point(0.0, 2.0),
        point(2.0, 0.0),
    );
    assert_eq!(p, Some(point(1.0, 1.0)));
    assert_eq!(
        line_intersection(
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(0.0, 1.0),
            point(1.0, 1.0)
        ),
        None
    );
}

#[test]
fn test_clockwise_angle() {
    let right = vector(1.0, 0.0);
    let down = vector(0.0, -1.0);
    assert!((clockwise_angle(right, down) - PI * 0.5).abs() < 1e-9);
    assert!((clockwise_angle(down, right) - PI * 1.5).abs() < 1e-9);
    assert!((clockwise_angle(right, right) - PI * 2.0).abs() < 1e-9);
}

#[test]
fn test_in_wedge() {
    // Convex corner of a counter-clockwise square.
    let prev = point(0.0, 1.0);
    let v = point(0.0, 0.0);
    let next = point(1.0, 0.0);
    assert!(in_wedge(prev, v, next, point(1.0, 1.0)));
    assert!(!in_wedge(prev, v, next, point(-1.0, -1.0)));
    assert!(!in_wedge(prev, v, next, point(2.0, 0.0)));

    // Reflex corner: everything but the quadrant between the edges is inside.
    assert!(in_wedge(next, v, prev, point(-1.0, -1.0)));
    assert!(in_wedge(next, v, prev, point(-1.0, 1.0)));
    assert!(!in_wedge(next, v, prev, point(1.0, 1.0)));
}
