use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{point, Box2D, LineSegment, Point, QuadraticBezierSegment};
use arrayvec::ArrayVec;

#[cfg(test)]
use std::vec::Vec;

/// Maximum number of times a curve is split in half while flattening.
///
/// Portions of a curve that are still not flat enough at this depth are approximated
/// by their chord.
pub const MAX_SUBDIVISION_DEPTH: u32 = 20;

// At most one pending half per subdivision level plus the one being processed.
const FLATTENING_STACK_CAPACITY: usize = MAX_SUBDIVISION_DEPTH as usize + 4;

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl1: Point<S>,
    pub ctrl2: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> CubicBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from * one_t3
            + self.ctrl1.to_vector() * S::THREE * one_t2 * t
            + self.ctrl2.to_vector() * S::THREE * one_t * t2
            + self.to.to_vector() * t3
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.to
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (CubicBezierSegment<S>, CubicBezierSegment<S>) {
        let ctrl1a = self.from + (self.ctrl1 - self.from) * t;
        let ctrl2a = self.ctrl1 + (self.ctrl2 - self.ctrl1) * t;
        let ctrl1aa = ctrl1a + (ctrl2a - ctrl1a) * t;
        let ctrl3a = self.ctrl2 + (self.to - self.ctrl2) * t;
        let ctrl2aa = ctrl2a + (ctrl3a - ctrl2a) * t;
        let ctrl1aaa = ctrl1aa + (ctrl2aa - ctrl1aa) * t;

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: ctrl1aaa,
            },
            CubicBezierSegment {
                from: ctrl1aaa,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        CubicBezierSegment {
            from: self.to,
            ctrl1: self.ctrl2,
            ctrl2: self.ctrl1,
            to: self.from,
        }
    }

    /// Maximum distance between the control points and the chord.
    ///
    /// Since the curve is contained in the convex hull of its control points, the
    /// curve is within this distance of its chord. When the chord is reduced to a
    /// point, the distance to that point is used.
    pub fn flatness(&self) -> S {
        let baseline = self.baseline();
        let d1 = baseline.square_distance_to_point(self.ctrl1);
        let d2 = baseline.square_distance_to_point(self.ctrl2);

        S::max(d1, d2).sqrt()
    }

    /// Returns true if the curve can be approximated with a single line segment, given
    /// a tolerance threshold.
    #[inline]
    pub fn is_linear(&self, tolerance: S) -> bool {
        self.flatness() <= tolerance
    }

    /// Returns a conservative rectangle that contains the curve.
    pub fn fast_bounding_box(&self) -> Box2D<S> {
        let min_x = self.from.x.min(self.ctrl1.x).min(self.ctrl2.x).min(self.to.x);
        let max_x = self.from.x.max(self.ctrl1.x).max(self.ctrl2.x).max(self.to.x);
        let min_y = self.from.y.min(self.ctrl1.y).min(self.ctrl2.y).min(self.to.y);
        let max_y = self.from.y.max(self.ctrl1.y).max(self.ctrl2.y).max(self.to.y);

        Box2D {
            min: point(min_x, min_y),
            max: point(max_x, max_y),
        }
    }

    /// Returns the flattened representation of the curve as an iterator, starting *after* the
    /// current point.
    pub fn flattened(&self, tolerance: S) -> Flattened<S> {
        Flattened::new(self, tolerance)
    }

    /// Iterates through the curve invoking a callback at each point.
    ///
    /// Returns `true` if the subdivision depth limit was reached.
    pub fn for_each_flattened<F: FnMut(&LineSegment<S>)>(&self, tolerance: S, callback: &mut F) -> bool {
        let mut iter = self.flattened(tolerance);
        let mut from = self.from;
        for to in &mut iter {
            callback(&LineSegment { from, to });
            from = to;
        }

        iter.reached_depth_limit()
    }

    /// Returns the quadratic curve with the same end points whose control point is the
    /// average of the two control points extrapolations.
    pub fn to_quadratic(&self) -> QuadraticBezierSegment<S> {
        let c1 = (self.ctrl1 * S::THREE - self.from) * S::HALF;
        let c2 = (self.ctrl2 * S::THREE - self.to) * S::HALF;
        QuadraticBezierSegment {
            from: self.from,
            ctrl: ((c1 + c2) * S::HALF).to_point(),
            to: self.to,
        }
    }

    pub fn to_f64(&self) -> CubicBezierSegment<f64> {
        CubicBezierSegment {
            from: self.from.to_f64(),
            ctrl1: self.ctrl1.to_f64(),
            ctrl2: self.ctrl2.to_f64(),
            to: self.to.to_f64(),
        }
    }
}

impl<S: Scalar> Segment for CubicBezierSegment<S> {
    impl_segment!(S);
}

/// An iterator over the points of a flattened cubic bézier segment.
///
/// The curve is subdivided with de Casteljau's algorithm at `t = 0.5` until each piece is
/// within the tolerance of its chord. The subdivision is driven by an explicit work stack,
/// so the memory footprint is bounded and no recursion is involved.
pub struct Flattened<S: Scalar> {
    stack: ArrayVec<(CubicBezierSegment<S>, u32), FLATTENING_STACK_CAPACITY>,
    tolerance: S,
    reached_depth_limit: bool,
}

impl<S: Scalar> Flattened<S> {
    pub(crate) fn new(curve: &CubicBezierSegment<S>, tolerance: S) -> Self {
        let mut stack = ArrayVec::new();
        stack.push((*curve, 0));

        Flattened {
            stack,
            tolerance,
            reached_depth_limit: false,
        }
    }

    /// Whether some portion of the curve could not be refined further because the
    /// subdivision depth limit was reached.
    #[inline]
    pub fn reached_depth_limit(&self) -> bool {
        self.reached_depth_limit
    }
}

impl<S: Scalar> Iterator for Flattened<S> {
    type Item = Point<S>;

    fn next(&mut self) -> Option<Point<S>> {
        while let Some((curve, depth)) = self.stack.pop() {
            if curve.is_linear(self.tolerance) {
                return Some(curve.to);
            }

            if depth >= MAX_SUBDIVISION_DEPTH {
                self.reached_depth_limit = true;
                return Some(curve.to);
            }

            let (first, second) = curve.split(S::HALF);
            // The first half is processed first, so it goes on top of the stack.
            self.stack.push((second, depth + 1));
            self.stack.push((first, depth + 1));
        }

        None
    }
}

#[cfg(test)]
fn distance_to_polyline(p: Point<f64>, from: Point<f64>, polyline: &[Point<f64>]) -> f64 {
    let mut prev = from;
    let mut min = f64::MAX;
    for &to in polyline {
        min = min.min(LineSegment { from: prev, to }.distance_to_point(p));
        prev = to;
    }

    min
}

#[test]
fn test_flatten_end() {
    let segment = CubicBezierSegment {
        from: Point::new(0.0, 0.0),
        ctrl1: Point::new(100.0, 0.0),
        ctrl2: Point::new(100.0, 100.0),
        to: Point::new(100.0, 200.0),
    };

    let mut last = segment.from;
    segment.for_each_flattened(0.0001, &mut |s| {
        last = s.to;
    });

    assert_eq!(last, segment.to);
}

#[test]
fn test_flatten_point() {
    let segment = CubicBezierSegment {
        from: Point::new(0.0, 0.0),
        ctrl1: Point::new(0.0, 0.0),
        ctrl2: Point::new(0.0, 0.0),
        to: Point::new(0.0, 0.0),
    };

    let points: Vec<Point<f32>> = segment.flattened(0.0001).collect();

    assert_eq!(points, &[segment.to]);
}

#[test]
fn test_flatten_loop_with_coincident_endpoints() {
    // A closed loop: the chord is reduced to a point so the flatness is measured
    // against the start point.
    let curve = CubicBezierSegment {
        from: point(-1061.0f32, -3327.0),
        ctrl1: point(-1061.0, -3177.0),
        ctrl2: point(-1061.0, -3477.0),
        to: point(-1061.0, -3327.0),
    };

    for tolerance in &[1.0, 0.1, 0.01] {
        let mut iter = curve.flattened(*tolerance);
        let points: Vec<Point<f32>> = (&mut iter).collect();
        assert!(points.len() > 1);
        assert_eq!(*points.last().unwrap(), curve.to);
        assert!(!iter.reached_depth_limit());
    }
}

#[test]
fn test_depth_limit() {
    let curve = CubicBezierSegment {
        from: point(0.0f64, 0.0),
        ctrl1: point(100.0, 0.0),
        ctrl2: point(100.0, 100.0),
        to: point(0.0, 100.0),
    };

    // A tolerance of zero can't be met, the depth limit kicks in.
    let mut iter = curve.flattened(0.0);
    let count = (&mut iter).count();
    assert!(iter.reached_depth_limit());
    assert!(count > 1000);
    assert!(count <= 1 << MAX_SUBDIVISION_DEPTH);
}

#[test]
fn test_flattening_within_tolerance() {
    let curves = [
        CubicBezierSegment {
            from: point(0.0f64, 0.0),
            ctrl1: point(1.0, 0.0),
            ctrl2: point(1.0, 1.0),
            to: point(0.0, 1.0),
        },
        CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(10.0, 30.0),
            ctrl2: point(-10.0, 30.0),
            to: point(5.0, -2.0),
        },
        CubicBezierSegment {
            from: point(0.0, 0.0),
            ctrl1: point(2.0, 0.0),
            ctrl2: point(-1.0, 0.0),
            to: point(1.0, 0.0),
        },
    ];

    for curve in &curves {
        for &tolerance in &[0.5, 0.1, 0.01, 0.001] {
            let polyline: Vec<Point<f64>> = curve.flattened(tolerance).collect();

            // Every point of the curve is near the polyline.
            for i in 0..=1000 {
                let p = curve.sample(i as f64 / 1000.0);
                let d = distance_to_polyline(p, curve.from, &polyline);
                assert!(d <= tolerance * 1.001 + 1e-9, "{d} > {tolerance}");
            }

            assert_eq!(*polyline.last().unwrap(), curve.to);
        }
    }
}

#[test]
fn test_point_count_increases_with_precision() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(10.0, 30.0),
        ctrl2: point(-10.0, 30.0),
        to: point(5.0, -2.0),
    };

    let mut previous = 0;
    for &tolerance in &[1.0, 0.5, 0.25, 0.1, 0.05, 0.01, 0.005, 0.001] {
        let count = curve.flattened(tolerance).count();
        assert!(count >= previous);
        previous = count;
    }

    assert!(previous > curve.flattened(1.0).count());
}

#[test]
fn test_split() {
    let curve = CubicBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl1: point(1.0, 2.0),
        ctrl2: point(3.0, 2.0),
        to: point(4.0, 0.0),
    };

    let (a, b) = curve.split(0.5);
    assert_eq!(a.from, curve.from);
    assert_eq!(b.to, curve.to);
    assert_eq!(a.to, b.from);
    assert!((a.to - curve.sample(0.5)).length() < 1e-5);
}
