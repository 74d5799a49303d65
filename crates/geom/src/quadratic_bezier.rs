use crate::cubic_bezier::Flattened as FlattenedCubic;
use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{point, Box2D, CubicBezierSegment, LineSegment, Point};

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> QuadraticBezierSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let t2 = t * t;
        let one_t = S::ONE - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * S::TWO * one_t * t + self.to.to_vector() * t2
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.to
    }

    /// Swap the beginning and the end of the segment.
    pub fn flip(&self) -> Self {
        QuadraticBezierSegment {
            from: self.to,
            ctrl: self.ctrl,
            to: self.from,
        }
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: S) -> (QuadraticBezierSegment<S>, QuadraticBezierSegment<S>) {
        let split_point = self.sample(t);

        (
            QuadraticBezierSegment {
                from: self.from,
                ctrl: self.from.lerp(self.ctrl, t),
                to: split_point,
            },
            QuadraticBezierSegment {
                from: split_point,
                ctrl: self.ctrl.lerp(self.to, t),
                to: self.to,
            },
        )
    }

    /// Elevate this curve to a third order bézier.
    ///
    /// The elevated curve describes exactly the same set of points.
    pub fn to_cubic(&self) -> CubicBezierSegment<S> {
        CubicBezierSegment {
            from: self.from,
            ctrl1: (self.from + self.ctrl.to_vector() * S::TWO) / S::THREE,
            ctrl2: (self.to + self.ctrl.to_vector() * S::TWO) / S::THREE,
            to: self.to,
        }
    }

    #[inline]
    pub fn baseline(&self) -> LineSegment<S> {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Returns a conservative rectangle that contains the curve.
    pub fn fast_bounding_box(&self) -> Box2D<S> {
        let min_x = self.from.x.min(self.ctrl.x).min(self.to.x);
        let max_x = self.from.x.max(self.ctrl.x).max(self.to.x);
        let min_y = self.from.y.min(self.ctrl.y).min(self.to.y);
        let max_y = self.from.y.max(self.ctrl.y).max(self.to.y);

        Box2D {
            min: point(min_x, min_y),
            max: point(max_x, max_y),
        }
    }

    /// Returns the flattened representation of the curve as an iterator, starting *after* the
    /// current point.
    ///
    /// The curve is degree-elevated and flattened as a cubic bézier segment.
    pub fn flattened(&self, tolerance: S) -> Flattened<S> {
        Flattened {
            inner: FlattenedCubic::new(&self.to_cubic(), tolerance),
        }
    }

    /// Iterates through the curve invoking a callback at each point.
    ///
    /// Returns `true` if the subdivision depth limit was reached.
    pub fn for_each_flattened<F>(&self, tolerance: S, callback: &mut F) -> bool
    where
        F: FnMut(&LineSegment<S>),
    {
        self.to_cubic().for_each_flattened(tolerance, callback)
    }

    pub fn to_f64(&self) -> QuadraticBezierSegment<f64> {
        QuadraticBezierSegment {
            from: self.from.to_f64(),
            ctrl: self.ctrl.to_f64(),
            to: self.to.to_f64(),
        }
    }
}

impl<S: Scalar> Segment for QuadraticBezierSegment<S> {
    impl_segment!(S);
}

/// An iterator over the points of a flattened quadratic bézier segment.
pub struct Flattened<S: Scalar> {
    inner: FlattenedCubic<S>,
}

impl<S: Scalar> Flattened<S> {
    #[inline]
    pub fn reached_depth_limit(&self) -> bool {
        self.inner.reached_depth_limit()
    }
}

impl<S: Scalar> Iterator for Flattened<S> {
    type Item = Point<S>;

    #[inline]
    fn next(&mut self) -> Option<Point<S>> {
        self.inner.next()
    }
}

#[test]
fn degree_elevation_preserves_the_curve() {
    let quadratic = QuadraticBezierSegment {
        from: point(0.0f64, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };
    let cubic = quadratic.to_cubic();

    for i in 0..=10 {
        let t = i as f64 / 10.0;
        assert!((quadratic.sample(t) - cubic.sample(t)).length() < 1e-9);
    }
}

#[test]
fn flattened_quadratic_ends_at_to() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };

    let mut last = curve.from;
    let mut count = 0;
    let limited = curve.for_each_flattened(0.01, &mut |s| {
        assert_eq!(s.from, last);
        last = s.to;
        count += 1;
    });

    assert!(!limited);
    assert!(count > 2);
    assert_eq!(last, curve.to);
    assert_eq!(curve.flattened(0.01).count(), count);
}

#[test]
fn flattened_quadratic_within_tolerance() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f64, 0.0),
        ctrl: point(5.0, 10.0),
        to: point(10.0, 0.0),
    };

    let tolerance = 0.05;
    let mut segments = std::vec::Vec::new();
    curve.for_each_flattened(tolerance, &mut |s| segments.push(*s));

    for i in 0..=200 {
        let p = curve.sample(i as f64 / 200.0);
        let d = segments
            .iter()
            .map(|s| s.distance_to_point(p))
            .fold(f64::MAX, f64::min);
        assert!(d <= tolerance * 1.001);
    }
}

#[test]
fn quadratic_fast_bounding_box() {
    let curve = QuadraticBezierSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(1.0, 1.0),
        to: point(2.0, 0.0),
    };

    let r = curve.fast_bounding_box();
    assert_eq!(r.min, point(0.0, 0.0));
    assert_eq!(r.max, point(2.0, 1.0));
}
