use crate::scalar::Scalar;
use crate::segment::Segment;
use crate::{point, Box2D, Point, Vector};

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment<S> {
    pub from: Point<S>,
    pub to: Point<S>,
}

impl<S: Scalar> LineSegment<S> {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        self.from.lerp(self.to, t)
    }

    /// Sample the x coordinate of the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn x(&self, t: S) -> S {
        self.from.x * (S::ONE - t) + self.to.x * t
    }

    /// Sample the y coordinate of the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn y(&self, t: S) -> S {
        self.from.y * (S::ONE - t) + self.to.y * t
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.to
    }

    pub fn solve_t_for_y(&self, y: S) -> S {
        let dy = self.to.y - self.from.y;
        if dy == S::ZERO {
            return S::ZERO;
        }

        (y - self.from.y) / dy
    }

    pub fn solve_x_for_y(&self, y: S) -> S {
        self.x(self.solve_t_for_y(y))
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    /// Split this segment into two sub-segments.
    #[inline]
    pub fn split(&self, t: S) -> (Self, Self) {
        let split_point = self.sample(t);

        (
            LineSegment {
                from: self.from,
                to: split_point,
            },
            LineSegment {
                from: split_point,
                to: self.to,
            },
        )
    }

    /// Return the smallest rectangle containing this segment.
    #[inline]
    pub fn bounding_box(&self) -> Box2D<S> {
        Box2D {
            min: point(S::min(self.from.x, self.to.x), S::min(self.from.y, self.to.y)),
            max: point(S::max(self.from.x, self.to.x), S::max(self.from.y, self.to.y)),
        }
    }

    #[inline]
    pub fn fast_bounding_box(&self) -> Box2D<S> {
        self.bounding_box()
    }

    /// Returns the vector between this segment's `from` and `to` points.
    #[inline]
    pub fn to_vector(&self) -> Vector<S> {
        self.to - self.from
    }

    /// Computes the length of this segment.
    #[inline]
    pub fn length(&self) -> S {
        self.to_vector().length()
    }

    /// Computes the squared length of this segment.
    #[inline]
    pub fn square_length(&self) -> S {
        self.to_vector().square_length()
    }

    /// Computes the intersection (if any) between this segment and another one.
    ///
    /// The result is provided in the form of the `t` parameter of each
    /// segment. To get the intersection point, sample one of the segments
    /// at the corresponding value.
    ///
    /// Segments sharing an endpoint and parallel segments are not considered
    /// intersecting.
    #[allow(clippy::suspicious_operation_groupings)]
    pub fn intersection_t(&self, other: &Self) -> Option<(S, S)> {
        if self.to == other.to
            || self.from == other.from
            || self.from == other.to
            || self.to == other.from
        {
            return None;
        }

        let v1 = self.to_vector();
        let v2 = other.to_vector();

        let v1_cross_v2 = v1.cross(v2);

        if v1_cross_v2 == S::ZERO {
            // The segments are parallel
            return None;
        }

        let sign_v1_cross_v2 = S::signum(v1_cross_v2);
        let abs_v1_cross_v2 = S::abs(v1_cross_v2);

        let v3 = other.from - self.from;

        // t and u should be divided by v1_cross_v2, but we postpone that to not lose precision.
        // We have to respect the sign of v1_cross_v2 (and therefore t and u) so we apply it now and
        // will use the absolute value of v1_cross_v2 afterwards.
        let t = v3.cross(v2) * sign_v1_cross_v2;
        let u = v3.cross(v1) * sign_v1_cross_v2;

        if t < S::ZERO || t > abs_v1_cross_v2 || u < S::ZERO || u > abs_v1_cross_v2 {
            return None;
        }

        Some((t / abs_v1_cross_v2, u / abs_v1_cross_v2))
    }

    #[inline]
    pub fn intersection(&self, other: &Self) -> Option<Point<S>> {
        self.intersection_t(other).map(|(t, _)| self.sample(t))
    }

    /// Computes the distance between this segment and a point.
    #[inline]
    pub fn distance_to_point(&self, p: Point<S>) -> S {
        self.square_distance_to_point(p).sqrt()
    }

    /// Computes the squared distance between this segment and a point.
    ///
    /// Can be useful to save a square root and a division when comparing against
    /// a distance that can be squared.
    #[inline]
    pub fn square_distance_to_point(&self, p: Point<S>) -> S {
        (self.closest_point(p) - p).square_length()
    }

    /// Computes the closest point on this segment to `p`.
    #[inline]
    pub fn closest_point(&self, p: Point<S>) -> Point<S> {
        let v1 = self.to - self.from;
        let v2 = p - self.from;
        let len2 = v1.dot(v1);
        if len2 == S::ZERO {
            return self.from;
        }
        let t = S::min(S::max(v2.dot(v1) / len2, S::ZERO), S::ONE);

        self.from + v1 * t
    }

    /// Distance between `p` and the infinite line supporting this segment.
    ///
    /// Falls back to the distance to `from` when the segment has no length.
    #[inline]
    pub fn distance_to_line(&self, p: Point<S>) -> S {
        let v = self.to_vector();
        let len = v.length();
        if len == S::ZERO {
            return (p - self.from).length();
        }

        S::abs(v.cross(p - self.from)) / len
    }

    /// Returns a positive value if `p` is on the left of the segment (counter-clockwise
    /// in a y-up coordinate system), a negative value if it is on the right and zero if
    /// the three points are collinear.
    #[inline]
    pub fn side(&self, p: Point<S>) -> S {
        self.to_vector().cross(p - self.from)
    }

    pub fn for_each_flattened<F>(&self, _tolerance: S, callback: &mut F) -> bool
    where
        F: FnMut(&LineSegment<S>),
    {
        callback(self);
        false
    }

    pub fn to_f64(&self) -> LineSegment<f64> {
        LineSegment {
            from: self.from.to_f64(),
            to: self.to.to_f64(),
        }
    }
}

impl<S: Scalar> Segment for LineSegment<S> {
    impl_segment!(S);
}

#[test]
fn intersection_rotated() {
    use core::f64::consts::PI;
    let epsilon = 0.0001;
    let count: u32 = 100;

    for i in 0..count {
        for j in 0..count {
            if i % (count / 2) == j % (count / 2) {
                // avoid the colinear case.
                continue;
            }

            let angle1 = i as f64 / (count as f64) * 2.0 * PI;
            let angle2 = j as f64 / (count as f64) * 2.0 * PI;

            let l1 = LineSegment {
                from: point(10.0 * angle1.cos(), 10.0 * angle1.sin()),
                to: point(-10.0 * angle1.cos(), -10.0 * angle1.sin()),
            };

            let l2 = LineSegment {
                from: point(10.0 * angle2.cos(), 10.0 * angle2.sin()),
                to: point(-10.0 * angle2.cos(), -10.0 * angle2.sin()),
            };

            assert!(l1.intersection(&l2).is_some());

            let p = l1.intersection(&l2).unwrap();
            assert!(p.x.abs() < epsilon && p.y.abs() < epsilon);
        }
    }
}

#[test]
fn intersection_touching() {
    let l1 = LineSegment {
        from: point(0.0, 0.0),
        to: point(10.0, 10.0),
    };

    let l2 = LineSegment {
        from: point(10.0, 10.0),
        to: point(10.0, 0.0),
    };

    assert!(l1.intersection(&l2).is_none());
}

#[test]
fn distance_to_degenerate_segment() {
    let l = LineSegment {
        from: point(1.0f32, 1.0),
        to: point(1.0, 1.0),
    };

    assert_eq!(l.closest_point(point(4.0, 5.0)), point(1.0, 1.0));
    assert_eq!(l.distance_to_line(point(4.0, 5.0)), 5.0);
}

#[test]
fn side_of_segment() {
    let l = LineSegment {
        from: point(0.0f32, 0.0),
        to: point(1.0, 0.0),
    };

    assert!(l.side(point(0.5, 1.0)) > 0.0);
    assert!(l.side(point(0.5, -1.0)) < 0.0);
    assert_eq!(l.side(point(2.0, 0.0)), 0.0);
}
