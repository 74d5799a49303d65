//! Elliptic arc related maths and tools.

use crate::scalar::{Float, Scalar};
use crate::cubic_bezier::Flattened as FlattenedCubic;
use crate::segment::Segment;
use crate::{point, vector, Angle, Box2D, CubicBezierSegment, LineSegment, Point, Vector};

/// Maximum number of cubic bézier segments approximating an arc, enough for 64 full
/// turns.
pub const MAX_ARC_CUBICS: u32 = 256;

/// An elliptic arc curve segment using the SVG's end-point notation.
///
/// See: <https://www.w3.org/TR/SVG/implnote.html#ArcImplementationNotes>
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SvgArc<S> {
    pub from: Point<S>,
    pub to: Point<S>,
    pub radii: Vector<S>,
    pub x_rotation: Angle<S>,
    pub flags: ArcFlags,
}

/// An elliptic arc curve segment using the center notation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Arc<S> {
    pub center: Point<S>,
    pub radii: Vector<S>,
    pub start_angle: Angle<S>,
    /// Positive sweeps go counter-clockwise in a y-up coordinate system.
    pub sweep_angle: Angle<S>,
    pub x_rotation: Angle<S>,
}

/// Flag parameters for arcs as described by the SVG specification.
///
/// For most situations using the SVG arc notation, there are four different arcs
/// (two different ellipses, each with two different arc sweeps) that satisfy the
/// arc parameters. The `large_arc` and `sweep` flags indicate which one of the
/// four arcs are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ArcFlags {
    /// Of the four candidate arc sweeps, two will represent an arc sweep of greater
    /// than or equal to 180 degrees (the "large-arc"), and two will represent an arc
    /// sweep of less than or equal to 180 degrees (the "small arc"). If `large_arc`
    /// is true, then one of the two larger arc sweeps will be chosen.
    pub large_arc: bool,
    /// If `sweep` is true, then the arc will be drawn in a "positive-angle" direction.
    pub sweep: bool,
}

impl<S: Scalar> SvgArc<S> {
    /// Per SVG rules, an arc with a zero radius is drawn as a straight line.
    #[inline]
    pub fn is_straight_line(&self) -> bool {
        S::abs(self.radii.x) <= S::EPSILON || S::abs(self.radii.y) <= S::EPSILON
    }

    /// Arcs whose end points coincide are omitted entirely.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Converts to the center notation.
    ///
    /// Radii that are too small to join the two end points are scaled up uniformly.
    /// Must not be called on straight or empty arcs.
    pub fn to_arc(&self) -> Arc<S> {
        Arc::from_svg_arc(self)
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.from
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.to
    }

    /// Approximates the arc with a sequence of line segments.
    ///
    /// Returns `true` if the subdivision depth limit was reached.
    pub fn for_each_flattened<F>(&self, tolerance: S, callback: &mut F) -> bool
    where
        F: FnMut(&LineSegment<S>),
    {
        if self.is_empty() {
            return false;
        }

        if self.is_straight_line() {
            callback(&LineSegment {
                from: self.from,
                to: self.to,
            });
            return false;
        }

        self.to_arc().for_each_flattened(tolerance, callback)
    }
}

impl<S: Scalar> Arc<S> {
    /// Create an arc from the SVG end-point notation (conversion described in
    /// section F.6.5 of the SVG specification).
    pub fn from_svg_arc(arc: &SvgArc<S>) -> Arc<S> {
        debug_assert!(!arc.is_empty());
        debug_assert!(!arc.is_straight_line());

        let mut rx = S::abs(arc.radii.x);
        let mut ry = S::abs(arc.radii.y);

        let xr = arc.x_rotation.get() % (S::TWO * S::PI());
        let cos_phi = Float::cos(xr);
        let sin_phi = Float::sin(xr);
        let hd_x = (arc.from.x - arc.to.x) * S::HALF;
        let hd_y = (arc.from.y - arc.to.y) * S::HALF;
        let hs_x = (arc.from.x + arc.to.x) * S::HALF;
        let hs_y = (arc.from.y + arc.to.y) * S::HALF;

        // F.6.5.1
        let p = point(
            cos_phi * hd_x + sin_phi * hd_y,
            -sin_phi * hd_x + cos_phi * hd_y,
        );

        // F.6.6: radii too small to span the end points get scaled up.
        let lambda = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry);
        if lambda > S::ONE {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        // F.6.5.2
        let rxry = rx * ry;
        let rxpy = rx * p.y;
        let rypx = ry * p.x;
        let sum_of_sq = rxpy * rxpy + rypx * rypx;

        let sign_coe = if arc.flags.large_arc == arc.flags.sweep {
            -S::ONE
        } else {
            S::ONE
        };
        let coe = if sum_of_sq > S::ZERO {
            sign_coe * S::max((rxry * rxry - sum_of_sq) / sum_of_sq, S::ZERO).sqrt()
        } else {
            S::ZERO
        };

        let transformed_cx = coe * rxpy / ry;
        let transformed_cy = -coe * rypx / rx;

        // F.6.5.3
        let center = point(
            cos_phi * transformed_cx - sin_phi * transformed_cy + hs_x,
            sin_phi * transformed_cx + cos_phi * transformed_cy + hs_y,
        );

        // F.6.5.5 and F.6.5.6
        let u = vector((p.x - transformed_cx) / rx, (p.y - transformed_cy) / ry);
        let v = vector((-p.x - transformed_cx) / rx, (-p.y - transformed_cy) / ry);

        let start_angle = directed_angle(vector(S::ONE, S::ZERO), u);
        let mut sweep_angle = directed_angle(u, v);
        if arc.flags.sweep && sweep_angle < S::ZERO {
            sweep_angle += S::TWO * S::PI();
        } else if !arc.flags.sweep && sweep_angle > S::ZERO {
            sweep_angle -= S::TWO * S::PI();
        }

        Arc {
            center,
            radii: vector(rx, ry),
            start_angle: Angle::radians(start_angle),
            sweep_angle: Angle::radians(sweep_angle),
            x_rotation: arc.x_rotation,
        }
    }

    /// A full ellipse (or circle) starting at angle zero.
    pub fn ellipse(center: Point<S>, radii: Vector<S>, x_rotation: Angle<S>) -> Self {
        Arc {
            center,
            radii,
            start_angle: Angle::radians(S::ZERO),
            sweep_angle: Angle::radians(S::TWO * S::PI()),
            x_rotation,
        }
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: S) -> Point<S> {
        let angle = self.start_angle.get() + self.sweep_angle.get() * t;
        self.map_unit_point(point(Float::cos(angle), Float::sin(angle)))
    }

    #[inline]
    pub fn from(&self) -> Point<S> {
        self.sample(S::ZERO)
    }

    #[inline]
    pub fn to(&self) -> Point<S> {
        self.sample(S::ONE)
    }

    #[inline]
    pub fn end_angle(&self) -> Angle<S> {
        self.start_angle + self.sweep_angle
    }

    /// Swap the direction of the arc.
    pub fn flip(&self) -> Self {
        Arc {
            start_angle: self.end_angle(),
            sweep_angle: -self.sweep_angle,
            ..*self
        }
    }

    /// Returns a conservative rectangle that contains the curve.
    pub fn fast_bounding_box(&self) -> Box2D<S> {
        let r = S::max(S::abs(self.radii.x), S::abs(self.radii.y));
        Box2D {
            min: point(self.center.x - r, self.center.y - r),
            max: point(self.center.x + r, self.center.y + r),
        }
    }

    // Maps a point of the unit circle onto the ellipse.
    #[inline]
    fn map_unit_point(&self, p: Point<S>) -> Point<S> {
        let x = p.x * self.radii.x;
        let y = p.y * self.radii.y;
        let phi = self.x_rotation.get();
        let (sin_phi, cos_phi) = (Float::sin(phi), Float::cos(phi));

        point(
            self.center.x + x * cos_phi - y * sin_phi,
            self.center.y + x * sin_phi + y * cos_phi,
        )
    }

    // Number of cubic bézier segments, each spanning at most a quarter turn.
    //
    // Non-finite sweeps produce nothing. Sweeps of more than `MAX_ARC_CUBICS` quarter
    // turns are split into `MAX_ARC_CUBICS` wider segments.
    fn num_cubics(&self) -> u32 {
        let sweep = self.sweep_angle.get();
        if sweep == S::ZERO || !Float::is_finite(sweep) {
            return 0;
        }

        let n = S::max(S::ceil(S::abs(sweep) / S::FRAC_PI_2() - S::EPSILON), S::ONE);
        if n >= S::value(MAX_ARC_CUBICS as f32) {
            return MAX_ARC_CUBICS;
        }

        n.to_u32().map_or(MAX_ARC_CUBICS, |n| n.min(MAX_ARC_CUBICS))
    }

    // Angle at the boundary between cubic `i - 1` and cubic `i`.
    #[inline]
    fn split_angle(&self, i: u32, count: u32) -> S {
        let sweep = self.sweep_angle.get();
        if i == count {
            return self.start_angle.get() + sweep;
        }
        let step = sweep / S::value(count as f32);

        self.start_angle.get() + step * S::value(i as f32)
    }

    fn cubic(&self, i: u32, count: u32) -> CubicBezierSegment<S> {
        let a0 = self.split_angle(i, count);
        let a1 = self.split_angle(i + 1, count);
        let k = S::FOUR / S::THREE * Float::tan((a1 - a0) / S::FOUR);

        let (s0, c0) = (Float::sin(a0), Float::cos(a0));
        let (s1, c1) = (Float::sin(a1), Float::cos(a1));

        CubicBezierSegment {
            from: self.map_unit_point(point(c0, s0)),
            ctrl1: self.map_unit_point(point(c0 - k * s0, s0 + k * c0)),
            ctrl2: self.map_unit_point(point(c1 + k * s1, s1 - k * c1)),
            to: self.map_unit_point(point(c1, s1)),
        }
    }

    /// Approximates the arc with a sequence of cubic bézier segments, each spanning
    /// at most a quarter turn.
    pub fn for_each_cubic_bezier<F>(&self, callback: &mut F)
    where
        F: FnMut(&CubicBezierSegment<S>),
    {
        let count = self.num_cubics();
        for i in 0..count {
            callback(&self.cubic(i, count));
        }
    }

    /// Returns an iterator over the points of the flattened arc, excluding its start.
    pub fn flattened(&self, tolerance: S) -> Flattened<S> {
        Flattened {
            arc: *self,
            tolerance,
            next_cubic: 0,
            num_cubics: self.num_cubics(),
            current: None,
            reached_depth_limit: false,
        }
    }

    /// Approximates the arc with a sequence of line segments.
    ///
    /// Returns `true` if the subdivision depth limit was reached.
    pub fn for_each_flattened<F>(&self, tolerance: S, callback: &mut F) -> bool
    where
        F: FnMut(&LineSegment<S>),
    {
        let mut reached_depth_limit = false;
        self.for_each_cubic_bezier(&mut |curve| {
            reached_depth_limit |= curve.for_each_flattened(tolerance, callback);
        });

        reached_depth_limit
    }
}

/// An iterator over the points of a flattened arc.
pub struct Flattened<S: Scalar> {
    arc: Arc<S>,
    tolerance: S,
    next_cubic: u32,
    num_cubics: u32,
    current: Option<FlattenedCubic<S>>,
    reached_depth_limit: bool,
}

impl<S: Scalar> Flattened<S> {
    /// Whether the subdivision depth limit was reached so far.
    pub fn reached_depth_limit(&self) -> bool {
        self.reached_depth_limit
            || self
                .current
                .as_ref()
                .map_or(false, FlattenedCubic::reached_depth_limit)
    }
}

impl<S: Scalar> Iterator for Flattened<S> {
    type Item = Point<S>;

    fn next(&mut self) -> Option<Point<S>> {
        loop {
            if let Some(current) = &mut self.current {
                if let Some(p) = current.next() {
                    return Some(p);
                }
                self.reached_depth_limit |= current.reached_depth_limit();
                self.current = None;
            }

            if self.next_cubic >= self.num_cubics {
                return None;
            }

            let cubic = self.arc.cubic(self.next_cubic, self.num_cubics);
            self.current = Some(FlattenedCubic::new(&cubic, self.tolerance));
            self.next_cubic += 1;
        }
    }
}

impl<S: Scalar> Segment for Arc<S> {
    impl_segment!(S);
}

// Signed angle from `a` to `b`, in ]-PI, PI].
fn directed_angle<S: Scalar>(a: Vector<S>, b: Vector<S>) -> S {
    Float::atan2(a.cross(b), a.dot(b))
}

#[cfg(test)]
fn approx_eq(a: Point<f64>, b: Point<f64>) -> bool {
    (a - b).length() < 1e-6
}

#[test]
fn from_svg_arc_end_points() {
    use std::f64::consts::PI;

    let flags = [
        ArcFlags { large_arc: false, sweep: false },
        ArcFlags { large_arc: false, sweep: true },
        ArcFlags { large_arc: true, sweep: false },
        ArcFlags { large_arc: true, sweep: true },
    ];

    for flags in &flags {
        let svg = SvgArc {
            from: point(0.0f64, 0.0),
            to: point(10.0, 5.0),
            radii: vector(10.0, 8.0),
            x_rotation: Angle::radians(PI / 6.0),
            flags: *flags,
        };

        let arc = svg.to_arc();
        assert!(approx_eq(arc.from(), svg.from), "{flags:?}");
        assert!(approx_eq(arc.to(), svg.to), "{flags:?}");
        assert_eq!(arc.sweep_angle.get() > 0.0, flags.sweep);
        assert_eq!(arc.sweep_angle.get().abs() > PI, flags.large_arc);
    }
}

#[test]
fn from_svg_arc_scales_small_radii() {
    let svg = SvgArc {
        from: point(0.0f64, 0.0),
        to: point(10.0, 0.0),
        radii: vector(1.0, 1.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };

    let arc = svg.to_arc();
    assert!((arc.radii.x - 5.0).abs() < 1e-6);
    assert!(approx_eq(arc.center, point(5.0, 0.0)));
    assert!(approx_eq(arc.to(), svg.to));
}

#[test]
fn zero_radius_is_a_line() {
    let svg = SvgArc {
        from: point(0.0f32, 0.0),
        to: point(10.0, 0.0),
        radii: vector(0.0, 3.0),
        x_rotation: Angle::radians(0.0),
        flags: ArcFlags::default(),
    };

    let mut segments = 0;
    let limited = svg.for_each_flattened(0.1, &mut |s| {
        assert_eq!(s.from, point(0.0, 0.0));
        assert_eq!(s.to, point(10.0, 0.0));
        segments += 1;
    });

    assert!(!limited);
    assert_eq!(segments, 1);
}

#[test]
fn cubic_approximation_of_a_circle() {
    let circle = Arc::ellipse(point(1.0f64, 2.0), vector(10.0, 10.0), Angle::radians(0.0));

    let mut count = 0;
    let mut prev = circle.from();
    circle.for_each_cubic_bezier(&mut |curve| {
        assert_eq!(curve.from, prev);
        for i in 0..=10 {
            let p = curve.sample(i as f64 / 10.0);
            let r = (p - circle.center).length();
            assert!((r - 10.0).abs() < 0.01);
        }
        prev = curve.to;
        count += 1;
    });

    assert_eq!(count, 4);
    assert!(approx_eq(prev, circle.from()));
}

#[test]
fn flattened_arc_stays_near_the_ellipse() {
    use std::f64::consts::PI;

    let arc = Arc {
        center: point(0.0f64, 0.0),
        radii: vector(20.0, 10.0),
        start_angle: Angle::radians(0.3),
        sweep_angle: Angle::radians(-1.5 * PI),
        x_rotation: Angle::radians(0.5),
    };

    let tolerance = 0.05;
    let mut last = arc.from();
    arc.for_each_flattened(tolerance, &mut |s| {
        assert_eq!(s.from, last);
        last = s.to;
    });
    assert!(approx_eq(last, arc.to()));
}

#[test]
fn flattened_iterator_matches_callback() {
    let arc = Arc {
        center: point(5.0f32, -3.0),
        radii: vector(8.0, 4.0),
        start_angle: Angle::radians(1.0),
        sweep_angle: Angle::radians(4.0),
        x_rotation: Angle::radians(0.0),
    };

    let mut expected = std::vec::Vec::new();
    arc.for_each_flattened(0.01, &mut |s| expected.push(s.to));

    let mut iter = arc.flattened(0.01);
    let points: std::vec::Vec<Point<f32>> = (&mut iter).collect();
    assert_eq!(points, expected);
    assert!(!iter.reached_depth_limit());
    assert_eq!(Arc { sweep_angle: Angle::radians(0.0), ..arc }.flattened(0.01).count(), 0);
}

#[test]
fn unbounded_sweeps() {
    let arc = Arc {
        center: point(0.0f32, 0.0),
        radii: vector(1.0, 1.0),
        start_angle: Angle::radians(0.0),
        sweep_angle: Angle::radians(f32::INFINITY),
        x_rotation: Angle::radians(0.0),
    };

    let mut count = 0;
    arc.for_each_cubic_bezier(&mut |_| count += 1);
    assert_eq!(count, 0);
    assert_eq!(arc.flattened(0.1).count(), 0);
    let nan = Arc { sweep_angle: Angle::radians(f32::NAN), ..arc };
    assert_eq!(nan.flattened(0.1).count(), 0);

    let huge = Arc { sweep_angle: Angle::radians(-1.0e9), ..arc };
    let mut count = 0;
    huge.for_each_cubic_bezier(&mut |cubic| {
        assert!(cubic.from.x.is_finite() && cubic.to.y.is_finite());
        count += 1;
    });
    assert_eq!(count, MAX_ARC_CUBICS);

    let two_turns = Arc { sweep_angle: Angle::radians(4.0 * core::f32::consts::PI), ..arc };
    let mut count = 0;
    two_turns.for_each_cubic_bezier(&mut |_| count += 1);
    assert_eq!(count, 8);
}
