use crate::scalar::Scalar;
use crate::{Box2D, LineSegment, Point};

/// Common APIs to segment types.
pub trait Segment: Copy + Sized {
    type Scalar: Scalar;

    /// Start of the curve.
    fn from(&self) -> Point<Self::Scalar>;

    /// End of the curve.
    fn to(&self) -> Point<Self::Scalar>;

    /// Sample the curve at t (expecting t between 0 and 1).
    fn sample(&self, t: Self::Scalar) -> Point<Self::Scalar>;

    /// Swap the direction of the segment.
    fn flip(&self) -> Self;

    /// Returns a rectangle that contains the curve.
    ///
    /// This is not necessarily the smallest possible bounding rectangle.
    fn fast_bounding_box(&self) -> Box2D<Self::Scalar>;

    /// Approximates the curve with sequence of line segments.
    ///
    /// The `tolerance` parameter defines the maximum distance between the curve and
    /// its approximation.
    ///
    /// Returns `true` if the subdivision depth limit was reached for some portion of the
    /// curve, in which case that portion is approximated by its chord.
    fn for_each_flattened(
        &self,
        tolerance: Self::Scalar,
        callback: &mut dyn FnMut(&LineSegment<Self::Scalar>),
    ) -> bool;
}

macro_rules! impl_segment {
    ($S:ty) => {
        type Scalar = $S;
        fn from(&self) -> Point<$S> {
            self.from()
        }
        fn to(&self) -> Point<$S> {
            self.to()
        }
        fn sample(&self, t: $S) -> Point<$S> {
            self.sample(t)
        }
        fn flip(&self) -> Self {
            self.flip()
        }
        fn fast_bounding_box(&self) -> Box2D<$S> {
            self.fast_bounding_box()
        }
        fn for_each_flattened(
            &self,
            tolerance: $S,
            callback: &mut dyn FnMut(&LineSegment<$S>),
        ) -> bool {
            self.for_each_flattened(tolerance, &mut |s| callback(s))
        }
    };
}
