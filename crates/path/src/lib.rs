#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Data structures to describe paths and extract their closed contours.
//!
//! A [`Path`] is an ordered sequence of [`PathCommand`]s, typically produced with a
//! [`Builder`](builder/struct.Builder.html). Paths are turned into flat, closed
//! [`Contour`]s by [`build_contours`], which approximates curves within a tolerance.
//!
//! This crate is reexported in [trellis](https://docs.rs/trellis/).
//!
//! # Examples
//!
//! ```
//! use trellis_path::builder::*;
//! use trellis_path::math::point;
//! use trellis_path::{build_contours, Path};
//!
//! let mut builder = Path::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.quadratic_bezier_to(point(1.0, 1.0), point(0.0, 1.0));
//! builder.close();
//! let path = builder.build();
//!
//! let contours = build_contours(&path, 0.01).unwrap();
//! assert_eq!(contours.len(), 1);
//! ```

pub use trellis_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod builder;
pub mod commands;
pub mod contour;

#[doc(inline)]
pub use crate::commands::{Path, PathCommand};
#[doc(inline)]
pub use crate::contour::{
    build_contours, Contour, ContourDiagnostics, ContourSet, DroppedSubpath, MalformedPath,
    MalformedPathKind,
};
pub use crate::geom::ArcFlags;

pub mod traits {
    //! `trellis_path` traits reexported here for convenience.

    pub use crate::builder::PathBuilder;
}

pub mod math {
    //! f32 version of the trellis_geom types used everywhere. Most other trellis crates
    //! reexport them.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```
    pub type Box2D = euclid::default::Box2D<f32>;

    /// An angle in radians (f32).
    pub type Angle = euclid::Angle<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    /// Shorthand for `Box2D::new(point(x0, y0), point(x1, y1))`.
    #[inline]
    pub fn box2d(x0: f32, y0: f32, x1: f32, y1: f32) -> Box2D {
        Box2D::new(point(x0, y0), point(x1, y1))
    }
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// See the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i32) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i32) -> bool {
        !self.is_in(winding_number)
    }
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::EvenOdd
    }
}

/// The two possible orientations for the edges of a shape to be built in.
///
/// Positive winding corresponds to the positive orientation in trigonometry,
/// which is counter-clockwise in a y-up coordinate system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Winding {
    Positive,
    Negative,
}

impl Winding {
    /// +1 for positive windings, -1 for negative ones.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            Winding::Positive => 1,
            Winding::Negative => -1,
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Winding::Positive => Winding::Negative,
            Winding::Negative => Winding::Positive,
        }
    }
}

#[test]
fn fill_rules() {
    assert!(FillRule::EvenOdd.is_in(1));
    assert!(FillRule::EvenOdd.is_in(-1));
    assert!(FillRule::EvenOdd.is_out(2));
    assert!(FillRule::EvenOdd.is_out(-2));
    assert!(FillRule::NonZero.is_in(2));
    assert!(FillRule::NonZero.is_in(-1));
    assert!(FillRule::NonZero.is_out(0));
}
