#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Fill tessellation of paths into triangle meshes.
//!
//! This crate is reexported in [trellis](https://docs.rs/trellis/).
//!
//! ## Overview
//!
//! The tessellation pipeline goes through the following stages:
//!
//! 1. Curves are flattened and sub-paths are turned into closed [`Contour`]s
//!    (see [`build_contours`](path::build_contours)).
//! 2. The [winding resolver](winding/index.html) applies the [`FillRule`] and partitions the
//!    contours into [`Region`]s made of one outer boundary and its holes. Self-intersecting
//!    and touching contours are first decomposed into simple cycles by the
//!    [arrangement](arrangement/index.html).
//! 3. Each region is [triangulated](triangulate/index.html): holes are bridged into the outer
//!    boundary, the resulting polygon is split into y-monotone pieces which are then
//!    triangulated with a stack based algorithm.
//! 4. The [`MeshAssembler`] welds the vertices of all regions into a single [`Mesh`].
//!
//! The most interesting types and functions of this crate are:
//!
//! * [`tessellate`] - One-shot tessellation of a path.
//! * [`Tessellator`] - Reusable tessellator exposing diagnostics and options.
//! * [`tessellate_batch`] - Tessellation of many paths on a worker pool.
//! * [`Mesh`] - The output, which can be written into [`VertexBuffers`] for GPU upload.
//!
//! ## Flattening and tolerance
//!
//! Curves are approximated with sequences of line segments. The tolerance is the maximum
//! distance allowed between a curve and its approximation. A smaller tolerance produces
//! more vertices. A tolerance of 0.1 is usually a good fit for geometry expressed in pixels.
//!
//! ## Examples
//!
//! ```
//! use trellis_tessellation::path::builder::*;
//! use trellis_tessellation::path::math::point;
//! use trellis_tessellation::path::{Path, Winding};
//! use trellis_tessellation::{tessellate, FillRule};
//!
//! let mut builder = Path::builder();
//! builder.add_circle(point(0.0, 0.0), 1.0, Winding::Positive);
//! let path = builder.build();
//!
//! let mesh = tessellate(&path, FillRule::NonZero, 0.01).unwrap();
//! assert!((mesh.area() - std::f32::consts::PI).abs() < 0.05);
//! ```

pub use trellis_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

#[cfg(debug_assertions)]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => (
        if $obj.log {
            log::trace!($fmt);
        }
    );
    ($obj:ident, $fmt:expr, $($arg:tt)*) => (
        if $obj.log {
            log::trace!($fmt, $($arg)*);
        }
    );
}

#[cfg(not(debug_assertions))]
macro_rules! tess_log {
    ($obj:ident, $fmt:expr) => {};
    ($obj:ident, $fmt:expr, $($arg:tt)*) => {};
}

pub mod arrangement;
mod batch;
mod error;
mod math_utils;
pub mod geometry_builder;
pub mod mesh;
mod monotone;
mod tessellator;
pub mod triangulate;
pub mod winding;

#[cfg(test)]
mod fill_tests;

#[doc(inline)]
pub use crate::batch::{tessellate_batch, BatchOptions, BatchOutput, CancellationToken};
#[doc(inline)]
pub use crate::error::*;
#[doc(inline)]
pub use crate::geometry_builder::{MaxIndex, Positions, VertexBuffers, VertexConstructor};
#[doc(inline)]
pub use crate::mesh::{Mesh, MeshAssembler, Triangle};
#[doc(inline)]
pub use crate::tessellator::{tessellate, TessellationOutput, Tessellator};
#[doc(inline)]
pub use crate::triangulate::{triangulate_region, TriangleSink, TriangulationStats, Triangulator};
#[doc(inline)]
pub use crate::winding::{resolve_regions, winding_number, Region, ResolvedRegions, Shape};

pub use crate::path::geom;
pub use crate::path::{Contour, FillRule, Winding};

pub mod math {
    //! f32 version of the trellis_geom types used everywhere. Reexported from trellis_path.

    pub use crate::path::math::*;
}

use core::ops::{Add, Sub};

/// How failures local to a region are handled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ErrorMode {
    /// Any degenerate region aborts the tessellation.
    Strict,
    /// Degenerate regions are skipped and reported as diagnostics. The tessellation
    /// only fails if nothing could be produced at all.
    Lenient,
}

/// Parameters for the tessellator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct TessellationOptions {
    /// Maximum allowed distance to the path when building an approximation.
    ///
    /// See [Flattening and tolerance](index.html#flattening-and-tolerance).
    ///
    /// Default value: `TessellationOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,

    /// Set the fill rule.
    ///
    /// See the [SVG specification](https://www.w3.org/TR/SVG/painting.html#FillRuleProperty).
    ///
    /// Default value: `EvenOdd`.
    pub fill_rule: FillRule,

    /// Default value: `Lenient`.
    pub mode: ErrorMode,

    /// Vertices closer than this distance are merged into a single vertex of the mesh.
    ///
    /// Default value: `TessellationOptions::DEFAULT_WELD_EPSILON`.
    pub weld_epsilon: f32,
}

impl TessellationOptions {
    /// Default flattening tolerance.
    pub const DEFAULT_TOLERANCE: f32 = 0.1;
    /// Default Fill rule.
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::EvenOdd;
    pub const DEFAULT_MODE: ErrorMode = ErrorMode::Lenient;
    pub const DEFAULT_WELD_EPSILON: f32 = 1e-5;

    pub const DEFAULT: Self = TessellationOptions {
        tolerance: Self::DEFAULT_TOLERANCE,
        fill_rule: Self::DEFAULT_FILL_RULE,
        mode: Self::DEFAULT_MODE,
        weld_epsilon: Self::DEFAULT_WELD_EPSILON,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub const fn with_mode(mut self, mode: ErrorMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub const fn with_weld_epsilon(mut self, epsilon: f32) -> Self {
        self.weld_epsilon = epsilon;
        self
    }

    /// Checks the parameters before anything is computed.
    pub fn validate(&self) -> Result<(), UnsupportedParameter> {
        if self.tolerance.is_nan() {
            return Err(UnsupportedParameter::ToleranceIsNaN);
        }
        if self.tolerance <= 0.0 {
            return Err(UnsupportedParameter::ToleranceIsNotPositive);
        }
        if self.weld_epsilon.is_nan() || self.weld_epsilon <= 0.0 {
            return Err(UnsupportedParameter::WeldEpsilonIsNotPositive);
        }

        Ok(())
    }
}

impl Default for TessellationOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

type Index = u32;

/// The index of a vertex in a [`Mesh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexId(pub Index);

impl VertexId {
    pub const INVALID: VertexId = VertexId(u32::MAX);

    pub fn offset(self) -> Index {
        self.0
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }

    pub fn from_usize(v: usize) -> Self {
        VertexId(v as Index)
    }
}

impl Add<u32> for VertexId {
    type Output = Self;
    fn add(self, rhs: u32) -> Self {
        VertexId(self.0 + rhs)
    }
}

impl Sub<u32> for VertexId {
    type Output = Self;
    fn sub(self, rhs: u32) -> Self {
        VertexId(self.0 - rhs)
    }
}

impl From<u16> for VertexId {
    fn from(v: u16) -> Self {
        VertexId(v as Index)
    }
}
impl From<u32> for VertexId {
    fn from(v: u32) -> Self {
        VertexId(v)
    }
}
impl From<i32> for VertexId {
    fn from(v: i32) -> Self {
        VertexId(v as Index)
    }
}

impl From<VertexId> for u16 {
    fn from(v: VertexId) -> Self {
        v.0 as u16
    }
}
impl From<VertexId> for u32 {
    fn from(v: VertexId) -> Self {
        v.0
    }
}
impl From<VertexId> for i32 {
    fn from(v: VertexId) -> Self {
        v.0 as i32
    }
}
impl From<VertexId> for usize {
    fn from(v: VertexId) -> Self {
        v.0 as usize
    }
}

#[test]
fn options_validation() {
    assert_eq!(TessellationOptions::DEFAULT.validate(), Ok(()));
    assert_eq!(
        TessellationOptions::tolerance(f32::NAN).validate(),
        Err(UnsupportedParameter::ToleranceIsNaN)
    );
    assert_eq!(
        TessellationOptions::tolerance(0.0).validate(),
        Err(UnsupportedParameter::ToleranceIsNotPositive)
    );
    assert_eq!(
        TessellationOptions::DEFAULT
            .with_weld_epsilon(-1.0)
            .validate(),
        Err(UnsupportedParameter::WeldEpsilonIsNotPositive)
    );
    assert_eq!(TessellationOptions::non_zero().fill_rule, FillRule::NonZero);
}
