#![deny(bare_trait_objects)]

//! Fill tessellation of 2D vector paths into triangle meshes.
//!
//! # Crates
//!
//! This meta-crate (`trellis`) reexports the following sub-crates for convenience:
//!
//! * **trellis_tessellation** - Winding resolution, triangulation and mesh assembly.
//! * **trellis_path** - Path building and contour extraction.
//! * **trellis_geom** - 2d utilities for line segments, bézier curves and arcs, and
//!   their flattening.
//!
//! Each `trellis_<name>` crate is reexported as a `<name>` module in `trellis`. For example:
//!
//! ```ignore
//! use trellis_tessellation::Tessellator;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! use trellis::tessellation::Tessellator;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! # Examples
//!
//! ## Tessellating a path with holes
//!
//! ```
//! use trellis::math::{box2d, point, Point};
//! use trellis::path::builder::*;
//! use trellis::path::{Path, Winding};
//! use trellis::tessellation::*;
//!
//! let mut builder = Path::builder();
//! builder.add_rectangle(&box2d(0.0, 0.0, 100.0, 50.0), Winding::Positive);
//! builder.add_circle(point(25.0, 25.0), 10.0, Winding::Negative);
//! builder.begin(point(60.0, 10.0));
//! builder.line_to(point(90.0, 10.0));
//! builder.quadratic_bezier_to(point(90.0, 40.0), point(60.0, 40.0));
//! builder.close();
//! let path = builder.build();
//!
//! let options = TessellationOptions::tolerance(0.1).with_fill_rule(FillRule::NonZero);
//! let output = Tessellator::new().tessellate_path(&path, &options).unwrap();
//!
//! // The circle winds the other way and is a hole. The second sub-path lies inside the
//! // rectangle with the same winding, so it stays filled.
//! let expected = 5000.0 - std::f32::consts::PI * 100.0;
//! assert!((output.mesh.area() - expected).abs() < 5.0);
//!
//! // The geometry is ready to be uploaded to the GPU.
//! let buffers: VertexBuffers<Point, u32> = output.mesh.to_buffers(Positions).unwrap();
//! assert_eq!(buffers.indices.len(), output.mesh.triangles().len() * 3);
//! ```
//!
//! ## Tessellating many paths at once
//!
//! ```
//! use trellis::math::box2d;
//! use trellis::path::builder::*;
//! use trellis::path::{Path, Winding};
//! use trellis::tessellation::*;
//!
//! let paths: Vec<Path> = (0..8)
//!     .map(|i| {
//!         let x = i as f32 * 2.0;
//!         let mut builder = Path::builder();
//!         builder.add_rectangle(&box2d(x, 0.0, x + 1.0, 1.0), Winding::Positive);
//!         builder.build()
//!     })
//!     .collect();
//!
//! let batch = BatchOptions::default().with_num_threads(2);
//! let output = tessellate_batch(&paths, &TessellationOptions::DEFAULT, &batch).unwrap();
//! assert_eq!(output.mesh.triangles().len(), 16);
//! ```
//!
//! ## What is the tolerance variable in these examples?
//!
//! The tessellator operates on flattened paths (that only contain line segments)
//! so curves are approximated with sequences of line segments. The tolerance is the
//! maximum distance allowed between the curve and its approximation.

pub extern crate trellis_tessellation;

pub use trellis_tessellation as tessellation;
pub use tessellation::geom;
pub use tessellation::path;

pub use path::math;
