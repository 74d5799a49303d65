//! Tools to help with generating vertex and index buffers.
//!
//! ## Overview
//!
//! A [`Mesh`](crate::Mesh) stores plain positions and `u32` indices. Renderers usually want
//! their own vertex layout and sometimes a smaller index type. This module provides:
//!
//! * The struct [`VertexBuffers`](struct.VertexBuffers.html), a simple pair of vectors of
//!   vertices and indices (generic parameters).
//! * The trait [`VertexConstructor`](trait.VertexConstructor.html) which creates custom
//!   vertices from the positions of the mesh. It is implemented for closures, and
//!   [`Positions`](struct.Positions.html) returns the positions untransformed.
//!
//! Meshes are written into the buffers with [`Mesh::write_buffers`](crate::Mesh::write_buffers).
//! Several meshes can be appended to the same buffers, the indices are offset accordingly.
//!
//! ## Examples
//!
//! ```
//! use trellis_tessellation::{tessellate, FillRule, VertexBuffers, VertexConstructor};
//! use trellis_tessellation::math::{point, Point};
//! use trellis_tessellation::path::builder::*;
//! use trellis_tessellation::path::Path;
//!
//! // Our custom vertex.
//! #[derive(Copy, Clone, Debug)]
//! pub struct MyVertex {
//!   position: [f32; 2],
//!   color: [f32; 4],
//! }
//!
//! struct WithColor([f32; 4]);
//!
//! impl VertexConstructor<MyVertex> for WithColor {
//!     fn new_vertex(&mut self, position: Point) -> MyVertex {
//!         MyVertex {
//!             position: position.to_array(),
//!             color: self.0,
//!         }
//!     }
//! }
//!
//! let mut builder = Path::builder();
//! builder.begin(point(0.0, 0.0));
//! builder.line_to(point(1.0, 0.0));
//! builder.line_to(point(1.0, 1.0));
//! builder.line_to(point(0.0, 1.0));
//! builder.close();
//! let path = builder.build();
//!
//! let mesh = tessellate(&path, FillRule::EvenOdd, 0.1).unwrap();
//!
//! let mut output: VertexBuffers<MyVertex, u16> = VertexBuffers::new();
//! mesh.write_buffers(&mut output, WithColor([1.0, 0.0, 0.0, 1.0])).unwrap();
//! mesh.write_buffers(&mut output, WithColor([0.0, 1.0, 0.0, 1.0])).unwrap();
//!
//! assert_eq!(output.vertices.len(), 8);
//! assert_eq!(output.indices.len(), 12);
//! ```

use crate::math::Point;

/// Structure that holds the vertex and index data.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexBuffers<OutputVertex, OutputIndex> {
    pub vertices: Vec<OutputVertex>,
    pub indices: Vec<OutputIndex>,
}

impl<OutputVertex, OutputIndex> VertexBuffers<OutputVertex, OutputIndex> {
    /// Constructor
    pub fn new() -> Self {
        VertexBuffers::with_capacity(512, 1024)
    }

    /// Constructor
    pub fn with_capacity(num_vertices: usize, num_indices: usize) -> Self {
        VertexBuffers {
            vertices: Vec::with_capacity(num_vertices),
            indices: Vec::with_capacity(num_indices),
        }
    }

    /// Empty the buffers without freeing memory, for reuse without reallocation.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// A trait specifying how to create vertex values.
pub trait VertexConstructor<OutputVertex> {
    fn new_vertex(&mut self, position: Point) -> OutputVertex;
}

/// A simple vertex constructor that just takes the position.
pub struct Positions;

impl VertexConstructor<Point> for Positions {
    fn new_vertex(&mut self, position: Point) -> Point {
        position
    }
}

impl<F, OutputVertex> VertexConstructor<OutputVertex> for F
where
    F: FnMut(Point) -> OutputVertex,
{
    fn new_vertex(&mut self, position: Point) -> OutputVertex {
        self(position)
    }
}

/// Provides the maximum value of an index.
///
/// This should be the maximum value representable by the index type up
/// to u32::MAX because meshes can't represent more than u32::MAX vertices.
pub trait MaxIndex {
    const MAX: usize;
}

impl MaxIndex for u8 {
    const MAX: usize = u8::MAX as usize;
}
impl MaxIndex for u16 {
    const MAX: usize = u16::MAX as usize;
}
impl MaxIndex for i16 {
    const MAX: usize = i16::MAX as usize;
}
impl MaxIndex for u32 {
    const MAX: usize = u32::MAX as usize;
}
impl MaxIndex for i32 {
    const MAX: usize = i32::MAX as usize;
}
impl MaxIndex for usize {
    const MAX: usize = u32::MAX as usize;
}

#[test]
fn closure_constructor() {
    use crate::math::point;

    let mut ctor = |p: Point| [p.x, p.y];
    assert_eq!(ctor.new_vertex(point(1.0, 2.0)), [1.0, 2.0]);
    assert_eq!(Positions.new_vertex(point(3.0, 4.0)), point(3.0, 4.0));

    let mut buffers: VertexBuffers<Point, u16> = VertexBuffers::with_capacity(4, 6);
    buffers.vertices.push(point(0.0, 0.0));
    buffers.indices.push(0);
    buffers.clear();
    assert!(buffers.vertices.is_empty() && buffers.indices.is_empty());
}
