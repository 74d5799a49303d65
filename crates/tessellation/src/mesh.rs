//! The output of the tessellators.
//!
//! A [`Mesh`] is a vertex buffer of positions plus counter-clockwise triangles referring to
//! it by index. It is produced by the [`MeshAssembler`], which welds vertices closer than a
//! given distance so that triangles of neighboring regions share their vertices.

use crate::error::GeometryBuilderError;
use crate::geometry_builder::{MaxIndex, VertexBuffers, VertexConstructor};
use crate::math::*;
use crate::math_utils::orient;
use crate::triangulate::{TriangleSink, TRIANGLE_AREA_EPSILON};
use crate::VertexId;

use std::collections::HashMap;

/// Three vertex indices in counter-clockwise order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Triangle(pub [VertexId; 3]);

/// A triangle mesh with deduplicated vertices.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Mesh {
    vertices: Vec<Point>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The positions of the vertices of a triangle.
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point; 3] {
        let [a, b, c] = triangle.0;
        [
            self.vertices[a.to_usize()],
            self.vertices[b.to_usize()],
            self.vertices[c.to_usize()],
        ]
    }

    /// Sum of the areas of the triangles.
    pub fn area(&self) -> f32 {
        let area: f64 = self
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                orient(a, b, c) * 0.5
            })
            .sum();

        area as f32
    }

    /// Appends the mesh to vertex and index buffers.
    ///
    /// Indices are offset by the number of vertices already in the buffers.
    pub fn write_buffers<OutputVertex, OutputIndex, Ctor>(
        &self,
        buffers: &mut VertexBuffers<OutputVertex, OutputIndex>,
        mut ctor: Ctor,
    ) -> Result<(), GeometryBuilderError>
    where
        OutputIndex: From<VertexId> + MaxIndex,
        Ctor: VertexConstructor<OutputVertex>,
    {
        let offset = buffers.vertices.len();
        if offset + self.vertices.len() > OutputIndex::MAX + 1 {
            return Err(GeometryBuilderError::TooManyVertices);
        }

        buffers.vertices.reserve(self.vertices.len());
        for &position in &self.vertices {
            buffers.vertices.push(ctor.new_vertex(position));
        }

        buffers.indices.reserve(self.triangles.len() * 3);
        for triangle in &self.triangles {
            for &id in &triangle.0 {
                buffers
                    .indices
                    .push(OutputIndex::from(id + offset as u32));
            }
        }

        Ok(())
    }

    /// Creates new vertex and index buffers containing the mesh.
    pub fn to_buffers<OutputVertex, OutputIndex, Ctor>(
        &self,
        ctor: Ctor,
    ) -> Result<VertexBuffers<OutputVertex, OutputIndex>, GeometryBuilderError>
    where
        OutputIndex: From<VertexId> + MaxIndex,
        Ctor: VertexConstructor<OutputVertex>,
    {
        let mut buffers = VertexBuffers::with_capacity(self.vertices.len(), self.triangles.len() * 3);
        self.write_buffers(&mut buffers, ctor)?;

        Ok(buffers)
    }
}

/// Builds a [`Mesh`], welding vertices closer than an epsilon.
///
/// Vertices are bucketed in a grid of `epsilon` sized cells. A new position is compared with
/// the vertices of its cell and of the 8 surrounding ones, and reuses the one with the lowest
/// id within `epsilon`. Given the same sequence of calls, the output is the same.
pub struct MeshAssembler {
    epsilon: f32,
    vertices: Vec<Point>,
    triangles: Vec<Triangle>,
    grid: HashMap<(i64, i64), Vec<VertexId>>,
}

impl MeshAssembler {
    /// Creates an assembler. `weld_epsilon` must be strictly positive.
    pub fn new(weld_epsilon: f32) -> Self {
        MeshAssembler {
            epsilon: weld_epsilon,
            vertices: Vec::new(),
            triangles: Vec::new(),
            grid: HashMap::new(),
        }
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    fn cell(&self, p: Point) -> (i64, i64) {
        // `as` saturates, which is good enough for positions beyond the grid's range.
        let x = (p.x as f64 / self.epsilon as f64).floor() as i64;
        let y = (p.y as f64 / self.epsilon as f64).floor() as i64;
        (x, y)
    }

    /// Returns the id of a vertex within `epsilon` of `position`, adding one if needed.
    pub fn add_vertex(&mut self, position: Point) -> VertexId {
        let (cx, cy) = self.cell(position);
        let eps2 = self.epsilon * self.epsilon;

        let mut found: Option<VertexId> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(ids) = self.grid.get(&key) {
                    for &id in ids {
                        let d = (self.vertices[id.to_usize()] - position).square_length();
                        if d <= eps2 && found.map_or(true, |f| id < f) {
                            found = Some(id);
                        }
                    }
                }
            }
        }

        if let Some(id) = found {
            return id;
        }

        let id = VertexId::from_usize(self.vertices.len());
        self.vertices.push(position);
        self.grid.entry((cx, cy)).or_insert_with(Vec::new).push(id);

        id
    }

    /// Adds a triangle, unless welding collapsed it or flipped it.
    ///
    /// Triangles with an area at or below [`TRIANGLE_AREA_EPSILON`] are dropped as well.
    /// Returns whether the triangle was kept.
    pub fn add_triangle(&mut self, a: VertexId, b: VertexId, c: VertexId) -> bool {
        if a == b || b == c || a == c {
            return false;
        }

        let area = orient(
            self.vertices[a.to_usize()],
            self.vertices[b.to_usize()],
            self.vertices[c.to_usize()],
        ) * 0.5;
        if area <= TRIANGLE_AREA_EPSILON {
            return false;
        }

        self.triangles.push(Triangle([a, b, c]));

        true
    }

    /// Adds the triangles of another mesh.
    pub fn append(&mut self, mesh: &Mesh) {
        let ids: Vec<VertexId> = mesh.vertices.iter().map(|&p| self.add_vertex(p)).collect();
        for triangle in &mesh.triangles {
            let [a, b, c] = triangle.0;
            self.add_triangle(ids[a.to_usize()], ids[b.to_usize()], ids[c.to_usize()]);
        }
    }

    pub fn build(self) -> Mesh {
        Mesh {
            vertices: self.vertices,
            triangles: self.triangles,
        }
    }
}

impl TriangleSink for MeshAssembler {
    fn triangle(&mut self, a: Point, b: Point, c: Point) {
        let a = self.add_vertex(a);
        let b = self.add_vertex(b);
        let c = self.add_vertex(c);
        self.add_triangle(a, b, c);
    }
}

#[test]
fn weld_vertices() {
    let mut assembler = MeshAssembler::new(0.01);
    let a = assembler.add_vertex(point(0.0, 0.0));
    let b = assembler.add_vertex(point(1.0, 0.0));
    assert_eq!(assembler.add_vertex(point(0.005, 0.0)), a);
    // Across a cell boundary.
    assert_eq!(assembler.add_vertex(point(1.0, -0.004)), b);
    assert_ne!(assembler.add_vertex(point(0.02, 0.0)), a);
    assert_eq!(assembler.num_vertices(), 3);
}

#[test]
fn lowest_id_wins() {
    let mut assembler = MeshAssembler::new(1.0);
    let a = assembler.add_vertex(point(0.0, 0.0));
    let b = assembler.add_vertex(point(1.5, 0.0));
    assert_ne!(a, b);
    // Within epsilon of both.
    assert_eq!(assembler.add_vertex(point(0.75, 0.0)), a);
}

#[test]
fn collapsed_triangles() {
    let mut assembler = MeshAssembler::new(0.1);
    assembler.triangle(point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0));
    // Two corners weld together.
    assembler.triangle(point(0.0, 0.0), point(0.05, 0.0), point(0.0, 1.0));
    // Clockwise.
    assembler.triangle(point(0.0, 0.0), point(0.0, 1.0), point(1.0, 0.0));
    assert_eq!(assembler.num_triangles(), 1);

    let mesh = assembler.build();
    assert_eq!(mesh.vertices().len(), 3);
    assert!((mesh.area() - 0.5).abs() < 1e-6);
}

#[test]
fn sliver_triangles() {
    let mut assembler = MeshAssembler::new(1e-5);
    // Counter-clockwise, but with an area of 5e-11.
    assembler.triangle(point(0.0, 0.0), point(1.0, 0.0), point(0.5, 1e-10));
    assert_eq!(assembler.num_triangles(), 0);

    assembler.triangle(point(0.0, 0.0), point(1.0, 0.0), point(0.5, 1e-3));
    assert_eq!(assembler.num_triangles(), 1);
}

#[test]
fn shared_edges_and_determinism() {
    let build = || {
        let mut assembler = MeshAssembler::new(1e-5);
        assembler.triangle(point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0));
        assembler.triangle(point(0.0, 0.0), point(1.0, 1.0), point(0.0, 1.0));
        assembler.build()
    };

    let mesh = build();
    assert_eq!(mesh.vertices().len(), 4);
    assert_eq!(mesh.triangles().len(), 2);
    assert_eq!(mesh, build());

    let mut merged = MeshAssembler::new(1e-5);
    merged.append(&mesh);
    merged.append(&mesh);
    let merged = merged.build();
    assert_eq!(merged.vertices().len(), 4);
    assert_eq!(merged.triangles().len(), 4);
}

#[test]
fn export_buffers() {
    let mut assembler = MeshAssembler::new(1e-5);
    assembler.triangle(point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0));
    assembler.triangle(point(0.0, 0.0), point(1.0, 1.0), point(0.0, 1.0));
    let mesh = assembler.build();

    let mut buffers: VertexBuffers<[f32; 2], u16> = VertexBuffers::new();
    mesh.write_buffers(&mut buffers, |p: Point| p.to_array()).unwrap();
    mesh.write_buffers(&mut buffers, |p: Point| p.to_array()).unwrap();
    assert_eq!(buffers.vertices.len(), 8);
    assert_eq!(&buffers.indices[..6], &[0, 1, 2, 0, 2, 3]);
    assert_eq!(&buffers.indices[6..], &[4, 5, 6, 4, 6, 7]);

    let buffers: VertexBuffers<Point, u32> =
        mesh.to_buffers(crate::geometry_builder::Positions).unwrap();
    assert_eq!(buffers.vertices, mesh.vertices());
}
