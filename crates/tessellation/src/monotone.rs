use crate::error::InternalError;
use crate::math::Point;
use crate::math_utils::cross;
use crate::VertexId;

/// Which chain of a monotone polygon a vertex belongs to.
///
/// With y pointing up and a counter-clockwise polygon, the right chain goes up from the
/// lowest vertex and the left chain goes down from the highest one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn is_right(self) -> bool {
        self == Side::Right
    }
}

/// Helper class that generates a triangulation from a sequence of vertices describing a
/// y-monotone polygon, sorted in sweep order (used internally by the `Triangulator`).
pub(crate) struct MonotoneTessellator {
    stack: Vec<MonotoneVertex>,
    previous: MonotoneVertex,
    triangles: Vec<[VertexId; 3]>,
    chain: Vec<(usize, Side)>,
}

#[derive(Copy, Clone, Debug)]
struct MonotoneVertex {
    pos: Point,
    id: VertexId,
    side: Side,
}

impl MonotoneTessellator {
    pub fn new() -> Self {
        MonotoneTessellator {
            stack: Vec::new(),
            triangles: Vec::new(),
            chain: Vec::new(),
            // Some placeholder value that will be replaced right away.
            previous: MonotoneVertex {
                pos: Point::new(0.0, 0.0),
                id: VertexId(0),
                side: Side::Left,
            },
        }
    }

    pub fn begin(&mut self, pos: Point, id: VertexId) {
        debug_assert!(id != VertexId::INVALID);
        let first = MonotoneVertex {
            pos,
            id,
            side: Side::Left,
        };
        self.previous = first;

        self.stack.clear();
        self.stack.push(first);
    }

    #[inline]
    pub fn vertex(&mut self, pos: Point, id: VertexId, side: Side) {
        self.monotone_vertex(MonotoneVertex { pos, id, side });
    }

    fn monotone_vertex(&mut self, current: MonotoneVertex) {
        debug_assert!(current.id != VertexId::INVALID);
        debug_assert!(!self.stack.is_empty());

        let changed_side = current.side != self.previous.side;

        if changed_side {
            // The whole stack is visible from the current vertex.
            for i in 0..(self.stack.len() - 1) {
                let mut a = self.stack[i];
                let mut b = self.stack[i + 1];

                if cross(b.pos - a.pos, current.pos - a.pos) < 0.0 {
                    core::mem::swap(&mut a, &mut b);
                }

                self.push_triangle(&a, &b, &current);
            }
            self.stack.clear();
            self.stack.push(self.previous);
        } else {
            let mut last_popped = self.stack.pop();
            while let (Some(popped), Some(&top)) = (last_popped, self.stack.last()) {
                let mut a = popped;
                let mut b = top;

                if current.side.is_right() {
                    core::mem::swap(&mut a, &mut b);
                }

                // Strictly convex: collinear vertices stay on the stack until the
                // other side is reached.
                if cross(current.pos - b.pos, a.pos - b.pos) > 0.0 {
                    self.push_triangle(&b, &a, &current);
                    last_popped = self.stack.pop();
                } else {
                    break;
                }
            }
            if let Some(item) = last_popped {
                self.stack.push(item);
            }
        }

        self.stack.push(current);
        self.previous = current;
    }

    pub fn end(&mut self, pos: Point, id: VertexId) {
        let side = self.previous.side.opposite();
        self.vertex(pos, id, side);
        self.stack.clear();
    }

    #[inline]
    fn push_triangle(&mut self, a: &MonotoneVertex, b: &MonotoneVertex, c: &MonotoneVertex) {
        debug_assert!(a.id != b.id);
        debug_assert!(b.id != c.id);
        debug_assert!(a.id != c.id);

        self.triangles.push([a.id, b.id, c.id]);
    }

    /// Triangulates a counter-clockwise monotone piece.
    ///
    /// `piece` lists the polygon vertices of the piece in counter-clockwise order and
    /// `rank` gives the position of each polygon vertex in sweep order.
    pub fn tessellate_piece(
        &mut self,
        piece: &[usize],
        positions: &[Point],
        rank: &[usize],
    ) -> Result<(), InternalError> {
        let n = piece.len();
        if n < 3 {
            return Err(InternalError::InvalidMonotonePiece(n));
        }

        let mut lowest = 0;
        let mut highest = 0;
        for i in 1..n {
            if rank[piece[i]] < rank[piece[lowest]] {
                lowest = i;
            }
            if rank[piece[i]] > rank[piece[highest]] {
                highest = i;
            }
        }

        // The right chain goes up from the lowest vertex, the left chain goes down from
        // the highest one. Each must be monotone.
        self.chain.clear();
        let mut i = (lowest + 1) % n;
        let mut previous = piece[lowest];
        while i != highest {
            if rank[piece[i]] < rank[previous] {
                return Err(InternalError::InvalidMonotonePiece(n));
            }
            self.chain.push((piece[i], Side::Right));
            previous = piece[i];
            i = (i + 1) % n;
        }
        let right_len = self.chain.len();

        let mut i = (lowest + n - 1) % n;
        let mut previous = piece[lowest];
        while i != highest {
            if rank[piece[i]] < rank[previous] {
                return Err(InternalError::InvalidMonotonePiece(n));
            }
            self.chain.push((piece[i], Side::Left));
            previous = piece[i];
            i = (i + n - 1) % n;
        }

        // Merge both chains in sweep order.
        let (right, left) = self.chain.split_at(right_len);
        let mut merged: Vec<(usize, Side)> = Vec::with_capacity(n);
        let (mut r, mut l) = (0, 0);
        while r < right.len() || l < left.len() {
            let take_right = l >= left.len() || (r < right.len() && rank[right[r].0] < rank[left[l].0]);
            if take_right {
                merged.push(right[r]);
                r += 1;
            } else {
                merged.push(left[l]);
                l += 1;
            }
        }

        let first = piece[lowest];
        self.begin(positions[first], VertexId::from_usize(first));
        for (v, side) in merged {
            self.vertex(positions[v], VertexId::from_usize(v), side);
        }
        let last = piece[highest];
        self.end(positions[last], VertexId::from_usize(last));

        Ok(())
    }

    /// Moves the generated triangles into `output`.
    pub fn flush(&mut self, output: &mut Vec<[VertexId; 3]>) {
        output.append(&mut self.triangles);
    }
}

#[cfg(test)]
use crate::math::point;

#[cfg(test)]
fn triangulated_area(positions: &[Point]) -> f64 {
    let piece: Vec<usize> = (0..positions.len()).collect();
    let mut sorted = piece.clone();
    sorted.sort_by(|&a, &b| crate::math_utils::compare_positions(positions[a], positions[b]));
    let mut rank = vec![0; positions.len()];
    for (r, &v) in sorted.iter().enumerate() {
        rank[v] = r;
    }

    let mut tess = MonotoneTessellator::new();
    tess.tessellate_piece(&piece, positions, &rank).unwrap();
    let mut triangles = Vec::new();
    tess.flush(&mut triangles);

    triangles
        .iter()
        .map(|t| {
            let [a, b, c] = *t;
            crate::math_utils::orient(
                positions[a.to_usize()],
                positions[b.to_usize()],
                positions[c.to_usize()],
            )
            .abs()
                * 0.5
        })
        .sum()
}

#[test]
fn test_monotone_tess() {
    {
        let mut tess = MonotoneTessellator::new();
        tess.begin(point(0.0, 0.0), VertexId(0));
        tess.vertex(point(-1.0, 1.0), VertexId(1), Side::Left);
        tess.end(point(1.0, 2.0), VertexId(2));
        assert_eq!(tess.triangles.len(), 1);
    }
    {
        let mut tess = MonotoneTessellator::new();
        tess.begin(point(0.0, 0.0), VertexId(0));
        tess.vertex(point(1.0, 1.0), VertexId(1), Side::Right);
        tess.vertex(point(-1.5, 2.0), VertexId(2), Side::Left);
        tess.vertex(point(-1.0, 3.0), VertexId(3), Side::Left);
        tess.vertex(point(1.0, 4.0), VertexId(4), Side::Right);
        tess.end(point(0.0, 5.0), VertexId(5));
        assert_eq!(tess.triangles.len(), 4);
    }
    {
        // A right chain with reflex vertices.
        let mut tess = MonotoneTessellator::new();
        tess.begin(point(0.0, 0.0), VertexId(0));
        tess.vertex(point(1.0, 1.0), VertexId(1), Side::Right);
        tess.vertex(point(3.0, 2.0), VertexId(2), Side::Right);
        tess.vertex(point(1.0, 3.0), VertexId(3), Side::Right);
        tess.vertex(point(1.0, 4.0), VertexId(4), Side::Right);
        tess.vertex(point(4.0, 5.0), VertexId(5), Side::Right);
        tess.end(point(0.0, 6.0), VertexId(6));
        assert_eq!(tess.triangles.len(), 5);
    }
    {
        let mut tess = MonotoneTessellator::new();
        tess.begin(point(0.0, 0.0), VertexId(0));
        tess.vertex(point(-1.0, 1.0), VertexId(1), Side::Left);
        tess.vertex(point(-3.0, 2.0), VertexId(2), Side::Left);
        tess.vertex(point(-1.0, 3.0), VertexId(3), Side::Left);
        tess.vertex(point(-1.0, 4.0), VertexId(4), Side::Left);
        tess.vertex(point(-4.0, 5.0), VertexId(5), Side::Left);
        tess.end(point(0.0, 6.0), VertexId(6));
        assert_eq!(tess.triangles.len(), 5);
    }
}

#[test]
fn monotone_piece_area() {
    // Counter-clockwise, monotone with reflex vertices on both chains.
    let positions = [
        point(0.0, 0.0),
        point(2.0, 1.0),
        point(1.0, 2.0),
        point(3.0, 4.0),
        point(0.0, 5.0),
        point(-1.0, 3.0),
        point(0.5, 2.5),
        point(-2.0, 1.0),
    ];

    let expected = crate::math_utils::signed_area_f64(&positions);
    assert!(expected > 0.0);
    assert!((triangulated_area(&positions) - expected).abs() < 1e-9);
}

#[test]
fn non_monotone_piece() {
    // A "U" shape is not y-monotone.
    let positions = [
        point(0.0, 0.0),
        point(3.0, 0.0),
        point(3.0, 3.0),
        point(2.0, 3.0),
        point(2.0, 1.0),
        point(1.0, 1.0),
        point(1.0, 3.0),
        point(0.0, 3.0),
    ];
    let piece: Vec<usize> = (0..positions.len()).collect();
    let mut sorted = piece.clone();
    sorted.sort_by(|&a, &b| crate::math_utils::compare_positions(positions[a], positions[b]));
    let mut rank = vec![0; positions.len()];
    for (r, &v) in sorted.iter().enumerate() {
        rank[v] = r;
    }

    let mut tess = MonotoneTessellator::new();
    assert_eq!(
        tess.tessellate_piece(&piece, &positions, &rank),
        Err(InternalError::InvalidMonotonePiece(8))
    );
}
