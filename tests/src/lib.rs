//! Shared inputs for the integration tests and benchmarks.

use trellis::geom::{CubicBezierSegment, LineSegment, QuadraticBezierSegment};
use trellis::math::{point, vector, Box2D, Point};
use trellis::path::builder::*;
use trellis::path::{Path, Winding};

use std::f32::consts::PI;

pub static TOLERANCES: [f32; 10] = [0.01, 0.025, 0.05, 0.075, 0.1, 0.15, 0.2, 0.25, 0.5, 1.0];

/// A cheap deterministic generator, so that benchmarks always see the same inputs.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    /// A value in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }

    pub fn point_in(&mut self, rect: &Box2D) -> Point {
        let x = rect.min.x + self.next_f32() * rect.width();
        let y = rect.min.y + self.next_f32() * rect.height();
        point(x, y)
    }
}

/// Cubic curves with loops, cusps and inflections scattered over a 1000x1000 area.
pub fn generate_bezier_curves(count: usize) -> Vec<CubicBezierSegment<f32>> {
    let area = Box2D {
        min: point(0.0, 0.0),
        max: point(1000.0, 1000.0),
    };
    let mut rng = Lcg::new(0x7e11_15);
    (0..count)
        .map(|_| CubicBezierSegment {
            from: rng.point_in(&area),
            ctrl1: rng.point_in(&area),
            ctrl2: rng.point_in(&area),
            to: rng.point_in(&area),
        })
        .collect()
}

pub fn generate_quadratic_curves(count: usize) -> Vec<QuadraticBezierSegment<f32>> {
    let area = Box2D {
        min: point(0.0, 0.0),
        max: point(1000.0, 1000.0),
    };
    let mut rng = Lcg::new(0xba5e);
    (0..count)
        .map(|_| QuadraticBezierSegment {
            from: rng.point_in(&area),
            ctrl: rng.point_in(&area),
            to: rng.point_in(&area),
        })
        .collect()
}

pub fn circle(center: Point, radius: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_circle(center, radius, Winding::Positive);
    builder.build()
}

/// A disc of radius `outer` with a hole of radius `inner`, the hole winding the
/// other way so that both fill rules agree.
pub fn annulus(center: Point, inner: f32, outer: f32) -> Path {
    let mut builder = Path::builder();
    builder.add_circle(center, outer, Winding::Positive);
    builder.add_circle(center, inner, Winding::Negative);
    builder.build()
}

/// A self-intersecting star polygon, `{branches/step}` in Schläfli notation.
pub fn star(center: Point, radius: f32, branches: usize, step: usize) -> Path {
    let mut builder = Path::builder();
    for i in 0..branches {
        let angle = PI / 2.0 + 2.0 * PI * ((i * step) % branches) as f32 / branches as f32;
        let p = center + vector(angle.cos(), angle.sin()) * radius;
        if i == 0 {
            builder.begin(p);
        } else {
            builder.line_to(p);
        }
    }
    builder.close();
    builder.build()
}

/// A rectangle with `teeth` notches cut from its top edge, exercising split and merge
/// vertices of the monotone decomposition.
pub fn comb(teeth: usize) -> Path {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(2.0 * teeth as f32 + 1.0, 0.0));
    builder.line_to(point(2.0 * teeth as f32 + 1.0, 3.0));
    for i in (0..teeth).rev() {
        let x = 2.0 * i as f32 + 1.0;
        builder.line_to(point(x + 1.0, 3.0));
        builder.line_to(point(x + 0.5, 1.0));
        builder.line_to(point(x, 3.0));
    }
    builder.line_to(point(0.0, 3.0));
    builder.close();
    builder.build()
}

/// A rectangle with a `columns` x `rows` grid of circular holes of radius 3.
pub fn perforated_plate(columns: usize, rows: usize) -> Path {
    let mut builder = Path::builder();
    builder.add_rectangle(
        &Box2D {
            min: point(0.0, 0.0),
            max: point(columns as f32 * 10.0, rows as f32 * 10.0),
        },
        Winding::Positive,
    );
    for y in 0..rows {
        for x in 0..columns {
            let center = point(x as f32 * 10.0 + 5.0, y as f32 * 10.0 + 5.0);
            builder.add_circle(center, 3.0, Winding::Negative);
        }
    }
    builder.build()
}

/// A grid of small shapes mixing circles, holes and stars.
pub fn scene(columns: usize, rows: usize) -> Vec<Path> {
    let mut paths = Vec::with_capacity(columns * rows);
    for y in 0..rows {
        for x in 0..columns {
            let center = point(x as f32 * 50.0 + 25.0, y as f32 * 50.0 + 25.0);
            paths.push(match (x + y) % 3 {
                0 => circle(center, 20.0),
                1 => annulus(center, 10.0, 20.0),
                _ => star(center, 20.0, 7, 3),
            });
        }
    }

    paths
}

/// Largest distance between points sampled on the curve and the polyline approximating it.
pub fn max_flattening_error(curve: &CubicBezierSegment<f32>, segments: &[LineSegment<f32>]) -> f32 {
    const STEPS: u32 = 500;
    let mut max_error: f32 = 0.0;
    for i in 0..=STEPS {
        let p = curve.sample(i as f32 / STEPS as f32);
        let error = segments
            .iter()
            .map(|segment| segment.distance_to_point(p))
            .fold(f32::MAX, f32::min);
        max_error = max_error.max(error);
    }

    max_error
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis::tessellation::*;

    #[test]
    fn flattening_stays_within_tolerance() {
        let curves = generate_bezier_curves(20);
        for &tolerance in &TOLERANCES[4..] {
            for curve in &curves {
                let mut segments = Vec::new();
                let reached_limit = curve.for_each_flattened(tolerance, &mut |segment| {
                    segments.push(*segment);
                });
                assert!(!reached_limit);
                let first = segments.first().map_or(curve.to, |s| s.from);
                let last = segments.last().map_or(curve.from, |s| s.to);
                assert!((first - curve.from).length() < 1e-3);
                assert!((last - curve.to).length() < 1e-3);

                let error = max_flattening_error(curve, &segments);
                assert!(
                    error <= tolerance * 1.01 + 1e-3,
                    "tolerance {:?} error {:?} curve {:?}",
                    tolerance,
                    error,
                    curve
                );
            }
        }
    }

    #[test]
    fn segment_count_decreases_with_tolerance() {
        let curves = generate_quadratic_curves(50);
        let mut previous = usize::MAX;
        for &tolerance in &TOLERANCES {
            let mut count = 0;
            for curve in &curves {
                curve.for_each_flattened(tolerance, &mut |_| count += 1);
            }
            assert!(count <= previous, "{} segments at tolerance {}", count, tolerance);
            previous = count;
        }
    }

    #[test]
    fn annulus_area() {
        let path = annulus(point(0.0, 0.0), 5.0, 10.0);
        let expected = PI * (100.0 - 25.0);
        for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
            let mesh = tessellate(&path, rule, 0.01).unwrap();
            assert!((mesh.area() - expected).abs() < expected * 0.01);
        }
    }

    #[test]
    fn comb_triangle_count() {
        let mesh = tessellate(&comb(10), FillRule::EvenOdd, 0.1).unwrap();
        // A simple polygon with n vertices has n - 2 triangles.
        assert_eq!(mesh.triangles().len(), 4 + 3 * 10 - 2);
        assert!((mesh.area() - (3.0 * 21.0 - 10.0)).abs() < 1e-3);
    }

    #[test]
    fn perforated_plate_area() {
        let output = Tessellator::new()
            .tessellate_path(&perforated_plate(12, 10), &TessellationOptions::tolerance(0.05))
            .unwrap();
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
        let expected = 120.0 * 100.0 - 120.0 * PI * 9.0;
        // Flattened holes are slightly smaller than the circles.
        assert!((output.mesh.area() - expected).abs() < expected * 0.02);
    }

    #[test]
    fn scene_batch() {
        let paths = scene(6, 5);
        let options = TessellationOptions::non_zero();

        let mut sequential = MeshAssembler::new(options.weld_epsilon);
        let mut diagnostics = Vec::new();
        let mut tessellator = Tessellator::new();
        for path in &paths {
            let output = tessellator.tessellate_path(path, &options).unwrap();
            sequential.append(&output.mesh);
            diagnostics.extend(output.diagnostics);
        }
        let sequential = sequential.build();

        let batch = BatchOptions::default().with_num_threads(3);
        let output = tessellate_batch(&paths, &options, &batch).unwrap();
        assert_eq!(output.mesh, sequential);
        assert_eq!(output.diagnostics, diagnostics);
    }
}
