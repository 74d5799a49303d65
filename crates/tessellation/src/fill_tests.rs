use crate::math::*;
use crate::math_utils::orient;
use crate::path::builder::*;
use crate::path::{build_contours, MalformedPath, MalformedPathKind, Path, PathCommand};
use crate::{
    tessellate, tessellate_batch, BatchOptions, CancellationToken, DegenerateReason, Diagnostic,
    ErrorMode, FillRule, Mesh, MeshAssembler, Shape, TessellationError, TessellationOptions,
    TessellationOutput, Tessellator, UnsupportedParameter, Winding,
};

use core::f32::consts::PI;

fn init_logging() -> bool {
    let enabled = std::env::var("TRELLIS_ENABLE_LOGGING").is_ok();
    if enabled {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    enabled
}

fn tessellate_with(
    path: &Path,
    options: &TessellationOptions,
) -> Result<TessellationOutput, TessellationError> {
    let log = init_logging();
    let mut tess = Tessellator::new();
    tess.set_logging(log);
    tess.tessellate_path(path, options)
}

fn polygon(points: &[(f32, f32)]) -> Vec<Point> {
    points.iter().map(|&(x, y)| point(x, y)).collect()
}

fn path_of(polygons: &[&[(f32, f32)]]) -> Path {
    let mut builder = Path::builder();
    for p in polygons {
        builder.add_polygon(&polygon(p));
    }

    builder.build()
}

fn contains_point(mesh: &Mesh, p: Point, strict: bool) -> usize {
    mesh.triangles()
        .iter()
        .filter(|t| {
            let [a, b, c] = mesh.triangle_positions(t);
            let o = [orient(a, b, p), orient(b, c, p), orient(c, a, p)];
            if strict {
                o.iter().all(|&v| v > 0.0)
            } else {
                o.iter().all(|&v| v >= 0.0)
            }
        })
        .count()
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.square_length();
    if len2 == 0.0 {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len2).max(0.0).min(1.0);
    (p - (a + ab * t)).length()
}

/// Samples a grid over the bounding box of the path and checks that the mesh covers
/// exactly the points the winding rule considers inside, without overlaps.
fn check_coverage(path: &Path, mesh: &Mesh, fill_rule: FillRule, tolerance: f32) {
    let contours = build_contours(path, tolerance).unwrap().contours;
    let shape = Shape::new(&contours, fill_rule);

    let mut min = point(f32::MAX, f32::MAX);
    let mut max = point(f32::MIN, f32::MIN);
    for c in &contours {
        let b = c.bounding_box();
        min = min.min(b.min);
        max = max.max(b.max);
    }

    let size = (max - min).length();
    let margin = size * 1e-3;
    let n = 60;
    for i in 0..n {
        for j in 0..n {
            // Offsets avoid sampling exactly on axis aligned edges.
            let p = point(
                min.x + (max.x - min.x) * (i as f32 + 0.37) / n as f32,
                min.y + (max.y - min.y) * (j as f32 + 0.61) / n as f32,
            );

            let near_edge = contours.iter().any(|c| {
                let len = c.points.len();
                (0..len).any(|k| distance_to_segment(p, c.points[k], c.points[(k + 1) % len]) < margin)
            });
            if near_edge {
                continue;
            }

            let covered = contains_point(mesh, p, false);
            assert!(
                contains_point(mesh, p, true) <= 1,
                "overlapping triangles at {:?}",
                p
            );
            assert_eq!(
                shape.contains(p),
                covered > 0,
                "coverage mismatch at {:?} with {:?}",
                p,
                fill_rule
            );
        }
    }
}

fn check_path(path: &Path, fill_rule: FillRule, expected_area: Option<f32>) -> Mesh {
    let options = TessellationOptions::tolerance(0.05).with_fill_rule(fill_rule);
    let output = match tessellate_with(path, &options) {
        Ok(output) => output,
        Err(e) => panic!("Test failed with fill rule {:?}: {}", fill_rule, e),
    };

    for t in output.mesh.triangles() {
        let [a, b, c] = output.mesh.triangle_positions(t);
        assert!(orient(a, b, c) > 0.0, "clockwise triangle {:?}", t);
    }

    if let Some(area) = expected_area {
        let actual = output.mesh.area();
        assert!(
            (actual - area).abs() <= 1e-3 * area.max(1.0),
            "expected area {}, got {} with {:?}",
            area,
            actual,
            fill_rule
        );
    }

    check_coverage(path, &output.mesh, fill_rule, 0.05);

    output.mesh
}

fn check_path_both_rules(path: &Path, expected_area: Option<f32>) {
    check_path(path, FillRule::EvenOdd, expected_area);
    check_path(path, FillRule::NonZero, expected_area);
}

#[test]
fn test_simple_triangle() {
    let path = path_of(&[&[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]]);
    let mesh = check_path(&path, FillRule::EvenOdd, Some(0.5));
    assert_eq!(mesh.triangles().len(), 1);
    assert_eq!(mesh.vertices().len(), 3);
}

#[test]
fn test_simple_monotone() {
    let path = path_of(&[&[
        (0.0, 0.0),
        (-1.0, 1.0),
        (-3.0, 2.0),
        (-1.0, 3.0),
        (-4.0, 5.0),
        (0.0, 6.0),
    ]]);
    check_path_both_rules(&path, None);
}

#[test]
fn test_split_and_merge_vertices() {
    let path = path_of(&[&[
        (0.0, 0.0),
        (1.0, 0.0),
        (1.5, -2.0),
        (2.0, 0.0),
        (3.0, 0.0),
        (3.5, -2.0),
        (4.0, 0.0),
        (5.0, 0.0),
        (5.0, 2.0),
        (4.0, 2.0),
        (3.5, 4.0),
        (3.0, 2.0),
        (2.0, 2.0),
        (1.5, 4.0),
        (1.0, 2.0),
        (0.0, 2.0),
    ]]);
    check_path_both_rules(&path, Some(14.0));
}

#[test]
fn test_nested_squares_classification() {
    let outer: &[(f32, f32)] = &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
    let inner: &[(f32, f32)] = &[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)];
    let inner_reversed: &[(f32, f32)] = &[(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)];

    // Same direction: a hole under even-odd only.
    let path = path_of(&[outer, inner]);
    check_path(&path, FillRule::EvenOdd, Some(12.0));
    check_path(&path, FillRule::NonZero, Some(16.0));

    // Reversing the inner square does not change even-odd but changes non-zero.
    let path = path_of(&[outer, inner_reversed]);
    check_path(&path, FillRule::EvenOdd, Some(12.0));
    check_path(&path, FillRule::NonZero, Some(12.0));
}

#[test]
fn test_o_shape() {
    let mut builder = Path::builder();
    builder.add_rectangle(&box2d(0.0, 0.0, 10.0, 10.0), Winding::Positive);
    builder.add_rectangle(&box2d(3.0, 3.0, 7.0, 7.0), Winding::Negative);
    let path = builder.build();

    let mesh = check_path(&path, FillRule::NonZero, Some(84.0));
    for t in mesh.triangles() {
        let [a, b, c] = mesh.triangle_positions(t);
        let center = point((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        let in_hole = center.x > 3.0 && center.x < 7.0 && center.y > 3.0 && center.y < 7.0;
        assert!(!in_hole, "triangle {:?} inside the hole", t);
    }
}

#[test]
fn test_several_holes_and_islands() {
    let mut builder = Path::builder();
    builder.add_rectangle(&box2d(0.0, 0.0, 20.0, 10.0), Winding::Positive);
    builder.add_rectangle(&box2d(1.0, 1.0, 9.0, 9.0), Winding::Negative);
    builder.add_rectangle(&box2d(11.0, 1.0, 19.0, 9.0), Winding::Negative);
    // Islands inside the holes.
    builder.add_rectangle(&box2d(3.0, 3.0, 7.0, 7.0), Winding::Positive);
    builder.add_circle(point(15.0, 5.0), 2.0, Winding::Positive);
    let path = builder.build();

    let even_odd = check_path(&path, FillRule::EvenOdd, None);
    let non_zero = check_path(&path, FillRule::NonZero, None);
    let expected = 200.0 - 64.0 - 64.0 + 16.0 + PI * 4.0;
    assert!((non_zero.area() - expected).abs() < 0.5);
    assert!((even_odd.area() - non_zero.area()).abs() < 1e-3);
}

#[test]
fn test_circle() {
    let mut builder = Path::builder();
    builder.add_circle(point(0.0, 0.0), 1.0, Winding::Positive);
    let path = builder.build();

    let mut previous_vertices = 0;
    for &tolerance in &[0.1, 0.01, 0.001] {
        let mesh = tessellate(&path, FillRule::NonZero, tolerance).unwrap();
        assert!(mesh.vertices().len() > previous_vertices);
        previous_vertices = mesh.vertices().len();

        // Inscribed polygons lose a bit of area: about 0.64% for 0.01.
        let max_error = if tolerance <= 0.001 { 0.005 } else { 0.01 };
        if tolerance <= 0.01 {
            assert!(((mesh.area() - PI) / PI).abs() < max_error, "area {}", mesh.area());
        }
    }

    check_path_both_rules(&path, None);
}

#[test]
fn test_star() {
    let mut points = Vec::new();
    for i in 0..5 {
        let angle = PI * 0.5 + (i * 2) as f32 * PI * 2.0 / 5.0;
        points.push(point(angle.cos() * 10.0, angle.sin() * 10.0));
    }
    let mut builder = Path::builder();
    builder.add_polygon(&points);
    let path = builder.build();

    let even_odd = check_path(&path, FillRule::EvenOdd, None);
    let non_zero = check_path(&path, FillRule::NonZero, None);
    // The central pentagon is only filled with the non-zero rule.
    assert!(non_zero.area() > even_odd.area());
    assert_eq!(contains_point(&even_odd, point(0.0, 0.0), false), 0);
    assert_eq!(contains_point(&non_zero, point(0.0, 0.0), false), 1);
}

#[test]
fn test_bowtie() {
    let path = path_of(&[&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]]);
    check_path_both_rules(&path, Some(2.0));
}

#[test]
fn test_overlapping_squares() {
    let a: &[(f32, f32)] = &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
    let b: &[(f32, f32)] = &[(1.0, 1.0), (3.0, 1.0), (3.0, 3.0), (1.0, 3.0)];
    let path = path_of(&[a, b]);
    check_path(&path, FillRule::NonZero, Some(7.0));
    check_path(&path, FillRule::EvenOdd, Some(6.0));
}

#[test]
fn test_squares_sharing_an_edge() {
    let a: &[(f32, f32)] = &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
    let b: &[(f32, f32)] = &[(1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0)];
    let path = path_of(&[a, b]);
    let mesh = check_path(&path, FillRule::NonZero, Some(2.0));
    assert!(mesh.vertices().len() <= 6);
}

#[test]
fn test_exactly_overlapping_contours() {
    let a: &[(f32, f32)] = &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)];
    let path = path_of(&[a, a]);

    let output = tessellate_with(&path, &TessellationOptions::non_zero()).unwrap();
    assert!((output.mesh.area() - 4.0).abs() < 1e-5);
    assert!(output
        .diagnostics
        .contains(&Diagnostic::AmbiguousContainment { contour: 1, other: 0 }));

    // Both cancel out under even-odd.
    let output = tessellate_with(&path, &TessellationOptions::even_odd()).unwrap();
    assert!(output.mesh.is_empty());
}

#[test]
fn test_degenerate_contour() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 1.0));
    builder.close();
    let path = builder.build();

    let output = tessellate_with(&path, &TessellationOptions::DEFAULT).unwrap();
    assert!(output.mesh.is_empty());
    assert_eq!(
        output.diagnostics,
        vec![Diagnostic::DroppedContour {
            subpath: 0,
            point_count: 2
        }]
    );

    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 1.0));
    builder.close();
    builder.add_rectangle(&box2d(0.0, 0.0, 1.0, 1.0), Winding::Positive);
    let path = builder.build();
    let output = tessellate_with(&path, &TessellationOptions::DEFAULT).unwrap();
    assert!((output.mesh.area() - 1.0).abs() < 1e-5);
    assert_eq!(output.diagnostics.len(), 1);
}

#[test]
fn test_empty_path() {
    let mesh = tessellate(&Path::new(), FillRule::EvenOdd, 0.1).unwrap();
    assert!(mesh.is_empty());
    assert!(mesh.vertices().is_empty());
}

#[test]
fn test_strict_and_lenient() {
    let mut builder = Path::builder();
    builder.add_rectangle(&box2d(0.0, 0.0, 1.0, 1.0), Winding::Positive);
    builder.add_rectangle(&box2d(5.0, 5.0, 5.0001, 5.0001), Winding::Positive);
    let path = builder.build();

    let lenient = TessellationOptions::DEFAULT.with_mode(ErrorMode::Lenient);
    let output = tessellate_with(&path, &lenient).unwrap();
    assert!((output.mesh.area() - 1.0).abs() < 1e-5);
    assert_eq!(
        output.diagnostics,
        vec![Diagnostic::SkippedRegion {
            contour_index: 1,
            reason: DegenerateReason::TooSmall,
        }]
    );

    let strict = TessellationOptions::DEFAULT.with_mode(ErrorMode::Strict);
    assert_eq!(
        tessellate_with(&path, &strict),
        Err(TessellationError::DegenerateRegion {
            contour_index: 1,
            reason: DegenerateReason::TooSmall,
        })
    );

    // Nothing left: lenient mode fails too.
    let mut builder = Path::builder();
    builder.add_rectangle(&box2d(5.0, 5.0, 5.0001, 5.0001), Winding::Positive);
    let path = builder.build();
    assert!(matches!(
        tessellate_with(&path, &lenient),
        Err(TessellationError::DegenerateRegion { .. })
    ));
}

#[test]
fn test_malformed_path() {
    let path = Path::from_commands(vec![PathCommand::LineTo(point(1.0, 0.0))]);
    assert_eq!(
        tessellate(&path, FillRule::EvenOdd, 0.1),
        Err(TessellationError::MalformedPath(MalformedPath {
            command_index: 0,
            kind: MalformedPathKind::MissingMoveTo,
        }))
    );
}

#[test]
fn test_unsupported_parameters() {
    let path = path_of(&[&[(0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]]);
    assert_eq!(
        tessellate(&path, FillRule::EvenOdd, -1.0),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::ToleranceIsNotPositive
        ))
    );
    assert_eq!(
        tessellate(&path, FillRule::EvenOdd, f32::NAN),
        Err(TessellationError::UnsupportedParameter(
            UnsupportedParameter::ToleranceIsNaN
        ))
    );
}

#[test]
fn test_determinism() {
    let mut builder = Path::builder();
    builder.add_circle(point(0.0, 0.0), 5.0, Winding::Positive);
    builder.add_circle(point(3.0, 0.0), 4.0, Winding::Positive);
    builder.add_rectangle(&box2d(-1.0, -1.0, 1.0, 1.0), Winding::Negative);
    let path = builder.build();

    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let a = tessellate(&path, rule, 0.05).unwrap();
        let b = tessellate(&path, rule, 0.05).unwrap();
        assert_eq!(a, b);
    }
}

fn batch_paths() -> Vec<Path> {
    let mut paths = Vec::new();
    for i in 0..8 {
        let mut builder = Path::builder();
        let x = i as f32 * 3.0;
        builder.add_rectangle(&box2d(x, 0.0, x + 2.0, 2.0), Winding::Positive);
        builder.add_circle(point(x + 1.0, 5.0), 1.0, Winding::Positive);
        paths.push(builder.build());
    }

    paths
}

#[test]
fn test_batch_matches_sequential() {
    init_logging();
    let paths = batch_paths();
    let options = TessellationOptions::tolerance(0.05);

    let mut assembler = MeshAssembler::new(options.weld_epsilon);
    for path in &paths {
        let output = Tessellator::new().tessellate_path(path, &options).unwrap();
        assembler.append(&output.mesh);
    }
    let sequential = assembler.build();

    for &threads in &[1, 4] {
        let batch = BatchOptions::default().with_num_threads(threads);
        let output = tessellate_batch(&paths, &options, &batch).unwrap();
        assert_eq!(output.mesh, sequential);
        assert!(output.diagnostics.is_empty());
    }
}

#[test]
fn test_batch_errors() {
    let mut paths = batch_paths();
    paths.insert(1, Path::from_commands(vec![PathCommand::Close]));
    paths.push(Path::from_commands(vec![PathCommand::LineTo(point(1.0, 0.0))]));

    let options = TessellationOptions::tolerance(0.05);
    let output = tessellate_batch(&paths, &options, &BatchOptions::default()).unwrap();
    let skipped: Vec<usize> = output
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::SkippedPath { path_index, .. } => Some(*path_index),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![1, 9]);

    let strict = options.with_mode(ErrorMode::Strict);
    assert_eq!(
        tessellate_batch(&paths, &strict, &BatchOptions::default()),
        Err(TessellationError::MalformedPath(MalformedPath {
            command_index: 0,
            kind: MalformedPathKind::MissingMoveTo,
        }))
    );
}

#[test]
fn test_batch_cancellation() {
    let paths = batch_paths();
    let token = CancellationToken::new();
    token.cancel();
    assert!(token.is_cancelled());

    let batch = BatchOptions::default().with_cancellation(token.clone());
    assert_eq!(
        tessellate_batch(&paths, &TessellationOptions::DEFAULT, &batch),
        Err(TessellationError::Cancelled)
    );

    let strict = TessellationOptions::DEFAULT.with_mode(ErrorMode::Strict);
    assert_eq!(
        tessellate_batch(&paths, &strict, &batch),
        Err(TessellationError::Cancelled)
    );

    let output =
        tessellate_batch(&paths, &TessellationOptions::DEFAULT, &BatchOptions::default()).unwrap();
    assert!(!output.mesh.is_empty());
}
