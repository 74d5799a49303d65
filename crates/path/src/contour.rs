//! Flat closed contours and their extraction from paths.

use crate::commands::{Path, PathCommand};
use crate::geom::{CubicBezierSegment, LineSegment, QuadraticBezierSegment, Segment, SvgArc};
use crate::math::{point, Box2D, Point};
use crate::Winding;

use thiserror::Error;

/// What is structurally wrong with a path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum MalformedPathKind {
    /// A drawing command or a close command appears before any move command.
    MissingMoveTo,
    /// A coordinate or arc parameter is NaN or infinite.
    NonFiniteCoordinate,
}

/// A structurally invalid command sequence.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[error("Malformed path at command {command_index}: {kind:?}.")]
pub struct MalformedPath {
    pub command_index: usize,
    pub kind: MalformedPathKind,
}

/// A closed polygonal boundary.
///
/// The start point is not repeated at the end and consecutive points are distinct.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Contour { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The shoelace area, positive for counter-clockwise contours in a y-up frame.
    pub fn signed_area(&self) -> f32 {
        signed_area(&self.points)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.signed_area().abs()
    }

    /// The orientation of the contour, or `None` if its area is zero.
    pub fn winding(&self) -> Option<Winding> {
        let area = self.signed_area();
        if area > 0.0 {
            Some(Winding::Positive)
        } else if area < 0.0 {
            Some(Winding::Negative)
        } else {
            None
        }
    }

    pub fn bounding_box(&self) -> Box2D {
        let mut min = point(f32::MAX, f32::MAX);
        let mut max = point(f32::MIN, f32::MIN);
        for p in &self.points {
            min = min.min(*p);
            max = max.max(*p);
        }

        Box2D { min, max }
    }

    /// Returns the contour going through the same points in the opposite direction.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Contour { points }
    }

    /// Reverses the contour in place if it doesn't have the requested orientation.
    pub fn set_winding(&mut self, winding: Winding) {
        if self.winding() == Some(winding.reversed()) {
            self.points.reverse();
        }
    }

    /// Iterates over the edges of the contour, including the closing one.
    pub fn edges(&self) -> impl Iterator<Item = LineSegment<f32>> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| LineSegment {
            from: self.points[i],
            to: self.points[(i + 1) % n],
        })
    }
}

/// Shoelace formula over a closed sequence of points.
pub fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    // Accumulate in f64, the cancellation is significant for large coordinates.
    let mut area = 0.0f64;
    let origin = points[0];
    for i in 1..(n - 1) {
        let a = points[i] - origin;
        let b = points[i + 1] - origin;
        area += a.x as f64 * b.y as f64 - a.y as f64 * b.x as f64;
    }

    (area * 0.5) as f32
}

/// A sub-path that did not produce a contour.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DroppedSubpath {
    pub subpath: usize,
    /// Index of the command that started the sub-path.
    pub command_index: usize,
    /// Number of distinct points left after flattening.
    pub point_count: usize,
}

/// Non-fatal events recorded while building contours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContourDiagnostics {
    pub dropped: Vec<DroppedSubpath>,
    /// Indices of the curve commands for which the subdivision depth limit was reached.
    pub subdivision_limit_reached: Vec<usize>,
}

impl ContourDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.dropped.is_empty() && self.subdivision_limit_reached.is_empty()
    }
}

/// The contours of a path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContourSet {
    pub contours: Vec<Contour>,
    /// For each contour, the index of the sub-path it comes from.
    pub subpaths: Vec<usize>,
    pub diagnostics: ContourDiagnostics,
}

impl ContourSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }
}

struct Subpath {
    index: usize,
    command_index: usize,
    points: Vec<Point>,
}

impl Subpath {
    #[inline]
    fn push(&mut self, p: Point) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    // Appends the end points of the segment's approximation.
    fn flatten<T: Segment<Scalar = f32>>(&mut self, segment: &T, tolerance: f32) -> bool {
        segment.for_each_flattened(tolerance, &mut |line| self.push(line.to))
    }

    #[inline]
    fn current(&self) -> Point {
        self.points.last().cloned().unwrap_or_else(|| point(0.0, 0.0))
    }
}

struct ContourBuilder {
    output: ContourSet,
    current: Option<Subpath>,
    // Where a drawing command starts when it follows a close command.
    last_start: Option<Point>,
    subpath_count: usize,
}

impl ContourBuilder {
    fn new() -> Self {
        ContourBuilder {
            output: ContourSet::default(),
            current: None,
            last_start: None,
            subpath_count: 0,
        }
    }

    fn begin(&mut self, at: Point, command_index: usize) {
        self.flush();
        self.current = Some(Subpath {
            index: self.subpath_count,
            command_index,
            points: vec![at],
        });
        self.last_start = Some(at);
        self.subpath_count += 1;
    }

    fn flush(&mut self) {
        let mut subpath = match self.current.take() {
            Some(subpath) => subpath,
            None => return,
        };

        // Fill semantics always close the contour, drop the explicit closing points.
        while subpath.points.len() > 1 && subpath.points.last() == subpath.points.first() {
            subpath.points.pop();
        }

        if subpath.points.len() < 3 {
            log::warn!(
                "Dropping sub-path {} (command {}): {} distinct point(s) after flattening.",
                subpath.index,
                subpath.command_index,
                subpath.points.len(),
            );
            self.output.diagnostics.dropped.push(DroppedSubpath {
                subpath: subpath.index,
                command_index: subpath.command_index,
                point_count: subpath.points.len(),
            });
            return;
        }

        self.output.contours.push(Contour::new(subpath.points));
        self.output.subpaths.push(subpath.index);
    }

    // Returns the sub-path a drawing command applies to, starting one after a close
    // command if needed.
    fn subpath_for_edge(&mut self, command_index: usize) -> Result<&mut Subpath, MalformedPath> {
        if self.current.is_none() {
            match self.last_start {
                Some(start) => self.begin(start, command_index),
                None => {
                    return Err(MalformedPath {
                        command_index,
                        kind: MalformedPathKind::MissingMoveTo,
                    })
                }
            }
        }

        self.current.as_mut().ok_or(MalformedPath {
            command_index,
            kind: MalformedPathKind::MissingMoveTo,
        })
    }

    fn command(&mut self, index: usize, command: &PathCommand, tolerance: f32) -> Result<(), MalformedPath> {
        if !command.is_finite() {
            return Err(MalformedPath {
                command_index: index,
                kind: MalformedPathKind::NonFiniteCoordinate,
            });
        }

        let limit_reached = match *command {
            PathCommand::MoveTo(to) => {
                self.begin(to, index);
                false
            }
            PathCommand::Close => {
                if self.current.is_none() && self.last_start.is_none() {
                    return Err(MalformedPath {
                        command_index: index,
                        kind: MalformedPathKind::MissingMoveTo,
                    });
                }
                self.flush();
                false
            }
            PathCommand::LineTo(to) => {
                self.subpath_for_edge(index)?.push(to);
                false
            }
            PathCommand::QuadraticTo { ctrl, to } => {
                let subpath = self.subpath_for_edge(index)?;
                let curve = QuadraticBezierSegment {
                    from: subpath.current(),
                    ctrl,
                    to,
                };
                subpath.flatten(&curve, tolerance)
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let subpath = self.subpath_for_edge(index)?;
                let curve = CubicBezierSegment {
                    from: subpath.current(),
                    ctrl1,
                    ctrl2,
                    to,
                };
                subpath.flatten(&curve, tolerance)
            }
            PathCommand::ArcTo(arc) => {
                let subpath = self.subpath_for_edge(index)?;
                subpath.push(arc.from());
                subpath.flatten(&arc, tolerance)
            }
            PathCommand::SvgArcTo {
                radii,
                x_rotation,
                flags,
                to,
            } => {
                let subpath = self.subpath_for_edge(index)?;
                let arc = SvgArc {
                    from: subpath.current(),
                    to,
                    radii,
                    x_rotation,
                    flags,
                };
                arc.for_each_flattened(tolerance, &mut |segment| subpath.push(segment.to))
            }
        };

        if limit_reached {
            log::debug!("Subdivision depth limit reached while flattening command {}.", index);
            self.output.diagnostics.subdivision_limit_reached.push(index);
        }

        Ok(())
    }
}

/// Flattens a path into closed contours.
///
/// Every sub-path is implicitly closed. Sub-paths with fewer than three distinct points
/// after flattening are dropped and reported in the diagnostics.
pub fn build_contours(path: &Path, tolerance: f32) -> Result<ContourSet, MalformedPath> {
    let mut builder = ContourBuilder::new();
    for (index, command) in path.iter().enumerate() {
        builder.command(index, command, tolerance)?;
    }
    builder.flush();

    Ok(builder.output)
}

#[cfg(test)]
use crate::builder::PathBuilder;

#[test]
fn square_contour() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 0.0));
    builder.line_to(point(1.0, 1.0));
    builder.line_to(point(0.0, 1.0));
    builder.line_to(point(0.0, 0.0));
    builder.close();

    let set = build_contours(&builder.build(), 0.1).unwrap();
    assert_eq!(set.len(), 1);
    // The explicit closing point is not stored.
    assert_eq!(set.contours[0].len(), 4);
    assert_eq!(set.contours[0].signed_area(), 1.0);
    assert_eq!(set.contours[0].winding(), Some(Winding::Positive));
    assert!(set.diagnostics.is_empty());
}

#[test]
fn open_subpaths_are_closed() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(2.0, 0.0));
    builder.line_to(point(0.0, 2.0));
    builder.begin(point(5.0, 5.0));
    builder.line_to(point(5.0, 6.0));
    builder.line_to(point(6.0, 6.0));

    let set = build_contours(&builder.build(), 0.1).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.subpaths, vec![0, 1]);
    assert_eq!(set.contours[0].signed_area(), 2.0);
    assert_eq!(set.contours[1].signed_area(), -0.5);
}

#[test]
fn degenerate_subpath_is_dropped() {
    let mut builder = Path::builder();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 1.0));
    builder.line_to(point(1.0, 1.0));
    builder.close();
    builder.begin(point(0.0, 0.0));
    builder.line_to(point(1.0, 0.0));
    builder.line_to(point(0.0, 1.0));
    builder.close();

    let set = build_contours(&builder.build(), 0.1).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.subpaths, vec![1]);
    assert_eq!(
        set.diagnostics.dropped,
        vec![DroppedSubpath {
            subpath: 0,
            command_index: 0,
            point_count: 2
        }]
    );
}

#[test]
fn draw_before_move_is_malformed() {
    let path = Path::from_commands(vec![
        PathCommand::LineTo(point(1.0, 0.0)),
        PathCommand::LineTo(point(1.0, 1.0)),
    ]);

    assert_eq!(
        build_contours(&path, 0.1),
        Err(MalformedPath {
            command_index: 0,
            kind: MalformedPathKind::MissingMoveTo,
        })
    );

    let path = Path::from_commands(vec![PathCommand::Close]);
    assert_eq!(
        build_contours(&path, 0.1).map(|set| set.len()),
        Err(MalformedPath {
            command_index: 0,
            kind: MalformedPathKind::MissingMoveTo,
        })
    );
}

#[test]
fn non_finite_coordinate_is_malformed() {
    let path = Path::from_commands(vec![
        PathCommand::MoveTo(point(0.0, 0.0)),
        PathCommand::LineTo(point(1.0, 0.0)),
        PathCommand::QuadraticTo {
            ctrl: point(f32::NAN, 0.0),
            to: point(0.0, 1.0),
        },
    ]);

    assert_eq!(
        build_contours(&path, 0.1).map(|set| set.len()),
        Err(MalformedPath {
            command_index: 2,
            kind: MalformedPathKind::NonFiniteCoordinate,
        })
    );
}

#[test]
fn drawing_after_close_starts_at_previous_start() {
    let path = Path::from_commands(vec![
        PathCommand::MoveTo(point(0.0, 0.0)),
        PathCommand::LineTo(point(1.0, 0.0)),
        PathCommand::LineTo(point(1.0, 1.0)),
        PathCommand::Close,
        PathCommand::LineTo(point(-1.0, 0.0)),
        PathCommand::LineTo(point(-1.0, -1.0)),
        PathCommand::Close,
    ]);

    let set = build_contours(&path, 0.1).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.contours[1].points[0], point(0.0, 0.0));
    assert_eq!(set.subpaths, vec![0, 1]);
}

#[test]
fn curves_are_flattened() {
    let mut builder = Path::builder();
    builder.add_circle(point(0.0, 0.0), 1.0, Winding::Positive);
    let path = builder.build();

    let coarse = build_contours(&path, 0.1).unwrap();
    let fine = build_contours(&path, 0.001).unwrap();
    assert_eq!(coarse.len(), 1);
    assert_eq!(fine.len(), 1);
    assert!(fine.contours[0].len() > coarse.contours[0].len());

    let area = fine.contours[0].signed_area();
    assert!((area - core::f32::consts::PI).abs() < 0.01);

    for p in &fine.contours[0].points {
        assert!((p.to_vector().length() - 1.0).abs() < 0.002);
    }
}

#[test]
fn svg_arc_half_disc() {
    use crate::geom::ArcFlags;
    use crate::math::{vector, Angle};

    let mut builder = Path::builder();
    builder.begin(point(1.0, 0.0));
    builder.svg_arc_to(
        vector(1.0, 1.0),
        Angle::radians(0.0),
        ArcFlags {
            large_arc: false,
            sweep: true,
        },
        point(-1.0, 0.0),
    );
    builder.close();

    let set = build_contours(&builder.build(), 0.001).unwrap();
    assert_eq!(set.len(), 1);
    let contour = &set.contours[0];
    assert_eq!(contour.points[0], point(1.0, 0.0));
    assert_eq!(contour.winding(), Some(Winding::Positive));
    assert!((contour.signed_area() - core::f32::consts::FRAC_PI_2).abs() < 0.01);

    // The upper half of the unit circle.
    for p in &contour.points {
        assert!(p.y >= -1e-5);
        assert!((p.to_vector().length() - 1.0).abs() < 0.002);
    }
    assert!(contour
        .points
        .iter()
        .any(|p| (*p - point(-1.0, 0.0)).length() < 1e-5));
}

#[test]
fn arc_to_joins_current_position() {
    use crate::geom::Arc;
    use crate::math::{vector, Angle};

    let arc = Arc {
        center: point(0.0, 0.0),
        radii: vector(1.0, 1.0),
        start_angle: Angle::radians(0.0),
        sweep_angle: Angle::radians(core::f32::consts::PI),
        x_rotation: Angle::radians(0.0),
    };
    let path = Path::from_commands(vec![
        PathCommand::MoveTo(point(0.0, -2.0)),
        PathCommand::ArcTo(arc),
        PathCommand::Close,
    ]);

    let set = build_contours(&path, 0.01).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.contours[0].points[0], point(0.0, -2.0));
    assert_eq!(set.contours[0].points[1], arc.from());
}

#[test]
fn reversed_contour() {
    let contour = Contour::new(vec![point(0.0, 0.0), point(1.0, 0.0), point(0.0, 1.0)]);
    let mut reversed = contour.reversed();
    assert_eq!(reversed.signed_area(), -contour.signed_area());
    reversed.set_winding(Winding::Positive);
    assert_eq!(reversed.signed_area(), contour.signed_area());
    assert_eq!(contour.edges().count(), 3);
}
