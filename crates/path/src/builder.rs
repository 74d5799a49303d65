//! Path building.
//!
//! The [`PathBuilder`] trait provides the sub-path oriented building interface along
//! with a few shape helpers. [`Builder`] is the implementation producing a [`Path`].
//!
//! ```
//! use trellis_path::builder::*;
//! use trellis_path::math::{box2d, point};
//! use trellis_path::{Path, Winding};
//!
//! let mut builder = Path::builder();
//! builder.add_rectangle(&box2d(0.0, 0.0, 10.0, 10.0), Winding::Positive);
//! builder.add_circle(point(5.0, 5.0), 2.0, Winding::Negative);
//! let path = builder.build();
//!
//! assert_eq!(path.iter().filter(|cmd| cmd.is_edge()).count(), 3 + 4);
//! ```

use crate::commands::{Path, PathCommand};
use crate::geom::{Arc, ArcFlags};
use crate::math::*;
use crate::Winding;

/// Control point distance of the cubic bézier quadrant approximating a unit circle.
const CIRCLE_KAPPA: f32 = 0.552_284_75;

/// The sub-path oriented path building interface.
pub trait PathBuilder {
    /// Starts a new sub-path at a given position.
    ///
    /// `at` becomes the current position of the sub-path.
    fn begin(&mut self, at: Point);

    /// Closes the current sub-path.
    fn close(&mut self);

    /// Adds a line segment to the current sub-path.
    fn line_to(&mut self, to: Point);

    /// Adds a quadratic bézier curve to the current sub-path.
    fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point);

    /// Adds a cubic bézier curve to the current sub-path.
    fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point);

    /// Adds an elliptic arc in center notation to the current sub-path.
    fn arc_to(&mut self, arc: &Arc<f32>);

    /// Adds an elliptic arc in SVG end-point notation, from the current position to `to`.
    fn svg_arc_to(&mut self, radii: Vector, x_rotation: Angle, flags: ArcFlags, to: Point);

    /// Adds a closed sub-path going through the provided points.
    fn add_polygon(&mut self, points: &[Point]) {
        if points.is_empty() {
            return;
        }

        self.begin(points[0]);
        for p in &points[1..] {
            self.line_to(*p);
        }

        self.close();
    }

    /// Adds a sub-path containing a rectangle.
    fn add_rectangle(&mut self, rect: &Box2D, winding: Winding) {
        match winding {
            Winding::Positive => self.add_polygon(&[
                rect.min,
                point(rect.max.x, rect.min.y),
                rect.max,
                point(rect.min.x, rect.max.y),
            ]),
            Winding::Negative => self.add_polygon(&[
                rect.min,
                point(rect.min.x, rect.max.y),
                rect.max,
                point(rect.max.x, rect.min.y),
            ]),
        };
    }

    /// Adds a sub-path containing a circle made of four cubic bézier quadrants.
    fn add_circle(&mut self, center: Point, radius: f32, winding: Winding) {
        let radius = radius.abs();
        let dir = winding.sign() as f32;
        let d = radius * CIRCLE_KAPPA;

        self.begin(center + vector(radius, 0.0));
        self.cubic_bezier_to(
            center + vector(radius, d * dir),
            center + vector(d, radius * dir),
            center + vector(0.0, radius * dir),
        );
        self.cubic_bezier_to(
            center + vector(-d, radius * dir),
            center + vector(-radius, d * dir),
            center + vector(-radius, 0.0),
        );
        self.cubic_bezier_to(
            center + vector(-radius, -d * dir),
            center + vector(-d, -radius * dir),
            center + vector(0.0, -radius * dir),
        );
        self.cubic_bezier_to(
            center + vector(d, -radius * dir),
            center + vector(radius, -d * dir),
            center + vector(radius, 0.0),
        );
        self.close();
    }

    /// Adds a sub-path containing an ellipse.
    fn add_ellipse(&mut self, center: Point, radii: Vector, x_rotation: Angle, winding: Winding) {
        let mut arc = Arc::ellipse(center, radii, x_rotation);
        if winding == Winding::Negative {
            arc.sweep_angle = -arc.sweep_angle;
        }

        self.begin(arc.from());
        self.arc_to(&arc);
        self.close();
    }
}

/// Builds a [`Path`] by recording commands.
///
/// The builder performs no validation, malformed command sequences are reported when
/// the path is consumed.
#[derive(Clone, Debug)]
pub struct Builder {
    commands: Vec<PathCommand>,
    current_position: Point,
    first_position: Point,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            commands: Vec::new(),
            current_position: point(0.0, 0.0),
            first_position: point(0.0, 0.0),
        }
    }

    pub fn with_capacity(commands: usize) -> Self {
        Builder {
            commands: Vec::with_capacity(commands),
            ..Builder::new()
        }
    }

    /// Same as `begin`, with the SVG naming.
    #[inline]
    pub fn move_to(&mut self, to: Point) {
        self.begin(to);
    }

    #[inline]
    pub fn current_position(&self) -> Point {
        self.current_position
    }

    /// Appends a raw command.
    pub fn push(&mut self, command: PathCommand) {
        match command {
            PathCommand::MoveTo(to) => {
                self.first_position = to;
                self.current_position = to;
            }
            PathCommand::LineTo(to)
            | PathCommand::QuadraticTo { to, .. }
            | PathCommand::CubicTo { to, .. }
            | PathCommand::SvgArcTo { to, .. } => {
                self.current_position = to;
            }
            PathCommand::ArcTo(arc) => {
                self.current_position = arc.to();
            }
            PathCommand::Close => {
                self.current_position = self.first_position;
            }
        }

        self.commands.push(command);
    }

    pub fn build(self) -> Path {
        Path::from_commands(self.commands)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl PathBuilder for Builder {
    fn begin(&mut self, at: Point) {
        self.push(PathCommand::MoveTo(at));
    }

    fn close(&mut self) {
        self.push(PathCommand::Close);
    }

    fn line_to(&mut self, to: Point) {
        self.push(PathCommand::LineTo(to));
    }

    fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) {
        self.push(PathCommand::QuadraticTo { ctrl, to });
    }

    fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
    }

    fn arc_to(&mut self, arc: &Arc<f32>) {
        self.push(PathCommand::ArcTo(*arc));
    }

    fn svg_arc_to(&mut self, radii: Vector, x_rotation: Angle, flags: ArcFlags, to: Point) {
        self.push(PathCommand::SvgArcTo {
            radii,
            x_rotation,
            flags,
            to,
        });
    }
}

#[test]
fn current_position_tracking() {
    let mut builder = Path::builder();
    builder.begin(point(1.0, 1.0));
    builder.line_to(point(2.0, 1.0));
    assert_eq!(builder.current_position(), point(2.0, 1.0));
    builder.cubic_bezier_to(point(3.0, 1.0), point(3.0, 2.0), point(2.0, 3.0));
    assert_eq!(builder.current_position(), point(2.0, 3.0));
    builder.close();
    assert_eq!(builder.current_position(), point(1.0, 1.0));

    let path = builder.build();
    assert_eq!(path.len(), 4);
    assert_eq!(path.commands()[3], PathCommand::Close);
}

#[test]
fn circle_quadrants() {
    let mut builder = Path::builder();
    builder.add_circle(point(0.0, 0.0), 1.0, Winding::Positive);
    let path = builder.build();

    assert_eq!(path.len(), 6);
    assert_eq!(path.commands()[0], PathCommand::MoveTo(point(1.0, 0.0)));
    // The first quadrant goes up, which is counter-clockwise with y pointing up.
    match path.commands()[1] {
        PathCommand::CubicTo { to, .. } => assert_eq!(to, point(0.0, 1.0)),
        _ => panic!("expected a cubic bézier segment"),
    }
}

#[test]
fn empty_polygon() {
    let mut builder = Path::builder();
    builder.add_polygon(&[]);
    assert!(builder.build().is_empty());
}
