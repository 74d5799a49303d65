//! The command sequence making up a path.

use crate::builder::Builder;
use crate::geom::{Arc, ArcFlags};
use crate::math::{Angle, Point, Vector};

use core::iter::FromIterator;
use core::slice;

/// A single drawing instruction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PathCommand {
    /// Starts a new sub-path.
    MoveTo(Point),
    LineTo(Point),
    QuadraticTo {
        ctrl: Point,
        to: Point,
    },
    CubicTo {
        ctrl1: Point,
        ctrl2: Point,
        to: Point,
    },
    /// An elliptic arc in center notation.
    ///
    /// If the current position is not the start of the arc, a line segment joins them.
    ArcTo(Arc<f32>),
    /// An elliptic arc in SVG end-point notation, starting at the current position.
    SvgArcTo {
        radii: Vector,
        x_rotation: Angle,
        flags: ArcFlags,
        to: Point,
    },
    /// Connects back to the start of the current sub-path.
    Close,
}

impl PathCommand {
    /// Whether this command draws from the current position.
    #[inline]
    pub fn is_edge(&self) -> bool {
        match self {
            PathCommand::MoveTo(..) | PathCommand::Close => false,
            _ => true,
        }
    }

    /// Returns true if every coordinate and parameter is finite.
    pub fn is_finite(&self) -> bool {
        fn finite(p: &Point) -> bool {
            p.x.is_finite() && p.y.is_finite()
        }

        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => finite(p),
            PathCommand::QuadraticTo { ctrl, to } => finite(ctrl) && finite(to),
            PathCommand::CubicTo { ctrl1, ctrl2, to } => finite(ctrl1) && finite(ctrl2) && finite(to),
            PathCommand::ArcTo(arc) => {
                finite(&arc.center)
                    && arc.radii.x.is_finite()
                    && arc.radii.y.is_finite()
                    && arc.start_angle.radians.is_finite()
                    && arc.sweep_angle.radians.is_finite()
                    && arc.x_rotation.radians.is_finite()
            }
            PathCommand::SvgArcTo {
                radii,
                x_rotation,
                to,
                ..
            } => radii.x.is_finite() && radii.y.is_finite() && x_rotation.radians.is_finite() && finite(to),
            PathCommand::Close => true,
        }
    }
}

/// An ordered sequence of path commands, possibly containing several sub-paths.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    /// Creates an empty path.
    #[inline]
    pub fn new() -> Self {
        Path {
            commands: Vec::new(),
        }
    }

    /// Creates a [Builder](builder/struct.Builder.html) to build a path.
    #[inline]
    pub fn builder() -> Builder {
        Builder::new()
    }

    #[inline]
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Path { commands }
    }

    #[inline]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<PathCommand> {
        self.commands.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Concatenates the commands of another path at the end of this one.
    pub fn extend_from_path(&mut self, other: &Path) {
        self.commands.extend_from_slice(&other.commands);
    }

    #[inline]
    pub fn into_commands(self) -> Vec<PathCommand> {
        self.commands
    }
}

impl<'l> IntoIterator for &'l Path {
    type Item = &'l PathCommand;
    type IntoIter = slice::Iter<'l, PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<PathCommand> for Path {
    fn from_iter<T: IntoIterator<Item = PathCommand>>(iter: T) -> Self {
        Path {
            commands: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<PathCommand>> for Path {
    fn from(commands: Vec<PathCommand>) -> Self {
        Path::from_commands(commands)
    }
}

#[test]
fn non_finite_commands() {
    use crate::math::point;

    assert!(PathCommand::LineTo(point(1.0, 2.0)).is_finite());
    assert!(!PathCommand::LineTo(point(f32::NAN, 2.0)).is_finite());
    assert!(!PathCommand::CubicTo {
        ctrl1: point(0.0, 0.0),
        ctrl2: point(f32::INFINITY, 0.0),
        to: point(1.0, 1.0),
    }
    .is_finite());
    assert!(PathCommand::Close.is_finite());
    assert!(!PathCommand::Close.is_edge());
}

#[test]
fn path_from_iterator() {
    use crate::math::point;

    let path: Path = vec![
        PathCommand::MoveTo(point(0.0, 0.0)),
        PathCommand::LineTo(point(1.0, 0.0)),
        PathCommand::Close,
    ]
    .into_iter()
    .collect();

    assert_eq!(path.len(), 3);
    assert_eq!(path.iter().filter(|cmd| cmd.is_edge()).count(), 1);
}
