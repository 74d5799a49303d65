use crate::path::MalformedPath;

use thiserror::Error;

/// The tessellator's result type.
pub type TessellationResult<T> = Result<T, TessellationError>;

/// Describes an unexpected error happening during tessellation.
///
/// These are recovered from internally whenever possible (for example by falling back
/// to ear clipping), so seeing one usually indicates a bug.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InternalError {
    #[error("Failed to extract the monotone pieces of a polygon")]
    FaceTracing,
    #[error("Invalid monotone piece ({0} vertices)")]
    InvalidMonotonePiece(usize),
    #[error("Invalid sweep status at vertex {0}")]
    SweepStatus(usize),
    #[error("No valid bridge found for the hole of contour {0}")]
    Bridge(usize),
    #[error("Failed to start the worker pool: {0}")]
    ThreadPool(String),
}

/// Rejected tessellation parameters.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnsupportedParameter {
    #[error("Tolerance is NaN")]
    ToleranceIsNaN,
    #[error("Tolerance is not strictly positive")]
    ToleranceIsNotPositive,
    #[error("Weld epsilon is NaN or not strictly positive")]
    WeldEpsilonIsNotPositive,
}

/// An error that can happen while writing a mesh into vertex buffers.
#[derive(Error, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GeometryBuilderError {
    /// The index type of the buffers cannot address all of the vertices.
    #[error("Too many vertices for the index type")]
    TooManyVertices,
}

/// Why a region could not be triangulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DegenerateReason {
    /// The area of the outer boundary is below `MIN_REGION_AREA`.
    TooSmall,
    /// A hole touches or crosses its outer boundary.
    HoleTouchesBoundary,
}

/// The tessellator's error enumeration.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum TessellationError {
    #[error(transparent)]
    MalformedPath(#[from] MalformedPath),
    #[error("Degenerate region (contour {contour_index}): {reason:?}")]
    DegenerateRegion {
        contour_index: usize,
        reason: DegenerateReason,
    },
    #[error("Unsupported parameter: {0}")]
    UnsupportedParameter(#[from] UnsupportedParameter),
    #[error("The job was cancelled")]
    Cancelled,
    #[error("Internal error: {0}")]
    Internal(#[from] InternalError),
}

/// Non-fatal conditions recorded while tessellating.
///
/// None of these prevent producing a mesh. They are reported next to it so that callers
/// can surface them, and each of them is also logged.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A sub-path flattened to fewer than three distinct points.
    DroppedContour { subpath: usize, point_count: usize },
    /// Curve flattening hit the subdivision cap for the command at this index.
    SubdivisionLimitReached { command_index: usize },
    /// Two contours are exactly overlapping, `contour` was merged into `other`.
    AmbiguousContainment { contour: usize, other: usize },
    /// A region was skipped in lenient mode.
    SkippedRegion {
        contour_index: usize,
        reason: DegenerateReason,
    },
    /// A region failed for another reason and was skipped in lenient mode.
    FailedRegion {
        contour_index: usize,
        error: TessellationError,
    },
    /// The monotone triangulation of a region was replaced with ear clipping.
    TriangulationFallback { contour_index: usize },
    /// A path of a batch failed and was left out of the merged mesh.
    SkippedPath {
        path_index: usize,
        error: TessellationError,
    },
}
