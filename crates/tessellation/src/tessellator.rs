use crate::error::{Diagnostic, TessellationError};
use crate::mesh::{Mesh, MeshAssembler};
use crate::path::{build_contours, FillRule, Path};
use crate::triangulate::Triangulator;
use crate::winding::resolve_regions;
use crate::{ErrorMode, TessellationOptions};

/// A mesh along with the non-fatal events recorded while producing it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TessellationOutput {
    pub mesh: Mesh,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fill tessellator.
///
/// Runs the whole pipeline on a path: flattening, winding resolution, triangulation
/// of each region and mesh assembly. The tessellator keeps its scratch buffers between
/// calls, so reusing it for many paths avoids some allocations.
///
/// # Examples
///
/// ```
/// use trellis_tessellation::path::builder::*;
/// use trellis_tessellation::path::{Path, Winding};
/// use trellis_tessellation::math::{box2d, point};
/// use trellis_tessellation::{Tessellator, TessellationOptions, FillRule};
///
/// let mut builder = Path::builder();
/// builder.add_rectangle(&box2d(0.0, 0.0, 10.0, 10.0), Winding::Positive);
/// builder.add_rectangle(&box2d(2.0, 2.0, 8.0, 8.0), Winding::Positive);
/// let path = builder.build();
///
/// let mut tessellator = Tessellator::new();
/// let output = tessellator
///     .tessellate_path(&path, &TessellationOptions::DEFAULT)
///     .unwrap();
///
/// // Under the even-odd rule the inner square is a hole.
/// assert!((output.mesh.area() - 64.0).abs() < 1e-3);
/// assert!(output.diagnostics.is_empty());
/// ```
pub struct Tessellator {
    triangulator: Triangulator,
    log: bool,
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl Tessellator {
    /// Constructor.
    pub fn new() -> Self {
        #[cfg(debug_assertions)]
        let log = std::env::var("TRELLIS_FORCE_LOGGING").is_ok();
        #[cfg(not(debug_assertions))]
        let log = false;

        let mut triangulator = Triangulator::new();
        triangulator.set_logging(log);

        Tessellator { triangulator, log }
    }

    /// Enable/disable some verbose logging during the tessellation, for
    /// debugging purposes.
    pub fn set_logging(&mut self, is_enabled: bool) {
        #[cfg(debug_assertions)]
        let forced = std::env::var("TRELLIS_FORCE_LOGGING").is_ok();
        #[cfg(not(debug_assertions))]
        let forced = false;

        self.log = is_enabled || forced;
        self.triangulator.set_logging(self.log);
    }

    /// Compute the tessellation of a path.
    ///
    /// In lenient mode, regions that cannot be triangulated are skipped and reported in the
    /// diagnostics, and an error is only returned if none of the regions could be
    /// triangulated. In strict mode the first failing region aborts the tessellation.
    pub fn tessellate_path(
        &mut self,
        path: &Path,
        options: &TessellationOptions,
    ) -> Result<TessellationOutput, TessellationError> {
        options.validate()?;

        let contours = build_contours(path, options.tolerance)?;

        let mut diagnostics = Vec::new();
        for dropped in &contours.diagnostics.dropped {
            diagnostics.push(Diagnostic::DroppedContour {
                subpath: dropped.subpath,
                point_count: dropped.point_count,
            });
        }
        for &command_index in &contours.diagnostics.subdivision_limit_reached {
            diagnostics.push(Diagnostic::SubdivisionLimitReached { command_index });
        }

        let resolved = resolve_regions(&contours.contours, options.fill_rule);
        diagnostics.extend(resolved.diagnostics);

        tess_log!(
            self,
            "Tessellating {} contours into {} regions",
            contours.len(),
            resolved.regions.len()
        );

        let mut assembler = MeshAssembler::new(options.weld_epsilon);
        let mut first_error = None;
        let mut triangulated = 0;
        for region in &resolved.regions {
            match self.triangulator.triangulate(region, &mut assembler) {
                Ok(stats) => {
                    triangulated += 1;
                    if stats.used_fallback {
                        diagnostics.push(Diagnostic::TriangulationFallback {
                            contour_index: region.source,
                        });
                    }
                }
                Err(error) => {
                    if options.mode == ErrorMode::Strict {
                        return Err(error);
                    }

                    log::warn!("Skipping region of contour {}: {}", region.source, error);
                    diagnostics.push(skipped_region(region.source, &error));
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }

        if triangulated == 0 {
            if let Some(error) = first_error {
                return Err(error);
            }
        }

        Ok(TessellationOutput {
            mesh: assembler.build(),
            diagnostics,
        })
    }
}

/// Tessellates a path with the default options, in lenient mode.
///
/// A path without any fillable area produces an empty mesh.
/// The diagnostic reported for a region skipped because of `error`.
fn skipped_region(source: usize, error: &TessellationError) -> Diagnostic {
    match *error {
        TessellationError::DegenerateRegion {
            contour_index,
            reason,
        } => Diagnostic::SkippedRegion {
            contour_index,
            reason,
        },
        _ => Diagnostic::FailedRegion {
            contour_index: source,
            error: error.clone(),
        },
    }
}

pub fn tessellate(path: &Path, fill_rule: FillRule, tolerance: f32) -> Result<Mesh, TessellationError> {
    let options = TessellationOptions::tolerance(tolerance)
        .with_fill_rule(fill_rule)
        .with_mode(ErrorMode::Lenient);

    Ok(Tessellator::new().tessellate_path(path, &options)?.mesh)
}

#[test]
fn every_skipped_region_is_reported() {
    use crate::error::{DegenerateReason, InternalError};

    let degenerate = TessellationError::DegenerateRegion {
        contour_index: 4,
        reason: DegenerateReason::HoleTouchesBoundary,
    };
    assert_eq!(
        skipped_region(2, &degenerate),
        Diagnostic::SkippedRegion {
            contour_index: 4,
            reason: DegenerateReason::HoleTouchesBoundary,
        }
    );

    let error: TessellationError = InternalError::Bridge(5).into();
    assert_eq!(
        skipped_region(2, &error),
        Diagnostic::FailedRegion {
            contour_index: 2,
            error: TessellationError::Internal(InternalError::Bridge(5)),
        }
    );
}
