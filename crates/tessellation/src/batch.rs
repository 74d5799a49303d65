//! Tessellation of many paths on a worker pool.
//!
//! Paths are independent: each one goes through the whole pipeline on a worker thread
//! with its own [`Tessellator`]. The per-path meshes are collected in input order and
//! merged by a single [`MeshAssembler`] once all jobs are done, so the output does not
//! depend on the scheduling.

use crate::error::{Diagnostic, InternalError, TessellationError};
use crate::mesh::{Mesh, MeshAssembler};
use crate::path::Path;
use crate::tessellator::{TessellationOutput, Tessellator};
use crate::{ErrorMode, TessellationOptions};

use rayon::prelude::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shared flag requesting the remaining jobs of a batch not to start.
///
/// Jobs check it before they start. A job that already started runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Configuration of the worker pool.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    /// Number of worker threads. `None` lets rayon pick one per logical CPU.
    pub num_threads: Option<usize>,
    pub cancellation: Option<CancellationToken>,
}

impl BatchOptions {
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// The merged mesh of a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutput {
    pub mesh: Mesh,
    /// Diagnostics of all paths, in input order. Failed paths are reported with
    /// [`Diagnostic::SkippedPath`].
    pub diagnostics: Vec<Diagnostic>,
}

/// Tessellates a list of paths in parallel and merges the results into a single mesh.
///
/// In strict mode, the first error in input order is returned. In lenient mode, failed
/// and cancelled paths are left out of the mesh, and an error is only returned if every
/// path failed.
pub fn tessellate_batch(
    paths: &[Path],
    options: &TessellationOptions,
    batch: &BatchOptions,
) -> Result<BatchOutput, TessellationError> {
    options.validate()?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = batch.num_threads {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| InternalError::ThreadPool(e.to_string()))?;

    let cancellation = batch.cancellation.as_ref();
    let results: Vec<Result<TessellationOutput, TessellationError>> = pool.install(|| {
        paths
            .par_iter()
            .map_init(Tessellator::new, |tessellator, path| {
                if cancellation.map_or(false, CancellationToken::is_cancelled) {
                    return Err(TessellationError::Cancelled);
                }
                tessellator.tessellate_path(path, options)
            })
            .collect()
    });

    merge(results, options)
}

/// The single writer phase: merges the per-path outputs in input order.
fn merge(
    results: Vec<Result<TessellationOutput, TessellationError>>,
    options: &TessellationOptions,
) -> Result<BatchOutput, TessellationError> {
    let mut assembler = MeshAssembler::new(options.weld_epsilon);
    let mut diagnostics = Vec::new();
    let mut first_error = None;
    let mut succeeded = 0;

    for (path_index, result) in results.into_iter().enumerate() {
        match result {
            Ok(output) => {
                succeeded += 1;
                assembler.append(&output.mesh);
                diagnostics.extend(output.diagnostics);
            }
            Err(error) => {
                if options.mode == ErrorMode::Strict {
                    return Err(error);
                }

                log::warn!("Skipping path {}: {}", path_index, error);
                if first_error.is_none() {
                    first_error = Some(error.clone());
                }
                diagnostics.push(Diagnostic::SkippedPath { path_index, error });
            }
        }
    }

    if succeeded == 0 {
        if let Some(error) = first_error {
            return Err(error);
        }
    }

    Ok(BatchOutput {
        mesh: assembler.build(),
        diagnostics,
    })
}
