//! The format router: plan a route, then run it.
//!
//! ## Temporary files
//!
//! A chain writes its first hop to `<input-stem>.tmp_0.<intermediate>` next
//! to the input. That file belongs to the call that created it and is held by
//! a [`ScratchFile`] guard, so it is removed on every exit path: success,
//! a handler error on either hop, or a panic unwinding through the router.

use crate::backend::{Backend, SystemBackend};
use crate::config::ConvertConfig;
use crate::error::ConvertError;
use crate::format::{display_extension, ConversionKey};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::registry::{plan_key, Route};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a successful conversion did.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub route: Route,
    /// Handlers that ran to completion.
    pub steps_completed: usize,
    /// Final files written; more than one when pages were rasterised.
    pub outputs: Vec<PathBuf>,
    pub duration_ms: u64,
}

/// Routes a conversion request through a [`Backend`].
pub struct FormatRouter<'a> {
    backend: &'a dyn Backend,
    progress: ProgressCallback,
}

impl<'a> FormatRouter<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            progress: Arc::new(NoopProgressCallback),
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// The route `input` → `output` would take, without running anything.
    pub fn plan(&self, input: &Path, output: &Path) -> Result<Route, ConvertError> {
        let key = ConversionKey::for_paths(input, output);
        plan_key(&key).ok_or_else(|| ConvertError::UnsupportedConversion {
            from: display_extension(input),
            to: display_extension(output),
        })
    }

    /// Convert `input` into `output`.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::UnsupportedConversion`] when no route exists; nothing
    ///   is written.
    /// - [`ConvertError::FileNotFound`] / [`ConvertError::PermissionDenied`]
    ///   when the input cannot be read; checked before any handler runs.
    /// - Whatever the failing handler reported, unchanged.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<ConversionReport, ConvertError> {
        let start = Instant::now();
        let route = self.plan(input, output)?;
        check_readable(input)?;

        info!(
            "Converting {} → {} ({})",
            input.display(),
            output.display(),
            route
        );
        let total = route.step_count();
        self.progress.on_conversion_start(total);

        let outputs = match &route {
            Route::Direct { key, handler } => {
                self.step(1, total, key, || handler.run(self.backend, input, output))?
            }
            Route::Chain { steps } => {
                let [(first_key, first), (second_key, second)] = steps;
                let scratch = ScratchFile::new(intermediate_path(input, 0, &first_key.to));

                self.step(1, total, first_key, || {
                    first.run(self.backend, input, scratch.path())
                })?;
                self.step(2, total, second_key, || {
                    second.run(self.backend, scratch.path(), output)
                })?
            }
        };

        self.progress.on_conversion_complete(total);
        let report = ConversionReport {
            route,
            steps_completed: total,
            outputs,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Conversion finished in {}ms ({} file(s) written)",
            report.duration_ms,
            report.outputs.len()
        );
        Ok(report)
    }

    fn step<F>(
        &self,
        step: usize,
        total: usize,
        key: &ConversionKey,
        run: F,
    ) -> Result<Vec<PathBuf>, ConvertError>
    where
        F: FnOnce() -> Result<Vec<PathBuf>, ConvertError>,
    {
        self.progress.on_step_start(step, total, key);
        debug!("Step {}/{}: {}", step, total, key);
        match run() {
            Ok(written) => {
                self.progress.on_step_complete(step, total);
                Ok(written)
            }
            Err(e) => {
                self.progress.on_step_error(step, total, &e.to_string());
                Err(e)
            }
        }
    }
}

/// Convert with the system backend.
///
/// ```rust,no_run
/// use convctl::{convert_file, ConvertConfig};
/// use std::path::Path;
///
/// let report = convert_file(
///     Path::new("report.docx"),
///     Path::new("report.png"),
///     &ConvertConfig::default(),
/// )?;
/// println!("{} via {}", report.outputs.len(), report.route);
/// # Ok::<(), convctl::ConvertError>(())
/// ```
pub fn convert_file(
    input: &Path,
    output: &Path,
    config: &ConvertConfig,
) -> Result<ConversionReport, ConvertError> {
    let backend = SystemBackend::new(config.clone());
    let mut router = FormatRouter::new(&backend);
    if let Some(cb) = &config.progress_callback {
        router = router.with_progress(Arc::clone(cb));
    }
    router.convert(input, output)
}

/// Path of the intermediate written by chain step `step` (0-based).
///
/// `docs/report.docx`, step 0, `pdf` → `docs/report.tmp_0.pdf`.
pub fn intermediate_path(input: &Path, step: usize, format: &str) -> PathBuf {
    input.with_extension(format!("tmp_{step}.{format}"))
}

/// Input must exist and be openable for reading.
pub(crate) fn check_readable(input: &Path) -> Result<(), ConvertError> {
    fs::File::open(input).map(|_| ()).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: input.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: input.to_path_buf(),
        },
    })
}

/// Deletes its path when dropped.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed intermediate {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove intermediate {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
