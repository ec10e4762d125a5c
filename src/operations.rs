//! Page-level PDF operations: merge, split, compress, rotate, watermark.
//!
//! Each operation validates its arguments here and then hands the work to a
//! [`Backend`]. The free functions at the bottom run against
//! [`SystemBackend`] for callers that only have a [`ConvertConfig`].

use crate::backend::{Backend, SystemBackend};
use crate::config::ConvertConfig;
use crate::convert::check_readable;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fold any angle onto a quarter turn in `0..360`.
///
/// Angles between quarter turns round down: `45` becomes `0`.
///
/// ```
/// use convctl::operations::normalize_rotation;
/// assert_eq!(normalize_rotation(-90), 270);
/// assert_eq!(normalize_rotation(450), 90);
/// assert_eq!(normalize_rotation(45), 0);
/// ```
pub fn normalize_rotation(degrees: i32) -> u16 {
    (degrees.rem_euclid(360) / 90 * 90) as u16
}

/// PDF operations over a borrowed backend.
pub struct PdfOperations<'a> {
    backend: &'a dyn Backend,
}

impl<'a> PdfOperations<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self { backend }
    }

    /// Concatenate `inputs` in order into `output`.
    pub fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConvertError> {
        if inputs.len() < 2 {
            return Err(ConvertError::NotEnoughInputs {
                count: inputs.len(),
            });
        }
        for input in inputs {
            check_readable(input)?;
        }
        self.backend.merge_pdfs(inputs, output)?;
        info!("Merged {} files → {}", inputs.len(), output.display());
        Ok(())
    }

    /// One file per page in `outdir`, which is created if needed.
    pub fn split(&self, input: &Path, outdir: &Path) -> Result<usize, ConvertError> {
        check_readable(input)?;
        self.backend.split_pdf(input, outdir)
    }

    pub fn compress(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        check_readable(input)?;
        self.backend.compress_pdf(input, output)
    }

    /// Rotate every page by `degrees`, normalised with [`normalize_rotation`].
    ///
    /// Returns the rotation actually applied.
    pub fn rotate(&self, input: &Path, output: &Path, degrees: i32) -> Result<u16, ConvertError> {
        check_readable(input)?;
        let applied = normalize_rotation(degrees);
        self.backend.rotate_pdf(input, output, applied)?;
        Ok(applied)
    }

    pub fn watermark(&self, input: &Path, output: &Path, text: &str) -> Result<(), ConvertError> {
        if text.trim().is_empty() {
            return Err(ConvertError::InvalidInput(
                "Watermark text must not be empty".to_string(),
            ));
        }
        check_readable(input)?;
        self.backend.watermark_pdf(input, output, text)
    }
}

pub fn merge_pdfs(
    inputs: &[PathBuf],
    output: &Path,
    config: &ConvertConfig,
) -> Result<(), ConvertError> {
    let backend = SystemBackend::new(config.clone());
    PdfOperations::new(&backend).merge(inputs, output)
}

pub fn split_pdf(input: &Path, outdir: &Path, config: &ConvertConfig) -> Result<usize, ConvertError> {
    let backend = SystemBackend::new(config.clone());
    PdfOperations::new(&backend).split(input, outdir)
}

pub fn compress_pdf(input: &Path, output: &Path, config: &ConvertConfig) -> Result<(), ConvertError> {
    let backend = SystemBackend::new(config.clone());
    PdfOperations::new(&backend).compress(input, output)
}

/// Rotate every page of `input` with the system backend.
///
/// ```no_run
/// use convctl::operations::rotate_pdf;
/// use convctl::ConvertConfig;
/// use std::path::Path;
///
/// let applied = rotate_pdf(
///     Path::new("scan.pdf"),
///     Path::new("upright.pdf"),
///     -90,
///     &ConvertConfig::default(),
/// )?;
/// assert_eq!(applied, 270);
/// # Ok::<(), convctl::ConvertError>(())
/// ```
pub fn rotate_pdf(
    input: &Path,
    output: &Path,
    degrees: i32,
    config: &ConvertConfig,
) -> Result<u16, ConvertError> {
    let backend = SystemBackend::new(config.clone());
    PdfOperations::new(&backend).rotate(input, output, degrees)
}

pub fn watermark_pdf(
    input: &Path,
    output: &Path,
    text: &str,
    config: &ConvertConfig,
) -> Result<(), ConvertError> {
    let backend = SystemBackend::new(config.clone());
    PdfOperations::new(&backend).watermark(input, output, text)
}
