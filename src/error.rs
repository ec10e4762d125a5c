//! Error types for the convctl library.
//!
//! Every failure a conversion can hit is a variant of [`ConvertError`]. The
//! variants are grouped by where the failure originates:
//!
//! * **Input**: the file the caller named does not exist or cannot be read.
//! * **Routing**: no handler and no two-hop chain connects the formats.
//! * **Dependency**: an external tool or library is not installed. These
//!   carry an install hint because the user can always fix them.
//! * **Tool**: an external process ran and exited non-zero. Its stderr is
//!   surfaced verbatim; we never try to interpret it.
//! * **PDF / image**: a library call rejected the input.
//!
//! All of them are terminal for the call that produced them. Nothing is
//! retried.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the convctl library.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The arguments to an operation are unusable (empty watermark text etc.).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A merge was requested with fewer than two documents.
    #[error("Need at least 2 files to merge (got {count})")]
    NotEnoughInputs { count: usize },

    // ── Routing errors ────────────────────────────────────────────────────
    /// Neither a direct handler nor a two-hop chain connects the formats.
    #[error("Unsupported conversion: {from} -> {to}")]
    UnsupportedConversion { from: String, to: String },

    // ── Dependency errors ─────────────────────────────────────────────────
    /// An external tool or library is not installed or cannot be loaded.
    #[error("{name} not found.\n{hint}")]
    MissingDependency { name: String, hint: String },

    // ── Tool errors ───────────────────────────────────────────────────────
    /// An external process could not be started.
    #[error("Failed to launch {tool}: {source}")]
    ToolSpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external process exited with a non-zero status.
    #[error("{tool} conversion failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    /// The tool reported success but the expected file never appeared.
    #[error("{tool} reported success but produced no output at '{path}'")]
    ToolProducedNothing { tool: String, path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF could not be opened or parsed.
    #[error("PDF '{path}' could not be read: {detail}")]
    PdfRead { path: PathBuf, detail: String },

    /// A page-level or document-level PDF edit failed.
    #[error("PDF operation failed on '{path}': {detail}")]
    PdfOperation { path: PathBuf, detail: String },

    /// pdfium-render returned an error while rasterising a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The imaging library could not decode or encode the file.
    #[error("Image '{path}' could not be processed: {detail}")]
    Image { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create, move or write an output file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// True when the fix is installing something rather than changing input.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, ConvertError::MissingDependency { .. })
    }
}
