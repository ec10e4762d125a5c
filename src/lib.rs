//! # convctl
//!
//! Convert files between document, image and media formats by routing each
//! request to the tool or library that already does it well.
//!
//! ## Why a router?
//!
//! LibreOffice, Pandoc, FFmpeg, pdfium and the `image` crate each cover a
//! slice of the format space. convctl owns no conversion logic of its own:
//! it keeps a fixed table of which collaborator handles which
//! `(source, destination)` pair, and when no single entry fits it chains two
//! of them through a common intermediate (`pdf`, `png` or `jpg`).
//!
//! ## Flow
//!
//! ```text
//! input.ext ─┬─ 1. Key     lowercase extensions, jpeg → jpg
//!            ├─ 2. Plan    direct entry, else first two-hop chain
//!            ├─ 3. Check   input exists and is readable
//!            ├─ 4. Run     handler(s) via Backend; chains write a temp file
//!            └─ 5. Clean   temp file removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use convctl::{convert_file, ConvertConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), convctl::ConvertError> {
//!     let config = ConvertConfig::builder().dpi(150).build()?;
//!     let report = convert_file(Path::new("slides.docx"), Path::new("slides.png"), &config)?;
//!     eprintln!("{} → {} file(s)", report.route, report.outputs.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `convctl` binary (clap + anyhow + tracing-subscriber + indicatif + dialoguer) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! convctl = { version = "2", default-features = false }
//! ```
//!
//! ## External dependencies
//!
//! | Collaborator | Needed for |
//! |--------------|------------|
//! | LibreOffice  | DOCX/DOC → PDF, PDF → DOCX |
//! | Pandoc (+ LaTeX) | Markdown → PDF |
//! | FFmpeg       | audio/video |
//! | pdfium (shared library) | TXT/image → PDF, PDF → images, merge, split, watermark |
//!
//! Image re-encoding, PDF rotation and compression are pure Rust.
//! [`doctor::diagnose`] reports what is available.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod doctor;
pub mod error;
pub mod format;
pub mod operations;
pub mod progress;
pub mod registry;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{Backend, SystemBackend};
pub use config::{ConvertConfig, ConvertConfigBuilder, TextLayout, ToolPaths, WatermarkStyle};
pub use convert::{convert_file, ConversionReport, FormatRouter};
pub use doctor::{diagnose, DoctorReport};
pub use error::ConvertError;
pub use format::ConversionKey;
pub use operations::{normalize_rotation, PdfOperations};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use registry::{plan, supported_conversions, Handler, Route};
