//! External collaborators behind a single trait.
//!
//! Every byte-level transformation convctl performs is delegated: office
//! documents to LibreOffice, Markdown to Pandoc, audio/video to FFmpeg,
//! images to the `image` crate, PDF rendering and page synthesis to pdfium,
//! and PDF structural edits to `lopdf`. [`Backend`] has one method per
//! operation so the router and the PDF operations can be driven by a fake in
//! tests without any of those installed.
//!
//! ```text
//! Router / PdfOperations ──▶ dyn Backend ──▶ SystemBackend
//!                                             ├─ office     (LibreOffice, Pandoc)
//!                                             ├─ media      (FFmpeg)
//!                                             ├─ imaging    (image)
//!                                             ├─ pdfium     (pdfium-render)
//!                                             └─ structure  (lopdf)
//! ```

pub mod imaging;
pub mod media;
pub mod office;
pub mod pdfium;
pub mod process;
pub mod structure;

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};

/// One operation per external collaborator.
///
/// Implementations write exactly the files their contract names and nothing
/// else; the caller owns cleanup of anything it asked to be written.
pub trait Backend {
    /// DOCX/DOC (or any office document) to PDF.
    fn office_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// PDF to DOCX.
    fn pdf_to_docx(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Markdown to PDF through a typesetting engine.
    fn markdown_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Plain text to paginated PDF.
    fn text_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// A raster image to a single-page PDF.
    fn image_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Re-encode an image into the format named by `output`'s extension.
    fn convert_image(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Rasterise every page; see [`crate::format::page_image_path`] for names.
    ///
    /// Returns the paths written.
    fn pdf_to_images(&self, input: &Path, output: &Path) -> Result<Vec<PathBuf>, ConvertError>;

    /// Audio/video transcode, format chosen by `output`'s extension.
    fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Concatenate the pages of `inputs` in order.
    fn merge_pdfs(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConvertError>;

    /// Write each page to `outdir/page_NNN.pdf`; returns the page count.
    fn split_pdf(&self, input: &Path, outdir: &Path) -> Result<usize, ConvertError>;

    /// Re-save with compressed content streams.
    fn compress_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError>;

    /// Add `degrees` (a multiple of 90 in 0..360) to every page's rotation.
    fn rotate_pdf(&self, input: &Path, output: &Path, degrees: u16) -> Result<(), ConvertError>;

    /// Stamp `text` diagonally across every page.
    fn watermark_pdf(&self, input: &Path, output: &Path, text: &str) -> Result<(), ConvertError>;
}

/// The production backend: real tools and libraries.
#[derive(Debug, Clone, Default)]
pub struct SystemBackend {
    config: ConvertConfig,
}

impl SystemBackend {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }
}

impl Backend for SystemBackend {
    fn office_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        office::office_to_pdf(&self.config, input, output)
    }

    fn pdf_to_docx(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        office::pdf_to_docx(&self.config, input, output)
    }

    fn markdown_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        office::markdown_to_pdf(&self.config, input, output)
    }

    fn text_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        pdfium::text_to_pdf(&self.config, input, output)
    }

    fn image_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        pdfium::image_to_pdf(&self.config, input, output)
    }

    fn convert_image(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        imaging::convert_image(input, output)
    }

    fn pdf_to_images(&self, input: &Path, output: &Path) -> Result<Vec<PathBuf>, ConvertError> {
        pdfium::pdf_to_images(&self.config, input, output)
    }

    fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        media::transcode(&self.config, input, output)
    }

    fn merge_pdfs(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConvertError> {
        pdfium::merge_pdfs(&self.config, inputs, output)
    }

    fn split_pdf(&self, input: &Path, outdir: &Path) -> Result<usize, ConvertError> {
        pdfium::split_pdf(&self.config, input, outdir)
    }

    fn compress_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        structure::compress_pdf(input, output)
    }

    fn rotate_pdf(&self, input: &Path, output: &Path, degrees: u16) -> Result<(), ConvertError> {
        structure::rotate_pdf(input, output, degrees)
    }

    fn watermark_pdf(&self, input: &Path, output: &Path, text: &str) -> Result<(), ConvertError> {
        pdfium::watermark_pdf(&self.config, input, output, text)
    }
}
