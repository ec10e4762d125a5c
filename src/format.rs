//! Format identifiers and conversion keys.
//!
//! A format is nothing more than a file extension: lowercase, without the
//! leading dot, with `jpeg` folded into `jpg`. Folding happens for lookups
//! only; [`display_extension`] keeps what the user typed for messages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Formats a two-hop chain may pass through, in search order.
pub const INTERMEDIATE_FORMATS: [&str; 3] = ["pdf", "png", "jpg"];

/// Normalise a raw extension for table lookups.
///
/// ```
/// use convctl::format::normalize;
/// assert_eq!(normalize(".JPEG"), "jpg");
/// assert_eq!(normalize("Pdf"), "pdf");
/// ```
pub fn normalize(ext: &str) -> String {
    let ext = ext.trim().trim_start_matches('.').to_lowercase();
    if ext == "jpeg" {
        "jpg".to_string()
    } else {
        ext
    }
}

/// Lowercased extension of `path` as written, without normalisation.
///
/// Returns an empty string when the path has no extension.
pub fn display_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Normalised format of `path`.
pub fn format_of(path: &Path) -> String {
    normalize(&display_extension(path))
}

/// Path of the `page`-th (1-based) image rendered from a PDF.
///
/// `out/report.png` with page 3 becomes `out/report_003.png`.
pub fn page_image_path(output: &Path, page: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output.with_file_name(format!("{stem}_{page:03}.{ext}"))
}

/// An ordered (source, destination) pair of normalised formats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversionKey {
    pub from: String,
    pub to: String,
}

impl ConversionKey {
    /// Build a key, normalising both sides.
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: normalize(from),
            to: normalize(to),
        }
    }

    /// Key for converting the file at `input` into the file at `output`.
    pub fn for_paths(input: &Path, output: &Path) -> Self {
        Self {
            from: format_of(input),
            to: format_of(output),
        }
    }
}

impl fmt::Display for ConversionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
