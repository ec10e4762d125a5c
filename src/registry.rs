//! The conversion table and route planning.
//!
//! ## Direct handlers
//!
//! Every supported `(source, destination)` pair maps to exactly one
//! [`Handler`]. The table is built once on first use and never mutated.
//!
//! ## Two-hop chains
//!
//! When no direct handler exists, [`plan`] tries each of
//! [`INTERMEDIATE_FORMATS`] in order and takes the first one with handlers
//! on both sides. Search stops at two hops.
//!
//! ```text
//! docx ──office──▶ pdf ──raster──▶ png        plan("docx", "png")
//! heic ──────────── ✗                          plan("heic", "png") == None
//! ```

use crate::backend::Backend;
use crate::error::ConvertError;
use crate::format::{ConversionKey, INTERMEDIATE_FORMATS};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do for one registered conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handler {
    OfficeToPdf,
    PdfToDocx,
    TextToPdf,
    MarkdownToPdf,
    ImageToPdf,
    PdfToImages,
    ImageConvert,
    Transcode,
}

impl Handler {
    /// Short human description, used by `--list`.
    pub fn description(self) -> &'static str {
        match self {
            Handler::OfficeToPdf => "LibreOffice (headless)",
            Handler::PdfToDocx => "LibreOffice PDF import",
            Handler::TextToPdf => "text layout (pdfium)",
            Handler::MarkdownToPdf => "Pandoc",
            Handler::ImageToPdf => "image page (pdfium)",
            Handler::PdfToImages => "page rasteriser (pdfium)",
            Handler::ImageConvert => "image re-encode",
            Handler::Transcode => "FFmpeg",
        }
    }

    /// Whether the handler writes numbered page files instead of `output`.
    ///
    /// Such a handler can only ever be the last step of a route.
    pub fn writes_pages(self) -> bool {
        matches!(self, Handler::PdfToImages)
    }

    /// Execute against `backend`, returning every file written.
    pub fn run(
        self,
        backend: &dyn Backend,
        input: &Path,
        output: &Path,
    ) -> Result<Vec<PathBuf>, ConvertError> {
        match self {
            Handler::OfficeToPdf => backend.office_to_pdf(input, output)?,
            Handler::PdfToDocx => backend.pdf_to_docx(input, output)?,
            Handler::TextToPdf => backend.text_to_pdf(input, output)?,
            Handler::MarkdownToPdf => backend.markdown_to_pdf(input, output)?,
            Handler::ImageToPdf => backend.image_to_pdf(input, output)?,
            Handler::ImageConvert => backend.convert_image(input, output)?,
            Handler::Transcode => backend.transcode(input, output)?,
            Handler::PdfToImages => return backend.pdf_to_images(input, output),
        }
        Ok(vec![output.to_path_buf()])
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

static CONVERSIONS: Lazy<HashMap<ConversionKey, Handler>> = Lazy::new(|| {
    use Handler::*;
    let entries: &[(&str, &str, Handler)] = &[
        // Documents
        ("pdf", "docx", PdfToDocx),
        ("docx", "pdf", OfficeToPdf),
        ("doc", "pdf", OfficeToPdf),
        ("txt", "pdf", TextToPdf),
        ("md", "pdf", MarkdownToPdf),
        // Images into PDF
        ("png", "pdf", ImageToPdf),
        ("jpg", "pdf", ImageToPdf),
        ("bmp", "pdf", ImageToPdf),
        ("webp", "pdf", ImageToPdf),
        // PDF into images
        ("pdf", "png", PdfToImages),
        ("pdf", "jpg", PdfToImages),
        // Image to image
        ("png", "jpg", ImageConvert),
        ("jpg", "png", ImageConvert),
        ("bmp", "png", ImageConvert),
        ("webp", "png", ImageConvert),
        // Media
        ("mp4", "mp3", Transcode),
        ("wav", "mp3", Transcode),
        ("mp4", "wav", Transcode),
    ];
    entries
        .iter()
        .map(|&(from, to, handler)| (ConversionKey::new(from, to), handler))
        .collect()
});

/// Direct handler for `key`, if one is registered.
pub fn lookup(key: &ConversionKey) -> Option<Handler> {
    CONVERSIONS.get(key).copied()
}

/// How a conversion will be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    Direct { key: ConversionKey, handler: Handler },
    Chain { steps: [(ConversionKey, Handler); 2] },
}

impl Route {
    /// The steps in execution order.
    pub fn steps(&self) -> Vec<(&ConversionKey, Handler)> {
        match self {
            Route::Direct { key, handler } => vec![(key, *handler)],
            Route::Chain { steps } => steps.iter().map(|(k, h)| (k, *h)).collect(),
        }
    }

    pub fn step_count(&self) -> usize {
        match self {
            Route::Direct { .. } => 1,
            Route::Chain { .. } => 2,
        }
    }

    /// The intermediate format of a chain.
    pub fn intermediate(&self) -> Option<&str> {
        match self {
            Route::Direct { .. } => None,
            Route::Chain { steps } => Some(steps[0].0.to.as_str()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Direct { key, .. } => write!(f, "{} → {}", key.from, key.to),
            Route::Chain { steps } => write!(
                f,
                "{} → {} → {}",
                steps[0].0.from, steps[0].0.to, steps[1].0.to
            ),
        }
    }
}

/// Two-hop chain from `key.from` to `key.to`, if any.
///
/// Intermediates are tried in [`INTERMEDIATE_FORMATS`] order; the source and
/// destination formats themselves are never used as an intermediate, and a
/// first hop that writes numbered page files is skipped.
pub fn find_chain(key: &ConversionKey) -> Option<[(ConversionKey, Handler); 2]> {
    INTERMEDIATE_FORMATS
        .iter()
        .filter(|mid| **mid != key.from && **mid != key.to)
        .find_map(|mid| {
            let first = ConversionKey::new(&key.from, mid);
            let second = ConversionKey::new(mid, &key.to);
            let first_handler = lookup(&first).filter(|h| !h.writes_pages())?;
            let second_handler = lookup(&second)?;
            Some([(first, first_handler), (second, second_handler)])
        })
}

/// Plan the conversion `from` → `to` (raw extensions are normalised).
///
/// Returns `None` for unsupported pairs and for a missing extension.
pub fn plan(from: &str, to: &str) -> Option<Route> {
    plan_key(&ConversionKey::new(from, to))
}

/// [`plan`] for an already-normalised key.
pub fn plan_key(key: &ConversionKey) -> Option<Route> {
    if key.from.is_empty() || key.to.is_empty() {
        return None;
    }
    if let Some(handler) = lookup(key) {
        return Some(Route::Direct {
            key: key.clone(),
            handler,
        });
    }
    let route = find_chain(key).map(|steps| Route::Chain { steps });
    if let Some(ref r) = route {
        debug!("No direct handler for {}; chaining {}", key, r);
    }
    route
}

/// One row of the conversion listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedConversion {
    pub from: String,
    pub to: String,
    /// `None` for direct conversions.
    pub via: Option<String>,
    pub handler: String,
}

/// Every pair the router accepts, direct ones first, each group sorted.
pub fn supported_conversions() -> Vec<SupportedConversion> {
    let mut direct: Vec<_> = CONVERSIONS
        .iter()
        .map(|(key, handler)| SupportedConversion {
            from: key.from.clone(),
            to: key.to.clone(),
            via: None,
            handler: handler.description().to_string(),
        })
        .collect();
    direct.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

    let mut formats: Vec<&str> = CONVERSIONS
        .keys()
        .flat_map(|k| [k.from.as_str(), k.to.as_str()])
        .collect();
    formats.sort_unstable();
    formats.dedup();

    let mut chained = Vec::new();
    for from in &formats {
        for to in &formats {
            let key = ConversionKey::new(from, to);
            if lookup(&key).is_some() {
                continue;
            }
            if let Some([first, second]) = find_chain(&key) {
                chained.push(SupportedConversion {
                    from: key.from,
                    to: key.to,
                    via: Some(first.0.to.clone()),
                    handler: format!("{} + {}", first.1, second.1),
                });
            }
        }
    }

    direct.extend(chained);
    direct
}
