//! Configuration types for file conversion.
//!
//! All tunable behaviour lives in [`ConvertConfig`], built through its
//! [`ConvertConfigBuilder`]. The router never reads it; only the handlers
//! behind [`crate::backend::SystemBackend`] do, so swapping in a fake backend
//! makes the config irrelevant for routing tests.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for conversions and PDF operations.
///
/// # Example
/// ```rust
/// use convctl::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .dpi(300)
///     .pdf_engine("lualatex")
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Clone)]
pub struct ConvertConfig {
    /// DPI used when rasterising PDF pages to images. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Resolution assumed when placing an image on a PDF page. Default: 100.
    ///
    /// A 1000 px wide image becomes a 720 pt (10 inch) wide page.
    pub image_pdf_dpi: u32,

    /// Page layout for plain-text to PDF.
    pub text: TextLayout,

    /// Appearance of watermark stamps.
    pub watermark: WatermarkStyle,

    /// LaTeX engine Pandoc is asked for first. Default: `xelatex`.
    ///
    /// When Pandoc fails with this engine it is retried with its own default.
    pub pdf_engine: String,

    /// Explicit tool locations; `None` means search `PATH`.
    pub tools: ToolPaths,

    /// Path to the pdfium shared library (or the directory holding it).
    ///
    /// Falls back to `PDFIUM_LIB_PATH`, the working directory, then the
    /// system library search path.
    pub pdfium_library: Option<PathBuf>,

    /// Optional per-step progress notifications.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            image_pdf_dpi: 100,
            text: TextLayout::default(),
            watermark: WatermarkStyle::default(),
            pdf_engine: "xelatex".to_string(),
            tools: ToolPaths::default(),
            pdfium_library: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConvertConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertConfig")
            .field("dpi", &self.dpi)
            .field("image_pdf_dpi", &self.image_pdf_dpi)
            .field("text", &self.text)
            .field("watermark", &self.watermark)
            .field("pdf_engine", &self.pdf_engine)
            .field("tools", &self.tools)
            .field("pdfium_library", &self.pdfium_library)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn image_pdf_dpi(mut self, dpi: u32) -> Self {
        self.config.image_pdf_dpi = dpi;
        self
    }

    pub fn text_layout(mut self, layout: TextLayout) -> Self {
        self.config.text = layout;
        self
    }

    pub fn watermark_style(mut self, style: WatermarkStyle) -> Self {
        self.config.watermark = style;
        self
    }

    pub fn pdf_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.pdf_engine = engine.into();
        self
    }

    pub fn libreoffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.libreoffice = Some(path.into());
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.pandoc = Some(path.into());
        self
    }

    pub fn ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tools.ffmpeg = Some(path.into());
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, ConvertError> {
        let c = &self.config;
        if !(72..=600).contains(&c.dpi) {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.image_pdf_dpi == 0 {
            return Err(ConvertError::InvalidConfig(
                "Image resolution must be ≥ 1 DPI".into(),
            ));
        }
        c.text.validate()?;
        c.watermark.validate()?;
        if c.pdf_engine.trim().is_empty() {
            return Err(ConvertError::InvalidConfig(
                "PDF engine name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Layout types ─────────────────────────────────────────────────────────

/// Page geometry and typography for plain-text to PDF.
///
/// Pages are A4. Lines longer than `wrap_width` characters are broken at
/// word boundaries; shorter lines are drawn as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayout {
    /// Helvetica size in points. Default: 12.
    pub font_size: f32,
    /// Baseline-to-baseline distance in points. Default: 14.
    pub line_height: f32,
    /// Margin on every side in points. Default: 40.
    pub margin: f32,
    /// Maximum characters per drawn line. Default: 100.
    pub wrap_width: usize,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            line_height: 14.0,
            margin: 40.0,
            wrap_width: 100,
        }
    }
}

impl TextLayout {
    /// A4 height in points.
    pub const PAGE_HEIGHT: f32 = 841.89;

    /// How many lines fit between the top and bottom margins.
    ///
    /// The first baseline sits at `PAGE_HEIGHT - margin`; a new page starts
    /// once the next baseline would fall below `margin`.
    pub fn lines_per_page(&self) -> usize {
        let usable = Self::PAGE_HEIGHT - 2.0 * self.margin;
        (usable / self.line_height).floor() as usize + 1
    }

    fn validate(&self) -> Result<(), ConvertError> {
        if self.font_size <= 0.0 || self.line_height <= 0.0 {
            return Err(ConvertError::InvalidConfig(
                "Font size and line height must be positive".into(),
            ));
        }
        if self.margin < 0.0 || self.margin * 2.0 >= Self::PAGE_HEIGHT {
            return Err(ConvertError::InvalidConfig(format!(
                "Margin {} does not leave room on an A4 page",
                self.margin
            )));
        }
        if self.wrap_width == 0 {
            return Err(ConvertError::InvalidConfig(
                "Wrap width must be ≥ 1".into(),
            ));
        }
        Ok(())
    }
}

/// Appearance of the diagonal watermark stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkStyle {
    /// Helvetica size in points. Default: 60.
    pub font_size: f32,
    /// Grey level, 0 = black, 255 = white. Default: 128.
    pub grey: u8,
    /// Opacity in 0.0–1.0. Default: 0.3.
    pub opacity: f32,
    /// Counter-clockwise rotation in degrees. Default: 45.
    pub angle: f32,
    /// Centre of the stamp in page points. Default: (300, 400).
    pub centre: (f32, f32),
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font_size: 60.0,
            grey: 128,
            opacity: 0.3,
            angle: 45.0,
            centre: (300.0, 400.0),
        }
    }
}

impl WatermarkStyle {
    /// Opacity as an 8-bit alpha value.
    pub fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn validate(&self) -> Result<(), ConvertError> {
        if self.font_size <= 0.0 {
            return Err(ConvertError::InvalidConfig(
                "Watermark font size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConvertError::InvalidConfig(format!(
                "Watermark opacity must be 0.0–1.0, got {}",
                self.opacity
            )));
        }
        Ok(())
    }
}

/// Explicit executable locations for external tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub libreoffice: Option<PathBuf>,
    pub pandoc: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
}
