//! PDF rasterisation and page synthesis via pdfium.
//!
//! pdfium handles everything that needs to understand page content:
//! rendering pages to bitmaps, laying out text pages, placing images on
//! pages, stamping watermarks, and copying pages between documents.
//!
//! ## Binding
//!
//! pdfium is a C++ shared library loaded at runtime. [`bind_pdfium`] looks,
//! in order, at the configured path, `PDFIUM_LIB_PATH`, the working directory
//! and the system library path. Failure is a
//! [`ConvertError::MissingDependency`] like any other absent tool.

use super::imaging;
use crate::config::{ConvertConfig, TextLayout};
use crate::error::ConvertError;
use crate::format::{format_of, page_image_path};
use image::{DynamicImage, ImageFormat};
use pdfium_render::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Helvetica averages roughly this many ems per glyph.
const HELVETICA_EM_RATIO: f32 = 0.55;

/// Install instructions for pdfium.
pub fn pdfium_install_hint() -> String {
    "PDFium is loaded at runtime. Download a build for your platform from\n\
  https://github.com/bblanchon/pdfium-binaries/releases\n\
and either place the library next to convctl or set\n\
  PDFIUM_LIB_PATH=/path/to/libpdfium"
        .to_string()
}

/// Bind to a pdfium library.
pub fn bind_pdfium(config: &ConvertConfig) -> Result<Pdfium, ConvertError> {
    let explicit = config
        .pdfium_library
        .clone()
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => {
            let library = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium at {}", library.display());
            Pdfium::bind_to_library(&library)
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ConvertError::MissingDependency {
        name: "PDFium".to_string(),
        hint: format!("{}\n(binding error: {:?})", pdfium_install_hint(), e),
    })?;

    Ok(Pdfium::new(bindings))
}

fn load_document<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| ConvertError::PdfRead {
            path: path.to_path_buf(),
            detail: format!("{:?}", e),
        })
}

fn pdf_op(path: &Path, e: PdfiumError) -> ConvertError {
    ConvertError::PdfOperation {
        path: path.to_path_buf(),
        detail: format!("{:?}", e),
    }
}

fn save(document: &PdfDocument, output: &Path) -> Result<(), ConvertError> {
    document.save_to_file(output).map_err(|e| pdf_op(output, e))
}

// ── Rasterisation ────────────────────────────────────────────────────────

/// Render every page of `input` to `<output stem>_NNN.<ext>`.
///
/// JPEG targets are rendered without alpha; anything else is written as PNG.
pub fn pdf_to_images(
    config: &ConvertConfig,
    input: &Path,
    output: &Path,
) -> Result<Vec<PathBuf>, ConvertError> {
    let pdfium = bind_pdfium(config)?;
    let document = load_document(&pdfium, input)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new().scale_page_by_factor(config.dpi as f32 / 72.0);
    let as_jpeg = format_of(output) == "jpg";

    let mut written = Vec::with_capacity(total_pages);
    for idx in 0..total_pages {
        let page = pages
            .get(idx as u16)
            .map_err(|e| ConvertError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            ConvertError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        let path = page_image_path(output, idx + 1);
        let saved = if as_jpeg {
            DynamicImage::ImageRgb8(image.to_rgb8()).save_with_format(&path, ImageFormat::Jpeg)
        } else {
            image.save_with_format(&path, ImageFormat::Png)
        };
        saved.map_err(|e| ConvertError::Image {
            path: path.clone(),
            detail: e.to_string(),
        })?;

        written.push(path);
    }

    Ok(written)
}

// ── Page synthesis ───────────────────────────────────────────────────────

/// Lay plain text out on A4 pages with Helvetica.
pub fn text_to_pdf(config: &ConvertConfig, input: &Path, output: &Path) -> Result<(), ConvertError> {
    let bytes = fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
            path: input.to_path_buf(),
        },
        _ => ConvertError::FileNotFound {
            path: input.to_path_buf(),
        },
    })?;
    let text = String::from_utf8_lossy(&bytes);
    let layout = &config.text;
    let pages = layout_text(&text, layout);

    let pdfium = bind_pdfium(config)?;
    let mut document = pdfium.create_new_pdf().map_err(|e| pdf_op(output, e))?;
    let font = document.fonts_mut().helvetica();
    let top = TextLayout::PAGE_HEIGHT - layout.margin;

    for lines in &pages {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::a4())
            .map_err(|e| pdf_op(output, e))?;

        for (row, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let y = top - row as f32 * layout.line_height;
            page.objects_mut()
                .create_text_object(
                    PdfPoints::new(layout.margin),
                    PdfPoints::new(y),
                    line,
                    font,
                    PdfPoints::new(layout.font_size),
                )
                .map_err(|e| pdf_op(output, e))?;
        }
    }

    save(&document, output)?;
    info!("Wrote {} text page(s) to {}", pages.len(), output.display());
    Ok(())
}

/// Place a raster image on a page sized to it.
pub fn image_to_pdf(config: &ConvertConfig, input: &Path, output: &Path) -> Result<(), ConvertError> {
    let img = imaging::open_image(input)?;
    let rgb = DynamicImage::ImageRgb8(imaging::flatten_onto_white(&img));

    let points_per_pixel = 72.0 / config.image_pdf_dpi as f32;
    let width = PdfPoints::new(rgb.width() as f32 * points_per_pixel);
    let height = PdfPoints::new(rgb.height() as f32 * points_per_pixel);

    let pdfium = bind_pdfium(config)?;
    let mut document = pdfium.create_new_pdf().map_err(|e| pdf_op(output, e))?;
    {
        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(|e| pdf_op(output, e))?;
        page.objects_mut()
            .create_image_object(PdfPoints::ZERO, PdfPoints::ZERO, &rgb, Some(width), Some(height))
            .map_err(|e| pdf_op(output, e))?;
    }

    save(&document, output)
}

/// Stamp `text` across every page of `input`.
pub fn watermark_pdf(
    config: &ConvertConfig,
    input: &Path,
    output: &Path,
    text: &str,
) -> Result<(), ConvertError> {
    let style = &config.watermark;
    let pdfium = bind_pdfium(config)?;
    let mut document = load_document(&pdfium, input)?;
    let font = document.fonts_mut().helvetica();

    let half_width = text.chars().count() as f32 * style.font_size * HELVETICA_EM_RATIO / 2.0;
    let colour = PdfColor::new(style.grey, style.grey, style.grey, style.alpha());
    let total_pages = document.pages().len() as usize;

    for idx in 0..total_pages {
        let mut page = document
            .pages()
            .get(idx as u16)
            .map_err(|e| pdf_op(input, e))?;

        let mut stamp =
            PdfPageTextObject::new(&document, text, font, PdfPoints::new(style.font_size))
                .map_err(|e| pdf_op(input, e))?;
        stamp.set_fill_color(colour).map_err(|e| pdf_op(input, e))?;
        // Centre on the origin, turn, then move to the page anchor.
        stamp
            .translate(
                PdfPoints::new(-half_width),
                PdfPoints::new(-style.font_size / 3.0),
            )
            .map_err(|e| pdf_op(input, e))?;
        stamp
            .rotate_counter_clockwise_degrees(style.angle)
            .map_err(|e| pdf_op(input, e))?;
        stamp
            .translate(PdfPoints::new(style.centre.0), PdfPoints::new(style.centre.1))
            .map_err(|e| pdf_op(input, e))?;

        page.objects_mut()
            .add_text_object(stamp)
            .map_err(|e| pdf_op(input, e))?;
    }

    save(&document, output)?;
    info!("Watermarked {} page(s) → {}", total_pages, output.display());
    Ok(())
}

// ── Page copying ─────────────────────────────────────────────────────────

/// Append every page of each input, in order, into a new document.
pub fn merge_pdfs(
    config: &ConvertConfig,
    inputs: &[PathBuf],
    output: &Path,
) -> Result<(), ConvertError> {
    let pdfium = bind_pdfium(config)?;
    let mut merged = pdfium.create_new_pdf().map_err(|e| pdf_op(output, e))?;

    for input in inputs {
        let source = load_document(&pdfium, input)?;
        merged
            .pages_mut()
            .append(&source)
            .map_err(|e| pdf_op(input, e))?;
        debug!("Appended {}", input.display());
    }

    save(&merged, output)
}

/// Write each page of `input` to `outdir/page_NNN.pdf`, creating `outdir`.
pub fn split_pdf(config: &ConvertConfig, input: &Path, outdir: &Path) -> Result<usize, ConvertError> {
    let pdfium = bind_pdfium(config)?;
    let source = load_document(&pdfium, input)?;

    fs::create_dir_all(outdir).map_err(|e| ConvertError::OutputWriteFailed {
        path: outdir.to_path_buf(),
        source: e,
    })?;

    let total_pages = source.pages().len() as usize;
    for idx in 0..total_pages {
        let path = outdir.join(split_page_name(idx + 1));
        let mut single = pdfium.create_new_pdf().map_err(|e| pdf_op(&path, e))?;
        single
            .pages_mut()
            .copy_page_from_document(&source, idx as u16, 0)
            .map_err(|e| pdf_op(input, e))?;
        save(&single, &path)?;
    }

    info!("Split into {} pages in {}", total_pages, outdir.display());
    Ok(total_pages)
}

/// File name of the `page`-th (1-based) split output.
pub fn split_page_name(page: usize) -> String {
    format!("page_{page:03}.pdf")
}

// ── Text layout ──────────────────────────────────────────────────────────

/// Break `text` into pages of drawable lines.
///
/// Always yields at least one page so empty input still becomes a valid,
/// blank document.
pub fn layout_text(text: &str, layout: &TextLayout) -> Vec<Vec<String>> {
    let lines: Vec<String> = text
        .lines()
        .flat_map(|line| wrap_line(&line.replace('\t', "    "), layout.wrap_width))
        .collect();

    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(layout.lines_per_page())
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Word-wrap a single line.
///
/// Lines up to `width` characters pass through (trailing whitespace
/// trimmed). Longer lines are rebuilt word by word, each output line kept
/// strictly shorter than `width` unless one word alone is longer.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let line = line.trim_end();
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let mut wrapped = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let current_len = current.chars().count();
        if current_len + word.chars().count() + 1 < width {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        } else {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lines_pass_through() {
        assert_eq!(wrap_line("hello world   ", 100), vec!["hello world"]);
        assert_eq!(wrap_line("", 100), vec![""]);
    }

    #[test]
    fn long_lines_wrap_at_word_boundaries() {
        let line = "alpha beta gamma delta epsilon";
        let wrapped = wrap_line(line, 12);
        assert_eq!(wrapped, vec!["alpha beta", "gamma delta", "epsilon"]);
        assert!(wrapped.iter().all(|l| l.len() < 12));
    }

    #[test]
    fn overlong_word_stays_whole() {
        let word = "x".repeat(30);
        let line = format!("a {word} b");
        assert_eq!(wrap_line(&line, 10), vec!["a".to_string(), word, "b".to_string()]);
    }

    #[test]
    fn layout_paginates_by_lines_per_page() {
        let layout = TextLayout::default();
        let per_page = layout.lines_per_page();
        let text = (0..per_page + 3)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let pages = layout_text(&text, &layout);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), per_page);
        assert_eq!(pages[1], vec!["line 55", "line 56", "line 57"]);
    }

    #[test]
    fn empty_text_is_one_blank_page() {
        assert_eq!(layout_text("", &TextLayout::default()), vec![Vec::<String>::new()]);
    }

    #[test]
    fn blank_lines_keep_their_row() {
        let pages = layout_text("a\n\nb", &TextLayout::default());
        assert_eq!(pages, vec![vec!["a".to_string(), String::new(), "b".to_string()]]);
    }

    #[test]
    fn split_names_are_three_digit() {
        assert_eq!(split_page_name(1), "page_001.pdf");
        assert_eq!(split_page_name(120), "page_120.pdf");
    }

    #[test]
    fn bad_pdfium_path_is_missing_dependency() {
        let config = ConvertConfig::builder()
            .pdfium_library("/definitely/not/libpdfium.so")
            .build()
            .unwrap();
        let err = bind_pdfium(&config).err().expect("binding must fail");
        assert!(err.is_missing_dependency(), "{err}");
        assert!(err.to_string().contains("PDFIUM_LIB_PATH"));
    }
}
