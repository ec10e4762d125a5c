//! Document-suite and typesetting handlers: LibreOffice and Pandoc.
//!
//! LibreOffice has no "write to this file" flag: `--convert-to` always writes
//! `<outdir>/<input stem>.<ext>`. We point `--outdir` at a private scratch
//! directory and move the result to the requested path, so a file that
//! happens to share the generated name next to the input is never touched.

use super::process::{move_file, Tool, ToolCommand};
use crate::config::ConvertConfig;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Office document (DOCX, DOC, …) to PDF via headless LibreOffice.
pub fn office_to_pdf(
    config: &ConvertConfig,
    input: &Path,
    output: &Path,
) -> Result<(), ConvertError> {
    let soffice = Tool::LibreOffice.locate(config.tools.libreoffice.as_deref())?;
    run_libreoffice(&soffice, input, output, "pdf", None)
}

/// PDF to DOCX via LibreOffice's Draw-based PDF import.
pub fn pdf_to_docx(
    config: &ConvertConfig,
    input: &Path,
    output: &Path,
) -> Result<(), ConvertError> {
    let soffice = Tool::LibreOffice.locate(config.tools.libreoffice.as_deref())?;
    run_libreoffice(
        &soffice,
        input,
        output,
        "docx:MS Word 2007 XML",
        Some("writer_pdf_import"),
    )
}

/// Markdown to PDF via Pandoc.
///
/// The configured LaTeX engine is tried first; when that run fails Pandoc is
/// invoked again with its default engine and the second error is reported.
pub fn markdown_to_pdf(
    config: &ConvertConfig,
    input: &Path,
    output: &Path,
) -> Result<(), ConvertError> {
    let pandoc = Tool::Pandoc.locate(config.tools.pandoc.as_deref())?;

    let first = ToolCommand::new("Pandoc", pandoc.clone())
        .arg(input)
        .arg("-o")
        .arg(output)
        .arg(format!("--pdf-engine={}", config.pdf_engine))
        .run();

    match first {
        Ok(_) => Ok(()),
        Err(ConvertError::ToolFailed { stderr, .. }) => {
            warn!(
                "Pandoc with {} failed, retrying with default engine: {}",
                config.pdf_engine, stderr
            );
            ToolCommand::new("Pandoc", pandoc)
                .arg(input)
                .arg("-o")
                .arg(output)
                .run()
                .map(|_| ())
        }
        Err(e) => Err(e),
    }
}

/// Run one LibreOffice conversion and move the product to `output`.
///
/// `target` is the `--convert-to` argument; only the part before `:` is the
/// extension LibreOffice writes.
fn run_libreoffice(
    soffice: &Path,
    input: &Path,
    output: &Path,
    target: &str,
    infilter: Option<&str>,
) -> Result<(), ConvertError> {
    let scratch = TempDir::with_prefix("convctl-office-")
        .map_err(|e| ConvertError::Internal(format!("scratch directory: {e}")))?;

    let mut cmd = ToolCommand::new("LibreOffice", soffice.to_path_buf());
    cmd.arg("--headless");
    if let Some(filter) = infilter {
        cmd.arg(format!("--infilter={filter}"));
    }
    cmd.arg("--convert-to")
        .arg(target)
        .arg(input)
        .arg("--outdir")
        .arg(scratch.path());

    info!("LibreOffice: {} → {}", input.display(), output.display());
    let log = cmd.run()?;

    let produced = libreoffice_product(scratch.path(), input, target);
    if !produced.exists() {
        if !log.is_empty() {
            warn!("LibreOffice: {}", log);
        }
        return Err(ConvertError::ToolProducedNothing {
            tool: "LibreOffice".to_string(),
            path: produced,
        });
    }

    debug!("Moving {} → {}", produced.display(), output.display());
    move_file(&produced, output)
}

/// Where LibreOffice writes its result for `input` inside `outdir`.
fn libreoffice_product(outdir: &Path, input: &Path, target: &str) -> PathBuf {
    let ext = target.split(':').next().unwrap_or(target);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    outdir.join(format!("{stem}.{ext}"))
}
