//! CLI binary for convctl.
//!
//! With arguments it runs one conversion or PDF operation and exits; with
//! none it opens the interactive menu.

mod menu;
mod ui;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use convctl::doctor::{diagnose, install_instructions};
use convctl::{supported_conversions, ConvertConfig, FormatRouter, PdfOperations, SystemBackend};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ui::{bold, dim, green, red};

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert (routed directly or through pdf/png/jpg)
  convctl report.docx report.pdf
  convctl slides.docx slides.png        # docx → pdf → png, one PNG per page

  # PDF operations
  convctl --merge a.pdf b.pdf c.pdf merged.pdf
  convctl --split book.pdf chapters/
  convctl --compress scan.pdf scan_small.pdf
  convctl --rotate -90 scan.pdf upright.pdf
  convctl --watermark "DRAFT" contract.pdf contract_draft.pdf

  # Diagnostics
  convctl --doctor
  convctl --doctor --json
  convctl --list

  # Interactive menu
  convctl

EXTERNAL TOOLS:
  LibreOffice   DOCX/DOC → PDF, PDF → DOCX
  Pandoc        Markdown → PDF (LaTeX engine: xelatex, falls back to default)
  FFmpeg        MP4/WAV → MP3, MP4 → WAV
  PDFium        TXT/image → PDF, PDF → images, merge, split, watermark

ENVIRONMENT VARIABLES:
  CONVCTL_DPI           Raster DPI for PDF → image (72–600)
  CONVCTL_LIBREOFFICE   Path to the soffice/libreoffice executable
  CONVCTL_PANDOC        Path to pandoc
  CONVCTL_FFMPEG        Path to ffmpeg
  PDFIUM_LIB_PATH       Path to libpdfium (file or directory)
  RUST_LOG              Override log filtering (e.g. convctl=debug)
"#;

/// Convert documents, images and media between formats.
#[derive(Parser, Debug)]
#[command(
    name = "convctl",
    version,
    about = "Convert documents, images and media between formats",
    long_about = "Convert files between document, image and media formats by delegating to \
LibreOffice, Pandoc, FFmpeg and PDFium. Pairs without a direct converter are chained through \
PDF, PNG or JPG. Run without arguments for the interactive menu.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("mode").args(["merge", "split", "compress", "rotate", "watermark", "doctor", "list", "install"]))
)]
struct Cli {
    /// INPUT OUTPUT for a conversion; the operands of the selected operation otherwise.
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Merge PDFs: FILES are the inputs followed by the output.
    #[arg(long)]
    merge: bool,

    /// Split a PDF: FILES are the input and an optional directory (default: pages).
    #[arg(long)]
    split: bool,

    /// Compress a PDF: FILES are INPUT OUTPUT.
    #[arg(long)]
    compress: bool,

    /// Rotate every page by DEG (rounded down to a multiple of 90): FILES are INPUT OUTPUT.
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    rotate: Option<i32>,

    /// Stamp TEXT diagonally on every page: FILES are INPUT OUTPUT.
    #[arg(long, value_name = "TEXT")]
    watermark: Option<String>,

    /// Check external dependencies and exit.
    #[arg(long)]
    doctor: bool,

    /// Print every supported conversion and exit.
    #[arg(long)]
    list: bool,

    /// Print install commands for external dependencies and exit.
    #[arg(long)]
    install: bool,

    /// Machine-readable output for --doctor and --list.
    #[arg(long)]
    json: bool,

    /// Show the route a conversion would take without running it.
    #[arg(long)]
    dry_run: bool,

    /// Raster DPI for PDF → image (72–600).
    #[arg(long, env = "CONVCTL_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// LibreOffice executable.
    #[arg(long, env = "CONVCTL_LIBREOFFICE")]
    libreoffice: Option<PathBuf>,

    /// Pandoc executable.
    #[arg(long, env = "CONVCTL_PANDOC")]
    pandoc: Option<PathBuf>,

    /// FFmpeg executable.
    #[arg(long, env = "CONVCTL_FFMPEG")]
    ffmpeg: Option<PathBuf>,

    /// PDFium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, env = "CONVCTL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CONVCTL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CONVCTL_QUIET")]
    quiet: bool,
}

impl Cli {
    fn interactive(&self) -> bool {
        self.files.is_empty()
            && !(self.merge
                || self.split
                || self.compress
                || self.rotate.is_some()
                || self.watermark.is_some()
                || self.doctor
                || self.list
                || self.install)
    }

    fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress && !self.json
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters; keep INFO lines
    // from tearing through it.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if cli.show_progress() || cli.interactive() {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("Error:"), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // ── Commands that need no configuration ──────────────────────────────
    if cli.install {
        println!("{}", install_instructions());
        return Ok(());
    }
    if cli.list {
        let rows = supported_conversions();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("Failed to serialise conversions")?
            );
        } else {
            ui::print_conversions(&rows);
        }
        return Ok(());
    }

    let config = build_config(cli)?;

    if cli.doctor {
        let report = diagnose(&config);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialise report")?
            );
        } else {
            ui::print_doctor(&report);
        }
        return Ok(());
    }

    if cli.interactive() {
        return menu::run(config);
    }

    let backend = SystemBackend::new(config);
    let ops = PdfOperations::new(&backend);

    // ── PDF operations ───────────────────────────────────────────────────
    if cli.merge {
        let Some((output, inputs)) = cli.files.split_last() else {
            bail!("--merge needs input PDFs followed by an output path");
        };
        ops.merge(inputs, output)
            .with_context(|| format!("Failed to merge into {}", output.display()))?;
        done(cli, &format!("Merged {} files into {}", inputs.len(), output.display()));
        return Ok(());
    }

    if cli.split {
        let (input, outdir) = match cli.files.as_slice() {
            [input] => (input.clone(), PathBuf::from("pages")),
            [input, outdir] => (input.clone(), outdir.clone()),
            _ => bail!("--split takes INPUT [DIR]"),
        };
        let pages = ops
            .split(&input, &outdir)
            .with_context(|| format!("Failed to split {}", input.display()))?;
        done(cli, &format!("{} pages written to {}", pages, outdir.display()));
        return Ok(());
    }

    if cli.compress || cli.rotate.is_some() || cli.watermark.is_some() {
        let [input, output] = cli.files.as_slice() else {
            bail!("expected INPUT OUTPUT, got {} path(s)", cli.files.len());
        };
        if cli.compress {
            ops.compress(input, output)
                .with_context(|| format!("Failed to compress {}", input.display()))?;
        } else if let Some(degrees) = cli.rotate {
            let applied = ops
                .rotate(input, output, degrees)
                .with_context(|| format!("Failed to rotate {}", input.display()))?;
            if applied as i32 != degrees && !cli.quiet {
                eprintln!("{}", dim(&format!("Rotation normalised to {applied}°")));
            }
        } else if let Some(text) = &cli.watermark {
            ops.watermark(input, output, text)
                .with_context(|| format!("Failed to watermark {}", input.display()))?;
        }
        done(cli, "Done.");
        return Ok(());
    }

    // ── Conversion ───────────────────────────────────────────────────────
    let [input, output] = cli.files.as_slice() else {
        bail!("expected INPUT OUTPUT, got {} path(s); see --help", cli.files.len());
    };

    let mut router = FormatRouter::new(&backend);
    if cli.dry_run {
        let route = router.plan(input, output)?;
        println!("{route}");
        return Ok(());
    }
    if cli.show_progress() {
        router = router.with_progress(ui::SpinnerProgress::new());
    }

    let report = router
        .convert(input, output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if !cli.quiet {
        if report.outputs.len() > 1 {
            eprintln!(
                "{}  {}  {} files  {}ms",
                green("✔"),
                report.route,
                report.outputs.len(),
                report.duration_ms
            );
        } else if cli.verbose {
            eprintln!(
                "{}  {}  {}ms",
                green("✔"),
                report.route,
                report.duration_ms
            );
        }
        println!("Done.");
    }
    Ok(())
}

fn done(cli: &Cli, message: &str) {
    if !cli.quiet {
        println!("{} {}", green("✔"), bold(message));
    }
}

/// Map CLI args to `ConvertConfig`.
fn build_config(cli: &Cli) -> Result<ConvertConfig> {
    let mut builder = ConvertConfig::builder().dpi(cli.dpi);
    if let Some(path) = &cli.libreoffice {
        builder = builder.libreoffice_path(path);
    }
    if let Some(path) = &cli.pandoc {
        builder = builder.pandoc_path(path);
    }
    if let Some(path) = &cli.ffmpeg {
        builder = builder.ffmpeg_path(path);
    }
    if let Some(path) = &cli.pdfium {
        builder = builder.pdfium_library(path);
    }
    builder.build().context("Invalid configuration")
}
