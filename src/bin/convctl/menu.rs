//! Interactive menu mode.
//!
//! Every action asks for an input file, derives the output name from it,
//! confirms before overwriting, and prints the outcome. Conversion errors
//! are printed and the loop continues; only prompt failures (closed
//! terminal, Ctrl-C) leave the menu.

use crate::ui::{bold, busy, cyan, dim, green, print_doctor, red};
use anyhow::Result;
use convctl::doctor::{diagnose, install_instructions};
use convctl::format::{display_extension, normalize};
use convctl::{ConvertConfig, ConvertError, FormatRouter, PdfOperations, SystemBackend};
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};

const CUSTOM_TARGETS: [&str; 8] = ["pdf", "docx", "png", "jpg", "bmp", "webp", "mp3", "wav"];
const IMAGE_TARGETS: [&str; 5] = ["png", "jpg", "bmp", "webp", "pdf"];

/// Run the menu until the user exits.
pub fn run(config: ConvertConfig) -> Result<()> {
    let menu = Menu {
        backend: SystemBackend::new(config.clone()),
        config,
    };
    match menu.main_loop() {
        Err(e) if is_interrupt(&e) => {
            println!("\n{}", bold("Interrupted. Goodbye!"));
            Ok(())
        }
        other => other,
    }
}

fn is_interrupt(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<dialoguer::Error>(),
        Some(dialoguer::Error::IO(io)) if io.kind() == std::io::ErrorKind::Interrupted
    )
}

struct Menu {
    config: ConvertConfig,
    backend: SystemBackend,
}

impl Menu {
    fn main_loop(&self) -> Result<()> {
        let items = [
            "Document conversions",
            "Image conversions",
            "PDF operations",
            "Media conversions",
            "Custom conversion (any → any)",
            "System check (doctor)",
            "Install dependencies",
            "Exit",
        ];
        loop {
            header("MAIN MENU");
            let choice = Select::new()
                .with_prompt("Select option")
                .items(&items)
                .default(0)
                .interact_opt()?;
            match choice {
                Some(0) => self.documents()?,
                Some(1) => self.images()?,
                Some(2) => self.pdf_operations()?,
                Some(3) => self.media()?,
                Some(4) => self.custom()?,
                Some(5) => {
                    print_doctor(&diagnose(&self.config));
                    pause()?;
                }
                Some(6) => {
                    println!("{}", install_instructions());
                    pause()?;
                }
                _ => {
                    println!("{}", bold("Goodbye! Thanks for using convctl."));
                    return Ok(());
                }
            }
        }
    }

    fn documents(&self) -> Result<()> {
        let options: [(&str, &str, &str); 5] = [
            ("DOCX → PDF", "DOCX", "pdf"),
            ("PDF → DOCX", "PDF", "docx"),
            ("DOC → PDF", "DOC", "pdf"),
            ("TXT → PDF", "TXT", "pdf"),
            ("MD → PDF", "MD", "pdf"),
        ];
        loop {
            header("DOCUMENT CONVERSIONS");
            let Some(idx) = submenu(options.iter().map(|o| o.0))? else {
                return Ok(());
            };
            let (_, kind, target) = options[idx];
            let input = prompt_input_file(&format!("Enter {kind} file path"))?;
            self.convert_to(&input, &input.with_extension(target))?;
            pause()?;
        }
    }

    fn images(&self) -> Result<()> {
        header("IMAGE CONVERSIONS");
        println!("  Supported: PNG, JPG, BMP, WEBP, PDF\n");
        let input = prompt_input_file("Enter image file path")?;
        let source = normalize(&display_extension(&input));
        println!("Detected format: {}", source.to_uppercase());

        let labels: Vec<String> = IMAGE_TARGETS
            .iter()
            .map(|ext| {
                let marker = if *ext == source { "→" } else { " " };
                format!("{marker} {}", ext.to_uppercase())
            })
            .collect();
        let Some(idx) = Select::new()
            .with_prompt("Select output format")
            .items(&labels)
            .interact_opt()?
        else {
            return Ok(());
        };

        self.convert_to(&input, &input.with_extension(IMAGE_TARGETS[idx]))?;
        pause()
    }

    fn pdf_operations(&self) -> Result<()> {
        let options = [
            "Merge PDFs",
            "Split PDF",
            "Compress PDF",
            "Rotate PDF",
            "Add watermark",
            "PDF → images (PNG/JPG)",
        ];
        let ops = PdfOperations::new(&self.backend);
        loop {
            header("PDF OPERATIONS");
            let Some(idx) = submenu(options.iter().copied())? else {
                return Ok(());
            };
            match idx {
                0 => self.merge(&ops)?,
                1 => {
                    let input = prompt_input_file("Enter PDF file path")?;
                    let outdir: String = Input::new()
                        .with_prompt("Output directory")
                        .default("pages".to_string())
                        .interact_text()?;
                    let spinner = busy("Splitting PDF…");
                    let result = ops.split(&input, Path::new(outdir.trim()));
                    spinner.finish_and_clear();
                    if let Some(pages) = report(result) {
                        println!("{} {} pages written to {}", green("✔"), pages, outdir.trim());
                    }
                }
                2 => {
                    let input = prompt_input_file("Enter PDF file path")?;
                    let output = with_suffix(&input, "_compressed.pdf");
                    if confirm_overwrite(&output)? {
                        let spinner = busy("Compressing PDF…");
                        let result = ops.compress(&input, &output);
                        spinner.finish_and_clear();
                        if report(result).is_some() {
                            saved(&output);
                        }
                    }
                }
                3 => {
                    let input = prompt_input_file("Enter PDF file path")?;
                    let degrees: i32 = Input::new()
                        .with_prompt("Rotation degrees (90, 180, 270, -90)")
                        .interact_text()?;
                    let output = with_suffix(&input, &format!("_rotated{degrees}.pdf"));
                    if confirm_overwrite(&output)? {
                        if let Some(applied) = report(ops.rotate(&input, &output, degrees)) {
                            println!("{}", dim(&format!("Applied {applied}°")));
                            saved(&output);
                        }
                    }
                }
                4 => {
                    let input = prompt_input_file("Enter PDF file path")?;
                    let text: String = Input::new()
                        .with_prompt("Watermark text")
                        .allow_empty(true)
                        .interact_text()?;
                    if !text.trim().is_empty() {
                        let output = with_suffix(&input, "_watermarked.pdf");
                        if confirm_overwrite(&output)? {
                            let spinner = busy("Adding watermark…");
                            let result = ops.watermark(&input, &output, text.trim());
                            spinner.finish_and_clear();
                            if report(result).is_some() {
                                saved(&output);
                            }
                        }
                    }
                }
                _ => {
                    let input = prompt_input_file("Enter PDF file path")?;
                    let formats = ["png", "jpg"];
                    let fmt = Select::new()
                        .with_prompt("Output format")
                        .items(&["PNG", "JPG"])
                        .default(0)
                        .interact()?;
                    self.convert_to(&input, &input.with_extension(formats[fmt]))?;
                }
            }
            pause()?;
        }
    }

    fn merge(&self, ops: &PdfOperations<'_>) -> Result<()> {
        println!("Enter PDF files to merge (empty line to finish):");
        let mut files: Vec<PathBuf> = Vec::new();
        loop {
            let entry: String = Input::new()
                .with_prompt(format!("  File {}", files.len() + 1))
                .allow_empty(true)
                .interact_text()?;
            let entry = clean_path(&entry);
            if entry.as_os_str().is_empty() {
                break;
            }
            if entry.exists() {
                files.push(entry);
            } else {
                println!("  {} File not found: {}", red("✗"), entry.display());
            }
        }
        if files.len() < 2 {
            println!("{} Need at least 2 files to merge", red("✗"));
            return Ok(());
        }

        let name: String = Input::new()
            .with_prompt("Output file name (e.g. merged.pdf)")
            .interact_text()?;
        let output = ensure_pdf_extension(&clean_path(&name));
        if confirm_overwrite(&output)? {
            let spinner = busy(format!("Merging {} PDFs…", files.len()));
            let result = ops.merge(&files, &output);
            spinner.finish_and_clear();
            if report(result).is_some() {
                saved(&output);
            }
        }
        Ok(())
    }

    fn media(&self) -> Result<()> {
        let options: [(&str, &str); 3] = [
            ("MP4 → MP3 (extract audio)", "mp3"),
            ("WAV → MP3", "mp3"),
            ("MP4 → WAV", "wav"),
        ];
        loop {
            header("MEDIA CONVERSIONS");
            let Some(idx) = submenu(options.iter().map(|o| o.0))? else {
                return Ok(());
            };
            let input = prompt_input_file("Enter media file path")?;
            self.convert_to(&input, &input.with_extension(options[idx].1))?;
            pause()?;
        }
    }

    fn custom(&self) -> Result<()> {
        header("CUSTOM CONVERSION");
        let input = prompt_input_file("Enter input file path")?;
        println!(
            "Detected input format: {}",
            display_extension(&input).to_uppercase()
        );
        println!("\nSupported output formats:");
        for (i, fmt) in CUSTOM_TARGETS.iter().enumerate() {
            println!("  [{}] {}", i + 1, fmt.to_uppercase());
        }

        let choice: String = Input::new()
            .with_prompt("Select output format (number or name)")
            .interact_text()?;
        match parse_format_choice(&choice, &CUSTOM_TARGETS) {
            Some(ext) => self.convert_to(&input, &input.with_extension(ext))?,
            None => println!("{} Invalid format selected", red("✗")),
        }
        pause()
    }

    /// Route one conversion with a spinner, asking before overwriting.
    fn convert_to(&self, input: &Path, output: &Path) -> Result<()> {
        if !confirm_overwrite(output)? {
            return Ok(());
        }
        println!(
            "Converting {} → {}…",
            input.file_name().unwrap_or_default().to_string_lossy(),
            display_extension(output).to_uppercase()
        );
        let router = FormatRouter::new(&self.backend).with_progress(crate::ui::SpinnerProgress::new());
        if let Some(outcome) = report(router.convert(input, output)) {
            if outcome.outputs.len() == 1 {
                saved(output);
            } else {
                println!("{} {} images saved", green("✔"), outcome.outputs.len());
            }
        }
        Ok(())
    }
}

// ── Prompts ──────────────────────────────────────────────────────────────────

fn header(title: &str) {
    println!();
    println!("{}", cyan(&"=".repeat(50)));
    println!("  {}", bold(&format!("convctl  ·  {title}")));
    println!("{}", cyan(&"=".repeat(50)));
}

/// Pick from `items` plus a trailing "Back"; `None` means back.
fn submenu<'a>(items: impl Iterator<Item = &'a str>) -> Result<Option<usize>> {
    let mut labels: Vec<&str> = items.collect();
    let back = labels.len();
    labels.push("Back to main menu");
    let choice = Select::new()
        .with_prompt("Select option")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.filter(|&i| i != back))
}

fn prompt_input_file(prompt: &str) -> Result<PathBuf> {
    loop {
        let raw: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let path = clean_path(&raw);
        if path.as_os_str().is_empty() {
            println!("{} Please enter a file path.", red("✗"));
        } else if !path.exists() {
            println!("{} File not found: {}", red("✗"), path.display());
        } else {
            return Ok(path);
        }
    }
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(format!("File '{}' exists. Overwrite?", path.display()))
        .default(false)
        .interact()?)
}

fn pause() -> Result<()> {
    let _: String = Input::new()
        .with_prompt("Press Enter to continue")
        .allow_empty(true)
        .interact_text()?;
    Ok(())
}

/// Print a library error and swallow it so the loop continues.
fn report<T>(result: Result<T, ConvertError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            println!("{} {}", red("✗ Error:"), e);
            None
        }
    }
}

fn saved(path: &Path) {
    println!("{} Saved: {}", green("✔"), bold(&path.display().to_string()));
}

// ── Output naming ────────────────────────────────────────────────────────────

fn clean_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches('"').trim_matches('\''))
}

/// `dir/a.pdf` + `_compressed.pdf` → `dir/a_compressed.pdf`.
fn with_suffix(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}"))
}

fn ensure_pdf_extension(path: &Path) -> PathBuf {
    if display_extension(path) == "pdf" {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".pdf");
        PathBuf::from(name)
    }
}

/// A 1-based index into `targets`, or a format name.
fn parse_format_choice(choice: &str, targets: &[&str]) -> Option<String> {
    let choice = choice.trim();
    if choice.is_empty() {
        return None;
    }
    if let Ok(n) = choice.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| targets.get(i))
            .map(|s| s.to_string());
    }
    let ext = normalize(choice);
    (!ext.is_empty()).then_some(ext)
}
