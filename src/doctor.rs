//! Dependency diagnostics and install instructions.
//!
//! [`diagnose`] probes each external tool on `PATH` (or at its configured
//! override) and tries to bind pdfium. Nothing is installed or modified; the
//! report says what is missing and how to get it.

use crate::backend::pdfium::{bind_pdfium, pdfium_install_hint};
use crate::backend::process::{current_platform, Platform, Tool};
use crate::config::ConvertConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Status of one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyStatus {
    pub name: String,
    pub found: bool,
    /// Resolved executable; `None` for libraries and for missing tools.
    pub path: Option<PathBuf>,
    /// What the dependency enables.
    pub used_for: String,
    /// Install instructions, present only when missing.
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    pub os: String,
    pub family: String,
    pub arch: String,
    pub convctl_version: String,
}

impl PlatformInfo {
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            family: std::env::consts::FAMILY.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            convctl_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorReport {
    pub dependencies: Vec<DependencyStatus>,
    pub platform: PlatformInfo,
}

impl DoctorReport {
    pub fn all_found(&self) -> bool {
        self.dependencies.iter().all(|d| d.found)
    }

    pub fn missing(&self) -> impl Iterator<Item = &DependencyStatus> {
        self.dependencies.iter().filter(|d| !d.found)
    }
}

fn used_for(tool: Tool) -> &'static str {
    match tool {
        Tool::LibreOffice => "DOCX/DOC → PDF, PDF → DOCX",
        Tool::Pandoc => "Markdown → PDF",
        Tool::FFmpeg => "MP4/WAV → MP3, MP4 → WAV",
    }
}

/// Probe every external dependency.
pub fn diagnose(config: &ConvertConfig) -> DoctorReport {
    let mut dependencies: Vec<DependencyStatus> = Tool::ALL
        .iter()
        .map(|&tool| {
            let explicit = match tool {
                Tool::LibreOffice => config.tools.libreoffice.as_deref(),
                Tool::Pandoc => config.tools.pandoc.as_deref(),
                Tool::FFmpeg => config.tools.ffmpeg.as_deref(),
            };
            let located = tool.locate(explicit);
            debug!("{}: {:?}", tool.display_name(), located);
            DependencyStatus {
                name: tool.display_name().to_string(),
                found: located.is_ok(),
                hint: located.is_err().then(|| tool.install_hint()),
                path: located.ok(),
                used_for: used_for(tool).to_string(),
            }
        })
        .collect();

    let pdfium = bind_pdfium(config);
    dependencies.push(DependencyStatus {
        name: "PDFium".to_string(),
        found: pdfium.is_ok(),
        path: None,
        used_for: "TXT/image → PDF, PDF → images, merge, split, watermark".to_string(),
        hint: pdfium.err().map(|_| pdfium_install_hint()),
    });

    DoctorReport {
        dependencies,
        platform: PlatformInfo::current(),
    }
}

/// Commands that install every external dependency on this platform.
pub fn install_instructions() -> String {
    let tools = match current_platform() {
        Platform::Linux => "\
# Ubuntu/Debian:
sudo apt update
sudo apt install -y ffmpeg libreoffice pandoc texlive-xetex

# Fedora:
sudo dnf install -y ffmpeg libreoffice pandoc texlive-xetex

# Arch:
sudo pacman -S ffmpeg libreoffice-fresh pandoc texlive-xetex",
        Platform::MacOs => "\
brew install ffmpeg pandoc
brew install --cask libreoffice mactex-no-gui",
        Platform::Windows => "\
winget install ffmpeg
winget install pandoc
winget install TheDocumentFoundation.LibreOffice
winget install MiKTeX.MiKTeX",
        Platform::Other => "\
FFmpeg:      https://ffmpeg.org/download.html
LibreOffice: https://www.libreoffice.org/download/download/
Pandoc:      https://pandoc.org/installing.html",
    };
    format!("{tools}\n\n# PDFium:\n{}", pdfium_install_hint())
}
