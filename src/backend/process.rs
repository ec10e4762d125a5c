//! External tool discovery and blocking process execution.
//!
//! Tools are found on `PATH` with [`which`] unless the config names an
//! explicit executable. A process runs to completion with no timeout; its
//! exit status and stderr are the only feedback we get, so a non-zero exit
//! becomes [`ConvertError::ToolFailed`] carrying stderr verbatim.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// External executables convctl knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    LibreOffice,
    Pandoc,
    FFmpeg,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::LibreOffice, Tool::Pandoc, Tool::FFmpeg];

    pub fn display_name(self) -> &'static str {
        match self {
            Tool::LibreOffice => "LibreOffice",
            Tool::Pandoc => "Pandoc",
            Tool::FFmpeg => "FFmpeg",
        }
    }

    /// Executable names tried on `PATH`, first match wins.
    pub fn binaries(self) -> &'static [&'static str] {
        match self {
            Tool::LibreOffice => &["libreoffice", "soffice"],
            Tool::Pandoc => &["pandoc"],
            Tool::FFmpeg => &["ffmpeg"],
        }
    }

    /// Platform-appropriate install instructions.
    pub fn install_hint(self) -> String {
        match (self, current_platform()) {
            (Tool::LibreOffice, Platform::Linux) => {
                "Install: sudo apt install libreoffice".to_string()
            }
            (Tool::LibreOffice, Platform::MacOs) => {
                "Install: brew install --cask libreoffice".to_string()
            }
            (Tool::LibreOffice, _) => {
                "Download from: https://www.libreoffice.org/download/download/".to_string()
            }
            (Tool::Pandoc, Platform::Windows) => {
                "Install from https://pandoc.org/installing.html or: winget install pandoc"
                    .to_string()
            }
            (Tool::Pandoc, _) => "Install from https://pandoc.org".to_string(),
            (Tool::FFmpeg, Platform::Windows) => {
                "Install from https://ffmpeg.org or: winget install ffmpeg".to_string()
            }
            (Tool::FFmpeg, _) => "Install from https://ffmpeg.org".to_string(),
        }
    }

    /// Resolve the executable.
    ///
    /// An explicit path is used when it exists; otherwise we fall back to
    /// searching `PATH` for each of [`Tool::binaries`].
    pub fn locate(self, explicit: Option<&Path>) -> Result<PathBuf, ConvertError> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            warn!(
                "Configured {} path {} does not exist; searching PATH",
                self.display_name(),
                path.display()
            );
        }

        self.binaries()
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| ConvertError::MissingDependency {
                name: self.display_name().to_string(),
                hint: self.install_hint(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

pub(crate) fn current_platform() -> Platform {
    if cfg!(target_os = "linux") {
        Platform::Linux
    } else if cfg!(target_os = "macos") {
        Platform::MacOs
    } else if cfg!(target_os = "windows") {
        Platform::Windows
    } else {
        Platform::Other
    }
}

/// A builder for one blocking invocation of an external tool.
///
/// # Example
///
/// ```no_run
/// use convctl::backend::process::ToolCommand;
/// use std::path::PathBuf;
///
/// # fn example() -> Result<(), convctl::ConvertError> {
/// ToolCommand::new("FFmpeg", PathBuf::from("ffmpeg"))
///     .arg("-y")
///     .arg("-i").arg("in.wav")
///     .arg("out.mp3")
///     .run()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// `name` is the human-facing tool name used in error messages.
    pub fn new(name: impl Into<String>, program: PathBuf) -> Self {
        Self {
            name: name.into(),
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(iter.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Run to completion and return whatever the tool wrote to stderr.
    ///
    /// Stdout goes to the null device.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::ToolSpawnFailed`] if the process cannot start.
    /// - [`ConvertError::ToolFailed`] if it exits non-zero; the message is
    ///   the process's stderr.
    pub fn run(&self) -> Result<String, ConvertError> {
        debug!("Running {} {:?}", self.program.display(), self.args);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = cmd.output().map_err(|e| ConvertError::ToolSpawnFailed {
            tool: self.name.clone(),
            source: e,
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        if !output.status.success() {
            let stderr = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ConvertError::ToolFailed {
                tool: self.name.clone(),
                stderr,
            });
        }

        Ok(stderr)
    }
}

/// Move `from` to `to`, copying when they sit on different filesystems.
pub(crate) fn move_file(from: &Path, to: &Path) -> Result<(), ConvertError> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| ConvertError::OutputWriteFailed {
        path: to.to_path_buf(),
        source: e,
    })?;
    if let Err(e) = fs::remove_file(from) {
        debug!("Could not remove {} after copy: {}", from.display(), e);
    }
    Ok(())
}
