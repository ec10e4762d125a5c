//! Audio/video transcoding through FFmpeg.

use super::process::{Tool, ToolCommand};
use crate::config::ConvertConfig;
use crate::error::ConvertError;
use std::path::Path;
use tracing::{debug, info};

/// Transcode `input` to `output`; FFmpeg picks codecs from the extension.
///
/// `-y` overwrites an existing output: confirming that is the caller's job.
pub fn transcode(config: &ConvertConfig, input: &Path, output: &Path) -> Result<(), ConvertError> {
    let ffmpeg = Tool::FFmpeg.locate(config.tools.ffmpeg.as_deref())?;

    if !input.exists() {
        return Err(ConvertError::FileNotFound {
            path: input.to_path_buf(),
        });
    }

    info!("FFmpeg: {} → {}", input.display(), output.display());
    let log = ToolCommand::new("FFmpeg", ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg(output)
        .run()?;
    if let Some(summary) = log.lines().last() {
        debug!("FFmpeg: {}", summary);
    }
    Ok(())
}
