//! Raster image handling through the `image` crate.
//!
//! JPEG has no alpha channel, so transparent sources are composited onto a
//! white background before encoding; every other target keeps the pixels
//! exactly as decoded.

use crate::error::ConvertError;
use crate::format::format_of;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use std::path::Path;
use tracing::debug;

/// Decode an image, sniffing the format from its content.
pub fn open_image(path: &Path) -> Result<DynamicImage, ConvertError> {
    let reader = ImageReader::open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Image {
                path: path.to_path_buf(),
                detail: e.to_string(),
            },
        })?
        .with_guessed_format()
        .map_err(|e| image_error(path, e))?;

    let img = reader.decode().map_err(|e| image_error(path, e))?;
    debug!(
        "Decoded {} → {}x{} {:?}",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );
    Ok(img)
}

/// Re-encode `input` in the format implied by `output`'s extension.
pub fn convert_image(input: &Path, output: &Path) -> Result<(), ConvertError> {
    let target = format_of(output);
    let format = ImageFormat::from_extension(&target).ok_or_else(|| ConvertError::Image {
        path: output.to_path_buf(),
        detail: format!("no encoder for '{target}'"),
    })?;
    let img = open_image(input)?;

    let img = if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(flatten_onto_white(&img))
    } else {
        img
    };

    img.save_with_format(output, format)
        .map_err(|e| image_error(output, e))
}

/// Composite any alpha channel onto opaque white.
///
/// Fully opaque images come back unchanged apart from dropping the channel.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn image_error(path: &Path, e: impl std::fmt::Display) -> ConvertError {
    ConvertError::Image {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}
