//! PNG export.
//!
//! The persisted formats carry no alpha channel; on export the magenta
//! "unset" sentinel becomes a fully transparent pixel so backgrounds stay
//! empty in the rendered image.

use crate::models::PixelBuffer;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Render a pixel buffer as an RGBA image, sentinel pixels transparent.
pub fn to_image(buffer: &PixelBuffer) -> RgbaImage {
    let (w, h) = buffer.dimensions();
    let mut image = RgbaImage::new(w, h);
    for (y, row) in buffer.rows().enumerate() {
        for (x, px) in row.iter().enumerate() {
            let rgba = if px.is_sentinel() {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([px.r, px.g, px.b, 255])
            };
            image.put_pixel(x as u32, y as u32, rgba);
        }
    }
    image
}

/// Scale by an integer factor with nearest-neighbor interpolation, keeping
/// pixel edges crisp.
pub fn scale(image: RgbaImage, factor: u8) -> RgbaImage {
    if factor <= 1 {
        return image;
    }
    let (w, h) = image.dimensions();
    image::imageops::resize(&image, w * u32::from(factor), h * u32::from(factor), FilterType::Nearest)
}

/// Write a buffer to a PNG file, creating parent directories as needed.
pub fn save_png(buffer: &PixelBuffer, path: &Path, factor: u8) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    scale(to_image(buffer), factor).save(path)?;
    Ok(())
}
