//! Pixel buffer and animation frame types.

use crate::color::Rgb;
use thiserror::Error;

/// Error type for pixel buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Pixel coordinate outside `[0,width) x [0,height)`.
    #[error("pixel ({x},{y}) out of bounds for {width}x{height} buffer")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    /// Pixel data length does not match `width * height`.
    #[error("expected {expected} pixels for dimensions, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    /// Width or height was zero.
    #[error("buffer dimensions must be positive")]
    ZeroDimension,
    /// `width * height` does not fit the address space.
    #[error("buffer dimensions {width}x{height} exceed addressable size")]
    Oversize { width: u32, height: u32 },
}

/// A rectangular grid of RGB pixels, row-major.
///
/// Invariant: `pixels.len() == width * height`, with both dimensions
/// positive. Every constructor enforces this, so indexing arithmetic inside
/// the codec never needs to re-check it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl PixelBuffer {
    /// Create a buffer filled with the magenta "unset" sentinel.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        Self::filled(width, height, Rgb::MAGENTA)
    }

    /// Create a buffer filled with a single color.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self, BufferError> {
        let len = Self::pixel_count(width, height)?;
        Ok(Self { width, height, pixels: vec![color; len] })
    }

    /// Create a buffer from existing row-major pixel data.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, BufferError> {
        let expected = Self::pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(BufferError::SizeMismatch { expected, actual: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    /// `width * height` in address-space arithmetic, with both dimensions
    /// positive.
    fn pixel_count(width: u32, height: u32) -> Result<usize, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::ZeroDimension);
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(BufferError::Oversize { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major pixel slice.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, BufferError> {
        if x >= self.width || y >= self.height {
            return Err(BufferError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.width as usize + x as usize)
    }

    /// Get the pixel at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgb, BufferError> {
        Ok(self.pixels[self.index(x, y)?])
    }

    /// Set the pixel at `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, color: Rgb) -> Result<(), BufferError> {
        let idx = self.index(x, y)?;
        self.pixels[idx] = color;
        Ok(())
    }

    /// One row of pixels.
    pub fn row(&self, y: u32) -> Result<&[Rgb], BufferError> {
        let start = self.index(0, y)?;
        Ok(&self.pixels[start..start + self.width as usize])
    }

    /// Iterate rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Rgb]> {
        self.pixels.chunks(self.width as usize)
    }

    /// Resize to new dimensions, copying the overlapping region and filling
    /// any new area with the magenta "unset" sentinel.
    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), BufferError> {
        let len = Self::pixel_count(new_width, new_height)?;
        let mut pixels = vec![Rgb::MAGENTA; len];
        let copy_w = self.width.min(new_width) as usize;
        for y in 0..self.height.min(new_height) {
            let src = y as usize * self.width as usize;
            let dst = y as usize * new_width as usize;
            pixels[dst..dst + copy_w].copy_from_slice(&self.pixels[src..src + copy_w]);
        }
        self.width = new_width;
        self.height = new_height;
        self.pixels = pixels;
        Ok(())
    }

    /// Copy a sub-rectangle starting at `(x, y)` into a new buffer.
    ///
    /// Fails with `OutOfBounds` when the rectangle does not fit.
    pub fn sub_rect(&self, x: u32, y: u32, w: u32, h: u32) -> Result<PixelBuffer, BufferError> {
        if w == 0 || h == 0 {
            return Err(BufferError::ZeroDimension);
        }
        // Widened so adversarial corner coordinates cannot wrap.
        if u64::from(x) + u64::from(w) > u64::from(self.width)
            || u64::from(y) + u64::from(h) > u64::from(self.height)
        {
            return Err(BufferError::OutOfBounds {
                x: x.saturating_add(w - 1),
                y: y.saturating_add(h - 1),
                width: self.width,
                height: self.height,
            });
        }
        let mut pixels = Vec::with_capacity(w as usize * h as usize);
        for row in y..y + h {
            let start = row as usize * self.width as usize + x as usize;
            pixels.extend_from_slice(&self.pixels[start..start + w as usize]);
        }
        PixelBuffer::from_pixels(w, h, pixels)
    }

    /// Distinct colors in first-seen scan order (row-major).
    pub fn distinct_colors(&self) -> Vec<Rgb> {
        let mut seen = std::collections::HashSet::new();
        let mut colors = Vec::new();
        for &px in &self.pixels {
            if seen.insert(px) {
                colors.push(px);
            }
        }
        colors
    }
}

/// One animation frame: a pixel buffer plus a display duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub buffer: PixelBuffer,
    duration: f64,
}

impl Frame {
    /// Default frame duration in seconds.
    pub const DEFAULT_DURATION: f64 = 0.1;

    /// Create a frame. Negative durations are clamped to zero.
    pub fn new(buffer: PixelBuffer, duration: f64) -> Self {
        Self { buffer, duration: duration.max(0.0) }
    }

    /// Display duration in seconds, always `>= 0`.
    pub fn duration(&self) -> f64 {
        self.duration
    }
}
