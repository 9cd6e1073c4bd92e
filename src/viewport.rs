//! Viewport addressing: a fixed-size editing window over a larger backing
//! buffer, positioned by an integer pan offset.
//!
//! The backing buffer carries a fixed oversize margin so small pans never
//! reallocate; growing past the margin is an explicit [`Viewport::grow`].
//! A pan request that would leave the valid range is rejected whole rather
//! than clamped, so a burst of deltas near a boundary cannot drift the
//! offset.

use crate::color::Rgb;
use crate::models::{BufferError, Frame, PixelBuffer};
use thiserror::Error;

/// Oversize added to each axis of the backing buffer at construction.
pub const PAN_MARGIN: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewportError {
    #[error("viewport {vw}x{vh} exceeds backing buffer {bw}x{bh}")]
    ViewportTooLarge { vw: u32, vh: u32, bw: u32, bh: u32 },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// A viewport over a backing [`PixelBuffer`].
///
/// Invariant: `pan_x <= buffer.width - viewport_width` and likewise for y,
/// so [`Viewport::extract_viewport`] is always in bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    buffer: PixelBuffer,
    viewport_width: u32,
    viewport_height: u32,
    pan_x: u32,
    pan_y: u32,
    pub(crate) dirty: bool,
}

impl Viewport {
    /// Fresh magenta-filled backing buffer sized `viewport + PAN_MARGIN` per
    /// axis.
    pub fn new(viewport_width: u32, viewport_height: u32) -> Result<Self, ViewportError> {
        let buffer = PixelBuffer::new(
            viewport_width.saturating_add(PAN_MARGIN),
            viewport_height.saturating_add(PAN_MARGIN),
        )?;
        Self::over(buffer, viewport_width, viewport_height)
    }

    /// Wrap an existing backing buffer. The viewport must fit inside it.
    pub fn over(
        buffer: PixelBuffer,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<Self, ViewportError> {
        if viewport_width == 0 || viewport_height == 0 {
            return Err(BufferError::ZeroDimension.into());
        }
        if viewport_width > buffer.width() || viewport_height > buffer.height() {
            return Err(ViewportError::ViewportTooLarge {
                vw: viewport_width,
                vh: viewport_height,
                bw: buffer.width(),
                bh: buffer.height(),
            });
        }
        Ok(Self { buffer, viewport_width, viewport_height, pan_x: 0, pan_y: 0, dirty: false })
    }

    pub fn viewport_dimensions(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    pub fn pan_offset(&self) -> (u32, u32) {
        (self.pan_x, self.pan_y)
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Propose a relative pan. A proposal that would leave
    /// `[0, buffer - viewport]` on either axis is rejected whole and returns
    /// `false` with the offset untouched.
    pub fn pan(&mut self, dx: i32, dy: i32) -> bool {
        let max_x = i64::from(self.buffer.width() - self.viewport_width);
        let max_y = i64::from(self.buffer.height() - self.viewport_height);
        let nx = i64::from(self.pan_x) + i64::from(dx);
        let ny = i64::from(self.pan_y) + i64::from(dy);
        if nx < 0 || ny < 0 || nx > max_x || ny > max_y {
            return false;
        }
        self.pan_x = nx as u32;
        self.pan_y = ny as u32;
        true
    }

    /// Force the unpanned state.
    pub fn reset(&mut self) {
        self.pan_x = 0;
        self.pan_y = 0;
    }

    pub fn is_panned(&self) -> bool {
        self.pan_x != 0 || self.pan_y != 0
    }

    /// The visible sub-rectangle of the backing buffer at the current offset.
    pub fn extract_viewport(&self) -> PixelBuffer {
        // In bounds by the pan invariant.
        self.buffer
            .sub_rect(self.pan_x, self.pan_y, self.viewport_width, self.viewport_height)
            .unwrap_or_else(|_| self.buffer.clone())
    }

    /// Frame holding only the visible region ("save what's visible").
    pub fn viewport_frame(&self, duration: f64) -> Frame {
        Frame::new(self.extract_viewport(), duration)
    }

    /// Frame holding the whole backing buffer, ignoring pan.
    pub fn full_frame(&self, duration: f64) -> Frame {
        Frame::new(self.buffer.clone(), duration)
    }

    /// Grow the backing buffer past its margin. Shrinking below what the
    /// viewport and current pan need is rejected; new area fills with the
    /// background sentinel.
    pub fn grow(&mut self, new_width: u32, new_height: u32) -> Result<(), ViewportError> {
        if new_width < self.pan_x + self.viewport_width
            || new_height < self.pan_y + self.viewport_height
        {
            return Err(ViewportError::ViewportTooLarge {
                vw: self.viewport_width,
                vh: self.viewport_height,
                bw: new_width,
                bh: new_height,
            });
        }
        self.buffer.resize(new_width, new_height)?;
        Ok(())
    }

    /// Replace the visible region's pixels, viewport-relative.
    pub fn load_viewport(&mut self, pixels: &PixelBuffer) -> Result<(), BufferError> {
        if pixels.dimensions() != (self.viewport_width, self.viewport_height) {
            return Err(BufferError::SizeMismatch {
                expected: (self.viewport_width as usize) * (self.viewport_height as usize),
                actual: (pixels.width() as usize) * (pixels.height() as usize),
            });
        }
        for (y, row) in pixels.rows().enumerate() {
            for (x, &px) in row.iter().enumerate() {
                self.buffer.set(self.pan_x + x as u32, self.pan_y + y as u32, px)?;
            }
        }
        Ok(())
    }

    pub(crate) fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.viewport_width || y >= self.viewport_height {
            return None;
        }
        self.buffer.get(self.pan_x + x, self.pan_y + y).ok()
    }

    pub(crate) fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) -> bool {
        if x >= self.viewport_width || y >= self.viewport_height {
            return false;
        }
        self.buffer.set(self.pan_x + x, self.pan_y + y, color).is_ok()
    }
}
