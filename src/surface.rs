//! The pixel-access contract an editing widget programs against.
//!
//! Unlike the strict [`PixelBuffer`] API, writes through this boundary are
//! lenient: an out-of-bounds coordinate or a wrong-length bulk write is
//! ignored rather than surfaced, which is the editor policy for stray brush
//! strokes at the canvas edge.

use crate::color::Rgb;
use crate::models::PixelBuffer;
use crate::viewport::Viewport;

/// The minimal surface any pixel-editing widget needs, independent of
/// whether it backs a static image or one frame of an animation.
pub trait PixelAccess {
    fn dimensions(&self) -> (u32, u32);

    /// Row-major copy of the editable region.
    fn pixel_data(&self) -> Vec<Rgb>;

    /// Replace the editable region wholesale. Ignored unless `pixels` is
    /// exactly `width * height` long.
    fn set_pixel_data(&mut self, pixels: &[Rgb]);

    fn pixel_at(&self, x: u32, y: u32) -> Option<Rgb>;

    /// Write one pixel; out-of-bounds coordinates are ignored.
    fn set_pixel_at(&mut self, x: u32, y: u32, color: Rgb);

    fn mark_dirty(&mut self);

    /// Report and clear the dirty flag.
    fn take_dirty(&mut self) -> bool;
}

/// A plain buffer plus a dirty flag, for surfaces with no pan addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSurface {
    buffer: PixelBuffer,
    dirty: bool,
}

impl EditSurface {
    pub fn new(buffer: PixelBuffer) -> Self {
        Self { buffer, dirty: false }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

impl PixelAccess for EditSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn pixel_data(&self) -> Vec<Rgb> {
        self.buffer.pixels().to_vec()
    }

    fn set_pixel_data(&mut self, pixels: &[Rgb]) {
        let (w, h) = self.buffer.dimensions();
        if pixels.len() != (w as usize) * (h as usize) {
            return;
        }
        if let Ok(next) = PixelBuffer::from_pixels(w, h, pixels.to_vec()) {
            self.buffer = next;
            self.dirty = true;
        }
    }

    fn pixel_at(&self, x: u32, y: u32) -> Option<Rgb> {
        self.buffer.get(x, y).ok()
    }

    fn set_pixel_at(&mut self, x: u32, y: u32, color: Rgb) {
        if self.buffer.set(x, y, color).is_ok() {
            self.dirty = true;
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// A panned viewport presents its visible region as the editable surface;
/// coordinates are viewport-relative and route through the pan offset.
impl PixelAccess for Viewport {
    fn dimensions(&self) -> (u32, u32) {
        self.viewport_dimensions()
    }

    fn pixel_data(&self) -> Vec<Rgb> {
        self.extract_viewport().pixels().to_vec()
    }

    fn set_pixel_data(&mut self, pixels: &[Rgb]) {
        let (w, h) = self.viewport_dimensions();
        if pixels.len() != (w as usize) * (h as usize) {
            return;
        }
        let Ok(patch) = PixelBuffer::from_pixels(w, h, pixels.to_vec()) else {
            return;
        };
        if self.load_viewport(&patch).is_ok() {
            self.dirty = true;
        }
    }

    fn pixel_at(&self, x: u32, y: u32) -> Option<Rgb> {
        self.pixel(x, y)
    }

    fn set_pixel_at(&mut self, x: u32, y: u32, color: Rgb) {
        if self.set_pixel(x, y, color) {
            self.dirty = true;
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
