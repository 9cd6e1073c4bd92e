//! Data models for sprite documents (pixel buffers, frames, tracks).

mod buffer;
mod document;

pub use buffer::{BufferError, Frame, PixelBuffer};
pub use document::{AnimationTrack, SpriteDocument, TrackError};
