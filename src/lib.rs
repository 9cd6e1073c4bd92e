//! glyphbuf - Sprite codec and pixel-buffer addressing
//!
//! This library provides functionality to:
//! - Turn RGB pixel grids into bounded-alphabet glyph text and back
//! - Quantize arbitrary color sets down to a 64-color palette
//! - Serialize sprite documents across TOML, INI, and YAML backends
//! - Address a fixed editing viewport over a larger backing buffer

pub mod color;
pub mod export;
pub mod formats;
pub mod glyph;
pub mod models;
pub mod quantize;
pub mod surface;
pub mod viewport;

pub use color::Rgb;
pub use formats::{
    decode_document, encode_document, load_document, save_document, FormatError, PaletteMode,
    SpriteFormat,
};
pub use glyph::{GlyphError, Palette, GLYPH_ALPHABET, MAX_COLORS};
pub use models::{AnimationTrack, Frame, PixelBuffer, SpriteDocument};
pub use quantize::{quantize, ColorCounts, Quantization};
pub use surface::{EditSurface, PixelAccess};
pub use viewport::{Viewport, PAN_MARGIN};
