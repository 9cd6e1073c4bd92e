//! Glyph codec: pixel grids as lines of characters.
//!
//! Each distinct color is assigned one character from a fixed 64-symbol
//! alphabet; a pixel buffer renders as one glyph per pixel, rows joined by
//! newline. Assignment is deterministic and order-stable: glyphs are consumed
//! from the alphabet in a single pass, in first-seen color order (or
//! descending-frequency order for quantized palettes).

use crate::color::Rgb;
use crate::models::PixelBuffer;
use crate::quantize::Quantization;
use std::collections::HashMap;
use thiserror::Error;

/// The fixed ordered glyph alphabet: `A-Z a-z 0-9 . @`, 64 symbols.
pub const GLYPH_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.@";

/// Hard cap on palette size. The single bounded-resource invariant of the
/// codec: it is never silently violated.
pub const MAX_COLORS: usize = 64;

/// Error type for glyph encoding/decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlyphError {
    /// More distinct colors than the 64-glyph alphabet can represent.
    #[error("{0} distinct colors exceed the {MAX_COLORS}-color palette cap")]
    TooManyColors(usize),
    /// A glyph block row differs in length from the first row.
    #[error("row {row} has {actual} glyphs, expected {expected}")]
    RowWidthMismatch { row: usize, expected: usize, actual: usize },
    /// A glyph in the block has no palette entry.
    #[error("unknown glyph '{0}'")]
    UnknownGlyph(char),
    /// A pixel color has no glyph assignment (encode-side contract breach).
    #[error("color {0} is not in the palette")]
    UnmappedColor(Rgb),
    /// A glyph block with no rows cannot form a buffer.
    #[error("empty glyph block")]
    EmptyGrid,
}

/// A bounded glyph -> color table, insertion ordered.
///
/// Built either from a buffer's own distinct-color set, from a
/// [`Quantization`], or from a parsed palette section of a sprite file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<(char, Rgb)>,
    by_color: HashMap<Rgb, char>,
    by_glyph: HashMap<char, Rgb>,
}

impl Palette {
    /// Assign glyphs to colors in the given order, consuming the alphabet in
    /// a single pass.
    pub fn from_colors(colors: &[Rgb]) -> Result<Self, GlyphError> {
        if colors.len() > MAX_COLORS {
            return Err(GlyphError::TooManyColors(colors.len()));
        }
        let mut palette = Palette::default();
        for (&color, glyph) in colors.iter().zip(GLYPH_ALPHABET.chars()) {
            palette.push(glyph, color);
        }
        Ok(palette)
    }

    /// Palette over a buffer's distinct colors in first-seen order.
    pub fn for_buffer(buffer: &PixelBuffer) -> Result<Self, GlyphError> {
        Self::from_colors(&buffer.distinct_colors())
    }

    /// Palette over a quantization result, in its frequency order.
    pub fn for_quantization(quantization: &Quantization) -> Result<Self, GlyphError> {
        Self::from_colors(quantization.palette())
    }

    /// Rebuild a palette from parsed `(glyph, color)` pairs. Glyph characters
    /// come from the file verbatim; a later duplicate glyph replaces the
    /// earlier entry.
    pub fn from_entries(entries: &[(char, Rgb)]) -> Result<Self, GlyphError> {
        if entries.len() > MAX_COLORS {
            return Err(GlyphError::TooManyColors(entries.len()));
        }
        let mut palette = Palette::default();
        for &(glyph, color) in entries {
            palette.push(glyph, color);
        }
        Ok(palette)
    }

    fn push(&mut self, glyph: char, color: Rgb) {
        if let Some(old) = self.by_glyph.insert(glyph, color) {
            self.by_color.remove(&old);
            self.entries.retain(|(g, _)| *g != glyph);
        }
        self.by_color.insert(color, glyph);
        self.entries.push((glyph, color));
    }

    pub fn glyph_for(&self, color: Rgb) -> Option<char> {
        self.by_color.get(&color).copied()
    }

    pub fn color_for(&self, glyph: char) -> Option<Rgb> {
        self.by_glyph.get(&glyph).copied()
    }

    /// `(glyph, color)` pairs in assignment order.
    pub fn entries(&self) -> &[(char, Rgb)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render a pixel buffer as glyph rows joined by `\n`.
///
/// Every pixel color must have a palette entry; encoding never substitutes
/// a fallback glyph.
pub fn encode(buffer: &PixelBuffer, palette: &Palette) -> Result<String, GlyphError> {
    let (w, h) = buffer.dimensions();
    let mut text = String::with_capacity((w as usize + 1) * h as usize);
    for (i, row) in buffer.rows().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        for &px in row {
            text.push(palette.glyph_for(px).ok_or(GlyphError::UnmappedColor(px))?);
        }
    }
    Ok(text)
}

/// Encode a buffer against its own distinct-color set.
///
/// Fails with `TooManyColors` past the 64-color cap; callers wanting a
/// bounded palette for arbitrary input quantize first.
pub fn encode_buffer(buffer: &PixelBuffer) -> Result<(String, Palette), GlyphError> {
    let palette = Palette::for_buffer(buffer)?;
    let text = encode(buffer, &palette)?;
    Ok((text, palette))
}

/// Reconstruct a pixel buffer from glyph rows and a palette table.
///
/// The block must be rectangular; width is the first row's length, height the
/// row count.
pub fn decode(text: &str, palette: &Palette) -> Result<PixelBuffer, GlyphError> {
    let rows: Vec<&str> = text.lines().collect();
    if rows.is_empty() || rows[0].is_empty() {
        return Err(GlyphError::EmptyGrid);
    }
    let width = rows[0].chars().count();

    let mut pixels = Vec::with_capacity(width * rows.len());
    for (i, row) in rows.iter().enumerate() {
        let row_len = row.chars().count();
        if row_len != width {
            return Err(GlyphError::RowWidthMismatch {
                row: i,
                expected: width,
                actual: row_len,
            });
        }
        for glyph in row.chars() {
            pixels.push(palette.color_for(glyph).ok_or(GlyphError::UnknownGlyph(glyph))?);
        }
    }

    // Rectangularity was just checked, so construction cannot fail.
    PixelBuffer::from_pixels(width as u32, rows.len() as u32, pixels)
        .map_err(|_| GlyphError::EmptyGrid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::{quantize, ColorCounts};

    #[test]
    fn test_alphabet_is_64_unique_symbols() {
        assert_eq!(GLYPH_ALPHABET.chars().count(), 64);
        let set: std::collections::HashSet<char> = GLYPH_ALPHABET.chars().collect();
        assert_eq!(set.len(), 64);
    }

    #[test]
    fn test_encode_first_seen_order() {
        let buf = PixelBuffer::from_pixels(
            2,
            2,
            vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255)],
        )
        .unwrap();
        let (text, palette) = encode_buffer(&buf).unwrap();
        assert_eq!(text, "AB\nBC");
        assert_eq!(palette.glyph_for(Rgb::new(255, 0, 0)), Some('A'));
        assert_eq!(palette.glyph_for(Rgb::new(0, 0, 255)), Some('C'));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let buf = PixelBuffer::from_pixels(
            2,
            2,
            vec![Rgb::new(255, 0, 0), Rgb::new(0, 255, 0), Rgb::new(0, 0, 255), Rgb::MAGENTA],
        )
        .unwrap();
        let (text, palette) = encode_buffer(&buf).unwrap();
        let decoded = decode(&text, &palette).unwrap();
        assert_eq!(decoded, buf);
    }

    #[test]
    fn test_encode_deterministic() {
        let buf = PixelBuffer::from_pixels(
            3,
            1,
            vec![Rgb::new(9, 9, 9), Rgb::new(1, 1, 1), Rgb::new(9, 9, 9)],
        )
        .unwrap();
        let (a, _) = encode_buffer(&buf).unwrap();
        let (b, _) = encode_buffer(&buf).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_too_many_colors_without_quantization() {
        let pixels: Vec<Rgb> = (0..100u8).map(|i| Rgb::new(i, 0, 0)).collect();
        let buf = PixelBuffer::from_pixels(10, 10, pixels).unwrap();
        assert_eq!(encode_buffer(&buf).unwrap_err(), GlyphError::TooManyColors(100));
    }

    #[test]
    fn test_quantized_encode_of_100_colors() {
        let pixels: Vec<Rgb> = (0..100u8).map(|i| Rgb::new(i, 0, 0)).collect();
        let buf = PixelBuffer::from_pixels(10, 10, pixels).unwrap();

        let mut counts = ColorCounts::new();
        counts.scan(&buf);
        let q = quantize(&counts);
        let palette = Palette::for_quantization(&q).unwrap();
        let text = encode(&q.apply(&buf), &palette).unwrap();

        assert!(palette.len() <= MAX_COLORS);
        assert!(decode(&text, &palette).is_ok());
    }

    #[test]
    fn test_decode_ragged_rows_rejected() {
        let palette = Palette::from_colors(&[Rgb::MAGENTA]).unwrap();
        let text = "AAAAAAAA\nAAAAAAAA\nAAAAAAA";
        assert_eq!(
            decode(text, &palette).unwrap_err(),
            GlyphError::RowWidthMismatch { row: 2, expected: 8, actual: 7 }
        );
    }

    #[test]
    fn test_decode_unknown_glyph() {
        let palette = Palette::from_colors(&[Rgb::MAGENTA]).unwrap();
        assert_eq!(decode("A?", &palette).unwrap_err(), GlyphError::UnknownGlyph('?'));
    }

    #[test]
    fn test_decode_empty_rejected() {
        let palette = Palette::from_colors(&[Rgb::MAGENTA]).unwrap();
        assert_eq!(decode("", &palette).unwrap_err(), GlyphError::EmptyGrid);
    }

    #[test]
    fn test_palette_uses_tail_symbols() {
        let colors: Vec<Rgb> = (0..64u8).map(|i| Rgb::new(i, 0, 0)).collect();
        let palette = Palette::from_colors(&colors).unwrap();
        assert_eq!(palette.glyph_for(Rgb::new(62, 0, 0)), Some('.'));
        assert_eq!(palette.glyph_for(Rgb::new(63, 0, 0)), Some('@'));
    }

    #[test]
    fn test_sentinel_roundtrips() {
        let buf = PixelBuffer::new(2, 1).unwrap();
        let (text, palette) = encode_buffer(&buf).unwrap();
        assert_eq!(text, "AA");
        assert_eq!(decode(&text, &palette).unwrap().pixels()[0], Rgb::MAGENTA);
    }
}
