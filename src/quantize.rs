//! Frequency-based color quantization.
//!
//! Reduces an unbounded color set to the 64-color palette bound. Unlike a
//! median-cut quantizer, the kept colors are always colors that actually
//! occur in the input: the 64 most frequent survive verbatim and every other
//! color maps to its nearest kept color.

use crate::color::Rgb;
use crate::glyph::MAX_COLORS;
use crate::models::PixelBuffer;
use std::collections::HashMap;

/// A color multiset gathered by scanning one or more pixel buffers.
///
/// Remembers first-seen order so that equal-frequency colors have a stable,
/// reproducible rank.
#[derive(Debug, Clone, Default)]
pub struct ColorCounts {
    order: Vec<Rgb>,
    counts: HashMap<Rgb, u64>,
}

impl ColorCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally every pixel of a buffer.
    pub fn scan(&mut self, buffer: &PixelBuffer) {
        for &px in buffer.pixels() {
            self.add(px, 1);
        }
    }

    pub fn add(&mut self, color: Rgb, count: u64) {
        match self.counts.get_mut(&color) {
            Some(n) => *n += count,
            None => {
                self.order.push(color);
                self.counts.insert(color, count);
            }
        }
    }

    /// Number of distinct colors seen.
    pub fn distinct(&self) -> usize {
        self.order.len()
    }

    /// `(color, count)` pairs in first-seen order.
    pub fn entries(&self) -> impl Iterator<Item = (Rgb, u64)> + '_ {
        self.order.iter().map(|c| (*c, self.counts[c]))
    }
}

/// Result of quantizing a color multiset: a bounded palette plus a total
/// mapping from every original color to its assigned palette color.
#[derive(Debug, Clone)]
pub struct Quantization {
    palette: Vec<Rgb>,
    mapping: HashMap<Rgb, Rgb>,
    lossless: bool,
}

impl Quantization {
    /// Palette colors. First-seen order when lossless, descending-frequency
    /// order when reduced. Always `<= 64` entries.
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Whether no color was remapped (input had `<= 64` distinct colors).
    pub fn is_lossless(&self) -> bool {
        self.lossless
    }

    /// The palette color assigned to an input color. Colors never seen
    /// during counting pass through unchanged.
    pub fn map(&self, color: Rgb) -> Rgb {
        self.mapping.get(&color).copied().unwrap_or(color)
    }

    /// Rewrite a buffer through the mapping.
    pub fn apply(&self, buffer: &PixelBuffer) -> PixelBuffer {
        let pixels = buffer.pixels().iter().map(|&px| self.map(px)).collect();
        // Same dimensions, same length: reconstruction cannot fail.
        PixelBuffer::from_pixels(buffer.width(), buffer.height(), pixels)
            .unwrap_or_else(|_| buffer.clone())
    }
}

/// Quantize a color multiset down to at most 64 colors.
///
/// With `<= 64` distinct colors the result is the identity: the palette is
/// exactly the input set in first-seen order. Beyond that, the 64 most
/// frequent colors are kept verbatim (count ties broken by first-seen order)
/// and every remaining color maps to its nearest kept color by squared RGB
/// distance; distance ties go to the kept color with the higher original
/// frequency, then the lower palette index. The order is total, so identical
/// input always produces identical output.
pub fn quantize(counts: &ColorCounts) -> Quantization {
    let entries: Vec<(Rgb, u64)> = counts.entries().collect();

    if entries.len() <= MAX_COLORS {
        let palette: Vec<Rgb> = entries.iter().map(|(c, _)| *c).collect();
        let mapping = palette.iter().map(|&c| (c, c)).collect();
        return Quantization { palette, mapping, lossless: true };
    }

    // Stable sort keeps first-seen order among equal counts.
    let mut ranked = entries;
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let kept: Vec<Rgb> = ranked[..MAX_COLORS].iter().map(|(c, _)| *c).collect();
    let mut mapping: HashMap<Rgb, Rgb> = kept.iter().map(|&c| (c, c)).collect();

    for &(color, _) in &ranked[MAX_COLORS..] {
        mapping.insert(color, nearest_kept(color, &kept));
    }

    Quantization { palette: kept, mapping, lossless: false }
}

/// Scan the frequency-ordered palette and keep the first strictly-smaller
/// distance. Because the palette is sorted by descending frequency, a
/// distance tie resolves to the higher-frequency color, and a further tie to
/// the lower index, in a single pass.
fn nearest_kept(color: Rgb, kept: &[Rgb]) -> Rgb {
    let mut best = kept[0];
    let mut best_dist = color.distance_sq(best);
    for &candidate in &kept[1..] {
        let dist = color.distance_sq(candidate);
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}
