//! Sprite document serialization across three interchangeable text backends.
//!
//! The backends share one semantic schema - a document section, zero or more
//! named track sections with ordered frame blocks, and a palette section -
//! and differ only in concrete syntax:
//!
//! - [`SpriteFormat::Toml`]: array-of-tables text (`toml` crate)
//! - [`SpriteFormat::Ini`]: nested-section key/value text, hand parsed
//! - [`SpriteFormat::Yaml`]: indented-mapping text, hand parsed
//!
//! Each writer is the left inverse of its own parser. Loading auto-detects
//! the backend by file extension, falling back to content sniffing.

mod ini;
mod toml;
mod yaml;

use crate::color::{ColorError, Rgb};
use crate::glyph::{self, GlyphError, Palette};
use crate::models::{AnimationTrack, Frame, SpriteDocument};
use crate::quantize::{quantize, ColorCounts};
use std::path::Path;
use thiserror::Error;

/// Error type for serialization and deserialization failures.
///
/// Loading never returns a partial document: on any error the previous
/// in-memory document is simply left untouched by the caller.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Malformed input that does not fit the schema.
    #[error("parse error: {0}")]
    Parse(String),
    /// A required key was absent from its section.
    #[error("missing key '{key}' in section '{section}'")]
    MissingKey { section: String, key: String },
    /// Frames of one track decoded to different dimensions.
    #[error(
        "track '{track}': frame {frame} is {found_w}x{found_h}, expected {expected_w}x{expected_h}"
    )]
    InconsistentFrameSize {
        track: String,
        frame: usize,
        expected_w: u32,
        expected_h: u32,
        found_w: u32,
        found_h: u32,
    },
    /// Neither extension nor content identified a backend.
    #[error("unrecognized sprite format")]
    UnknownFormat,
    #[error(transparent)]
    Glyph(#[from] GlyphError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Concrete serialization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteFormat {
    Toml,
    Ini,
    Yaml,
}

impl SpriteFormat {
    /// Canonical file extension for this backend.
    pub fn extension(self) -> &'static str {
        match self {
            SpriteFormat::Toml => "toml",
            SpriteFormat::Ini => "ini",
            SpriteFormat::Yaml => "yaml",
        }
    }

    /// Identify a backend from a file extension.
    pub fn from_extension(path: &Path) -> Option<SpriteFormat> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(SpriteFormat::Toml),
            "ini" => Some(SpriteFormat::Ini),
            "yaml" | "yml" => Some(SpriteFormat::Yaml),
            _ => None,
        }
    }

    /// Identify a backend from file content.
    ///
    /// A top-level `sprite:` mapping key means YAML; a quoted assignment
    /// means TOML; a bare `[section]` header means INI.
    pub fn sniff(content: &str) -> Option<SpriteFormat> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if line == "sprite:" || line.starts_with("sprite:") {
                return Some(SpriteFormat::Yaml);
            }
            if line.starts_with('[') {
                // TOML quotes its string values; INI never does.
                return if content.contains("= \"") {
                    Some(SpriteFormat::Toml)
                } else {
                    Some(SpriteFormat::Ini)
                };
            }
            return None;
        }
        None
    }

    /// Extension first, then content sniffing.
    pub fn detect(path: &Path, content: &str) -> Result<SpriteFormat, FormatError> {
        Self::from_extension(path)
            .or_else(|| Self::sniff(content))
            .ok_or(FormatError::UnknownFormat)
    }
}

/// How to handle documents whose distinct colors exceed the 64-glyph cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteMode {
    /// Fail with `TooManyColors` past the cap. Lossless.
    Strict,
    /// Reduce to the 64 most frequent colors first.
    Quantize,
}

/// Shared in-memory schema the three backends read and write.
///
/// Glyph blocks hold literal newlines here; escaping them (or not) is each
/// backend's concern.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DocumentRepr {
    pub name: String,
    pub description: String,
    /// Empty means "first track" (the load-time default).
    pub default_track: String,
    pub tracks: Vec<TrackRepr>,
    pub palette: Vec<(char, Rgb)>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrackRepr {
    pub name: String,
    /// Track-level frame interval in seconds.
    pub interval: f64,
    pub looped: bool,
    pub frames: Vec<FrameRepr>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FrameRepr {
    /// Set only when this frame's duration differs from the track interval.
    pub duration: Option<f64>,
    /// Glyph block, rows separated by literal newlines.
    pub pixels: String,
}

impl DocumentRepr {
    /// A static sprite inlines its single glyph block in the document
    /// section instead of writing a track section.
    pub fn is_static(&self) -> bool {
        self.tracks.len() == 1 && self.tracks[0].frames.len() == 1
    }
}

/// Encode every frame of a document against one shared palette.
pub(crate) fn to_repr(
    doc: &SpriteDocument,
    mode: PaletteMode,
) -> Result<DocumentRepr, FormatError> {
    let mut counts = ColorCounts::new();
    for track in doc.tracks() {
        for frame in track.frames() {
            counts.scan(&frame.buffer);
        }
    }

    // Strict mode assigns glyphs in first-seen order and fails past the cap;
    // quantized mode assigns in descending-frequency order.
    let (palette, quantization) = match mode {
        PaletteMode::Strict => {
            let colors: Vec<Rgb> = counts.entries().map(|(c, _)| c).collect();
            (Palette::from_colors(&colors)?, None)
        }
        PaletteMode::Quantize => {
            let q = quantize(&counts);
            (Palette::for_quantization(&q)?, Some(q))
        }
    };

    let mut tracks = Vec::with_capacity(doc.tracks().len());
    for track in doc.tracks() {
        let interval = track.frames()[0].duration();
        let mut frames = Vec::with_capacity(track.frame_count());
        for frame in track.frames() {
            let pixels = match &quantization {
                Some(q) => glyph::encode(&q.apply(&frame.buffer), &palette)?,
                None => glyph::encode(&frame.buffer, &palette)?,
            };
            let duration =
                if frame.duration() == interval { None } else { Some(frame.duration()) };
            frames.push(FrameRepr { duration, pixels });
        }
        tracks.push(TrackRepr { name: track.name.clone(), interval, looped: track.looped, frames });
    }

    let default_track = if doc.default_track_name() == doc.tracks()[0].name {
        String::new()
    } else {
        doc.default_track_name().to_string()
    };

    Ok(DocumentRepr {
        name: doc.name.clone(),
        description: doc.description.clone(),
        default_track,
        tracks,
        palette: palette.entries().to_vec(),
    })
}

/// Rebuild a document from the shared schema, decoding every glyph block and
/// enforcing per-track frame-size consistency.
pub(crate) fn from_repr(repr: DocumentRepr) -> Result<SpriteDocument, FormatError> {
    if repr.tracks.is_empty() {
        return Err(FormatError::Parse("document has no tracks".to_string()));
    }
    let palette = Palette::from_entries(&repr.palette)?;

    let mut tracks: Vec<AnimationTrack> = Vec::with_capacity(repr.tracks.len());
    for track_repr in &repr.tracks {
        if track_repr.frames.is_empty() {
            return Err(FormatError::Parse(format!(
                "track '{}' has no frames",
                track_repr.name
            )));
        }

        let mut expected: Option<(u32, u32)> = None;
        let mut frames: Vec<Frame> = Vec::with_capacity(track_repr.frames.len());
        for (i, frame_repr) in track_repr.frames.iter().enumerate() {
            let buffer = glyph::decode(&frame_repr.pixels, &palette)?;
            let dims = buffer.dimensions();
            match expected {
                None => expected = Some(dims),
                Some((w, h)) if dims != (w, h) => {
                    return Err(FormatError::InconsistentFrameSize {
                        track: track_repr.name.clone(),
                        frame: i,
                        expected_w: w,
                        expected_h: h,
                        found_w: dims.0,
                        found_h: dims.1,
                    });
                }
                Some(_) => {}
            }
            let duration = frame_repr.duration.unwrap_or(track_repr.interval);
            if duration < 0.0 {
                return Err(FormatError::Parse(format!(
                    "track '{}' frame {} has negative duration",
                    track_repr.name, i
                )));
            }
            frames.push(Frame::new(buffer, duration));
        }

        let mut iter = frames.into_iter();
        // Emptiness was checked above.
        let first = iter.next().ok_or_else(|| {
            FormatError::Parse(format!("track '{}' has no frames", track_repr.name))
        })?;
        let mut track = AnimationTrack::new(track_repr.name.clone(), first);
        track.looped = track_repr.looped;
        for (i, frame) in iter.enumerate() {
            track
                .insert_frame(i + 1, frame)
                .map_err(|e| FormatError::Parse(e.to_string()))?;
        }
        tracks.push(track);
    }

    let mut iter = tracks.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| FormatError::Parse("document has no tracks".to_string()))?;
    let mut doc = SpriteDocument::new(repr.name, first);
    doc.description = repr.description;
    for track in iter {
        doc.insert_track(track);
    }
    if !repr.default_track.is_empty() {
        doc.set_default_track(&repr.default_track)
            .map_err(|e| FormatError::Parse(e.to_string()))?;
    }
    Ok(doc)
}

/// Serialize a document to text in the given backend.
pub fn encode_document(
    doc: &SpriteDocument,
    format: SpriteFormat,
    mode: PaletteMode,
) -> Result<String, FormatError> {
    let repr = to_repr(doc, mode)?;
    match format {
        SpriteFormat::Toml => toml::write(&repr),
        SpriteFormat::Ini => ini::write(&repr),
        SpriteFormat::Yaml => Ok(yaml::write(&repr)),
    }
}

/// Parse text in the given backend into a document.
pub fn decode_document(text: &str, format: SpriteFormat) -> Result<SpriteDocument, FormatError> {
    let repr = match format {
        SpriteFormat::Toml => toml::parse(text)?,
        SpriteFormat::Ini => ini::parse(text)?,
        SpriteFormat::Yaml => yaml::parse(text)?,
    };
    from_repr(repr)
}

/// Load a document from a file, auto-detecting the backend.
///
/// Whole-file, synchronous: the entire file is read, then parsed in memory.
pub fn load_document(path: &Path) -> Result<SpriteDocument, FormatError> {
    let content = std::fs::read_to_string(path)?;
    let format = SpriteFormat::detect(path, &content)?;
    decode_document(&content, format)
}

/// Save a document to a file in an explicit backend.
///
/// Serialization happens fully in memory before anything touches disk, so a
/// failed encode leaves the target file untouched.
pub fn save_document(
    path: &Path,
    doc: &SpriteDocument,
    format: SpriteFormat,
    mode: PaletteMode,
) -> Result<(), FormatError> {
    let text = encode_document(doc, format, mode)?;
    std::fs::write(path, text)?;
    Ok(())
}
