//! INI backend: nested-section key/value syntax.
//!
//! ```ini
//! [sprite]
//! name = hero
//!
//! [track.idle]
//! interval = 0.1
//! loop = true
//!
//! [track.idle.frame.0]
//! pixels = AB\nBA
//!
//! [palette.A]
//! red = 255
//! green = 0
//! blue = 255
//! ```
//!
//! Values are unquoted; newlines inside glyph blocks are stored as `\n`
//! escapes, and leading/trailing spaces in metadata values as `\s` escapes.
//! The reader runs a normalization pass over pixel values that
//! collapses doubled escape artifacts (`\\n`) left behind by a historical
//! writer back to single escapes before unescaping, so legacy files load as
//! literal newlines rather than stray backslashes.

use super::{DocumentRepr, FormatError, FrameRepr, TrackRepr};
use crate::color::{parse_hex, Rgb};
use crate::models::Frame;

/// Escape a value for a single-line `key = value` slot.
///
/// Leading and trailing spaces become `\s` so they survive the whitespace
/// trim the reader applies to raw line content.
fn escape_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let last = s.chars().count().saturating_sub(1);
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            _ => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape_value`].
fn unescape_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Normalization pass for glyph-block values: collapse doubled escape
/// artifacts until stable, then unescape. Glyph rows never contain a
/// backslash of their own, so every backslash here is escape machinery.
fn normalize_pixels(raw: &str) -> String {
    let mut s = raw.to_string();
    while s.contains("\\\\n") {
        s = s.replace("\\\\n", "\\n");
    }
    unescape_value(&s)
}

/// A track name interpolated into a `[track.<name>]` header must not be able
/// to break the header syntax or collide with the frame sub-section marker.
fn check_header_name(name: &str) -> Result<(), FormatError> {
    if name.is_empty() || name.contains(['[', ']', '\n']) || name.contains(".frame.") {
        return Err(FormatError::Parse(format!(
            "track name '{}' cannot be used in a section header",
            name.escape_default()
        )));
    }
    Ok(())
}

pub(crate) fn write(repr: &DocumentRepr) -> Result<String, FormatError> {
    let mut out = String::new();

    out.push_str("[sprite]\n");
    push_kv(&mut out, "name", &repr.name);
    if !repr.description.is_empty() {
        push_kv(&mut out, "description", &repr.description);
    }
    if !repr.default_track.is_empty() {
        push_kv(&mut out, "default_track", &repr.default_track);
    }

    if repr.is_static() {
        let track = &repr.tracks[0];
        push_kv(&mut out, "track", &track.name);
        push_kv(&mut out, "interval", &format_f64(track.interval));
        push_kv(&mut out, "loop", if track.looped { "true" } else { "false" });
        push_kv(&mut out, "pixels", &track.frames[0].pixels);
    } else {
        for track in &repr.tracks {
            check_header_name(&track.name)?;
            out.push('\n');
            out.push_str(&format!("[track.{}]\n", track.name));
            push_kv(&mut out, "interval", &format_f64(track.interval));
            push_kv(&mut out, "loop", if track.looped { "true" } else { "false" });
            for (i, frame) in track.frames.iter().enumerate() {
                out.push('\n');
                out.push_str(&format!("[track.{}.frame.{}]\n", track.name, i));
                if let Some(duration) = frame.duration {
                    push_kv(&mut out, "duration", &format_f64(duration));
                }
                push_kv(&mut out, "pixels", &frame.pixels);
            }
        }
    }

    for &(glyph, color) in &repr.palette {
        out.push('\n');
        out.push_str(&format!("[palette.{glyph}]\n"));
        push_kv(&mut out, "red", &color.r.to_string());
        push_kv(&mut out, "green", &color.g.to_string());
        push_kv(&mut out, "blue", &color.b.to_string());
    }

    Ok(out)
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(" = ");
    out.push_str(&escape_value(value));
    out.push('\n');
}

fn format_f64(v: f64) -> String {
    format!("{v}")
}

/// A parsed `[header]` section with its raw key/value pairs in file order.
struct Section {
    header: String,
    pairs: Vec<(String, String)>,
    line: usize,
}

impl Section {
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn require(&self, key: &str) -> Result<&str, FormatError> {
        self.get(key).ok_or_else(|| FormatError::MissingKey {
            section: self.header.clone(),
            key: key.to_string(),
        })
    }

    fn parse_f64(&self, key: &str) -> Result<Option<f64>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
                FormatError::Parse(format!(
                    "section [{}] key '{}': invalid number '{}'",
                    self.header, key, raw
                ))
            }),
        }
    }

    fn parse_bool(&self, key: &str) -> Result<Option<bool>, FormatError> {
        match self.get(key) {
            None => Ok(None),
            Some("true") => Ok(Some(true)),
            Some("false") => Ok(Some(false)),
            Some(raw) => Err(FormatError::Parse(format!(
                "section [{}] key '{}': invalid bool '{}'",
                self.header, key, raw
            ))),
        }
    }
}

/// Split raw text into sections. Comments (`;` or `#`) and blank lines are
/// skipped; keys before the first header are an error.
fn split_sections(text: &str) -> Result<Vec<Section>, FormatError> {
    let mut sections: Vec<Section> = Vec::new();
    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.push(Section { header: header.to_string(), pairs: Vec::new(), line: i + 1 });
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(FormatError::Parse(format!("line {}: expected 'key = value'", i + 1)));
        };
        let Some(section) = sections.last_mut() else {
            return Err(FormatError::Parse(format!("line {}: key outside any section", i + 1)));
        };
        section.pairs.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(sections)
}

pub(crate) fn parse(text: &str) -> Result<DocumentRepr, FormatError> {
    let sections = split_sections(text)?;

    let mut repr = DocumentRepr {
        name: String::new(),
        description: String::new(),
        default_track: String::new(),
        tracks: Vec::new(),
        palette: Vec::new(),
    };
    // Per-track frames carry their declared index until all sections are
    // seen, then sort.
    let mut frame_order: Vec<Vec<usize>> = Vec::new();
    let mut saw_sprite = false;

    for section in &sections {
        if section.header == "sprite" {
            saw_sprite = true;
            repr.name = unescape_value(section.require("name")?);
            repr.description = section.get("description").map(unescape_value).unwrap_or_default();
            repr.default_track =
                section.get("default_track").map(unescape_value).unwrap_or_default();
            if let Some(raw_pixels) = section.get("pixels") {
                let name = section
                    .get("track")
                    .map(unescape_value)
                    .unwrap_or_else(|| "default".to_string());
                repr.tracks.push(TrackRepr {
                    name,
                    interval: section.parse_f64("interval")?.unwrap_or(Frame::DEFAULT_DURATION),
                    looped: section.parse_bool("loop")?.unwrap_or(true),
                    frames: vec![FrameRepr { duration: None, pixels: normalize_pixels(raw_pixels) }],
                });
                frame_order.push(vec![0]);
            }
        } else if let Some(rest) = section.header.strip_prefix("track.") {
            if let Some((track_name, index_str)) = rest.split_once(".frame.") {
                let index: usize = index_str.parse().map_err(|_| {
                    FormatError::Parse(format!(
                        "line {}: invalid frame index '{}'",
                        section.line, index_str
                    ))
                })?;
                let pos = track_position(&mut repr, &mut frame_order, track_name);
                repr.tracks[pos].frames.push(FrameRepr {
                    duration: section.parse_f64("duration")?,
                    pixels: normalize_pixels(section.require("pixels")?),
                });
                frame_order[pos].push(index);
            } else {
                let pos = track_position(&mut repr, &mut frame_order, rest);
                if let Some(interval) = section.parse_f64("interval")? {
                    repr.tracks[pos].interval = interval;
                }
                if let Some(looped) = section.parse_bool("loop")? {
                    repr.tracks[pos].looped = looped;
                }
            }
        } else if let Some(glyph_str) = section.header.strip_prefix("palette.") {
            let mut chars = glyph_str.chars();
            let (Some(glyph), None) = (chars.next(), chars.next()) else {
                return Err(FormatError::Parse(format!(
                    "line {}: palette key '{}' is not a single glyph",
                    section.line, glyph_str
                )));
            };
            // `hex = #RRGGBB` is accepted as a shorthand for the three
            // channel keys when reading hand-written files.
            let color = match section.get("hex") {
                Some(hex) => parse_hex(hex)?,
                None => {
                    let red = parse_channel(section, "red")?;
                    let green = parse_channel(section, "green")?;
                    let blue = parse_channel(section, "blue")?;
                    Rgb::new(red, green, blue)
                }
            };
            repr.palette.push((glyph, color));
        } else {
            return Err(FormatError::Parse(format!(
                "line {}: unknown section [{}]",
                section.line, section.header
            )));
        }
    }

    if !saw_sprite {
        return Err(FormatError::MissingKey {
            section: "sprite".to_string(),
            key: "name".to_string(),
        });
    }

    // Reorder frames by their declared indices.
    for (track, order) in repr.tracks.iter_mut().zip(&frame_order) {
        let mut indexed: Vec<(usize, FrameRepr)> =
            order.iter().copied().zip(std::mem::take(&mut track.frames)).collect();
        indexed.sort_by_key(|(i, _)| *i);
        track.frames = indexed.into_iter().map(|(_, f)| f).collect();
    }

    Ok(repr)
}

/// Find or create the track with this name, preserving first-mention order.
fn track_position(
    repr: &mut DocumentRepr,
    frame_order: &mut Vec<Vec<usize>>,
    name: &str,
) -> usize {
    if let Some(pos) = repr.tracks.iter().position(|t| t.name == name) {
        return pos;
    }
    repr.tracks.push(TrackRepr {
        name: name.to_string(),
        interval: Frame::DEFAULT_DURATION,
        looped: true,
        frames: Vec::new(),
    });
    frame_order.push(Vec::new());
    repr.tracks.len() - 1
}

fn parse_channel(section: &Section, key: &str) -> Result<u8, FormatError> {
    let raw = section.require(key)?;
    raw.parse::<u8>().map_err(|_| {
        FormatError::Parse(format!(
            "section [{}] key '{}': invalid channel value '{}'",
            section.header, key, raw
        ))
    })
}
