//! TOML backend: array-of-tables syntax.
//!
//! ```toml
//! [sprite]
//! name = "hero"
//!
//! [[track]]
//! name = "idle"
//! interval = 0.1
//! loop = true
//!
//! [[track.frame]]
//! index = 0
//! pixels = """
//! AAB
//! BBA"""
//!
//! [palette.A]
//! red = 255
//! green = 0
//! blue = 255
//! ```
//!
//! Static sprites inline `pixels` (and the track keys) in the `[sprite]`
//! section instead of writing a `[[track]]` section.

use super::{DocumentRepr, FormatError, FrameRepr, TrackRepr};
use crate::color::Rgb;
use crate::models::Frame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct TomlDocument {
    sprite: TomlSprite,
    #[serde(rename = "track", default, skip_serializing_if = "Vec::is_empty")]
    tracks: Vec<TomlTrack>,
    palette: BTreeMap<String, TomlColor>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlSprite {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    default_track: String,
    // Static-sprite inline fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    track: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interval: Option<f64>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    looped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pixels: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlTrack {
    name: String,
    interval: f64,
    #[serde(rename = "loop")]
    looped: bool,
    #[serde(rename = "frame", default)]
    frames: Vec<TomlFrame>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlFrame {
    index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    pixels: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TomlColor {
    red: u8,
    green: u8,
    blue: u8,
}

pub(crate) fn write(repr: &DocumentRepr) -> Result<String, FormatError> {
    let mut sprite = TomlSprite {
        name: repr.name.clone(),
        description: repr.description.clone(),
        default_track: repr.default_track.clone(),
        track: None,
        interval: None,
        looped: None,
        pixels: None,
    };

    let mut tracks = Vec::new();
    if repr.is_static() {
        let track = &repr.tracks[0];
        sprite.track = Some(track.name.clone());
        sprite.interval = Some(track.interval);
        sprite.looped = Some(track.looped);
        sprite.pixels = Some(track.frames[0].pixels.clone());
    } else {
        for track in &repr.tracks {
            tracks.push(TomlTrack {
                name: track.name.clone(),
                interval: track.interval,
                looped: track.looped,
                frames: track
                    .frames
                    .iter()
                    .enumerate()
                    .map(|(i, f)| TomlFrame {
                        index: i,
                        duration: f.duration,
                        pixels: f.pixels.clone(),
                    })
                    .collect(),
            });
        }
    }

    let palette = repr
        .palette
        .iter()
        .map(|&(glyph, color)| {
            (glyph.to_string(), TomlColor { red: color.r, green: color.g, blue: color.b })
        })
        .collect();

    let doc = TomlDocument { sprite, tracks, palette };
    toml::to_string_pretty(&doc).map_err(|e| FormatError::Parse(e.to_string()))
}

pub(crate) fn parse(text: &str) -> Result<DocumentRepr, FormatError> {
    let doc: TomlDocument =
        toml::from_str(text).map_err(|e| FormatError::Parse(e.to_string()))?;

    let mut tracks = Vec::new();
    if let Some(pixels) = doc.sprite.pixels {
        tracks.push(TrackRepr {
            name: doc.sprite.track.unwrap_or_else(|| "default".to_string()),
            interval: doc.sprite.interval.unwrap_or(Frame::DEFAULT_DURATION),
            looped: doc.sprite.looped.unwrap_or(true),
            frames: vec![FrameRepr { duration: None, pixels }],
        });
    }
    for track in doc.tracks {
        let mut frames = track.frames;
        frames.sort_by_key(|f| f.index);
        tracks.push(TrackRepr {
            name: track.name,
            interval: track.interval,
            looped: track.looped,
            frames: frames
                .into_iter()
                .map(|f| FrameRepr { duration: f.duration, pixels: f.pixels })
                .collect(),
        });
    }

    let mut palette = Vec::with_capacity(doc.palette.len());
    for (key, color) in doc.palette {
        let mut chars = key.chars();
        let (Some(glyph), None) = (chars.next(), chars.next()) else {
            return Err(FormatError::Parse(format!(
                "palette key '{key}' is not a single glyph"
            )));
        };
        palette.push((glyph, Rgb::new(color.red, color.green, color.blue)));
    }

    Ok(DocumentRepr {
        name: doc.sprite.name,
        description: doc.sprite.description,
        default_track: doc.sprite.default_track,
        tracks,
        palette,
    })
}
