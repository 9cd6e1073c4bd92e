//! Cross-module integration tests: document round-trips through each format
//! backend, file save/load with auto-detection, and quantized export.

use glyphbuf::formats::{
    decode_document, encode_document, load_document, save_document, FormatError, PaletteMode,
    SpriteFormat,
};
use glyphbuf::glyph::GlyphError;
use glyphbuf::models::{AnimationTrack, Frame, PixelBuffer, SpriteDocument, TrackError};
use glyphbuf::Rgb;
use pretty_assertions::assert_eq;

const RED: Rgb = Rgb::new(255, 0, 0);
const GREEN: Rgb = Rgb::new(0, 255, 0);
const BLUE: Rgb = Rgb::new(0, 0, 255);

fn buffer(w: u32, h: u32, pixels: &[Rgb]) -> PixelBuffer {
    PixelBuffer::from_pixels(w, h, pixels.to_vec()).unwrap()
}

/// Two tracks, heterogeneous frame durations, non-first default track.
fn animated_doc() -> SpriteDocument {
    let first = Frame::new(buffer(2, 2, &[RED, GREEN, BLUE, Rgb::MAGENTA]), 0.1);
    let second = Frame::new(buffer(2, 2, &[GREEN, RED, Rgb::MAGENTA, BLUE]), 0.25);
    let mut idle = AnimationTrack::new("idle", first);
    idle.insert_frame(1, second).unwrap();

    let mut walk = AnimationTrack::new("walk", Frame::new(buffer(3, 1, &[RED, RED, BLUE]), 0.05));
    walk.looped = false;

    let mut doc = SpriteDocument::new("hero", idle);
    doc.description = "test sprite".to_string();
    doc.insert_track(walk);
    doc.set_default_track("walk").unwrap();
    doc
}

fn static_doc() -> SpriteDocument {
    let frame = Frame::new(buffer(2, 2, &[RED, GREEN, GREEN, BLUE]), Frame::DEFAULT_DURATION);
    SpriteDocument::new("dot", AnimationTrack::new("default", frame))
}

#[test]
fn roundtrip_each_backend_is_identity() {
    let doc = animated_doc();
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let text = encode_document(&doc, format, PaletteMode::Strict).unwrap();
        let parsed = decode_document(&text, format).unwrap();
        assert_eq!(parsed, doc, "round-trip through {format:?}");
    }
}

#[test]
fn roundtrip_static_sprite_each_backend() {
    let doc = static_doc();
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let text = encode_document(&doc, format, PaletteMode::Strict).unwrap();
        assert_eq!(decode_document(&text, format).unwrap(), doc);
    }
}

#[test]
fn backends_agree_on_document_semantics() {
    let doc = animated_doc();
    let via_toml = decode_document(
        &encode_document(&doc, SpriteFormat::Toml, PaletteMode::Strict).unwrap(),
        SpriteFormat::Toml,
    )
    .unwrap();
    let via_ini = decode_document(
        &encode_document(&doc, SpriteFormat::Ini, PaletteMode::Strict).unwrap(),
        SpriteFormat::Ini,
    )
    .unwrap();
    let via_yaml = decode_document(
        &encode_document(&doc, SpriteFormat::Yaml, PaletteMode::Strict).unwrap(),
        SpriteFormat::Yaml,
    )
    .unwrap();
    assert_eq!(via_toml, via_ini);
    assert_eq!(via_ini, via_yaml);
}

#[test]
fn three_color_grid_roundtrips_exactly() {
    let buf = buffer(2, 2, &[RED, GREEN, GREEN, BLUE]);
    let doc = SpriteDocument::new(
        "grid",
        AnimationTrack::new("default", Frame::new(buf.clone(), 0.1)),
    );
    let text = encode_document(&doc, SpriteFormat::Toml, PaletteMode::Strict).unwrap();
    let parsed = decode_document(&text, SpriteFormat::Toml).unwrap();
    assert_eq!(parsed.tracks()[0].frames()[0].buffer, buf);
}

#[test]
fn hundred_unique_colors_strict_fails() {
    let pixels: Vec<Rgb> = (0..100u8).map(|i| Rgb::new(i, 0, 0)).collect();
    let doc = SpriteDocument::new(
        "rainbow",
        AnimationTrack::new("default", Frame::new(buffer(10, 10, &pixels), 0.1)),
    );
    let err = encode_document(&doc, SpriteFormat::Ini, PaletteMode::Strict).unwrap_err();
    assert!(matches!(err, FormatError::Glyph(GlyphError::TooManyColors(100))));
}

#[test]
fn hundred_unique_colors_quantized_stays_bounded() {
    // One clearly dominant color plus 99 singletons.
    let mut pixels: Vec<Rgb> = (1..100u8).map(|i| Rgb::new(i, 0, 0)).collect();
    pixels.extend(std::iter::repeat(Rgb::new(200, 200, 200)).take(101));
    let doc = SpriteDocument::new(
        "rainbow",
        AnimationTrack::new("default", Frame::new(buffer(10, 20, &pixels), 0.1)),
    );

    let text = encode_document(&doc, SpriteFormat::Yaml, PaletteMode::Quantize).unwrap();
    let parsed = decode_document(&text, SpriteFormat::Yaml).unwrap();
    let colors = parsed.tracks()[0].frames()[0].buffer.distinct_colors();
    assert!(colors.len() <= glyphbuf::MAX_COLORS);
    assert!(colors.contains(&Rgb::new(200, 200, 200)), "dominant color kept verbatim");
}

#[test]
fn deleting_the_last_frame_is_rejected() {
    let mut doc = static_doc();
    let err = doc.delete_frame("default", 0).unwrap_err();
    assert_eq!(err, TrackError::CannotDeleteLastFrame);
    assert_eq!(doc.tracks()[0].frame_count(), 1);
}

#[test]
fn ragged_glyph_rows_fail_to_load() {
    let text = "\
sprite:
  name: ragged
  pixels: |-
    AAAAAAAA
    AAAAAAAA
    AAAAAAA
palette:
  A:
    red: 255
    green: 0
    blue: 255
";
    let err = decode_document(text, SpriteFormat::Yaml).unwrap_err();
    assert!(matches!(
        err,
        FormatError::Glyph(GlyphError::RowWidthMismatch { row: 2, expected: 8, actual: 7 })
    ));
}

#[test]
fn inconsistent_frame_sizes_within_a_track_rejected() {
    let frame_a = Frame::new(buffer(2, 2, &[RED, RED, RED, RED]), 0.1);
    let frame_b = Frame::new(buffer(3, 1, &[RED, RED, RED]), 0.1);
    let mut track = AnimationTrack::new("broken", frame_a);
    track.insert_frame(1, frame_b).unwrap();
    let doc = SpriteDocument::new("x", track);

    let text = encode_document(&doc, SpriteFormat::Toml, PaletteMode::Strict).unwrap();
    let err = decode_document(&text, SpriteFormat::Toml).unwrap_err();
    assert!(matches!(err, FormatError::InconsistentFrameSize { frame: 1, .. }));
}

#[test]
fn save_and_load_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let doc = animated_doc();
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let path = dir.path().join(format!("hero.{}", format.extension()));
        save_document(&path, &doc, format, PaletteMode::Strict).unwrap();
        assert_eq!(load_document(&path).unwrap(), doc);
    }
}

#[test]
fn load_sniffs_content_when_extension_is_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let doc = static_doc();
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let path = dir.path().join(format!("sprite-{}.txt", format.extension()));
        save_document(&path, &doc, format, PaletteMode::Strict).unwrap();
        assert_eq!(load_document(&path).unwrap(), doc, "sniffing {format:?}");
    }
}

#[test]
fn load_missing_file_surfaces_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_document(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
}

#[test]
fn sentinel_color_survives_roundtrip() {
    let buf = buffer(3, 1, &[Rgb::MAGENTA, RED, Rgb::MAGENTA]);
    let doc = SpriteDocument::new("bg", AnimationTrack::new("default", Frame::new(buf, 0.1)));
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let text = encode_document(&doc, format, PaletteMode::Strict).unwrap();
        let parsed = decode_document(&text, format).unwrap();
        let pixels = parsed.tracks()[0].frames()[0].buffer.pixels().to_vec();
        assert_eq!(pixels, vec![Rgb::MAGENTA, RED, Rgb::MAGENTA]);
    }
}

#[test]
fn padded_metadata_survives_roundtrip() {
    let first = Frame::new(buffer(2, 2, &[RED, GREEN, BLUE, Rgb::MAGENTA]), 0.1);
    let second = Frame::new(buffer(2, 2, &[GREEN, RED, Rgb::MAGENTA, BLUE]), 0.1);
    let mut track = AnimationTrack::new(" idle ", first);
    track.insert_frame(1, second).unwrap();
    let mut doc = SpriteDocument::new("  hero  ", track);
    doc.description = "  padded  ".to_string();

    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let text = encode_document(&doc, format, PaletteMode::Strict).unwrap();
        let parsed = decode_document(&text, format).unwrap();
        assert_eq!(parsed, doc, "whitespace through {format:?}");
        assert_eq!(parsed.description, "  padded  ");
        assert_eq!(parsed.tracks()[0].name, " idle ");
    }
}

#[test]
fn per_frame_durations_survive_roundtrip() {
    let doc = animated_doc();
    for format in [SpriteFormat::Toml, SpriteFormat::Ini, SpriteFormat::Yaml] {
        let text = encode_document(&doc, format, PaletteMode::Strict).unwrap();
        let parsed = decode_document(&text, format).unwrap();
        let frames = parsed.track("idle").unwrap().frames();
        assert_eq!(frames[0].duration(), 0.1);
        assert_eq!(frames[1].duration(), 0.25);
        assert_eq!(parsed.default_track_name(), "walk");
    }
}
