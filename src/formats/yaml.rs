//! YAML backend: indented-mapping syntax with block scalars.
//!
//! ```yaml
//! sprite:
//!   name: hero
//! tracks:
//!   - name: idle
//!     interval: 0.1
//!     loop: true
//!     frames:
//!       - pixels: |-
//!           AB
//!           BA
//! palette:
//!   A:
//!     red: 255
//!     green: 0
//!     blue: 255
//! ```
//!
//! The parser covers exactly the dialect the writer emits: two-space
//! indentation, `- ` list items, plain scalars, and `|-` block scalars for
//! glyph grids (which keep their literal newlines and need no escaping).

use super::{DocumentRepr, FormatError, FrameRepr, TrackRepr};
use crate::color::Rgb;
use crate::models::Frame;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

pub(crate) fn write(repr: &DocumentRepr) -> String {
    let mut out = String::new();

    out.push_str("sprite:\n");
    push_entry(&mut out, 1, "name", &repr.name);
    if !repr.description.is_empty() {
        push_entry(&mut out, 1, "description", &repr.description);
    }
    if !repr.default_track.is_empty() {
        push_entry(&mut out, 1, "default_track", &repr.default_track);
    }

    if repr.is_static() {
        let track = &repr.tracks[0];
        push_entry(&mut out, 1, "track", &track.name);
        push_entry(&mut out, 1, "interval", &format!("{}", track.interval));
        push_entry(&mut out, 1, "loop", if track.looped { "true" } else { "false" });
        push_entry(&mut out, 1, "pixels", &track.frames[0].pixels);
    } else {
        out.push_str("tracks:\n");
        for track in &repr.tracks {
            push_item_entry(&mut out, 1, "name", &track.name);
            push_entry(&mut out, 2, "interval", &format!("{}", track.interval));
            push_entry(&mut out, 2, "loop", if track.looped { "true" } else { "false" });
            out.push_str(&indent(2));
            out.push_str("frames:\n");
            for frame in &track.frames {
                match frame.duration {
                    Some(duration) => {
                        push_item_entry(&mut out, 3, "duration", &format!("{duration}"));
                        push_entry(&mut out, 4, "pixels", &frame.pixels);
                    }
                    None => push_item_entry(&mut out, 3, "pixels", &frame.pixels),
                }
            }
        }
    }

    out.push_str("palette:\n");
    for &(glyph, color) in &repr.palette {
        out.push_str(&indent(1));
        out.push_str(&format!("{glyph}:\n"));
        push_entry(&mut out, 2, "red", &color.r.to_string());
        push_entry(&mut out, 2, "green", &color.g.to_string());
        push_entry(&mut out, 2, "blue", &color.b.to_string());
    }

    out
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

/// A multi-line value is a block scalar only when the indentation-based
/// block syntax can reproduce it exactly: no blank rows, no row with
/// surrounding whitespace.
fn wants_block(value: &str) -> bool {
    value.contains('\n') && value.split('\n').all(|row| !row.is_empty() && row == row.trim())
}

/// Plain scalar where the parser's whitespace trim is lossless, double
/// quoted otherwise.
fn inline_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && value == value.trim()
        && !value.contains('\n')
        && !value.starts_with('"');
    if plain {
        return value.to_string();
    }
    let mut out = String::from('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `key: value`, switching to a `|-` block scalar for multi-line values.
fn push_entry(out: &mut String, level: usize, key: &str, value: &str) {
    if wants_block(value) {
        out.push_str(&indent(level));
        out.push_str(&format!("{key}: |-\n"));
        for row in value.split('\n') {
            out.push_str(&indent(level + 1));
            out.push_str(row);
            out.push('\n');
        }
    } else {
        out.push_str(&indent(level));
        out.push_str(&format!("{key}: {}\n", inline_scalar(value)));
    }
}

/// First entry of a list item: `- key: value` with the dash on the item's
/// own indent level.
fn push_item_entry(out: &mut String, level: usize, key: &str, value: &str) {
    if wants_block(value) {
        out.push_str(&indent(level));
        out.push_str(&format!("- {key}: |-\n"));
        for row in value.split('\n') {
            out.push_str(&indent(level + 2));
            out.push_str(row);
            out.push('\n');
        }
    } else {
        out.push_str(&indent(level));
        out.push_str(&format!("- {key}: {}\n", inline_scalar(value)));
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parsed node tree for the restricted dialect.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Scalar(String),
    Map(Vec<(String, Node)>),
    List(Vec<Node>),
}

impl Node {
    fn get<'a>(&'a self, key: &str) -> Option<&'a Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn scalar(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Node::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

struct Cursor {
    /// `(indent, content)` per significant line, with synthetic entries for
    /// unwrapped list items.
    lines: Vec<(usize, String, usize)>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        let mut lines = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let trimmed = raw.trim_end();
            let content = trimmed.trim_start();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            lines.push((trimmed.len() - content.len(), content.to_string(), i + 1));
        }
        Self { lines, pos: 0 }
    }

    fn peek(&self) -> Option<(usize, &str, usize)> {
        self.lines.get(self.pos).map(|(i, c, n)| (*i, c.as_str(), *n))
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Rewrite the current line in place (used to unwrap `- key: value`
    /// list items into plain mapping entries).
    fn replace_current(&mut self, new_indent: usize, new_content: &str) {
        if let Some(entry) = self.lines.get_mut(self.pos) {
            entry.0 = new_indent;
            entry.1 = new_content.to_string();
        }
    }
}

fn parse_map(cur: &mut Cursor, map_indent: usize) -> Result<Vec<(String, Node)>, FormatError> {
    let mut entries = Vec::new();
    while let Some((ind, content, lineno)) = cur.peek() {
        if ind < map_indent {
            break;
        }
        if ind > map_indent {
            return Err(FormatError::Parse(format!("line {lineno}: unexpected indent")));
        }
        if content.starts_with("- ") {
            break;
        }
        let Some((key, rest)) = content.split_once(':') else {
            return Err(FormatError::Parse(format!("line {lineno}: expected 'key: value'")));
        };
        let key = key.trim().to_string();
        let rest = rest.trim().to_string();
        cur.advance();

        let node = match rest.as_str() {
            "" => parse_nested(cur, map_indent)?,
            "|" | "|-" => Node::Scalar(parse_block(cur, map_indent)),
            _ if rest.starts_with('"') => Node::Scalar(unquote(&rest, lineno)?),
            _ => Node::Scalar(rest),
        };
        entries.push((key, node));
    }
    Ok(entries)
}

/// Inverse of the double-quoted form [`inline_scalar`] emits.
fn unquote(s: &str, lineno: usize) -> Result<String, FormatError> {
    let inner = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .filter(|_| s.len() >= 2)
        .ok_or_else(|| {
            FormatError::Parse(format!("line {lineno}: unterminated quoted scalar"))
        })?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            if c == '"' {
                return Err(FormatError::Parse(format!(
                    "line {lineno}: unescaped quote in quoted scalar"
                )));
            }
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            other => {
                return Err(FormatError::Parse(format!(
                    "line {lineno}: invalid escape '\\{}'",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

/// After a bare `key:` line: a deeper-indented list or mapping, or an empty
/// scalar when nothing deeper follows.
fn parse_nested(cur: &mut Cursor, key_indent: usize) -> Result<Node, FormatError> {
    let next = cur.peek().map(|(ind, content, _)| (ind, content.starts_with("- ")));
    match next {
        Some((ind, true)) if ind > key_indent => parse_list(cur, ind),
        Some((ind, false)) if ind > key_indent => Ok(Node::Map(parse_map(cur, ind)?)),
        _ => Ok(Node::Scalar(String::new())),
    }
}

fn parse_list(cur: &mut Cursor, item_indent: usize) -> Result<Node, FormatError> {
    let mut items = Vec::new();
    while let Some((ind, content, _)) = cur.peek() {
        if ind != item_indent || !content.starts_with("- ") {
            break;
        }
        // Unwrap the dash: the rest is the item's first mapping entry, two
        // columns deeper.
        let rest = content[2..].to_string();
        cur.replace_current(item_indent + 2, &rest);
        items.push(Node::Map(parse_map(cur, item_indent + 2)?));
    }
    Ok(Node::List(items))
}

/// Collect a `|-` block scalar: every following line deeper than the key,
/// dedented to the first content line's indent, joined by newlines.
fn parse_block(cur: &mut Cursor, key_indent: usize) -> String {
    let mut rows: Vec<String> = Vec::new();
    let mut block_indent: Option<usize> = None;
    while let Some((ind, content, _)) = cur.peek() {
        if ind <= key_indent {
            break;
        }
        let block_indent = *block_indent.get_or_insert(ind);
        if ind < block_indent {
            break;
        }
        rows.push(content.to_string());
        cur.advance();
    }
    rows.join("\n")
}

pub(crate) fn parse(text: &str) -> Result<DocumentRepr, FormatError> {
    let mut cur = Cursor::new(text);
    let root = Node::Map(parse_map(&mut cur, 0)?);
    if let Some((_, _, lineno)) = cur.peek() {
        return Err(FormatError::Parse(format!("line {lineno}: trailing content")));
    }

    let sprite = root.get("sprite").ok_or_else(|| FormatError::MissingKey {
        section: "sprite".to_string(),
        key: "name".to_string(),
    })?;
    let name = sprite
        .scalar("name")
        .ok_or_else(|| FormatError::MissingKey {
            section: "sprite".to_string(),
            key: "name".to_string(),
        })?
        .to_string();

    let mut tracks = Vec::new();
    if let Some(pixels) = sprite.scalar("pixels") {
        tracks.push(TrackRepr {
            name: sprite.scalar("track").unwrap_or("default").to_string(),
            interval: parse_f64(sprite, "sprite", "interval")?.unwrap_or(Frame::DEFAULT_DURATION),
            looped: parse_bool(sprite, "sprite", "loop")?.unwrap_or(true),
            frames: vec![FrameRepr { duration: None, pixels: pixels.to_string() }],
        });
    }
    if let Some(Node::List(items)) = root.get("tracks") {
        for (i, item) in items.iter().enumerate() {
            let section = format!("tracks[{i}]");
            let mut frames = Vec::new();
            if let Some(Node::List(frame_items)) = item.get("frames") {
                for (j, frame) in frame_items.iter().enumerate() {
                    let frame_section = format!("{section}.frames[{j}]");
                    frames.push(FrameRepr {
                        duration: parse_f64(frame, &frame_section, "duration")?,
                        pixels: frame
                            .scalar("pixels")
                            .ok_or_else(|| FormatError::MissingKey {
                                section: frame_section.clone(),
                                key: "pixels".to_string(),
                            })?
                            .to_string(),
                    });
                }
            }
            tracks.push(TrackRepr {
                name: item
                    .scalar("name")
                    .ok_or_else(|| FormatError::MissingKey {
                        section: section.clone(),
                        key: "name".to_string(),
                    })?
                    .to_string(),
                interval: parse_f64(item, &section, "interval")?.unwrap_or(Frame::DEFAULT_DURATION),
                looped: parse_bool(item, &section, "loop")?.unwrap_or(true),
                frames,
            });
        }
    }

    let mut palette = Vec::new();
    if let Some(Node::Map(entries)) = root.get("palette") {
        for (key, value) in entries {
            let mut chars = key.chars();
            let (Some(glyph), None) = (chars.next(), chars.next()) else {
                return Err(FormatError::Parse(format!(
                    "palette key '{key}' is not a single glyph"
                )));
            };
            let section = format!("palette.{key}");
            let red = parse_channel(value, &section, "red")?;
            let green = parse_channel(value, &section, "green")?;
            let blue = parse_channel(value, &section, "blue")?;
            palette.push((glyph, Rgb::new(red, green, blue)));
        }
    }

    Ok(DocumentRepr {
        name,
        description: sprite.scalar("description").unwrap_or("").to_string(),
        default_track: sprite.scalar("default_track").unwrap_or("").to_string(),
        tracks,
        palette,
    })
}

fn parse_f64(node: &Node, section: &str, key: &str) -> Result<Option<f64>, FormatError> {
    match node.scalar(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| {
            FormatError::Parse(format!("{section}.{key}: invalid number '{raw}'"))
        }),
    }
}

fn parse_bool(node: &Node, section: &str, key: &str) -> Result<Option<bool>, FormatError> {
    match node.scalar(key) {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(raw) => {
            Err(FormatError::Parse(format!("{section}.{key}: invalid bool '{raw}'")))
        }
    }
}

fn parse_channel(node: &Node, section: &str, key: &str) -> Result<u8, FormatError> {
    let raw = node.scalar(key).ok_or_else(|| FormatError::MissingKey {
        section: section.to_string(),
        key: key.to_string(),
    })?;
    raw.parse::<u8>().map_err(|_| {
        FormatError::Parse(format!("{section}.{key}: invalid channel value '{raw}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn animated_repr() -> DocumentRepr {
        DocumentRepr {
            name: "hero".to_string(),
            description: "a hero".to_string(),
            default_track: "walk".to_string(),
            tracks: vec![
                TrackRepr {
                    name: "idle".to_string(),
                    interval: 0.1,
                    looped: true,
                    frames: vec![
                        FrameRepr { duration: None, pixels: "AB\nBA".to_string() },
                        FrameRepr { duration: Some(0.25), pixels: "BA\nAB".to_string() },
                    ],
                },
                TrackRepr {
                    name: "walk".to_string(),
                    interval: 0.05,
                    looped: false,
                    frames: vec![FrameRepr { duration: None, pixels: "AA\nBB".to_string() }],
                },
            ],
            palette: vec![('A', Rgb::new(255, 0, 0)), ('B', Rgb::new(0, 0, 255))],
        }
    }

    #[test]
    fn test_animated_roundtrip() {
        let repr = animated_repr();
        assert_eq!(parse(&write(&repr)).unwrap(), repr);
    }

    #[test]
    fn test_static_roundtrip() {
        let repr = DocumentRepr {
            name: "dot".to_string(),
            description: String::new(),
            default_track: String::new(),
            tracks: vec![TrackRepr {
                name: "default".to_string(),
                interval: 0.1,
                looped: true,
                frames: vec![FrameRepr { duration: None, pixels: "AB\nBA".to_string() }],
            }],
            palette: vec![('A', Rgb::MAGENTA), ('B', Rgb::new(0, 0, 0))],
        };
        let text = write(&repr);
        assert!(text.contains("pixels: |-"));
        assert!(!text.contains("tracks:"));
        assert_eq!(parse(&text).unwrap(), repr);
    }

    #[test]
    fn test_block_scalar_shape() {
        let repr = animated_repr();
        let text = write(&repr);
        assert!(text.contains("      - pixels: |-\n          AB\n          BA\n"));
    }

    #[test]
    fn test_dot_and_at_glyph_keys() {
        let repr = DocumentRepr {
            name: "x".to_string(),
            description: String::new(),
            default_track: String::new(),
            tracks: vec![TrackRepr {
                name: "default".to_string(),
                interval: 0.1,
                looped: true,
                frames: vec![FrameRepr { duration: None, pixels: ".@".to_string() }],
            }],
            palette: vec![('.', Rgb::new(1, 1, 1)), ('@', Rgb::new(2, 2, 2))],
        };
        assert_eq!(parse(&write(&repr)).unwrap(), repr);
    }

    #[test]
    fn test_padded_metadata_roundtrip() {
        let mut repr = animated_repr();
        repr.name = "  hero  ".to_string();
        repr.description = "  padded  ".to_string();
        repr.tracks[0].name = " idle ".to_string();
        let text = write(&repr);
        assert!(text.contains("description: \"  padded  \""));
        assert!(text.contains("- name: \" idle \""));
        assert_eq!(parse(&text).unwrap(), repr);
    }

    #[test]
    fn test_awkward_multiline_description_quoted() {
        // A blank middle row cannot survive the block-scalar form, so the
        // writer falls back to a quoted scalar.
        let mut repr = animated_repr();
        repr.description = "above\n\nbelow ".to_string();
        let text = write(&repr);
        assert!(text.contains("description: \"above\\n\\nbelow \""));
        assert_eq!(parse(&text).unwrap(), repr);
    }

    #[test]
    fn test_quoted_scalar_escapes() {
        let mut repr = animated_repr();
        repr.description = " say \"hi\" and \\ more ".to_string();
        assert_eq!(parse(&write(&repr)).unwrap(), repr);
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        let text = "sprite:\n  name: \"broken\n  pixels: A\npalette:\n  A:\n    red: 1\n    green: 1\n    blue: 1\n";
        assert!(matches!(parse(text), Err(FormatError::Parse(_))));
    }

    #[test]
    fn test_comments_ignored() {
        let text = "# generated\nsprite:\n  name: dot\n  pixels: A\npalette:\n  A:\n    red: 255\n    green: 0\n    blue: 255\n";
        assert_eq!(parse(text).unwrap().name, "dot");
    }

    #[test]
    fn test_missing_sprite_section() {
        let err = parse("palette:\n").unwrap_err();
        assert!(matches!(err, FormatError::MissingKey { .. }));
    }

    #[test]
    fn test_invalid_number() {
        let text = "sprite:\n  name: x\n  pixels: A\n  interval: fast\npalette:\n  A:\n    red: 1\n    green: 1\n    blue: 1\n";
        assert!(matches!(parse(text), Err(FormatError::Parse(_))));
    }

    #[test]
    fn test_bad_indent_rejected() {
        let text = "sprite:\n  name: x\n      stray: deep\n";
        assert!(matches!(parse(text), Err(FormatError::Parse(_))));
    }
}
