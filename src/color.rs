//! RGB pixel type and hex color parsing
//!
//! The persisted pixel format is three channels, no alpha. Magenta
//! `(255, 0, 255)` is the reserved "unset/background" sentinel and is never a
//! meaningful foreground color.

use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3 or 6 hex chars after #)
    #[error("invalid color length {0}, expected 3 or 6")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// An RGB pixel. Three bytes, no alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Reserved sentinel for "unset/background" pixels.
    pub const MAGENTA: Rgb = Rgb { r: 255, g: 0, b: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Whether this pixel is the unset/background sentinel.
    pub fn is_sentinel(self) -> bool {
        self == Self::MAGENTA
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Parse a hex color string (`#RGB` or `#RRGGBB`) into an [`Rgb`].
///
/// # Examples
///
/// ```
/// use glyphbuf::color::{parse_hex, Rgb};
///
/// assert_eq!(parse_hex("#F0F").unwrap(), Rgb::MAGENTA);
/// assert_eq!(parse_hex("#FF8000").unwrap(), Rgb::new(255, 128, 0));
/// ```
///
/// # Errors
///
/// Returns `ColorError` if the input is empty, missing the leading `#`,
/// the wrong length, or contains non-hex characters.
pub fn parse_hex(s: &str) -> Result<Rgb, ColorError> {
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let Some(hex) = s.strip_prefix('#') else {
        return Err(ColorError::MissingHash);
    };

    for c in hex.chars() {
        if !c.is_ascii_hexdigit() {
            return Err(ColorError::InvalidHex(c));
        }
    }

    match hex.len() {
        3 => {
            // #RGB -> #RRGGBB (doubled digits)
            let mut chars = hex.chars();
            let r = parse_hex_digit(chars.next().unwrap())? * 17;
            let g = parse_hex_digit(chars.next().unwrap())? * 17;
            let b = parse_hex_digit(chars.next().unwrap())? * 17;
            Ok(Rgb::new(r, g, b))
        }
        6 => {
            let r = parse_hex_pair(&hex[0..2])?;
            let g = parse_hex_pair(&hex[2..4])?;
            let b = parse_hex_pair(&hex[4..6])?;
            Ok(Rgb::new(r, g, b))
        }
        len => Err(ColorError::InvalidLength(len)),
    }
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

/// Parse a two-character hex string to u8 (0-255)
fn parse_hex_pair(s: &str) -> Result<u8, ColorError> {
    let mut chars = s.chars();
    let high = parse_hex_digit(chars.next().unwrap())?;
    let low = parse_hex_digit(chars.next().unwrap())?;
    Ok(high * 16 + low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(parse_hex("#F00").unwrap(), Rgb::new(255, 0, 0));
        assert_eq!(parse_hex("#0f0").unwrap(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(parse_hex("#FF00FF").unwrap(), Rgb::MAGENTA);
        assert_eq!(parse_hex("#123456").unwrap(), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_hex(""), Err(ColorError::Empty));
        assert_eq!(parse_hex("FF00FF"), Err(ColorError::MissingHash));
        assert_eq!(parse_hex("#FF00"), Err(ColorError::InvalidLength(4)));
        assert_eq!(parse_hex("#GG0000"), Err(ColorError::InvalidHex('G')));
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = Rgb::new(255, 128, 7);
        assert_eq!(parse_hex(&color.to_hex()).unwrap(), color);
    }

    #[test]
    fn test_sentinel() {
        assert!(Rgb::MAGENTA.is_sentinel());
        assert!(!Rgb::new(255, 0, 254).is_sentinel());
        assert_eq!(Rgb::MAGENTA.to_hex(), "#FF00FF");
    }

    #[test]
    fn test_distance_sq() {
        assert_eq!(Rgb::new(0, 0, 0).distance_sq(Rgb::new(0, 0, 0)), 0);
        assert_eq!(Rgb::new(0, 0, 0).distance_sq(Rgb::new(1, 2, 3)), 14);
        // Symmetric
        assert_eq!(
            Rgb::new(10, 20, 30).distance_sq(Rgb::new(30, 20, 10)),
            Rgb::new(30, 20, 10).distance_sq(Rgb::new(10, 20, 30))
        );
    }
}
