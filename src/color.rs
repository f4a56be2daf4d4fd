//! Small helpers for presenting palette colors.

use super::{Color, Options};

use thiserror::Error;

/// Represents an error for invalid input when parsing a hex color
#[derive(Clone, PartialEq, Debug, Error)]
#[error("invalid hex color: {0:?}")]
pub struct HexParseError(pub String);

/// Formats a color as `#RRGGBB`.
pub fn rgb_to_hex(color: Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Parses `#RRGGBB` (the `#` is optional). Extra trailing bytes, such as an
/// alpha channel in `#RRGGBBAA`, are ignored.
pub fn hex_to_rgb(hex: &str) -> Result<Color, HexParseError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let invalid = || HexParseError(hex.to_string());

    if digits.len() < 6
        || digits.len() % 2 != 0
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(invalid());
    }

    let mut bytes = [0u8; 3];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
    }

    Ok(Color::new(bytes[0], bytes[1], bytes[2]))
}

/// Returns a contrasting color: each channel is reflected between the
/// smallest and the largest channel. Near white gives black and near black
/// gives white, using the default [`Options`] thresholds.
pub fn complement(color: Color) -> Color {
    let options = Options::default();
    if options.is_white(color) {
        return Color::new(0, 0, 0);
    }
    if options.is_black(color) {
        return Color::new(0xFF, 0xFF, 0xFF);
    }

    let lo = color.r.min(color.g).min(color.b) as u16;
    let hi = color.r.max(color.g).max(color.b) as u16;
    let k = lo + hi;
    Color::new(
        (k - color.r as u16) as u8,
        (k - color.g as u16) as u8,
        (k - color.b as u16) as u8,
    )
}
