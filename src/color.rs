use egui::Color32;

use crate::error::{EditorError, EditorResult};

/// Value written into cells that are "empty".
pub const EMPTY: Color32 = Color32::TRANSPARENT;

/// Default drawing colour of a fresh session.
pub const DEFAULT_COLOR: Color32 = Color32::WHITE;

/// Forces a colour to be fully opaque.
///
/// The pixel grid never holds partial alpha, so every colour a tool writes
/// goes through here first.
pub fn opaque(color: Color32) -> Color32 {
    let [r, g, b, _] = color.to_array();
    Color32::from_rgb(r, g, b)
}

/// Whether a cell counts as empty (nothing to sample, nothing to export).
pub fn is_empty(color: Color32) -> bool {
    color.a() == 0
}

/// Formats the RGB channels as `#rrggbb`.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Parses `#rrggbb` (the leading `#` is optional) into an opaque colour.
pub fn parse_hex(text: &str) -> EditorResult<Color32> {
    let digits = text.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EditorError::InvalidHexColor(text.to_owned()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| EditorError::InvalidHexColor(text.to_owned()))
    };

    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Normalizes an arbitrary RGBA sample to the grid's alpha rule:
/// alpha of at least 128 becomes opaque, anything lower becomes empty.
pub fn quantize_alpha(r: u8, g: u8, b: u8, a: u8) -> Color32 {
    if a >= 128 {
        Color32::from_rgb(r, g, b)
    } else {
        EMPTY
    }
}
