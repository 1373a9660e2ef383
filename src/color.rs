use serde::{Deserialize, Serialize};

/// Fallback for attributes that are neither hex codes nor palette names.
pub const DEFAULT_COLOR: &str = "#FF0000";

/// A named entry in the selectable palette.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectableColor {
    pub name: String,
    pub hex: String,
}

impl SelectableColor {
    fn new(name: &str, hex: &str) -> Self {
        Self {
            name: name.to_string(),
            hex: hex.to_string(),
        }
    }
}

pub fn default_palette() -> Vec<SelectableColor> {
    vec![
        SelectableColor::new("Black", "#000000"),
        SelectableColor::new("Red", "#FF0000"),
        SelectableColor::new("Blue", "#0000FF"),
        SelectableColor::new("Green", "#00FF00"),
        SelectableColor::new("Orange", "#FFA500"),
        SelectableColor::new("Purple", "#800080"),
        SelectableColor::new("Yellow", "#FFFF00"),
        SelectableColor::new("Pink", "#FFC0CB"),
        SelectableColor::new("Gray", "#808080"),
    ]
}

/// True for `#RGB` and `#RRGGBB`, any case.
pub fn is_hex_code(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Resolves a color attribute to a hex string.
///
/// Literal hex codes pass through untouched, otherwise the palette is searched
/// by name ignoring case. Anything else falls back to red.
pub fn resolve_color(attr: &str, palette: &[SelectableColor]) -> String {
    if is_hex_code(attr) {
        return attr.to_string();
    }
    palette
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(attr))
        .map(|c| c.hex.clone())
        .unwrap_or_else(|| {
            log::debug!("color {attr:?} not in palette, using {DEFAULT_COLOR}");
            DEFAULT_COLOR.to_string()
        })
}

/// Parses a hex code into opaque RGBA. Unparseable input draws red.
pub fn to_rgba(hex: &str) -> [u8; 4] {
    const RED: [u8; 4] = [255, 0, 0, 255];
    if !is_hex_code(hex) {
        return RED;
    }
    let digits = &hex[1..];
    let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
    if digits.len() == 3 {
        let expand = |i: usize| {
            let d = &digits[i..i + 1];
            channel(d) * 17
        };
        [expand(0), expand(1), expand(2), 255]
    } else {
        [
            channel(&digits[0..2]),
            channel(&digits[2..4]),
            channel(&digits[4..6]),
            255,
        ]
    }
}
