//! Color specification parsing and validation.
//!
//! A color specification is either a hexadecimal string (`#RGB`, `#RRGGBB`,
//! `#RRGGBBAA`) or a recognized color name. Hex forms are always checked
//! first; a string that starts with `#` never reaches the named-color table.
//!
//! Named colors are the CSS/SVG keywords plus the `grey0`..`grey100` (and
//! `gray0`..`gray100`) ramp and `transparent`. Lookup is case-insensitive.

use trueno_viz::color::Rgba;

use crate::error::{Error, Result};

/// Check whether `spec` is a well-formed hex color.
///
/// Exactly 3, 6 or 8 hex digits must follow the leading `#`.
#[must_use]
pub fn is_hex_color(spec: &str) -> bool {
    let Some(digits) = spec.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6 | 8) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Check whether `spec` is a valid color specification.
#[must_use]
pub fn is_valid_color(spec: &str) -> bool {
    if is_hex_color(spec) {
        return true;
    }
    if spec.starts_with('#') {
        return false;
    }
    named_color(spec).is_some()
}

/// Parse a color specification into an [`Rgba`].
///
/// # Errors
///
/// Returns [`Error::InvalidColorSpec`] naming `spec` when it is neither a
/// valid hex color nor a recognized name.
///
/// # Example
///
/// ```
/// use brandplot::color::parse_color;
///
/// let c = parse_color("#1F3A5F").unwrap();
/// assert_eq!((c.r, c.g, c.b, c.a), (0x1F, 0x3A, 0x5F, 255));
/// assert!(parse_color("#FFFF").is_err());
/// ```
pub fn parse_color(spec: &str) -> Result<Rgba> {
    if is_hex_color(spec) {
        return parse_hex(&spec[1..]).ok_or_else(|| Error::InvalidColorSpec(spec.to_string()));
    }
    if spec.starts_with('#') {
        return Err(Error::InvalidColorSpec(spec.to_string()));
    }
    named_color(spec).ok_or_else(|| Error::InvalidColorSpec(spec.to_string()))
}

/// Look up a color name.
///
/// Only strings that start with an ASCII letter and contain nothing but
/// letters and digits are considered names, so numeric-looking strings are
/// rejected here rather than being reinterpreted.
#[must_use]
pub fn named_color(name: &str) -> Option<Rgba> {
    let first = name.chars().next()?;
    if !first.is_ascii_alphabetic() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let name = name.to_ascii_lowercase();

    if name == "transparent" {
        return Some(Rgba::TRANSPARENT);
    }
    if let Some(level) = grey_level(&name) {
        return Some(Rgba::rgb(level, level, level));
    }

    palette::named::from_str(&name).map(|c| Rgba::rgb(c.red, c.green, c.blue))
}

/// Format a color as lowercase hex, including alpha only when not opaque.
#[must_use]
pub fn to_hex(color: Rgba) -> String {
    if color.a == 255 {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
    }
}

/// `grey0`..`grey100` / `gray0`..`gray100` as a byte level.
fn grey_level(name: &str) -> Option<u8> {
    let digits = name.strip_prefix("grey").or_else(|| name.strip_prefix("gray"))?;
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    let pct: u32 = digits.parse().ok()?;
    if pct > 100 {
        return None;
    }
    // Ties round down: grey50 is 127, grey1 is 3.
    Some(((pct * 255 + 49) / 100) as u8)
}

fn parse_hex(digits: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

    match digits.len() {
        3 => {
            let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
            Some(Rgba::rgb(r * 17, g * 17, b * 17))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_lengths() {
        assert!(is_hex_color("#abc"));
        assert!(is_hex_color("#AABBCC"));
        assert!(is_hex_color("#aabbcc80"));

        assert!(!is_hex_color("#abcd"));
        assert!(!is_hex_color("#abcde"));
        assert!(!is_hex_color("#abcdef0"));
        assert!(!is_hex_color("#abcdef012"));
        assert!(!is_hex_color("#"));
        assert!(!is_hex_color("abc"));
        assert!(!is_hex_color("#ggg"));
    }

    #[test]
    fn test_malformed_hex_never_reaches_names() {
        // Digit-only strings look like hex without '#'; they are not names.
        assert!(!is_valid_color("#12345"));
        assert!(!is_valid_color("12345"));
        assert!(!is_valid_color("123"));
        assert!(!is_valid_color("#red"));
    }

    #[test]
    fn test_parse_short_hex() {
        let c = parse_color("#f80").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (255, 136, 0, 255));
    }

    #[test]
    fn test_parse_hex_with_alpha() {
        let c = parse_color("#00000080").unwrap();
        assert_eq!(c.a, 0x80);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(named_color("steelblue"), Some(Rgba::rgb(70, 130, 180)));
        assert_eq!(named_color("SteelBlue"), Some(Rgba::rgb(70, 130, 180)));
        assert_eq!(named_color("red"), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(named_color("transparent"), Some(Rgba::TRANSPARENT));
        assert_eq!(named_color("notacolor"), None);
        assert_eq!(named_color("steel blue"), None);
    }

    #[test]
    fn test_grey_ramp() {
        assert_eq!(named_color("grey0"), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(named_color("gray50"), Some(Rgba::rgb(127, 127, 127)));
        assert_eq!(named_color("grey100"), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(named_color("grey101"), None);
    }

    #[test]
    fn test_parse_error_names_input() {
        match parse_color("blurple") {
            Err(Error::InvalidColorSpec(s)) => assert_eq!(s, "blurple"),
            other => panic!("expected InvalidColorSpec, got {other:?}"),
        }
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(Rgba::rgb(31, 58, 95)), "#1f3a5f");
        assert_eq!(to_hex(Rgba::new(0, 0, 0, 128)), "#00000080");
    }
}
