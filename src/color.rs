//! Hex color normalization and color-space helpers.
//!
//! Every palette entry in the app is stored in canonical form: `#RRGGBB`,
//! uppercase. Anything user-typed goes through [`normalize_hex`] before it is
//! accepted; the sampler/marker pipeline only ever sees canonical strings.

/// Normalize a user-supplied hex string to canonical `#RRGGBB` (uppercase).
///
/// Accepts 6-digit and 3-digit shorthand, with or without a leading `#`.
/// Returns `None` for anything else.
pub fn normalize_hex(value: &str) -> Option<String> {
    let sanitized = value.trim().to_ascii_uppercase();
    let digits = sanitized.strip_prefix('#').unwrap_or(&sanitized);

    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    match digits.len() {
        6 => Some(format!("#{}", digits)),
        3 => {
            let b = digits.as_bytes();
            Some(format!(
                "#{0}{0}{1}{1}{2}{2}",
                b[0] as char, b[1] as char, b[2] as char
            ))
        }
        _ => None,
    }
}

/// Parse a hex color (any accepted form) into an RGB triple.
pub fn hex_to_rgb(value: &str) -> Option<[u8; 3]> {
    let canonical = normalize_hex(value)?;
    let digits = &canonical[1..];
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Format an RGB triple as canonical `#RRGGBB`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Wrap a hue into [0, 360).
pub fn normalize_hue(hue: f32) -> f32 {
    let h = hue % 360.0;
    if h < 0.0 { h + 360.0 } else { h }
}

/// HSL → RGB. `h` in degrees (any range), `s` and `l` in percent (0–100).
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [u8; 3] {
    let hue = normalize_hue(h);
    let saturation = (s.clamp(0.0, 100.0)) / 100.0;
    let lightness = (l.clamp(0.0, 100.0)) / 100.0;

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hue_prime = hue / 60.0;
    let second = chroma * (1.0 - ((hue_prime % 2.0) - 1.0).abs());

    let (rp, gp, bp) = match hue_prime as i32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };

    let m = lightness - chroma / 2.0;
    [
        ((rp + m) * 255.0).round() as u8,
        ((gp + m) * 255.0).round() as u8,
        ((bp + m) * 255.0).round() as u8,
    ]
}

/// HSL → canonical hex.
pub fn hsl_to_hex(h: f32, s: f32, l: f32) -> String {
    let [r, g, b] = hsl_to_rgb(h, s, l);
    rgb_to_hex(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_six_digit_forms() {
        assert_eq!(normalize_hex("#a1b2c3").as_deref(), Some("#A1B2C3"));
        assert_eq!(normalize_hex("A1B2C3").as_deref(), Some("#A1B2C3"));
        assert_eq!(normalize_hex("  #ff0000  ").as_deref(), Some("#FF0000"));
    }

    #[test]
    fn normalize_expands_shorthand() {
        assert_eq!(normalize_hex("#abc").as_deref(), Some("#AABBCC"));
        assert_eq!(normalize_hex("f0f").as_deref(), Some("#FF00FF"));
    }

    #[test]
    fn normalize_rejects_junk() {
        assert_eq!(normalize_hex(""), None);
        assert_eq!(normalize_hex("#12"), None);
        assert_eq!(normalize_hex("#1234"), None);
        assert_eq!(normalize_hex("#GGGGGG"), None);
        assert_eq!(normalize_hex("not a color"), None);
    }

    #[test]
    fn hex_rgb_round_trip() {
        assert_eq!(hex_to_rgb("#FF8001"), Some([255, 128, 1]));
        assert_eq!(rgb_to_hex(255, 128, 1), "#FF8001");
    }

    #[test]
    fn hue_wrapping() {
        assert_eq!(normalize_hue(370.0), 10.0);
        assert_eq!(normalize_hue(-30.0), 330.0);
        assert_eq!(normalize_hue(0.0), 0.0);
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0), "#FF0000");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00FF00");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0), "#0000FF");
        assert_eq!(hsl_to_hex(0.0, 0.0, 100.0), "#FFFFFF");
        assert_eq!(hsl_to_hex(0.0, 0.0, 0.0), "#000000");
    }
}
