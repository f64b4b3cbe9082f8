use std::fmt;

/// An RGB byte triple read from an image. Alpha is never carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorValue {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorValue {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Drop alpha from an RGBA quadruple as returned by a pixel read.
    pub const fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2])
    }

    /// `#rrggbb`, lowercase, zero padded.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Two-digit lowercase hex for one channel.
pub fn hex_pair(value: u8) -> String {
    format!("{value:02x}")
}

/// Inverse of [`hex_pair`]. Accepts either case; rejects anything that is not
/// exactly two hex digits.
pub fn parse_hex_pair(pair: &str) -> Option<u8> {
    if pair.len() != 2 || !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(pair, 16).ok()
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// Text color that stays legible on top of a swatch of `color`.
pub fn readable_text_color(color: ColorValue) -> (u8, u8, u8) {
    let (_, _, l) = rgb_to_hsl(color.r, color.g, color.b);
    if l > 0.55 { (19, 22, 31) } else { (226, 224, 216) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < 1e-9,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn to_hex_is_lowercase_and_zero_padded() {
        assert_eq!(ColorValue::new(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(ColorValue::new(0, 0, 0).to_hex(), "#000000");
        assert_eq!(ColorValue::new(10, 171, 205).to_hex(), "#0aabcd");
    }

    #[test]
    fn from_rgba_discards_alpha() {
        assert_eq!(
            ColorValue::from_rgba([1, 2, 3, 0]),
            ColorValue::from_rgba([1, 2, 3, 255])
        );
    }

    #[test]
    fn every_byte_survives_hex_pair_roundtrip() {
        for v in 0..=u8::MAX {
            let pair = hex_pair(v);
            assert_eq!(pair.len(), 2);
            assert_eq!(pair, pair.to_ascii_lowercase());
            assert_eq!(parse_hex_pair(&pair), Some(v));
        }
    }

    #[test]
    fn parse_hex_pair_rejects_malformed_input() {
        assert_eq!(parse_hex_pair("f"), None);
        assert_eq!(parse_hex_pair("fff"), None);
        assert_eq!(parse_hex_pair("+f"), None);
        assert_eq!(parse_hex_pair("zz"), None);
        assert_eq!(parse_hex_pair("FF"), Some(255));
    }

    #[test]
    fn rgb_to_hsl_pure_primaries() {
        let (h_g, s_g, l_g) = rgb_to_hsl(0, 255, 0);
        assert_close(h_g, 120.0);
        assert_close(s_g, 1.0);
        assert_close(l_g, 0.5);

        let (h, s, l) = rgb_to_hsl(128, 128, 128);
        assert_close(h, 0.0);
        assert_close(s, 0.0);
        assert_close(l, 128.0 / 255.0);
    }

    #[test]
    fn readable_text_flips_on_light_swatches() {
        assert_eq!(readable_text_color(ColorValue::new(255, 255, 255)), (19, 22, 31));
        assert_eq!(readable_text_color(ColorValue::new(0, 0, 0)), (226, 224, 216));
    }
}
