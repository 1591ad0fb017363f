//! crates/figure8_core/src/color.rs
//!
//! Background tint derived from a map id.

use serde::Serialize;
use std::fmt;

pub const SATURATION: u8 = 80;
pub const LIGHTNESS: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hsl {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.hue, self.saturation, self.lightness)
    }
}

/// Tint behind the sidebar and the pin form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundColor {
    Tint(Hsl),
    /// No map selected.
    Neutral,
}

impl fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundColor::Tint(hsl) => fmt::Display::fmt(hsl, f),
            BackgroundColor::Neutral => f.write_str("white"),
        }
    }
}

impl Serialize for BackgroundColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Polynomial rolling hash over the UTF-16 code units of `s`, wrapping at 32 bits.
/// Collisions are fine, the result is only used for a cosmetic tint.
pub fn hash_id(s: &str) -> i32 {
    s.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash))
    })
}

pub fn color_for(map_id: &str) -> Hsl {
    let hue = hash_id(map_id).rem_euclid(360) as u16;
    Hsl {
        hue,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

pub fn background_for(selected_map_id: Option<&str>) -> BackgroundColor {
    selected_map_id.map_or(BackgroundColor::Neutral, |id| BackgroundColor::Tint(color_for(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_matches_reference_values() {
        assert_eq!(hash_id(""), 0);
        assert_eq!(hash_id("1"), 49);
        assert_eq!(hash_id("ab"), 97 * 31 + 98);
        assert_eq!(hash_id("hello world"), 1_794_106_052);
    }

    #[test]
    fn long_ids_wrap_instead_of_overflowing() {
        let id = "1718000000000-a-very-long-map-identifier-that-overflows-32-bits";
        let color = color_for(id);
        assert!(color.hue < 360);
        assert_eq!(color, color_for(id));
    }

    #[test]
    fn negative_hashes_normalize_into_range() {
        assert_eq!(hash_id("1718000000000"), -990_796_797);
        assert_eq!(color_for("1718000000000").hue, 243);
        assert_eq!(hash_id("example-user-1"), -1_122_633_614);
        assert_eq!(color_for("example-user-1").hue, 106);
    }

    #[test]
    fn renders_as_css_hsl() {
        assert_eq!(color_for("1").to_string(), "hsl(49, 80%, 90%)");
        assert_eq!(background_for(None).to_string(), "white");
    }
}
