//! Colours and sequential palettes.

use atlas_common::{AtlasError, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Black, the feature outline colour.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Creates a colour from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let invalid = || AtlasError::validation_field(format!("invalid colour '{hex}'"), "palette");
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation in RGB. `t` is clamped to `[0, 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn interpolate(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let (a, b) = (f64::from(a) / 255.0, f64::from(b) / 255.0);
            let unit = (b - a).mul_add(t, a);
            (unit * 255.9999).floor().clamp(0.0, 255.0) as u8
        };
        Self::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

const YL_OR_RD: [&str; 9] = [
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026", "#800026",
];
const YL_OR_BR: [&str; 9] = [
    "#ffffe5", "#fff7bc", "#fee391", "#fec44f", "#fe9929", "#ec7014", "#cc4c02", "#993404", "#662506",
];
const YL_GN_BU: [&str; 9] = [
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494", "#081d58",
];
const BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c", "#08306b",
];
const GREENS: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c", "#00441b",
];
const REDS: [&str; 9] = [
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
];
const ORANGES: [&str; 9] = [
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c", "#f16913", "#d94801", "#a63603", "#7f2704",
];
const PURPLES: [&str; 9] = [
    "#fcfbfd", "#efedf5", "#dadaeb", "#bcbddc", "#9e9ac8", "#807dba", "#6a51a3", "#54278f", "#3f007d",
];
const GREYS: [&str; 9] = [
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525", "#000000",
];

fn named_stops(name: &str) -> Option<&'static [&'static str; 9]> {
    match name {
        "YlOrRd_09" => Some(&YL_OR_RD),
        "YlOrBr_09" => Some(&YL_OR_BR),
        "YlGnBu_09" => Some(&YL_GN_BU),
        "Blues_09" => Some(&BLUES),
        "Greens_09" => Some(&GREENS),
        "Reds_09" => Some(&REDS),
        "Oranges_09" => Some(&ORANGES),
        "Purples_09" => Some(&PURPLES),
        "Greys_09" => Some(&GREYS),
        _ => None,
    }
}

/// A sequential palette: at least two stops, lowest value first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    name: String,
    stops: Vec<Color>,
}

impl Palette {
    /// One of the ColorBrewer 9-class sequential ramps, e.g. `YlOrRd_09`.
    pub fn named(name: &str) -> Result<Self> {
        let stops = named_stops(name).ok_or_else(|| {
            AtlasError::validation_field(format!("unknown palette '{name}'"), "palette")
        })?;
        Ok(Self {
            name: name.to_string(),
            stops: stops.iter().map(|hex| Color::from_hex(hex)).collect::<Result<_>>()?,
        })
    }

    /// A palette from `#rrggbb` stops.
    pub fn custom<S: AsRef<str>>(stops: &[S]) -> Result<Self> {
        if stops.len() < 2 {
            return Err(AtlasError::validation_field(
                format!("a palette needs at least 2 colours, got {}", stops.len()),
                "palette",
            ));
        }
        Ok(Self {
            name: "custom".to_string(),
            stops: stops
                .iter()
                .map(|hex| Color::from_hex(hex.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// Palette name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops, lowest value first.
    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    /// Colour of the domain minimum.
    pub fn lowest(&self) -> Color {
        self.stops[0]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            name: "YlOrRd_09".to_string(),
            stops: YL_OR_RD
                .iter()
                .filter_map(|hex| Color::from_hex(hex).ok())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_config::PALETTE_NAMES;

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::from_hex("#FD8D3C").unwrap();
        assert_eq!(color, Color::rgb(0xfd, 0x8d, 0x3c));
        assert_eq!(color.to_hex(), "#fd8d3c");
        assert!(Color::from_hex("fd8d3c").is_err());
        assert!(Color::from_hex("#fd8d3").is_err());
        assert!(Color::from_hex("#fd8d3g").is_err());
    }

    #[test]
    fn test_interpolation_endpoints_are_exact() {
        let low = Color::from_hex("#ffffcc").unwrap();
        let high = Color::from_hex("#800026").unwrap();
        assert_eq!(low.interpolate(high, 0.0), low);
        assert_eq!(low.interpolate(high, 1.0), high);
        assert_eq!(Color::BLACK.interpolate(Color::rgb(255, 255, 255), 0.5), Color::rgb(127, 127, 127));
    }

    #[test]
    fn test_every_configurable_palette_resolves() {
        for name in PALETTE_NAMES {
            let palette = Palette::named(name).unwrap();
            assert_eq!(palette.stops().len(), 9, "{name}");
        }
        assert!(Palette::named("Rainbow").is_err());
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.name(), "YlOrRd_09");
        assert_eq!(palette.lowest().to_hex(), "#ffffcc");
        assert_eq!(palette.stops().len(), 9);
    }

    #[test]
    fn test_custom_palette_needs_two_stops() {
        assert!(Palette::custom(&["#ffffff"]).is_err());
        let palette = Palette::custom(&["#ffffff", "#ff0000"]).unwrap();
        assert_eq!(palette.name(), "custom");
        assert_eq!(palette.stops()[1], Color::rgb(255, 0, 0));
    }
}
