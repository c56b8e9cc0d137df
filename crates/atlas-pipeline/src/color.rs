//! Value-to-colour scales and their legend.

use crate::palette::{Color, Palette};
use serde::Serialize;

/// Legend contract handed to the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    /// Caption shown next to the colour ramp
    pub caption: String,
    /// Value mapped to the first stop
    pub domain_min: f64,
    /// Value mapped to the last stop
    pub domain_max: f64,
    /// Palette name
    pub palette: String,
    /// Palette stops, lowest first
    pub stops: Vec<Color>,
}

/// A continuous mapping from values to palette colours.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    palette: Palette,
    min: f64,
    max: f64,
}

impl ColorScale {
    /// `(min, max)` of the scale.
    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Colour for `value`.
    ///
    /// Values outside the domain clamp to its bounds. A degenerate domain
    /// (`min == max`) and non-finite values map to the lowest stop.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn color_for(&self, value: f64) -> Color {
        let stops = self.palette.stops();
        let span = self.max - self.min;
        if !value.is_finite() || span <= 0.0 || stops.len() < 2 {
            return self.palette.lowest();
        }

        let unit = ((value - self.min) / span).clamp(0.0, 1.0);
        let segments = stops.len() - 1;
        let position = unit * segments as f64;
        let index = (position.floor() as usize).min(segments - 1);
        stops[index].interpolate(stops[index + 1], position - index as f64)
    }
}

/// Builds a [`ColorScale`] over a set of values.
#[derive(Debug, Clone)]
pub struct ColorScaleBuilder {
    palette: Palette,
    caption: String,
}

impl ColorScaleBuilder {
    /// Creates a builder for `palette` with a legend `caption`.
    pub fn new(palette: Palette, caption: impl Into<String>) -> Self {
        Self {
            palette,
            caption: caption.into(),
        }
    }

    /// Domain is `[min, max]` of the finite values; `[0, 0]` when there are none.
    pub fn build(&self, values: &[f64]) -> (ColorScale, Legend) {
        let (min, max) = values
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .fold(None, |bounds: Option<(f64, f64)>, value| {
                Some(bounds.map_or((value, value), |(lo, hi)| (lo.min(value), hi.max(value))))
            })
            .unwrap_or((0.0, 0.0));

        let scale = ColorScale {
            palette: self.palette.clone(),
            min,
            max,
        };
        let legend = Legend {
            caption: self.caption.clone(),
            domain_min: min,
            domain_max: max,
            palette: self.palette.name().to_string(),
            stops: self.palette.stops().to_vec(),
        };
        (scale, legend)
    }
}
