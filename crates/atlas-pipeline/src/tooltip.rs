//! Per-feature tooltip metadata.

use crate::join::JoinedFeature;
use atlas_common::Result;
use atlas_i18n::{Locale, Localizer, MessageKey};
use serde::Serialize;

/// One labelled line of a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TooltipEntry {
    /// Field label
    pub label: String,
    /// Display text
    pub value: String,
}

/// Builds `(label, value)` lines for joined features.
#[derive(Debug, Clone)]
pub struct TooltipBuilder {
    locale: Locale,
    code_label: String,
    value_label: String,
}

impl TooltipBuilder {
    /// Uses explicit labels; numbers follow `locale`.
    pub fn new(locale: Locale, code_label: impl Into<String>, value_label: impl Into<String>) -> Self {
        Self {
            locale,
            code_label: code_label.into(),
            value_label: value_label.into(),
        }
    }

    /// Takes labels and number format from the localizer.
    pub fn localized(localizer: &Localizer) -> Result<Self> {
        Ok(Self::new(
            localizer.locale(),
            localizer.message(MessageKey::TooltipCountry)?,
            localizer.message(MessageKey::TooltipTotalCases)?,
        ))
    }

    /// Country code line, then the grouped value.
    pub fn build(&self, feature: &JoinedFeature) -> Vec<TooltipEntry> {
        vec![
            TooltipEntry {
                label: self.code_label.clone(),
                value: feature.country_code.to_string(),
            },
            TooltipEntry {
                label: self.value_label.clone(),
                value: self.locale.format_number(feature.value),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::CountryCode;
    use geo::{point, Geometry};
    use serde_json::Map;

    fn feature(code: &str, value: f64) -> JoinedFeature {
        JoinedFeature {
            country_code: CountryCode::from(code),
            geometry: Geometry::Point(point!(x: 0.0, y: 0.0)),
            value,
            matched: true,
            attributes: Map::new(),
        }
    }

    #[test]
    fn test_spanish_tooltip() {
        let builder = TooltipBuilder::localized(&Localizer::new(Locale::Spanish).unwrap()).unwrap();
        let entries = builder.build(&feature("USA", 103_436_829.0));
        assert_eq!(entries[0].label, "País");
        assert_eq!(entries[0].value, "USA");
        assert_eq!(entries[1].label, "Casos totales");
        assert_eq!(entries[1].value, "103.436.829");
    }

    #[test]
    fn test_english_fractional_value() {
        let builder = TooltipBuilder::new(Locale::English, "Country", "Total cases");
        let entries = builder.build(&feature("CAN", 1234.5));
        assert_eq!(entries[1].value, "1,234.5");
    }

    #[test]
    fn test_unmatched_feature_shows_zero() {
        let builder = TooltipBuilder::new(Locale::Spanish, "País", "Casos totales");
        assert_eq!(builder.build(&feature("MEX", 0.0))[1].value, "0");
    }
}
