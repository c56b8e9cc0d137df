//! Configuration validation.

use crate::defaults::PALETTE_NAMES;
use crate::schema::{ChoroplethConfig, Config};
use atlas_common::{parse_calendar_date, AtlasError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Regex pattern for `#rrggbb` colour stops.
pub static HEX_COLOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern"));

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first offending key.
    pub fn validate(config: &Config) -> Result<()> {
        validate_path(&config.sources.cases_path, "sources.cases_path")?;
        validate_path(&config.sources.polygons_path, "sources.polygons_path")?;
        validate_path(&config.output.directory, "output.directory")?;

        if config.sources.polygon_code_property.trim().is_empty() {
            return Err(AtlasError::validation_field(
                "polygon code property cannot be empty",
                "sources.polygon_code_property",
            ));
        }

        validate_date(&config.filter.max_date)?;
        validate_palette(&config.choropleth)?;

        if config.logging.level.trim().is_empty() {
            return Err(AtlasError::validation_field(
                "log level cannot be empty",
                "logging.level",
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate(self)
    }
}

/// Validates a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> Result<()> {
    parse_calendar_date(value).map(|_| ()).ok_or_else(|| {
        AtlasError::validation_field(format!("unparseable date '{value}'"), "filter.max_date")
    })
}

/// Validates a `#rrggbb` colour.
pub fn validate_hex_color(value: &str) -> Result<()> {
    if HEX_COLOR_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(AtlasError::validation_field(
            format!("invalid colour '{value}', expected #rrggbb"),
            "choropleth.custom_palette",
        ))
    }
}

/// Validates the palette selection.
pub fn validate_palette(choropleth: &ChoroplethConfig) -> Result<()> {
    if choropleth.uses_custom_palette() {
        let stops = choropleth.custom_palette.as_deref().unwrap_or_default();
        if stops.len() < 2 {
            return Err(AtlasError::validation_field(
                format!("a custom palette needs at least 2 colours, got {}", stops.len()),
                "choropleth.custom_palette",
            ));
        }
        return stops.iter().try_for_each(|stop| validate_hex_color(stop));
    }

    if PALETTE_NAMES.contains(&choropleth.palette.as_str()) {
        Ok(())
    } else {
        Err(AtlasError::validation_field(
            format!(
                "unknown palette '{}', expected one of {} or 'custom'",
                choropleth.palette,
                PALETTE_NAMES.join(", ")
            ),
            "choropleth.palette",
        ))
    }
}

fn validate_path(path: &Path, field: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        Err(AtlasError::validation_field("path cannot be empty", field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: AtlasError) -> Option<String> {
        match err {
            AtlasError::Validation { field, .. } => field,
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#ffffcc"));
        assert!(HEX_COLOR_REGEX.is_match("#800026"));
        assert!(HEX_COLOR_REGEX.is_match("#ABC123"));

        assert!(!HEX_COLOR_REGEX.is_match("ffffcc"));
        assert!(!HEX_COLOR_REGEX.is_match("#fff"));
        assert!(!HEX_COLOR_REGEX.is_match("#fffffff"));
        assert!(!HEX_COLOR_REGEX.is_match("#gggggg"));
        assert!(!HEX_COLOR_REGEX.is_match(""));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut config = Config::default();
        config.filter.max_date = "04/08/2024".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("filter.max_date"));
    }

    #[test]
    fn test_unknown_palette_is_rejected() {
        let mut config = Config::default();
        config.choropleth.palette = "Rainbow".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("choropleth.palette"));
    }

    #[test]
    fn test_custom_palette_rules() {
        let mut config = Config::default();
        config.choropleth.palette = "custom".to_string();
        assert!(config.validate().is_err());

        config.choropleth.custom_palette = Some(vec!["#ffffff".to_string()]);
        assert!(config.validate().is_err());

        config.choropleth.custom_palette = Some(vec!["#ffffff".to_string(), "red".to_string()]);
        assert!(config.validate().is_err());

        config.choropleth.custom_palette = Some(vec!["#ffffff".to_string(), "#ff0000".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_paths_are_rejected() {
        let mut config = Config::default();
        config.sources.cases_path = "".into();
        let err = config.validate().unwrap_err();
        assert_eq!(field_of(err).as_deref(), Some("sources.cases_path"));
    }
}
