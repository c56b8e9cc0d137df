//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a file only needs the keys it
//! wants to change.

use atlas_common::{JoinKeyNormalization, LogFormat, LoggingConfig};
use atlas_i18n::Locale;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for COVID Atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the case table and the country polygons are read from.
    pub sources: SourcesConfig,
    /// Row filtering.
    pub filter: FilterConfig,
    /// Choropleth colouring and joining.
    pub choropleth: ChoroplethConfig,
    /// Display language.
    pub display: DisplayConfig,
    /// Export destination.
    pub output: OutputConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Source file locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Case table, either a `.csv` file or a `.zip` holding one.
    pub cases_path: PathBuf,
    /// GeoJSON feature collection of country polygons.
    pub polygons_path: PathBuf,
    /// Feature property holding the ISO code.
    pub polygon_code_property: String,
}

/// Row filtering applied before projection and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub max_date: String,
    /// Rows whose code starts with this prefix are dropped. Empty disables.
    pub excluded_code_prefix: Option<String>,
}

impl FilterConfig {
    /// The exclusion prefix, treating an empty string as no exclusion.
    pub fn excluded_prefix(&self) -> Option<&str> {
        self.excluded_code_prefix
            .as_deref()
            .filter(|prefix| !prefix.is_empty())
    }
}

/// Choropleth settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoroplethConfig {
    /// Named sequential palette, or `custom`.
    pub palette: String,
    /// `#rrggbb` stops, used when `palette` is `custom`.
    pub custom_palette: Option<Vec<String>>,
    /// Legend caption; the localized default is used when absent.
    pub legend_caption: Option<String>,
    /// How polygon codes are matched to aggregate codes.
    pub join_key_normalization: JoinKeyNormalization,
}

impl ChoroplethConfig {
    /// Whether the custom stops are in use.
    pub fn uses_custom_palette(&self) -> bool {
        self.palette.eq_ignore_ascii_case(crate::defaults::CUSTOM_PALETTE)
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Label and number-format language.
    pub language: Locale,
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the exported files are written into.
    pub directory: PathBuf,
}

/// Logging settings as they appear in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `atlas_pipeline=debug`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
    /// Log file; stderr when absent.
    pub file: Option<PathBuf>,
}

impl LoggingSettings {
    /// Converts into the subscriber configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}
