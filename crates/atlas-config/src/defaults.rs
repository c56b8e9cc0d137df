//! Default values, matching the published dashboard.

use crate::schema::*;
use atlas_common::{JoinKeyNormalization, LogFormat};
use atlas_i18n::Locale;
use std::path::PathBuf;

/// Case table shipped with the dashboard.
pub const DEFAULT_CASES_PATH: &str = "datos/owid-covid-data.csv";
/// Country polygons shipped with the dashboard.
pub const DEFAULT_POLYGONS_PATH: &str = "datos/paises.geojson";
/// Feature property holding the ISO code.
pub const DEFAULT_CODE_PROPERTY: &str = "ADM0_ISO";
/// Last date of the OWID snapshot.
pub const DEFAULT_MAX_DATE: &str = "2024-08-04";
/// Prefix of OWID aggregate pseudo-regions such as `OWID_WRL`.
pub const DEFAULT_EXCLUDED_PREFIX: &str = "OWID";
/// Default palette.
pub const DEFAULT_PALETTE: &str = "YlOrRd_09";
/// Palette name selecting `custom_palette`.
pub const CUSTOM_PALETTE: &str = "custom";
/// Named palettes the renderer knows.
pub const PALETTE_NAMES: [&str; 9] = [
    "YlOrRd_09",
    "YlOrBr_09",
    "YlGnBu_09",
    "Blues_09",
    "Greens_09",
    "Reds_09",
    "Oranges_09",
    "Purples_09",
    "Greys_09",
];
/// Export directory.
pub const DEFAULT_OUTPUT_DIR: &str = "salida";

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: SourcesConfig::default(),
            filter: FilterConfig::default(),
            choropleth: ChoroplethConfig::default(),
            display: DisplayConfig {
                language: Locale::Spanish,
            },
            output: OutputConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            cases_path: PathBuf::from(DEFAULT_CASES_PATH),
            polygons_path: PathBuf::from(DEFAULT_POLYGONS_PATH),
            polygon_code_property: DEFAULT_CODE_PROPERTY.to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_date: DEFAULT_MAX_DATE.to_string(),
            excluded_code_prefix: Some(DEFAULT_EXCLUDED_PREFIX.to_string()),
        }
    }
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_string(),
            custom_palette: None,
            legend_caption: None,
            join_key_normalization: JoinKeyNormalization::Exact,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}
