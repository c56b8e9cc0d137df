//! Test utilities and shared fixtures for the atlas workspace.
//!
//! This module provides sample sources, configuration documents and helper
//! functions used by unit and integration tests across all crates.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Write `contents` to a temporary file whose name ends with `suffix`.
#[cfg(feature = "tempfile")]
pub fn write_temp_file(contents: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temporary file");
    file.write_all(contents).expect("Failed to write temporary file");
    file.flush().expect("Failed to flush temporary file");
    file
}

/// Sample source documents shaped like the OWID and Natural Earth inputs.
pub mod source_fixtures {
    /// A small OWID-style case table.
    ///
    /// With a maximum date of 2024-01-03 and the `OWID` prefix excluded, the
    /// daily sums are 150, 150 and 70, the per-country maxima are USA 150,
    /// CAN 70 and ARG missing, and MEX falls outside the window.
    pub fn cases_csv() -> &'static str {
        concat!(
            "iso_code,continent,location,date,total_cases,new_cases,total_deaths\n",
            "USA,North America,United States,2024-01-01,100,,1\n",
            "USA,North America,United States,2024-01-02,150,50,2\n",
            "CAN,North America,Canada,2024-01-01,50,,0\n",
            "CAN,North America,Canada,2024-01-03,70,20,1\n",
            "OWID_WRL,,World,2024-01-01,1000,,10\n",
            "MEX,North America,Mexico,2024-01-05,500,,\n",
            "ARG,South America,Argentina,2024-01-02,,,\n",
        )
    }

    /// Three square country polygons keyed by `ADM0_ISO`: USA, CAN and MEX.
    pub fn countries_geojson() -> &'static str {
        r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": { "ADM0_ISO": "USA", "NAME": "United States of America" },
      "geometry": { "type": "Polygon", "coordinates": [[[-120.0, 30.0], [-80.0, 30.0], [-80.0, 48.0], [-120.0, 48.0], [-120.0, 30.0]]] }
    },
    {
      "type": "Feature",
      "properties": { "ADM0_ISO": "CAN", "NAME": "Canada" },
      "geometry": { "type": "MultiPolygon", "coordinates": [[[[-130.0, 49.0], [-60.0, 49.0], [-60.0, 70.0], [-130.0, 70.0], [-130.0, 49.0]]]] }
    },
    {
      "type": "Feature",
      "properties": { "ADM0_ISO": "MEX", "NAME": "Mexico" },
      "geometry": { "type": "Polygon", "coordinates": [[[-115.0, 15.0], [-90.0, 15.0], [-90.0, 30.0], [-115.0, 30.0], [-115.0, 15.0]]] }
    }
  ]
}"#
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// A minimal YAML configuration; every omitted key takes its default.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
filter:
  max_date: "2024-01-03"
"#
    }

    /// A full YAML configuration.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "sources:\n",
            "  cases_path: \"datos/owid-covid-data.zip\"\n",
            "  polygons_path: \"datos/paises.geojson\"\n",
            "  polygon_code_property: \"ADM0_ISO\"\n",
            "\n",
            "filter:\n",
            "  max_date: \"2024-08-04\"\n",
            "  excluded_code_prefix: \"OWID\"\n",
            "\n",
            "choropleth:\n",
            "  palette: \"Blues_09\"\n",
            "  legend_caption: \"Total cases by country\"\n",
            "  join_key_normalization: \"trim_uppercase\"\n",
            "\n",
            "display:\n",
            "  language: \"en\"\n",
            "\n",
            "output:\n",
            "  directory: \"out\"\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  format: \"compact\"\n",
        )
    }

    /// A TOML configuration with a custom palette.
    pub fn custom_palette_toml() -> &'static str {
        r##"
[filter]
max_date = "2024-01-03"
excluded_code_prefix = "OWID"

[choropleth]
palette = "custom"
custom_palette = ["#ffffff", "#ff0000"]
"##
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Strategy for country codes, including `OWID_` pseudo-regions.
    pub fn country_code_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => r"[A-Z]{3}",
            1 => r"OWID_[A-Z]{3}",
        ]
    }

    /// Strategy for dates in 2020 through 2024.
    pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (0i64..1826).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid epoch") + chrono::Duration::days(offset)
        })
    }

    /// Strategy for cumulative case counts, sometimes missing.
    pub fn total_cases_strategy() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            1 => Just(None),
            6 => (0u32..5_000_000).prop_map(|n| Some(f64::from(n))),
        ]
    }
}
