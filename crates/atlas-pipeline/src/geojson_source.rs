//! GeoJSON country polygon source.

use crate::records::CountryPolygon;
use crate::source::{PolygonSource, SourceFingerprint};
use atlas_common::{AtlasError, CountryCode, Result};
use geojson::{Feature, GeoJson};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Reads a GeoJSON feature collection of country outlines.
#[derive(Debug, Clone)]
pub struct GeoJsonPolygonSource {
    path: PathBuf,
    code_property: String,
}

impl GeoJsonPolygonSource {
    /// Creates a source reading the join key from `code_property`.
    pub fn new(path: impl Into<PathBuf>, code_property: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code_property: code_property.into(),
        }
    }
}

impl PolygonSource for GeoJsonPolygonSource {
    fn location(&self) -> &Path {
        &self.path
    }

    fn fingerprint(&self) -> Result<SourceFingerprint> {
        SourceFingerprint::of_file(&self.path)
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<CountryPolygon>> {
        let text = fs::read_to_string(&self.path)
            .map_err(|err| AtlasError::source_error_with("cannot read polygons", &self.path, err))?;
        let polygons = parse_polygons(&text, &self.code_property, &self.path)?;
        info!(polygons = polygons.len(), "Loaded country polygons");
        Ok(polygons)
    }
}

/// Parses GeoJSON text into polygons. `path` is only used for error context.
pub fn parse_polygons(text: &str, code_property: &str, path: &Path) -> Result<Vec<CountryPolygon>> {
    let geojson: GeoJson = text
        .parse()
        .map_err(|err| AtlasError::source_error_with("unparseable GeoJSON", path, err))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(AtlasError::source_error(
                "expected a Feature or FeatureCollection, found a bare geometry",
                path,
            ))
        }
    };

    features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| to_polygon(index, feature, code_property, path))
        .collect()
}

fn to_polygon(index: usize, feature: Feature, code_property: &str, path: &Path) -> Result<CountryPolygon> {
    let code = feature
        .property(code_property)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| {
            AtlasError::source_error(
                format!("feature {index} has no string property '{code_property}'"),
                path,
            )
        })?
        .to_string();

    let value = feature
        .geometry
        .map(|geometry| geometry.value)
        .ok_or_else(|| AtlasError::source_error(format!("feature {index} ({code}) has no geometry"), path))?;

    let geometry = match value {
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_) => geo::Geometry::<f64>::try_from(value)
            .map_err(|err| {
                AtlasError::source_error_with(format!("feature {index} ({code}) has invalid coordinates"), path, err)
            })?,
        other => {
            return Err(AtlasError::source_error(
                format!("feature {index} ({code}) is a {}, expected Polygon or MultiPolygon", geometry_kind(&other)),
                path,
            ))
        }
    };

    Ok(CountryPolygon {
        country_code: CountryCode::new(code),
        geometry,
        attributes: feature.properties.unwrap_or_default(),
    })
}

fn geometry_kind(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::test_utils::{source_fixtures, write_temp_file};
    use geo::Geometry;

    #[test]
    fn test_reads_fixture() {
        let file = write_temp_file(source_fixtures::countries_geojson().as_bytes(), ".geojson");
        let polygons = GeoJsonPolygonSource::new(file.path(), "ADM0_ISO").load().unwrap();

        let codes: Vec<&str> = polygons.iter().map(|p| p.country_code.as_str()).collect();
        assert_eq!(codes, vec!["USA", "CAN", "MEX"]);
        assert!(matches!(polygons[0].geometry, Geometry::Polygon(_)));
        assert!(matches!(polygons[1].geometry, Geometry::MultiPolygon(_)));
        assert_eq!(polygons[2].attributes["NAME"], serde_json::json!("Mexico"));
    }

    #[test]
    fn test_missing_code_names_the_feature() {
        let err = parse_polygons(
            source_fixtures::countries_geojson(),
            "ISO_A3",
            Path::new("paises.geojson"),
        )
        .unwrap_err();
        assert!(err.is_source());
        assert!(err.to_string().contains("feature 0"));
    }

    #[test]
    fn test_non_polygon_geometry_is_rejected() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"ADM0_ISO": "VAT"},
             "geometry": {"type": "Point", "coordinates": [12.45, 41.9]}}
        ]}"#;
        let err = parse_polygons(text, "ADM0_ISO", Path::new("paises.geojson")).unwrap_err();
        assert!(err.to_string().contains("Point"));
    }

    #[test]
    fn test_numeric_code_is_rejected() {
        let text = r#"{"type": "Feature", "properties": {"ADM0_ISO": 840},
            "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}}"#;
        assert!(parse_polygons(text, "ADM0_ISO", Path::new("paises.geojson")).is_err());
    }

    #[test]
    fn test_unparseable_text_is_a_source_error() {
        let err = parse_polygons("{ not json", "ADM0_ISO", Path::new("paises.geojson")).unwrap_err();
        assert!(err.is_source());
    }
}
