//! Writes pipeline views into an output directory.

use crate::error::{CliError, CliResult};
use atlas_pipeline::{
    ChoroplethFeature, ChoroplethView, FeatureStyle, Legend, PipelineOutput, TableView,
    TimeSeriesView,
};
use geojson::{Feature, FeatureCollection, GeoJson};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Case table with localized headers.
pub const TABLE_FILE: &str = "tabla.csv";
/// Daily totals and chart metadata.
pub const TIME_SERIES_FILE: &str = "serie_temporal.json";
/// Styled choropleth features.
pub const CHOROPLETH_FILE: &str = "coropletas.geojson";
/// Legend and feature styles.
pub const LEGEND_FILE: &str = "leyenda.json";

#[derive(Serialize)]
struct LegendDocument<'a> {
    title: &'a str,
    layer_name: &'a str,
    #[serde(flatten)]
    legend: &'a Legend,
    style: &'a FeatureStyle,
    highlight: &'a FeatureStyle,
}

/// Writes the four output files.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
}

impl Exporter {
    /// Writes into `directory`, creating it on first use.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Output directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes every view and returns the paths written, in a fixed order.
    #[instrument(skip(self, output), fields(directory = %self.directory.display()))]
    pub fn write_all(&self, output: &PipelineOutput) -> CliResult<Vec<PathBuf>> {
        fs::create_dir_all(&self.directory).map_err(|err| CliError::write(&self.directory, err))?;

        let written = vec![
            self.write_table(&output.table)?,
            self.write_time_series(&output.time_series)?,
            self.write_choropleth(&output.choropleth)?,
            self.write_legend(&output.choropleth)?,
        ];
        info!(files = written.len(), "Exported views");
        Ok(written)
    }

    /// Header row of column labels, then one line per row.
    pub fn write_table(&self, table: &TableView) -> CliResult<PathBuf> {
        let path = self.directory.join(TABLE_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(table.columns.iter().map(|column| column.label.as_str()))?;
        for row in &table.rows {
            writer.write_record(table.columns.iter().map(|column| row.cell(column.field)))?;
        }
        writer.flush().map_err(|err| CliError::write(&path, err))?;
        debug!(rows = table.rows.len(), path = %path.display(), "Wrote table");
        Ok(path)
    }

    /// Pretty JSON of the time series view.
    pub fn write_time_series(&self, series: &TimeSeriesView) -> CliResult<PathBuf> {
        let path = self.directory.join(TIME_SERIES_FILE);
        write_json(&path, series)?;
        debug!(points = series.points.len(), path = %path.display(), "Wrote time series");
        Ok(path)
    }

    /// One GeoJSON feature per polygon.
    pub fn write_choropleth(&self, view: &ChoroplethView) -> CliResult<PathBuf> {
        let path = self.directory.join(CHOROPLETH_FILE);
        let collection: FeatureCollection = view
            .features
            .iter()
            .map(to_geojson_feature)
            .collect::<CliResult<_>>()?;
        fs::write(&path, GeoJson::from(collection).to_string())
            .map_err(|err| CliError::write(&path, err))?;
        debug!(features = view.features.len(), path = %path.display(), "Wrote choropleth");
        Ok(path)
    }

    /// Legend with the layer's titles and styles.
    pub fn write_legend(&self, view: &ChoroplethView) -> CliResult<PathBuf> {
        let path = self.directory.join(LEGEND_FILE);
        write_json(
            &path,
            &LegendDocument {
                title: &view.title,
                layer_name: &view.layer_name,
                legend: &view.legend,
                style: &view.style,
                highlight: &view.highlight,
            },
        )?;
        Ok(path)
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    let file = File::create(path).map_err(|err| CliError::write(path, err))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

// Source attributes first; computed keys win on collision.
fn to_geojson_feature(feature: &ChoroplethFeature) -> CliResult<Feature> {
    let mut properties: Map<String, Value> = feature.attributes.clone();
    properties.insert("country_code".to_string(), Value::from(feature.country_code.as_str()));
    properties.insert("value".to_string(), Value::from(feature.value));
    properties.insert("matched".to_string(), Value::from(feature.matched));
    properties.insert("fill_color".to_string(), Value::from(feature.fill_color.to_hex()));
    properties.insert("tooltip".to_string(), serde_json::to_value(&feature.tooltip)?);

    Ok(Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&feature.geometry))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}
