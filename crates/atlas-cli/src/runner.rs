//! One end-to-end run: sources, pipeline, export.

use crate::error::CliResult;
use crate::export::Exporter;
use atlas_config::Config;
use atlas_pipeline::{
    CsvCaseSource, GeoJsonPolygonSource, Pipeline, PipelineSettings, SourceCache,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows in the filtered table
    pub table_rows: usize,
    /// Days in the time series
    pub days: usize,
    /// Features in the choropleth
    pub features: usize,
    /// Localized warning texts
    pub warnings: Vec<String>,
    /// Files written
    pub files: Vec<PathBuf>,
}

/// Runs the atlas for a loaded configuration.
pub struct AtlasRunner {
    config: Config,
    cache: SourceCache,
}

impl AtlasRunner {
    /// Creates a runner with an empty source cache.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cache: SourceCache::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Source cache shared by every run of this runner.
    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Loads both sources, runs the pipeline and writes the outputs.
    #[instrument(skip(self))]
    pub fn run(&self) -> CliResult<RunSummary> {
        let started = Instant::now();
        let sources = &self.config.sources;

        let pipeline = Pipeline::new(PipelineSettings::from_config(&self.config))?;
        let cases = self.cache.cases(&CsvCaseSource::new(&sources.cases_path))?;
        let polygons = self.cache.polygons(&GeoJsonPolygonSource::new(
            &sources.polygons_path,
            &sources.polygon_code_property,
        ))?;

        let output = pipeline.run(&cases, &polygons)?;

        let mut warnings = Vec::with_capacity(output.warnings.len());
        for warning in &output.warnings {
            let text = pipeline.describe_warning(warning)?;
            warn!(%warning, "{text}");
            warnings.push(text);
        }

        let files = Exporter::new(&self.config.output.directory).write_all(&output)?;

        info!(
            elapsed_ms = started.elapsed().as_millis(),
            cache_hit_rate = self.cache.metrics().hit_rate(),
            "Atlas run complete"
        );

        Ok(RunSummary {
            table_rows: output.table.rows.len(),
            days: output.time_series.points.len(),
            features: output.choropleth.features.len(),
            warnings,
            files,
        })
    }
}
