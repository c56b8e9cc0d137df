//! End-to-end run: filter, project, aggregate, join, colour and label.

use crate::aggregator::{
    CountryLatestAggregator, DailyAggregate, DailyTotalsAggregator, DataAggregator,
};
use crate::color::{ColorScaleBuilder, Legend};
use crate::filter::TemporalFilter;
use crate::join::{GeoJoiner, PipelineWarning};
use crate::palette::{Color, Palette};
use crate::projector::{ColumnProjector, TableView};
use crate::records::{CaseRecord, CountryPolygon};
use crate::tooltip::{TooltipBuilder, TooltipEntry};
use atlas_common::{CountryCode, JoinKeyNormalization, Result, DATE_FORMAT};
use atlas_config::Config;
use atlas_i18n::{FluentArgs, Locale, Localizer, MessageKey};
use geo::Geometry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Everything a run needs besides the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Inclusive date bound, `YYYY-MM-DD`
    pub max_date: String,
    /// Pseudo-region prefix to drop; empty or `None` keeps everything
    pub excluded_code_prefix: Option<String>,
    /// Named palette, or `custom`
    pub palette: String,
    /// Stops used when `palette` is `custom`
    pub custom_palette: Option<Vec<String>>,
    /// Legend caption; the localized caption when `None`
    pub legend_caption: Option<String>,
    /// Join key comparison
    pub join_key_normalization: JoinKeyNormalization,
    /// Label language and number format
    pub locale: Locale,
}

impl PipelineSettings {
    /// Settings taken from a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_date: config.filter.max_date.clone(),
            excluded_code_prefix: config.filter.excluded_prefix().map(str::to_string),
            palette: config.choropleth.palette.clone(),
            custom_palette: config
                .choropleth
                .uses_custom_palette()
                .then(|| config.choropleth.custom_palette.clone())
                .flatten(),
            legend_caption: config.choropleth.legend_caption.clone(),
            join_key_normalization: config.choropleth.join_key_normalization,
            locale: config.display.language,
        }
    }

    fn resolve_palette(&self) -> Result<Palette> {
        match &self.custom_palette {
            Some(stops) => Palette::custom(stops),
            None => Palette::named(&self.palette),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Daily totals with chart metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesView {
    /// Chart title
    pub title: String,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
    /// `strftime` pattern for the x axis
    pub date_format: String,
    /// Points ordered by date
    pub points: Vec<DailyAggregate>,
}

/// Stroke and fill parameters for map features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStyle {
    /// Outline colour
    pub stroke_color: Color,
    /// Outline width
    pub weight: f64,
    /// Fill opacity
    pub fill_opacity: f64,
}

impl FeatureStyle {
    /// Resting style.
    pub const BASE: Self = Self {
        stroke_color: Color::BLACK,
        weight: 0.5,
        fill_opacity: 0.7,
    };

    /// Style under the pointer.
    pub const HIGHLIGHT: Self = Self {
        stroke_color: Color::BLACK,
        weight: 3.0,
        fill_opacity: 0.9,
    };
}

/// A coloured, labelled country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethFeature {
    /// Polygon code
    pub country_code: CountryCode,
    /// Polygon geometry
    #[serde(skip)]
    pub geometry: Geometry<f64>,
    /// Joined value
    pub value: f64,
    /// Whether an aggregate matched
    pub matched: bool,
    /// Colour from the scale
    pub fill_color: Color,
    /// Tooltip lines
    pub tooltip: Vec<TooltipEntry>,
    /// Polygon attributes
    pub attributes: Map<String, Value>,
}

/// The choropleth layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethView {
    /// Map title
    pub title: String,
    /// Layer name
    pub layer_name: String,
    /// One feature per polygon, in polygon order
    pub features: Vec<ChoroplethFeature>,
    /// Legend
    pub legend: Legend,
    /// Resting style
    pub style: FeatureStyle,
    /// Highlight style
    pub highlight: FeatureStyle,
}

/// The three views plus non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    /// Filtered case table
    pub table: TableView,
    /// Daily totals
    pub time_series: TimeSeriesView,
    /// Choropleth layer
    pub choropleth: ChoroplethView,
    /// Ambiguous joins
    pub warnings: Vec<PipelineWarning>,
}

/// A configured pipeline. Holds no state between runs.
#[derive(Debug)]
pub struct Pipeline {
    settings: PipelineSettings,
    filter: TemporalFilter,
    projector: ColumnProjector,
    joiner: GeoJoiner,
    scale_builder: ColorScaleBuilder,
    tooltips: TooltipBuilder,
    localizer: Localizer,
}

impl Pipeline {
    /// Validates `settings` and prepares every stage.
    pub fn new(settings: PipelineSettings) -> Result<Self> {
        let filter = TemporalFilter::new(&settings.max_date, settings.excluded_code_prefix.as_deref())
            .map_err(|err| err.in_stage("configure"))?;
        let palette = settings.resolve_palette().map_err(|err| err.in_stage("configure"))?;
        let localizer = Localizer::new(settings.locale)?;

        let caption = match &settings.legend_caption {
            Some(caption) => caption.clone(),
            None => localizer.message(MessageKey::LegendCaption)?,
        };

        Ok(Self {
            filter,
            projector: ColumnProjector::localized(&localizer)?,
            joiner: GeoJoiner::new(settings.join_key_normalization),
            scale_builder: ColorScaleBuilder::new(palette, caption),
            tooltips: TooltipBuilder::localized(&localizer)?,
            localizer,
            settings,
        })
    }

    /// Settings the pipeline was built from.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs every stage over already loaded data.
    pub fn run(&self, cases: &[CaseRecord], polygons: &[CountryPolygon]) -> Result<PipelineOutput> {
        let span = info_span!("pipeline", cases = cases.len(), polygons = polygons.len());
        let _entered = span.enter();
        let started = Instant::now();

        let filtered = run_stage("filter", || Ok(self.filter.apply(cases)))?;
        let rows = run_stage("project", || self.projector.project(&filtered))?;
        let daily = run_stage(DailyTotalsAggregator.name(), || DailyTotalsAggregator.aggregate(&rows))?;
        let countries = run_stage(CountryLatestAggregator.name(), || {
            CountryLatestAggregator.aggregate(&rows)
        })?;
        let joined = run_stage("join", || Ok(self.joiner.join(polygons, &countries)))?;

        let choropleth = run_stage("style", || {
            let values: Vec<f64> = joined.features.iter().map(|feature| feature.value).collect();
            let (scale, legend) = self.scale_builder.build(&values);
            let features = joined
                .features
                .iter()
                .map(|feature| ChoroplethFeature {
                    country_code: feature.country_code.clone(),
                    geometry: feature.geometry.clone(),
                    value: feature.value,
                    matched: feature.matched,
                    fill_color: scale.color_for(feature.value),
                    tooltip: self.tooltips.build(feature),
                    attributes: feature.attributes.clone(),
                })
                .collect();

            Ok(ChoroplethView {
                title: self.localizer.message(MessageKey::MapTitle)?,
                layer_name: self.localizer.message(MessageKey::MapLayerName)?,
                features,
                legend,
                style: FeatureStyle::BASE,
                highlight: FeatureStyle::HIGHLIGHT,
            })
        })?;

        let time_series = TimeSeriesView {
            title: self.localizer.message(MessageKey::ChartTitle)?,
            x_label: self.localizer.message(MessageKey::ChartXLabel)?,
            y_label: self.localizer.message(MessageKey::ChartYLabel)?,
            date_format: DATE_FORMAT.to_string(),
            points: daily,
        };
        let table = self
            .projector
            .table(self.localizer.message(MessageKey::TableTitle)?, rows);

        info!(
            rows = table.rows.len(),
            days = time_series.points.len(),
            features = choropleth.features.len(),
            warnings = joined.warnings.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            table,
            time_series,
            choropleth,
            warnings: joined.warnings,
        })
    }

    /// Localized text for a warning.
    pub fn describe_warning(&self, warning: &PipelineWarning) -> Result<String> {
        match warning {
            PipelineWarning::JoinAmbiguity {
                country_code,
                matches,
            } => {
                let mut args = FluentArgs::new();
                args.set("code", country_code.to_string());
                args.set("count", *matches);
                self.localizer
                    .message_with_args(MessageKey::WarningJoinAmbiguity, &args)
            }
        }
    }
}

fn run_stage<T>(stage: &'static str, body: impl FnOnce() -> Result<T>) -> Result<T> {
    let span = info_span!("stage", stage);
    let _entered = span.enter();
    let started = Instant::now();
    let result = body().map_err(|err| err.in_stage(stage));
    debug!(elapsed_us = started.elapsed().as_micros(), ok = result.is_ok(), "Stage finished");
    result
}
