//! # Atlas Pipeline
//!
//! Turns a cumulative per-country case table and a set of country polygons
//! into three presentation datasets: a filtered case table, a daily total
//! time series and a colour-coded choropleth layer with tooltips.
//!
//! Sources are loaded through the [`CaseSource`] and [`PolygonSource`]
//! traits and memoized by [`SourceCache`]; the stages themselves are pure
//! and are chained by [`Pipeline::run`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod cache;
pub mod color;
pub mod csv_source;
pub mod filter;
pub mod geojson_source;
pub mod join;
pub mod palette;
pub mod pipeline;
pub mod projector;
pub mod records;
pub mod source;
pub mod tooltip;

pub use aggregator::{
    CountryAggregate, CountryLatestAggregator, DailyAggregate, DailyTotalsAggregator,
    DataAggregator,
};
pub use cache::{CacheConfig, CacheMetrics, SourceCache};
pub use color::{ColorScale, ColorScaleBuilder, Legend};
pub use csv_source::{read_cases, CsvCaseSource};
pub use filter::TemporalFilter;
pub use geojson_source::{parse_polygons, GeoJsonPolygonSource};
pub use join::{GeoJoiner, JoinOutcome, JoinedFeature, PipelineWarning};
pub use palette::{Color, Palette};
pub use pipeline::{
    ChoroplethFeature, ChoroplethView, FeatureStyle, Pipeline, PipelineOutput, PipelineSettings,
    TimeSeriesView,
};
pub use projector::{ColumnProjector, ProjectedRecord, TableColumn, TableView};
pub use records::{CaseRecord, CountryPolygon};
pub use source::{
    CaseSource, InMemoryCaseSource, InMemoryPolygonSource, PolygonSource, SourceFingerprint,
};
pub use tooltip::{TooltipBuilder, TooltipEntry};
