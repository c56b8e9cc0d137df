//! Integration tests for atlas-pipeline crate.
//!
//! These tests run the pipeline over file-backed sources and check the
//! aggregation and join properties over generated case tables.

use atlas_common::test_utils::property_testing::{
    country_code_strategy, date_strategy, total_cases_strategy,
};
use atlas_common::test_utils::{init_test_logging, source_fixtures, write_temp_file};
use atlas_common::{CountryCode, Measure};
use atlas_pipeline::{
    CaseRecord, CountryLatestAggregator, CountryPolygon, CsvCaseSource, DailyTotalsAggregator,
    DataAggregator, GeoJoiner, GeoJsonPolygonSource, Pipeline, PipelineSettings, SourceCache,
    TemporalFilter,
};
use chrono::NaiveDate;
use geo::polygon;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;

fn fixture_settings() -> PipelineSettings {
    PipelineSettings {
        max_date: "2024-01-03".to_string(),
        excluded_code_prefix: Some("OWID".to_string()),
        ..PipelineSettings::default()
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn unit_square(code: &str) -> CountryPolygon {
    CountryPolygon::new(
        code,
        polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)],
    )
}

#[test]
fn test_file_sources_end_to_end() {
    init_test_logging();

    let cases_file = write_temp_file(source_fixtures::cases_csv().as_bytes(), ".csv");
    let polygons_file = write_temp_file(source_fixtures::countries_geojson().as_bytes(), ".geojson");
    let cases_source = CsvCaseSource::new(cases_file.path());
    let polygon_source = GeoJsonPolygonSource::new(polygons_file.path(), "ADM0_ISO");

    let cache = SourceCache::default();
    let cases = cache.cases(&cases_source).unwrap();
    let polygons = cache.polygons(&polygon_source).unwrap();
    assert_eq!(cases.len(), 7);
    assert_eq!(polygons.len(), 3);

    let output = Pipeline::new(fixture_settings())
        .unwrap()
        .run(&cases, &polygons)
        .unwrap();

    // OWID_WRL and the out-of-window MEX row are gone.
    assert_eq!(output.table.rows.len(), 5);
    assert!(output.table.rows.iter().all(|row| row.date <= day(3)));

    let series: Vec<(NaiveDate, f64)> = output
        .time_series
        .points
        .iter()
        .map(|point| (point.date, point.total_cases_sum))
        .collect();
    assert_eq!(series, vec![(day(1), 150.0), (day(2), 150.0), (day(3), 70.0)]);

    let values: Vec<(&str, f64, bool)> = output
        .choropleth
        .features
        .iter()
        .map(|feature| (feature.country_code.as_str(), feature.value, feature.matched))
        .collect();
    assert_eq!(
        values,
        vec![("USA", 150.0, true), ("CAN", 70.0, true), ("MEX", 0.0, false)]
    );
    assert_eq!(
        output.choropleth.features[1].attributes.get("NAME"),
        Some(&serde_json::Value::from("Canada"))
    );
    assert_eq!(output.choropleth.features[0].tooltip[1].value, "150");

    // Second lookup is served from memory.
    cache.cases(&cases_source).unwrap();
    assert_eq!(cache.metrics().hits.load(Ordering::Relaxed), 1);
}

#[test]
fn test_output_serializes_without_geometry() {
    let cases = vec![CaseRecord::new("USA", "United States", day(1), 1_234.0, 3.0)];
    let polygons = vec![unit_square("USA"), unit_square("MEX")];
    let output = Pipeline::new(fixture_settings())
        .unwrap()
        .run(&cases, &polygons)
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    let feature = &json["choropleth"]["features"][0];
    assert!(feature.get("geometry").is_none());
    assert_eq!(feature["fill_color"], "#800026");
    assert_eq!(json["choropleth"]["features"][1]["fill_color"], "#ffffcc");
    assert_eq!(json["time_series"]["points"][0]["date"], "2024-01-01");
    assert_eq!(json["choropleth"]["style"]["stroke_color"], "#000000");
}

#[test]
fn test_duplicate_polygons_both_receive_the_value() {
    let cases = vec![CaseRecord::new("FRA", "France", day(1), 10.0, Measure::Missing)];
    let polygons = vec![unit_square("FRA"), unit_square("FRA")];
    let output = Pipeline::new(fixture_settings())
        .unwrap()
        .run(&cases, &polygons)
        .unwrap();

    assert_eq!(output.choropleth.features.len(), 2);
    assert!(output.choropleth.features.iter().all(|f| f.value == 10.0));
    assert!(output.warnings.is_empty());
}

fn record_strategy() -> impl Strategy<Value = CaseRecord> {
    (country_code_strategy(), date_strategy(), total_cases_strategy()).prop_map(
        |(code, date, total_cases)| {
            CaseRecord::new(code.as_str(), code.as_str(), date, total_cases, Measure::Missing)
        },
    )
}

proptest! {
    #[test]
    fn test_filter_respects_bounds(
        records in prop::collection::vec(record_strategy(), 0..60),
        bound in date_strategy(),
    ) {
        let filter = TemporalFilter::from_date(bound, Some("OWID"));
        for record in filter.apply(&records) {
            prop_assert!(record.date() <= bound);
            prop_assert!(!record.country_code.has_prefix("OWID"));
        }
        let kept = records.iter().filter(|r| r.date() <= bound && !r.country_code.has_prefix("OWID")).count();
        prop_assert_eq!(filter.apply(&records).len(), kept);
    }

    #[test]
    fn test_aggregates_conserve_mass_and_maxima(
        records in prop::collection::vec(record_strategy(), 0..60),
    ) {
        let settings = PipelineSettings {
            max_date: "2030-01-01".to_string(),
            excluded_code_prefix: None,
            ..PipelineSettings::default()
        };
        let output = Pipeline::new(settings).unwrap().run(&records, &[]).unwrap();
        let rows = &output.table.rows;

        let total: f64 = records.iter().filter_map(|r| r.total_cases.value()).sum();
        let daily_total: f64 = output.time_series.points.iter().map(|p| p.total_cases_sum).sum();
        prop_assert_eq!(daily_total, total);
        prop_assert!(output.time_series.points.windows(2).all(|w| w[0].date < w[1].date));

        let mut expected: BTreeMap<CountryCode, Option<f64>> = BTreeMap::new();
        for record in &records {
            let slot = expected.entry(record.country_code.clone()).or_insert(None);
            if let Some(value) = record.total_cases.value() {
                *slot = Some(slot.map_or(value, |current: f64| current.max(value)));
            }
        }
        let countries = CountryLatestAggregator.aggregate(rows).unwrap();
        prop_assert_eq!(countries.len(), expected.len());
        for aggregate in countries {
            prop_assert_eq!(Some(&aggregate.total_cases_latest), expected.get(&aggregate.country_code));
        }
    }

    #[test]
    fn test_join_keeps_every_polygon_in_order(
        records in prop::collection::vec(record_strategy(), 0..40),
        codes in prop::collection::vec(country_code_strategy(), 0..12),
    ) {
        let settings = PipelineSettings {
            max_date: "2030-01-01".to_string(),
            excluded_code_prefix: None,
            ..PipelineSettings::default()
        };
        let rows = atlas_pipeline::ColumnProjector::new(|field| field.to_string())
            .project(&records.iter().collect::<Vec<_>>())
            .unwrap();
        let aggregates = CountryLatestAggregator.aggregate(&rows).unwrap();
        let polygons: Vec<CountryPolygon> = codes.iter().map(|code| unit_square(code)).collect();

        let outcome = GeoJoiner::default().join(&polygons, &aggregates);
        prop_assert_eq!(outcome.features.len(), polygons.len());
        for (feature, polygon) in outcome.features.iter().zip(&polygons) {
            prop_assert_eq!(&feature.country_code, &polygon.country_code);
            let expected = aggregates
                .iter()
                .find(|a| a.country_code == polygon.country_code)
                .and_then(|a| a.total_cases_latest)
                .unwrap_or(0.0);
            prop_assert_eq!(feature.value, expected);
        }

        let pipeline = Pipeline::new(settings).unwrap();
        prop_assert_eq!(
            pipeline.run(&records, &polygons).unwrap(),
            pipeline.run(&records, &polygons).unwrap()
        );
        prop_assert!(DailyTotalsAggregator.aggregate(&rows).is_ok());
    }
}
