//! Reductions over projected case records.

use crate::projector::ProjectedRecord;
use atlas_common::{format_date, AtlasError, CountryCode, Measure, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Trait for reducing projected records into a view-specific shape.
pub trait DataAggregator<T> {
    /// Reduces `records` in one pass.
    fn aggregate(&self, records: &[ProjectedRecord]) -> Result<Vec<T>>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Sum of `total_cases` across countries for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    /// Calendar date
    pub date: NaiveDate,
    /// Sum over every country with a value on this date
    pub total_cases_sum: f64,
}

/// Latest cumulative `total_cases` for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryAggregate {
    /// Country code
    pub country_code: CountryCode,
    /// Maximum observed value; `None` when the country never reported one
    pub total_cases_latest: Option<f64>,
}

/// Numeric `total_cases` of a record. Missing cells are `None`; text that is
/// not a number is a validation error.
fn total_cases(record: &ProjectedRecord) -> Result<Option<f64>> {
    match &record.total_cases {
        Measure::Value(value) => Ok(Some(*value)),
        Measure::Missing => Ok(None),
        Measure::Invalid(raw) => Err(AtlasError::validation_field(
            format!(
                "non-numeric total_cases '{raw}' for {} on {}",
                record.country_code,
                format_date(record.date)
            ),
            "total_cases",
        )),
    }
}

/// Sums `total_cases` by date, ascending.
#[derive(Debug, Default, Clone, Copy)]
pub struct DailyTotalsAggregator;

impl DataAggregator<DailyAggregate> for DailyTotalsAggregator {
    #[instrument(skip(self, records), fields(records = records.len()))]
    fn aggregate(&self, records: &[ProjectedRecord]) -> Result<Vec<DailyAggregate>> {
        let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for record in records {
            let slot = sums.entry(record.date).or_insert(0.0);
            if let Some(value) = total_cases(record)? {
                *slot += value;
            }
        }

        let result: Vec<DailyAggregate> = sums
            .into_iter()
            .map(|(date, total_cases_sum)| DailyAggregate {
                date,
                total_cases_sum,
            })
            .collect();

        debug!("Aggregated {} daily totals", result.len());
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "daily_totals"
    }
}

/// Takes the maximum `total_cases` per country, in order of first appearance.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountryLatestAggregator;

impl DataAggregator<CountryAggregate> for CountryLatestAggregator {
    #[instrument(skip(self, records), fields(records = records.len()))]
    fn aggregate(&self, records: &[ProjectedRecord]) -> Result<Vec<CountryAggregate>> {
        let mut result: Vec<CountryAggregate> = Vec::new();
        let mut positions: HashMap<&CountryCode, usize> = HashMap::new();

        for record in records {
            let value = total_cases(record)?;
            let index = *positions.entry(&record.country_code).or_insert_with(|| {
                result.push(CountryAggregate {
                    country_code: record.country_code.clone(),
                    total_cases_latest: None,
                });
                result.len() - 1
            });

            if let Some(value) = value {
                let latest = &mut result[index].total_cases_latest;
                *latest = Some(latest.map_or(value, |current| current.max(value)));
            }
        }

        debug!("Aggregated {} countries", result.len());
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "country_latest"
    }
}
