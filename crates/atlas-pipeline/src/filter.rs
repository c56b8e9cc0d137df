//! Date-bound and pseudo-region filtering.

use crate::records::CaseRecord;
use atlas_common::{parse_calendar_date, AtlasError, Result};
use chrono::NaiveDate;
use tracing::debug;

/// Keeps records on or before a maximum date whose code lacks an excluded
/// prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFilter {
    max_date: NaiveDate,
    excluded_prefix: Option<String>,
}

impl TemporalFilter {
    /// Parses `max_date` (`YYYY-MM-DD`). An empty prefix disables exclusion.
    pub fn new(max_date: &str, excluded_prefix: Option<&str>) -> Result<Self> {
        let parsed = parse_calendar_date(max_date).ok_or_else(|| {
            AtlasError::validation_field(format!("unparseable maximum date '{max_date}'"), "max_date")
        })?;
        Ok(Self::from_date(parsed, excluded_prefix))
    }

    /// Builds a filter from an already parsed date.
    pub fn from_date(max_date: NaiveDate, excluded_prefix: Option<&str>) -> Self {
        Self {
            max_date,
            excluded_prefix: excluded_prefix
                .filter(|prefix| !prefix.is_empty())
                .map(str::to_string),
        }
    }

    /// Inclusive upper bound.
    pub fn max_date(&self) -> NaiveDate {
        self.max_date
    }

    /// Active exclusion prefix.
    pub fn excluded_prefix(&self) -> Option<&str> {
        self.excluded_prefix.as_deref()
    }

    /// Whether `record` passes.
    pub fn keeps(&self, record: &CaseRecord) -> bool {
        record.date() <= self.max_date
            && self
                .excluded_prefix
                .as_deref()
                .map_or(true, |prefix| !record.country_code.has_prefix(prefix))
    }

    /// Records that pass, in input order.
    pub fn apply<'a>(&self, records: &'a [CaseRecord]) -> Vec<&'a CaseRecord> {
        let kept: Vec<&CaseRecord> = records.iter().filter(|record| self.keeps(record)).collect();
        debug!(
            kept = kept.len(),
            dropped = records.len() - kept.len(),
            max_date = %self.max_date,
            "Filtered case records"
        );
        kept
    }
}
