//! Projection onto the canonical table schema.

use crate::records::CaseRecord;
use atlas_common::{format_date, AtlasError, CountryCode, Field, Measure, Result};
use atlas_i18n::{Localizer, MessageKey};
use chrono::NaiveDate;
use serde::Serialize;

/// A case record restricted to the canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRecord {
    /// `iso_code`
    pub country_code: CountryCode,
    /// `location`
    pub country_name: String,
    /// Calendar date; time of day discarded.
    pub date: NaiveDate,
    /// `total_cases`
    pub total_cases: Measure,
    /// `total_deaths`
    pub total_deaths: Measure,
}

impl ProjectedRecord {
    /// Text of one cell, as written to tabular exports.
    pub fn cell(&self, field: Field) -> String {
        match field {
            Field::CountryCode => self.country_code.to_string(),
            Field::CountryName => self.country_name.clone(),
            Field::Date => format_date(self.date),
            Field::TotalCases => measure_text(&self.total_cases),
            Field::TotalDeaths => measure_text(&self.total_deaths),
        }
    }
}

fn measure_text(measure: &Measure) -> String {
    match measure {
        Measure::Value(value) => value.to_string(),
        Measure::Missing => String::new(),
        Measure::Invalid(raw) => raw.clone(),
    }
}

/// A column of the table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    /// Canonical field.
    pub field: Field,
    /// Display label.
    pub label: String,
}

/// The filtered table, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    /// Heading.
    pub title: String,
    /// Columns, canonical order.
    pub columns: Vec<TableColumn>,
    /// Rows in source order.
    pub rows: Vec<ProjectedRecord>,
}

/// Narrows records to the canonical schema and labels the columns.
#[derive(Debug, Clone)]
pub struct ColumnProjector {
    columns: Vec<TableColumn>,
}

impl ColumnProjector {
    /// Uses `label` to name each canonical field.
    pub fn new(label: impl Fn(Field) -> String) -> Self {
        Self {
            columns: Field::ALL
                .into_iter()
                .map(|field| TableColumn {
                    field,
                    label: label(field),
                })
                .collect(),
        }
    }

    /// Labels the columns in the localizer's language.
    pub fn localized(localizer: &Localizer) -> Result<Self> {
        let columns = Field::ALL
            .into_iter()
            .map(|field| {
                Ok(TableColumn {
                    field,
                    label: localizer.message(header_key(field))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Labelled columns.
    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Projects records, preserving order.
    ///
    /// Numeric fields holding text that is not a number are rejected.
    pub fn project(&self, records: &[&CaseRecord]) -> Result<Vec<ProjectedRecord>> {
        records
            .iter()
            .map(|record| {
                let date = record.date();
                for (field, measure) in [
                    (Field::TotalCases, &record.total_cases),
                    (Field::TotalDeaths, &record.total_deaths),
                ] {
                    if let Measure::Invalid(raw) = measure {
                        return Err(AtlasError::validation_field(
                            format!(
                                "non-numeric {field} '{raw}' for {} on {}",
                                record.country_code,
                                format_date(date)
                            ),
                            field.source_column(),
                        ));
                    }
                }

                Ok(ProjectedRecord {
                    country_code: record.country_code.clone(),
                    country_name: record.country_name.clone(),
                    date,
                    total_cases: record.total_cases.clone(),
                    total_deaths: record.total_deaths.clone(),
                })
            })
            .collect()
    }

    /// Wraps projected rows into a table view.
    pub fn table(&self, title: impl Into<String>, rows: Vec<ProjectedRecord>) -> TableView {
        TableView {
            title: title.into(),
            columns: self.columns.clone(),
            rows,
        }
    }
}

fn header_key(field: Field) -> MessageKey {
    match field {
        Field::CountryCode => MessageKey::TableCountryCode,
        Field::CountryName => MessageKey::TableCountryName,
        Field::Date => MessageKey::TableDate,
        Field::TotalCases => MessageKey::TableTotalCases,
        Field::TotalDeaths => MessageKey::TableTotalDeaths,
    }
}
