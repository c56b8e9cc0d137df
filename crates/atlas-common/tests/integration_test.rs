//! Integration tests for atlas-common crate.

use atlas_common::{
    format_date, format_grouped, parse_calendar_date, AtlasError, CountryCode, Field, Measure,
};
use chrono::NaiveDate;
use proptest::prelude::*;

#[test]
fn test_country_code_display() {
    let code = CountryCode::from("ARG");
    assert_eq!(format!("{}", code), "ARG");
}

#[test]
fn test_date_roundtrip() {
    let date = NaiveDate::from_ymd_opt(2024, 8, 4).unwrap();
    assert_eq!(format_date(date), "2024-08-04");
    assert_eq!(parse_calendar_date("2024-08-04"), Some(date));
}

#[test]
fn test_field_source_columns() {
    let columns: Vec<&str> = Field::ALL.iter().map(|f| f.source_column()).collect();
    assert_eq!(
        columns,
        vec!["iso_code", "location", "date", "total_cases", "total_deaths"]
    );
}

#[test]
fn test_validation_error_keeps_field() {
    match AtlasError::validation_field("unparseable date", "max_date") {
        AtlasError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("max_date")),
        other => panic!("Expected Validation error variant, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn test_grouped_digits_survive(n in 0u64..10_000_000_000) {
        let formatted = format_grouped(n as f64, ',', '.');
        let digits: String = formatted.chars().filter(char::is_ascii_digit).collect();
        prop_assert_eq!(digits, n.to_string());
    }

    #[test]
    fn test_measure_parse_finite_numbers(value in -1.0e9f64..1.0e9) {
        let parsed = Measure::parse(&value.to_string());
        prop_assert_eq!(parsed.value(), Some(value));
    }
}
