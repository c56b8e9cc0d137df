//! Shared parsing and formatting helpers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Calendar date format used on every surface (`2024-08-04`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Parses a date or a date with time of day.
///
/// Plain dates resolve to midnight.
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Some(date) = parse_calendar_date(input) {
        return Some(date.and_time(NaiveTime::default()));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a number with digit grouping.
///
/// Integral values print without decimals; others print with up to two
/// decimals, trailing zeros removed.
pub fn format_grouped(value: f64, group_separator: char, decimal_separator: char) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // Beyond 1e15 an f64 has no fractional digits left to round, and
    // scaling by 100 could overflow.
    let rounded = if value.abs() >= 1e15 {
        value
    } else {
        (value * 100.0).round() / 100.0
    };
    let negative = rounded < 0.0;
    let fixed = format!("{:.2}", rounded.abs());
    let (integral, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(integral.len() + integral.len() / 3 + 4);
    for (index, digit) in integral.chars().enumerate() {
        if index > 0 && (integral.len() - index) % 3 == 0 {
            grouped.push(group_separator);
        }
        grouped.push(digit);
    }

    if !fraction.is_empty() {
        grouped.push(decimal_separator);
        grouped.push_str(fraction);
    }
    if negative && grouped.chars().any(|c| c.is_ascii_digit() && c != '0') {
        grouped.insert(0, '-');
    }
    grouped
}
