//! Records handed to the pipeline by the sources.

use atlas_common::{CountryCode, Measure};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use geo::Geometry;
use serde_json::{Map, Value};

/// One row of the case table.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    /// `iso_code`
    pub country_code: CountryCode,
    /// `location`
    pub country_name: String,
    /// `date`, with whatever time of day the source carried.
    pub observed_at: NaiveDateTime,
    /// `total_cases`
    pub total_cases: Measure,
    /// `total_deaths`
    pub total_deaths: Measure,
}

impl CaseRecord {
    /// Creates a record observed at midnight of `date`.
    pub fn new(
        country_code: impl Into<CountryCode>,
        country_name: impl Into<String>,
        date: NaiveDate,
        total_cases: impl Into<Measure>,
        total_deaths: impl Into<Measure>,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
            observed_at: date.and_time(NaiveTime::default()),
            total_cases: total_cases.into(),
            total_deaths: total_deaths.into(),
        }
    }

    /// Replaces the observation timestamp.
    #[must_use]
    pub fn observed_at(mut self, observed_at: NaiveDateTime) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Calendar date of the observation.
    pub fn date(&self) -> NaiveDate {
        self.observed_at.date()
    }
}

/// A country outline with its join key.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPolygon {
    /// Join key, matched against [`CaseRecord::country_code`].
    pub country_code: CountryCode,
    /// Polygon or multipolygon.
    pub geometry: Geometry<f64>,
    /// Feature properties as read from the source.
    pub attributes: Map<String, Value>,
}

impl CountryPolygon {
    /// Creates a polygon without attributes.
    pub fn new(country_code: impl Into<CountryCode>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            country_code: country_code.into(),
            geometry: geometry.into(),
            attributes: Map::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_date_drops_time_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let record = CaseRecord::new("USA", "United States", date, 150.0, Measure::Missing)
            .observed_at(date.and_hms_opt(23, 59, 59).unwrap());
        assert_eq!(record.date(), date);
        assert_eq!(record.total_cases.value(), Some(150.0));
        assert!(record.total_deaths.is_missing());
    }

    #[test]
    fn test_polygon_attributes() {
        let square = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)];
        let polygon = CountryPolygon::new("MEX", square).with_attribute("NAME", "Mexico");
        assert_eq!(polygon.attributes["NAME"], Value::from("Mexico"));
        assert!(matches!(polygon.geometry, Geometry::Polygon(_)));
    }
}
