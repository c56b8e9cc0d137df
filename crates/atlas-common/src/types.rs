//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An ISO 3166-1 alpha-3 country code, or an aggregate pseudo-region code
/// such as `OWID_WRL`.
///
/// Codes are compared exactly: no case folding or trimming happens unless
/// [`CountryCode::normalized`] is called explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Creates a code from any string-like value, verbatim.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code begins with `prefix`.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Trimmed, upper-cased copy of the code.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self(self.0.trim().to_uppercase())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for CountryCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

/// How country codes are compared when joining polygons to aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKeyNormalization {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// Trim whitespace and upper-case both sides first.
    TrimUppercase,
}

impl JoinKeyNormalization {
    /// The key `code` is compared under.
    pub fn key(self, code: &CountryCode) -> CountryCode {
        match self {
            Self::Exact => code.clone(),
            Self::TrimUppercase => code.normalized(),
        }
    }
}

/// A numeric cell read from a source table.
///
/// Sources keep whatever they found so that data-quality problems surface at
/// aggregation time with full context instead of being coerced on read.
#[derive(Debug, Clone, PartialEq)]
pub enum Measure {
    /// A finite number.
    Value(f64),
    /// An empty cell or an explicit NaN.
    Missing,
    /// Text that does not parse as a number.
    Invalid(String),
}

impl Measure {
    /// Parses a raw cell.
    ///
    /// Empty cells and `NaN` are [`Measure::Missing`]; finite numbers are
    /// [`Measure::Value`]; everything else is kept as [`Measure::Invalid`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Value(value),
            Ok(_) | Err(_) => Self::Invalid(trimmed.to_string()),
        }
    }

    /// The numeric value, if present.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Missing | Self::Invalid(_) => None,
        }
    }

    /// Whether the cell is empty or NaN.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Missing
        }
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::from)
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => serializer.serialize_f64(*value),
            Self::Missing => serializer.serialize_none(),
            Self::Invalid(raw) => serializer.serialize_str(raw),
        }
    }
}

/// The canonical columns of the case table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// `iso_code`
    CountryCode,
    /// `location`
    CountryName,
    /// `date`
    Date,
    /// `total_cases`
    TotalCases,
    /// `total_deaths`
    TotalDeaths,
}

impl Field {
    /// All canonical fields in table order.
    pub const ALL: [Self; 5] = [
        Self::CountryCode,
        Self::CountryName,
        Self::Date,
        Self::TotalCases,
        Self::TotalDeaths,
    ];

    /// Column name in the source table.
    pub fn source_column(self) -> &'static str {
        match self {
            Self::CountryCode => "iso_code",
            Self::CountryName => "location",
            Self::Date => "date",
            Self::TotalCases => "total_cases",
            Self::TotalDeaths => "total_deaths",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_column())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.source_column() == s)
            .ok_or_else(|| format!("unknown column: {s}"))
    }
}
