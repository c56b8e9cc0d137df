//! Supported locales and their number conventions.

use atlas_common::{format_grouped, AtlasError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unic_langid::LanguageIdentifier;

/// Supported locales
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// Spanish, the language of the published dashboard.
    #[default]
    #[serde(rename = "es", alias = "es-ES")]
    Spanish,
    /// English.
    #[serde(rename = "en", alias = "en-US")]
    English,
}

impl Locale {
    /// Get the language code for this locale
    pub fn code(self) -> &'static str {
        match self {
            Self::Spanish => "es-ES",
            Self::English => "en-US",
        }
    }

    /// Get the short language code for this locale
    pub fn short_code(self) -> &'static str {
        match self {
            Self::Spanish => "es",
            Self::English => "en",
        }
    }

    /// Parse a locale from a language code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "es" | "es-ES" => Some(Self::Spanish),
            "en" | "en-US" => Some(Self::English),
            _ => None,
        }
    }

    /// Convert to Fluent LanguageIdentifier
    pub fn to_language_identifier(self) -> Result<LanguageIdentifier> {
        self.code().parse().map_err(|_| {
            AtlasError::localization(format!("invalid language identifier '{}'", self.code()), self.code())
        })
    }

    /// Get all supported locales
    pub fn all() -> [Self; 2] {
        [Self::Spanish, Self::English]
    }

    /// Thousands separator.
    pub fn group_separator(self) -> char {
        match self {
            Self::Spanish => '.',
            Self::English => ',',
        }
    }

    /// Decimal separator.
    pub fn decimal_separator(self) -> char {
        match self {
            Self::Spanish => ',',
            Self::English => '.',
        }
    }

    /// Formats a number with this locale's digit grouping.
    pub fn format_number(self, value: f64) -> String {
        format_grouped(value, self.group_separator(), self.decimal_separator())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s).ok_or_else(|| {
            AtlasError::validation_field(format!("unsupported language '{s}'"), "display.language")
        })
    }
}
