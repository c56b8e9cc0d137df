//! Typed message keys and the localizer that resolves them.

use crate::loader::FluentLoader;
use crate::locale::Locale;
use atlas_common::{AtlasError, Result};
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource};
use std::fmt;

/// Every message the atlas renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// Heading of the case table.
    TableTitle,
    /// Column header for `iso_code`.
    TableCountryCode,
    /// Column header for `location`.
    TableCountryName,
    /// Column header for `date`.
    TableDate,
    /// Column header for `total_cases`.
    TableTotalCases,
    /// Column header for `total_deaths`.
    TableTotalDeaths,
    /// Title of the time-series chart.
    ChartTitle,
    /// X axis label of the time-series chart.
    ChartXLabel,
    /// Y axis label of the time-series chart.
    ChartYLabel,
    /// Heading of the map.
    MapTitle,
    /// Name of the choropleth layer.
    MapLayerName,
    /// Default legend caption.
    LegendCaption,
    /// Tooltip label for the country code.
    TooltipCountry,
    /// Tooltip label for the joined value.
    TooltipTotalCases,
    /// Warning emitted for ambiguous joins; takes `code` and `count`.
    WarningJoinAmbiguity,
}

impl MessageKey {
    /// All keys, for completeness checks.
    pub const ALL: [Self; 15] = [
        Self::TableTitle,
        Self::TableCountryCode,
        Self::TableCountryName,
        Self::TableDate,
        Self::TableTotalCases,
        Self::TableTotalDeaths,
        Self::ChartTitle,
        Self::ChartXLabel,
        Self::ChartYLabel,
        Self::MapTitle,
        Self::MapLayerName,
        Self::LegendCaption,
        Self::TooltipCountry,
        Self::TooltipTotalCases,
        Self::WarningJoinAmbiguity,
    ];

    /// Fluent message identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::TableTitle => "table-title",
            Self::TableCountryCode => "table-country-code",
            Self::TableCountryName => "table-country-name",
            Self::TableDate => "table-date",
            Self::TableTotalCases => "table-total-cases",
            Self::TableTotalDeaths => "table-total-deaths",
            Self::ChartTitle => "chart-title",
            Self::ChartXLabel => "chart-x-label",
            Self::ChartYLabel => "chart-y-label",
            Self::MapTitle => "map-title",
            Self::MapLayerName => "map-layer-name",
            Self::LegendCaption => "legend-caption",
            Self::TooltipCountry => "tooltip-country",
            Self::TooltipTotalCases => "tooltip-total-cases",
            Self::WarningJoinAmbiguity => "warning-join-ambiguity",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Resolves messages and formats numbers for one locale.
pub struct Localizer {
    locale: Locale,
    bundle: FluentBundle<FluentResource>,
}

impl fmt::Debug for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer")
            .field("locale", &self.locale)
            .field("bundle", &"FluentBundle<FluentResource>")
            .finish()
    }
}

impl Localizer {
    /// Builds a localizer for `locale`.
    pub fn new(locale: Locale) -> Result<Self> {
        Ok(Self {
            locale,
            bundle: FluentLoader::load_bundle(locale)?,
        })
    }

    /// The active locale.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Formats a message that takes no arguments.
    pub fn message(&self, key: MessageKey) -> Result<String> {
        self.format(key, None)
    }

    /// Formats a message with arguments.
    pub fn message_with_args(&self, key: MessageKey, args: &FluentArgs<'_>) -> Result<String> {
        self.format(key, Some(args))
    }

    fn format(&self, key: MessageKey, args: Option<&FluentArgs<'_>>) -> Result<String> {
        let pattern = self
            .bundle
            .get_message(key.id())
            .and_then(|message| message.value())
            .ok_or_else(|| {
                AtlasError::localization(format!("message '{key}' not found"), self.locale.code())
            })?;

        let mut errors = Vec::new();
        let formatted = self.bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            return Err(AtlasError::localization(
                format!("failed to format '{key}': {errors:?}"),
                self.locale.code(),
            ));
        }
        Ok(formatted.into_owned())
    }
}
