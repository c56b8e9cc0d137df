//! Fluent bundle loading from embedded resources.

use crate::locale::Locale;
use atlas_common::{AtlasError, Result};
use fluent_bundle::{FluentBundle, FluentResource};
use tracing::debug;

const SPANISH_FTL: &str = include_str!("../locales/es/atlas.ftl");
const ENGLISH_FTL: &str = include_str!("../locales/en/atlas.ftl");

/// Fluent bundle loader.
pub struct FluentLoader;

impl FluentLoader {
    /// Raw Fluent source for a locale.
    pub fn resource(locale: Locale) -> &'static str {
        match locale {
            Locale::Spanish => SPANISH_FTL,
            Locale::English => ENGLISH_FTL,
        }
    }

    /// Parses the embedded resource and builds a bundle for `locale`.
    pub fn load_bundle(locale: Locale) -> Result<FluentBundle<FluentResource>> {
        let resource = FluentResource::try_new(Self::resource(locale).to_string()).map_err(
            |(_, errors)| {
                AtlasError::localization(
                    format!("failed to parse Fluent resource: {errors:?}"),
                    locale.code(),
                )
            },
        )?;

        let mut bundle = FluentBundle::new(vec![locale.to_language_identifier()?]);
        // Plain strings for tables and JSON; no bidi isolation marks.
        bundle.set_use_isolating(false);
        bundle.add_resource(resource).map_err(|errors| {
            AtlasError::localization(format!("failed to add Fluent resource: {errors:?}"), locale.code())
        })?;

        debug!(locale = %locale, "Loaded Fluent bundle");
        Ok(bundle)
    }
}
