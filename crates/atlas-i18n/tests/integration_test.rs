//! Integration tests for atlas-i18n crate.
//!
//! These tests verify that every locale resolves every message key.

use atlas_i18n::{FluentArgs, Locale, Localizer, MessageKey};

#[test]
fn test_every_locale_has_every_message() {
    for locale in Locale::all() {
        let localizer = Localizer::new(locale).unwrap();
        for key in MessageKey::ALL {
            let result = if key == MessageKey::WarningJoinAmbiguity {
                let mut args = FluentArgs::new();
                args.set("code", "CAN");
                args.set("count", 3);
                localizer.message_with_args(key, &args)
            } else {
                localizer.message(key)
            };
            let text = result.unwrap_or_else(|e| panic!("{locale}: {key}: {e}"));
            assert!(!text.trim().is_empty(), "{locale}: {key} is empty");
        }
    }
}

#[test]
fn test_table_headers_per_locale() {
    let headers = |locale| {
        let localizer = Localizer::new(locale).unwrap();
        [
            MessageKey::TableCountryCode,
            MessageKey::TableCountryName,
            MessageKey::TableDate,
            MessageKey::TableTotalCases,
            MessageKey::TableTotalDeaths,
        ]
        .map(|key| localizer.message(key).unwrap())
    };

    assert_eq!(
        headers(Locale::Spanish),
        ["Código ISO", "País", "Fecha", "Casos totales", "Muertes totales"]
    );
    assert_eq!(
        headers(Locale::English),
        ["Country code", "Country", "Date", "Total cases", "Total deaths"]
    );
}
