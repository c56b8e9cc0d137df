//! # Atlas I18n
//!
//! Localized labels and number formatting using the Fluent localization
//! system for COVID Atlas.
//!
//! Table headers, chart and map titles, tooltip labels and warnings are
//! resolved through embedded Fluent resources for Spanish and English.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod loader;
pub mod locale;
pub mod messages;

pub use fluent_bundle::FluentArgs;
pub use loader::*;
pub use locale::*;
pub use messages::*;
