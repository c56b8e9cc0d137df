//! # Atlas Config
//!
//! Type-safe configuration management for COVID Atlas.
//!
//! Configuration is read from YAML or TOML, overlaid with `ATLAS_*`
//! environment variables and validated before any data is touched.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use defaults::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
