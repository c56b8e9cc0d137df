//! # Atlas CLI
//!
//! The `covid-atlas` command: loads configuration and sources, runs the
//! pipeline and writes the case table, time series, choropleth and legend
//! into the output directory.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod runner;

pub use error::*;
pub use export::*;
pub use runner::*;
