#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Indicator engine for municipal property-tax tables.
//!
//! The engine is a pure function of a loaded [`predial_table::PropertyTable`],
//! a [`predial_analytics_models::FilterSelection`] and an
//! [`config::AnalysisConfig`]. The table is filtered once into a
//! [`filter::PropertyView`], and each analysis reads that view
//! independently and returns a typed report. Nothing is cached between
//! runs; the caller re-runs the pipeline whenever the filters or the
//! uploaded table change.

pub mod cadastral;
pub mod collection;
pub mod compliance;
pub mod config;
pub mod dashboard;
pub mod delinquency;
pub mod export;
pub mod filter;
mod markers;
pub mod risk;
pub mod scenario;
pub mod stats;

#[cfg(test)]
mod fixtures;

pub use markers::money;

use predial_analytics_models::Analysis;
use predial_property_models::Column;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The table lacks columns an analysis needs. Scoped to that analysis.
    #[error("{analysis} requires missing column(s): {}", join_columns(.columns))]
    MissingColumns {
        /// The analysis that cannot run.
        analysis: Analysis,
        /// The absent columns.
        columns: Vec<Column>,
    },

    /// A filter was requested on a column the table does not have.
    #[error("Cannot filter on missing column '{column}'")]
    MissingFilterColumn {
        /// The absent column.
        column: Column,
    },

    /// Configuration values are out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration TOML could not be parsed.
    #[error("Invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serializing a report failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(Column::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}
