#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loading and normalization of property tables.
//!
//! A [`PropertyTable`] is the single in-memory table that every dashboard
//! run starts from. It is built once per upload by [`loader::CsvTableReader`]
//! and then passed by reference into the analysis pipeline; nothing in the
//! toolchain keeps it in global state.

pub mod loader;
pub mod normalize;
pub mod progress;

use std::collections::BTreeSet;

use predial_property_models::{Column, PropertyRecord};
use thiserror::Error;

/// Errors that can occur while loading a property table.
#[derive(Debug, Error)]
pub enum TableError {
    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input has no usable header row.
    #[error("Table has no header row")]
    NoHeader,
}

/// A loaded property table with normalized headers.
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    headers: Vec<String>,
    columns: BTreeSet<Column>,
    records: Vec<PropertyRecord>,
}

impl PropertyTable {
    /// Builds a table from normalized headers and the records read under
    /// them. Headers that name a canonical [`Column`] mark it as present.
    #[must_use]
    pub fn new(headers: Vec<String>, records: Vec<PropertyRecord>) -> Self {
        let columns = headers.iter().filter_map(|h| h.parse().ok()).collect();
        Self {
            headers,
            columns,
            records,
        }
    }

    /// Builds a table directly from records, declaring which columns the
    /// source provided.
    #[must_use]
    pub fn from_records(
        columns: impl IntoIterator<Item = Column>,
        records: Vec<PropertyRecord>,
    ) -> Self {
        let columns: BTreeSet<Column> = columns.into_iter().collect();
        Self {
            headers: columns.iter().map(ToString::to_string).collect(),
            columns,
            records,
        }
    }

    /// Normalized header row, including non-canonical headers.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Canonical columns present in the source.
    #[must_use]
    pub const fn columns(&self) -> &BTreeSet<Column> {
        &self.columns
    }

    /// Whether the source provided `column`.
    #[must_use]
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the subset of `required` that the source did not provide,
    /// in the order given.
    #[must_use]
    pub fn missing_columns(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|column| !self.has_column(*column))
            .collect()
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
