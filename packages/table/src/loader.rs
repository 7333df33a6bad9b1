//! CSV loader for property tables.
//!
//! Reads a delimited text export of the property spreadsheet, normalizes the
//! header row, and maps every data row onto a [`PropertyRecord`]. Columns
//! that are not part of the canonical set are ignored; canonical columns
//! that are absent simply leave the corresponding record fields empty, so
//! each analysis can decide for itself whether it has what it needs.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use predial_property_models::{Column, PropertyRecord};

use crate::normalize::normalize_headers;
use crate::progress::ProgressCallback;
use crate::{PropertyTable, TableError};

/// Reader that loads a [`PropertyTable`] from CSV.
#[derive(Debug, Clone)]
pub struct CsvTableReader {
    /// Field delimiter byte (defaults to `,`).
    delimiter: u8,
    /// Optional cap on the number of records to read.
    max_records: Option<u64>,
}

impl Default for CsvTableReader {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvTableReader {
    /// Creates a comma-delimited reader with no record limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: b',',
            max_records: None,
        }
    }

    /// Sets the field delimiter (e.g. `b';'` for spreadsheet exports made
    /// with a comma decimal separator).
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Limits the number of records that will be read.
    #[must_use]
    pub const fn with_max_records(mut self, max: u64) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Opens and reads the CSV file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be opened or is not valid
    /// CSV.
    pub fn read_path(
        &self,
        path: &Path,
        progress: &dyn ProgressCallback,
    ) -> Result<PropertyTable, TableError> {
        log::debug!("Opening property table {}", path.display());
        let file = std::fs::File::open(path)?;
        let table = self.read(file, progress)?;
        log::info!(
            "Loaded {} property records from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Reads a property table from any byte source.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the input has no header row or a row cannot
    /// be decoded.
    pub fn read<R: Read>(
        &self,
        reader: R,
        progress: &dyn ProgressCallback,
    ) -> Result<PropertyTable, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let raw_headers = reader.headers()?.clone();
        if raw_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::NoHeader);
        }

        let headers = normalize_headers(raw_headers.iter());
        let positions = column_positions(&headers);
        log::debug!(
            "Recognized {} of {} columns: {:?}",
            positions.len(),
            headers.len(),
            positions.keys().collect::<Vec<_>>()
        );

        progress.set_message("Reading property records".to_owned());

        let mut unparseable: BTreeMap<Column, u64> = BTreeMap::new();
        let mut records = Vec::new();

        for (row, result) in reader.records().enumerate() {
            if let Some(max) = self.max_records
                && records.len() as u64 >= max
            {
                log::info!("Reached max_records limit ({max}), stopping CSV read");
                break;
            }

            let raw = result?;
            let cells = RowCells {
                raw: &raw,
                positions: &positions,
            };

            let mut number = |column: Column| {
                let value = cells.text(column)?;
                let parsed = parse_number(value);
                if parsed.is_none() {
                    *unparseable.entry(column).or_default() += 1;
                }
                parsed
            };

            records.push(PropertyRecord {
                row,
                district: cells.owned(Column::District),
                urban_sector: cells.owned(Column::UrbanSector),
                horizontal_property: cells.owned(Column::HorizontalProperty),
                sector: cells.owned(Column::Sector),
                payment_flag: cells.owned(Column::PaymentFlag),
                financing_flag: cells.owned(Column::FinancingFlag),
                tax_due: number(Column::TaxDue),
                collected: number(Column::Collected),
                assessed_value: number(Column::AssessedValue),
                built_area: number(Column::BuiltArea),
                economic_use: cells.owned(Column::EconomicUse),
                latitude: number(Column::Latitude),
                longitude: number(Column::Longitude),
            });
            progress.inc(1);
        }

        for (column, count) in &unparseable {
            log::warn!("{count} value(s) in column '{column}' are not numbers and were treated as missing");
        }

        progress.finish(format!("Read {} property records", records.len()));

        Ok(PropertyTable::new(headers, records))
    }
}

/// Maps each recognized canonical column to its first position in the
/// header row.
fn column_positions(headers: &[String]) -> BTreeMap<Column, usize> {
    let mut positions = BTreeMap::new();
    for (i, header) in headers.iter().enumerate() {
        let Ok(column) = header.parse::<Column>() else {
            continue;
        };
        if positions.contains_key(&column) {
            log::warn!("Duplicate column '{header}' at position {i}, keeping the first occurrence");
            continue;
        }
        positions.insert(column, i);
    }
    positions
}

/// Cell accessor for one data row.
struct RowCells<'a> {
    raw: &'a StringRecord,
    positions: &'a BTreeMap<Column, usize>,
}

impl<'a> RowCells<'a> {
    fn text(&self, column: Column) -> Option<&'a str> {
        let index = *self.positions.get(&column)?;
        self.raw
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn owned(&self, column: Column) -> Option<String> {
        self.text(column).map(str::to_owned)
    }
}

/// Parses a numeric cell, tolerating a currency sign and embedded spaces.
///
/// Non-finite results count as unparseable.
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ' ')).collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}
