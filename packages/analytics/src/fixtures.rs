//! Record builders shared by the unit tests.

use predial_property_models::{Column, PropertyRecord};
use predial_table::PropertyTable;

/// An unpaid, unfinanced property in district "A" with coordinates and
/// unremarkable values. Tests override fields with struct update syntax.
#[allow(clippy::cast_precision_loss)]
pub fn property(row: usize) -> PropertyRecord {
    PropertyRecord {
        row,
        district: Some("A".to_owned()),
        urban_sector: Some("1".to_owned()),
        horizontal_property: Some("No".to_owned()),
        sector: Some("01".to_owned()),
        payment_flag: Some("no".to_owned()),
        financing_flag: Some("no".to_owned()),
        tax_due: Some(100.0),
        collected: Some(0.0),
        assessed_value: Some(1_000.0),
        built_area: Some(50.0),
        economic_use: Some("Habitacional".to_owned()),
        latitude: Some(4.0 + row as f64 * 0.001),
        longitude: Some(-74.0),
    }
}

/// Same as [`property`] but marked as paid.
pub fn paid(row: usize) -> PropertyRecord {
    PropertyRecord {
        payment_flag: Some("si".to_owned()),
        ..property(row)
    }
}

/// A table declaring every canonical column.
pub fn table(records: Vec<PropertyRecord>) -> PropertyTable {
    PropertyTable::from_records(Column::all().iter().copied(), records)
}
