//! Filter stage: equality predicates over the loaded table.
//!
//! Produces a [`PropertyView`], a borrowed subset of the table's records
//! that every analysis reads. An empty view is a normal outcome.

use std::collections::BTreeSet;

use predial_analytics_models::{Analysis, FilterOptions, FilterSelection};
use predial_property_models::{Column, PropertyRecord};
use predial_table::PropertyTable;

use crate::AnalyticsError;

/// The records of a table that passed the active filters.
#[derive(Debug, Clone)]
pub struct PropertyView<'a> {
    table: &'a PropertyTable,
    records: Vec<&'a PropertyRecord>,
}

impl<'a> PropertyView<'a> {
    /// A view over every record of `table`.
    #[must_use]
    pub fn all(table: &'a PropertyTable) -> Self {
        Self {
            table,
            records: table.records().iter().collect(),
        }
    }

    /// The records in source order.
    #[must_use]
    pub fn records(&self) -> &[&'a PropertyRecord] {
        &self.records
    }

    /// Number of records in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the view has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that have not paid, in source order.
    #[must_use]
    pub fn delinquents(&self) -> Vec<&'a PropertyRecord> {
        self.records
            .iter()
            .copied()
            .filter(|record| !record.is_paid())
            .collect()
    }

    /// Present values of a numeric column across the view.
    #[must_use]
    pub fn numbers(&self, column: Column) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|record| record.number(column))
            .collect()
    }

    /// Fails with [`AnalyticsError::MissingColumns`] if the underlying table
    /// lacks any of `required`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::MissingColumns`] naming every absent column.
    pub fn require(&self, analysis: Analysis, required: &[Column]) -> Result<(), AnalyticsError> {
        let columns = self.table.missing_columns(required);
        if columns.is_empty() {
            Ok(())
        } else {
            Err(AnalyticsError::MissingColumns { analysis, columns })
        }
    }
}

/// Returns the active predicates of a selection as `(column, value)` pairs.
fn active_predicates(filters: &FilterSelection) -> Vec<(Column, &str)> {
    [
        (Column::District, filters.district.as_deref()),
        (Column::UrbanSector, filters.urban_sector.as_deref()),
        (
            Column::HorizontalProperty,
            filters.horizontal_property.as_deref(),
        ),
    ]
    .into_iter()
    .filter_map(|(column, value)| value.map(|v| (column, v.trim())))
    .collect()
}

/// Keeps the records that match every active filter.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingFilterColumn`] if a filter is active on
/// a column the table does not have.
pub fn apply_filters<'a>(
    table: &'a PropertyTable,
    filters: &FilterSelection,
) -> Result<PropertyView<'a>, AnalyticsError> {
    let predicates = active_predicates(filters);

    if let Some((column, _)) = predicates
        .iter()
        .find(|(column, _)| !table.has_column(*column))
    {
        return Err(AnalyticsError::MissingFilterColumn { column: *column });
    }

    let records: Vec<&PropertyRecord> = table
        .records()
        .iter()
        .filter(|record| {
            predicates
                .iter()
                .all(|(column, value)| record.text(*column) == Some(*value))
        })
        .collect();

    log::info!(
        "Filters kept {} of {} records ({} active)",
        records.len(),
        table.len(),
        predicates.len()
    );

    Ok(PropertyView { table, records })
}

/// Lists the distinct, sorted, non-blank values of each filterable column.
#[must_use]
pub fn filter_options(table: &PropertyTable) -> FilterOptions {
    let distinct = |column: Column| -> Vec<String> {
        table
            .records()
            .iter()
            .filter_map(|record| record.text(column))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    };

    FilterOptions {
        districts: distinct(Column::District),
        urban_sectors: distinct(Column::UrbanSector),
        horizontal_property: distinct(Column::HorizontalProperty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{property, table};

    fn sample() -> PropertyTable {
        table(vec![
            PropertyRecord {
                district: Some("A".to_owned()),
                urban_sector: Some("1".to_owned()),
                horizontal_property: Some("No".to_owned()),
                ..property(0)
            },
            PropertyRecord {
                district: Some("A".to_owned()),
                urban_sector: Some("2".to_owned()),
                horizontal_property: Some("Si".to_owned()),
                ..property(1)
            },
            PropertyRecord {
                district: Some("B".to_owned()),
                urban_sector: Some("1".to_owned()),
                horizontal_property: Some("No".to_owned()),
                ..property(2)
            },
            PropertyRecord {
                district: None,
                urban_sector: None,
                horizontal_property: None,
                ..property(3)
            },
        ])
    }

    fn rows(view: &PropertyView<'_>) -> Vec<usize> {
        view.records().iter().map(|record| record.row).collect()
    }

    #[test]
    fn no_filters_keeps_everything() {
        let table = sample();
        let view = apply_filters(&table, &FilterSelection::default()).unwrap();
        assert_eq!(rows(&view), vec![0, 1, 2, 3]);
    }

    #[test]
    fn active_filters_are_anded() {
        let table = sample();
        let view = apply_filters(
            &table,
            &FilterSelection {
                district: Some("A".to_owned()),
                urban_sector: Some("1".to_owned()),
                horizontal_property: None,
            },
        )
        .unwrap();
        assert_eq!(rows(&view), vec![0]);
    }

    #[test]
    fn unmatched_filter_gives_empty_view() {
        let table = sample();
        let view = apply_filters(
            &table,
            &FilterSelection {
                district: Some("Z".to_owned()),
                ..FilterSelection::default()
            },
        )
        .unwrap();
        assert!(view.is_empty());
        assert!(view.delinquents().is_empty());
        assert!(view.numbers(Column::TaxDue).is_empty());
    }

    #[test]
    fn filter_on_absent_column_is_an_error() {
        let table = PropertyTable::from_records([Column::District], vec![property(0)]);
        let result = apply_filters(
            &table,
            &FilterSelection {
                urban_sector: Some("1".to_owned()),
                ..FilterSelection::default()
            },
        );
        assert!(matches!(
            result,
            Err(AnalyticsError::MissingFilterColumn {
                column: Column::UrbanSector
            })
        ));
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let options = filter_options(&sample());
        assert_eq!(options.districts, vec!["A", "B"]);
        assert_eq!(options.urban_sectors, vec!["1", "2"]);
        assert_eq!(options.horizontal_property, vec!["No", "Si"]);
    }

    #[test]
    fn require_reports_missing_columns() {
        let table = PropertyTable::from_records([Column::TaxDue], vec![property(0)]);
        let view = PropertyView::all(&table);
        assert!(view.require(Analysis::Scenarios, &[Column::TaxDue]).is_ok());
        let err = view
            .require(Analysis::Scenarios, &[Column::TaxDue, Column::PaymentFlag])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "scenarios requires missing column(s): pago_impuesto_predial"
        );
    }
}
