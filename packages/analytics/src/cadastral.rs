//! Cadastral update opportunities.
//!
//! Two independent flags:
//!
//! * zero built area with an assessed value above the median of the
//!   zero-built-area subset, a hint of unregistered construction;
//! * unpaid with a tax due above the median tax due of the whole view.

use predial_analytics_models::{Analysis, CadastralReport, MarkerColor, PropertySummary};
use predial_property_models::{Column, PropertyRecord};

use crate::AnalyticsError;
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats;

/// Columns the cadastral analysis reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::BuiltArea,
    Column::AssessedValue,
    Column::PaymentFlag,
    Column::TaxDue,
    Column::Latitude,
    Column::Longitude,
];

/// Detects cadastral update opportunities.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn cadastral(view: &PropertyView<'_>) -> Result<CadastralReport, AnalyticsError> {
    view.require(Analysis::Cadastral, REQUIRED_COLUMNS)?;

    let records = view.records();

    let zero_area: Vec<&PropertyRecord> = records
        .iter()
        .copied()
        .filter(|record| record.has_zero_built_area())
        .collect();
    let zero_area_median_assessed_value = stats::median(&stats::present(
        zero_area.iter().map(|record| record.assessed_value),
    ));
    let zero_area_high_value: Vec<&PropertyRecord> = zero_area
        .iter()
        .copied()
        .filter(|record| stats::exceeds(record.assessed_value, zero_area_median_assessed_value))
        .collect();

    let median_tax_due = stats::median(&view.numbers(Column::TaxDue));
    let unpaid_high_due: Vec<&PropertyRecord> = records
        .iter()
        .copied()
        .filter(|record| !record.is_paid() && stats::exceeds(record.tax_due, median_tax_due))
        .collect();

    let mut zero_area_layer = LayerBuilder::new("Zero built area, high value");
    for record in &zero_area_high_value {
        zero_area_layer.add(record.coordinates(), MarkerColor::Orange, || {
            format!(
                "<b>Cadastral opportunity</b><br>District: {}<br>Assessed value: {}<br>Built area: {}",
                markers::text(record.district.as_deref()),
                markers::money(record.assessed_value),
                markers::amount(record.built_area),
            )
        });
    }

    let mut unpaid_layer = LayerBuilder::new("Unpaid, high tax due");
    for record in &unpaid_high_due {
        unpaid_layer.add(record.coordinates(), MarkerColor::Red, || {
            format!(
                "<b>High tax unpaid</b><br>District: {}<br>Tax due: {}<br>Assessed value: {}",
                markers::text(record.district.as_deref()),
                markers::money(record.tax_due),
                markers::money(record.assessed_value),
            )
        });
    }

    let report = CadastralReport {
        zero_built_area_count: zero_area.len() as u64,
        zero_area_median_assessed_value,
        median_tax_due,
        zero_area_high_value_count: zero_area_high_value.len() as u64,
        zero_area_high_value: summaries(&zero_area_high_value),
        unpaid_high_due_count: unpaid_high_due.len() as u64,
        unpaid_high_due: summaries(&unpaid_high_due),
        zero_area_layer: zero_area_layer.finish(),
        unpaid_layer: unpaid_layer.finish(),
    };

    log::debug!(
        "Cadastral: {} zero-area ({} high value), {} unpaid above median due",
        report.zero_built_area_count,
        report.zero_area_high_value_count,
        report.unpaid_high_due_count
    );

    Ok(report)
}

fn summaries(records: &[&PropertyRecord]) -> Vec<PropertySummary> {
    records.iter().map(|record| PropertySummary::from(*record)).collect()
}
