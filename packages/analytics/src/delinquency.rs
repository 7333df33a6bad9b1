//! Segmentation of the delinquent portfolio.
//!
//! Delinquents are the records that have not paid. Their assessed value,
//! tax due and built area are binned into quintiles fitted over the
//! delinquent subset only, and records above the subset's median value or
//! area are flagged as critical.

use std::collections::BTreeMap;

use predial_analytics_models::{
    Analysis, CategoryCount, DelinquencyReport, DelinquentSegment, MarkerColor, PropertySummary,
};
use predial_property_models::{Column, PropertyRecord};

use crate::AnalyticsError;
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats;

/// Columns the delinquency segmentation reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::PaymentFlag,
    Column::AssessedValue,
    Column::TaxDue,
    Column::BuiltArea,
    Column::EconomicUse,
    Column::Latitude,
    Column::Longitude,
];

/// Category used for delinquents without an economic use.
const UNKNOWN_USE: &str = "Unknown";

/// Segments the delinquent portfolio.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn delinquency(view: &PropertyView<'_>) -> Result<DelinquencyReport, AnalyticsError> {
    view.require(Analysis::Delinquency, REQUIRED_COLUMNS)?;

    let delinquents = view.delinquents();

    let assessed: Vec<Option<f64>> = delinquents.iter().map(|r| r.assessed_value).collect();
    let due: Vec<Option<f64>> = delinquents.iter().map(|r| r.tax_due).collect();
    let area: Vec<Option<f64>> = delinquents.iter().map(|r| r.built_area).collect();

    let median_assessed_value = stats::median(&stats::present(assessed.iter().copied()));
    let median_built_area = stats::median(&stats::present(area.iter().copied()));

    let (assessed_bins, assessed_value_bins) = stats::quintile_bins(&assessed);
    let (due_bins, tax_due_bins) = stats::quintile_bins(&due);
    let (area_bins, built_area_bins) = stats::quintile_bins(&area);

    let mut layer = LayerBuilder::new("Delinquent properties");
    let mut segments = Vec::with_capacity(delinquents.len());

    for (i, record) in delinquents.iter().enumerate() {
        let critical = stats::exceeds(record.assessed_value, median_assessed_value)
            || stats::exceeds(record.built_area, median_built_area);

        layer.add(record.coordinates(), MarkerColor::Crimson, || {
            format!(
                "<b>Delinquent</b><br>District: {}<br>Economic use: {}<br>Assessed value: {}<br>Tax due: {}<br>Built area: {}",
                markers::text(record.district.as_deref()),
                markers::text(record.economic_use.as_deref()),
                markers::money(record.assessed_value),
                markers::money(record.tax_due),
                markers::amount(record.built_area),
            )
        });

        segments.push(DelinquentSegment {
            property: PropertySummary::from(*record),
            assessed_value_quintile: assessed_bins[i],
            tax_due_quintile: due_bins[i],
            built_area_quintile: area_bins[i],
            critical,
        });
    }

    let critical_count = segments.iter().filter(|segment| segment.critical).count();

    let report = DelinquencyReport {
        delinquent_count: delinquents.len() as u64,
        critical_count: critical_count as u64,
        median_assessed_value,
        median_built_area,
        assessed_value_bins,
        tax_due_bins,
        built_area_bins,
        segments,
        by_economic_use: count_by_economic_use(&delinquents),
        map: layer.finish(),
    };

    log::debug!(
        "Delinquency: {} delinquent, {} critical",
        report.delinquent_count,
        report.critical_count
    );

    Ok(report)
}

/// Counts records per economic use, largest count first and ties by name.
fn count_by_economic_use(records: &[&PropertyRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *counts
            .entry(record.economic_use.as_deref().unwrap_or(UNKNOWN_USE))
            .or_default() += 1;
    }

    let mut counts: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_owned(),
            count,
        })
        .collect();
    // Stable, so equal counts keep the map's name order.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
