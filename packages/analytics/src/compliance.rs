//! Tax compliance indicators.
//!
//! A property complies when its payment flag is affirmative. The analysis
//! reports the global compliance and collection rates, aggregates them per
//! district, and ranks districts into compliance quintiles computed fresh
//! over the districts present in the current view.

use std::collections::BTreeMap;

use predial_analytics_models::{Analysis, ComplianceReport, DistrictGroup, MarkerColor};
use predial_property_models::{Column, Coordinates, PropertyRecord};

use crate::AnalyticsError;
use crate::config::{AnalysisConfig, ComplianceColorThresholds};
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats::{self, QUINTILES, QuantileBins};

/// Columns the compliance analysis reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::District,
    Column::PaymentFlag,
    Column::TaxDue,
    Column::Collected,
    Column::Latitude,
    Column::Longitude,
];

/// Computes compliance metrics and per-district aggregates.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn compliance(
    view: &PropertyView<'_>,
    config: &AnalysisConfig,
) -> Result<ComplianceReport, AnalyticsError> {
    view.require(Analysis::Compliance, REQUIRED_COLUMNS)?;

    let records = view.records();
    let total_due = stats::sum(records.iter().map(|record| record.tax_due));
    let total_collected = stats::sum(records.iter().map(|record| record.collected));
    let indicators: Vec<f64> = records.iter().map(|record| indicator(record)).collect();

    let (districts, district_bins) = group_by_district(records);

    let mut layer = LayerBuilder::new("Compliance by district");
    for group in &districts {
        let percent = group.compliance_rate * 100.0;
        layer.add(
            group.centroid,
            compliance_color(percent, config.compliance_colors),
            || {
                format!(
                    "District: {}<br>Compliance: {percent:.2}%<br>Collected: {}<br>Billed: {}",
                    group.district,
                    markers::money(Some(group.total_collected)),
                    markers::money(Some(group.total_due)),
                )
            },
        );
    }

    let report = ComplianceReport {
        total_properties: records.len() as u64,
        total_due,
        total_collected,
        compliance_rate: stats::mean(&indicators),
        collection_ratio: stats::ratio(total_collected, total_due),
        districts,
        district_bins,
        map: layer.finish(),
    };

    log::debug!(
        "Compliance: {} properties, rate {:?}, {} districts in {} bins",
        report.total_properties,
        report.compliance_rate,
        report.districts.len(),
        report.district_bins
    );

    Ok(report)
}

/// 1.0 for a property that paid, 0.0 otherwise.
fn indicator(record: &PropertyRecord) -> f64 {
    if record.is_paid() { 1.0 } else { 0.0 }
}

/// Marker color for a district's compliance percentage.
#[must_use]
pub fn compliance_color(percent: f64, thresholds: ComplianceColorThresholds) -> MarkerColor {
    if percent > thresholds.high {
        MarkerColor::Green
    } else if percent > thresholds.medium {
        MarkerColor::Orange
    } else {
        MarkerColor::Red
    }
}

#[derive(Default)]
struct DistrictAccumulator {
    properties: u64,
    paid: u64,
    due: f64,
    collected: f64,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
}

impl DistrictAccumulator {
    fn push(&mut self, record: &PropertyRecord) {
        self.properties += 1;
        if record.is_paid() {
            self.paid += 1;
        }
        self.due += record.tax_due.unwrap_or_default();
        self.collected += record.collected.unwrap_or_default();
        self.latitudes.extend(record.latitude);
        self.longitudes.extend(record.longitude);
    }

    #[allow(clippy::cast_precision_loss)]
    fn rate(&self) -> f64 {
        self.paid as f64 / self.properties as f64
    }

    fn centroid(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: stats::mean(&self.latitudes)?,
            longitude: stats::mean(&self.longitudes)?,
        })
    }
}

/// Groups records by district (sorted by name) and ranks the districts'
/// compliance rates into quintiles. Records without a district are left out.
fn group_by_district(records: &[&PropertyRecord]) -> (Vec<DistrictGroup>, usize) {
    let mut groups: BTreeMap<&str, DistrictAccumulator> = BTreeMap::new();
    for record in records {
        let Some(district) = record.district.as_deref() else {
            continue;
        };
        groups.entry(district).or_default().push(record);
    }

    let rates: Vec<f64> = groups.values().map(DistrictAccumulator::rate).collect();
    let bins = QuantileBins::fit(&rates, QUINTILES);

    let districts = groups
        .into_iter()
        .zip(rates)
        .map(|((district, acc), rate)| DistrictGroup {
            district: district.to_owned(),
            property_count: acc.properties,
            compliance_rate: rate,
            total_due: acc.due,
            total_collected: acc.collected,
            collection_ratio: stats::ratio(acc.collected, acc.due),
            centroid: acc.centroid(),
            compliance_quintile: bins.assign(rate).unwrap_or(1),
        })
        .collect();

    (districts, bins.bin_count())
}
