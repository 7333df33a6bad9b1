//! Collection prioritization: delinquents ranked by outstanding tax.

use predial_analytics_models::{Analysis, CollectionReport, MarkerColor, PropertySummary};
use predial_property_models::{Column, PropertyRecord};

use crate::AnalyticsError;
use crate::config::AnalysisConfig;
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats;

/// Columns the collection view reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::PaymentFlag,
    Column::TaxDue,
    Column::Latitude,
    Column::Longitude,
];

/// Delinquents of the view ordered by tax due, largest first. Missing
/// amounts go last and ties keep source order.
pub(crate) fn sorted_delinquents<'a>(view: &PropertyView<'a>) -> Vec<&'a PropertyRecord> {
    let mut delinquents = view.delinquents();
    delinquents.sort_by(|a, b| stats::descending_missing_last(a.tax_due, b.tax_due));
    delinquents
}

/// Builds the prioritized collection list.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn collection(
    view: &PropertyView<'_>,
    config: &AnalysisConfig,
) -> Result<CollectionReport, AnalyticsError> {
    view.require(Analysis::Collection, REQUIRED_COLUMNS)?;

    let delinquents = sorted_delinquents(view);
    let total_outstanding = stats::sum(delinquents.iter().map(|record| record.tax_due));

    let mut layer = LayerBuilder::new("Collection targets");
    for record in &delinquents {
        layer.add(record.coordinates(), MarkerColor::Purple, || {
            format!(
                "<b>Collection target</b><br>District: {}<br>Tax due: {}",
                markers::text(record.district.as_deref()),
                markers::money(record.tax_due),
            )
        });
    }

    let priority = delinquents
        .iter()
        .take(config.priority_list_size)
        .map(|record| PropertySummary::from(*record))
        .collect();

    log::debug!(
        "Collection: {} delinquent, {:.2} outstanding",
        delinquents.len(),
        total_outstanding
    );

    Ok(CollectionReport {
        delinquent_count: delinquents.len() as u64,
        total_outstanding,
        priority,
        map: layer.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{paid, property, table};

    fn with_due(row: usize, due: Option<f64>) -> PropertyRecord {
        PropertyRecord {
            tax_due: due,
            ..property(row)
        }
    }

    #[test]
    fn priority_is_sorted_by_tax_due() {
        let table = table(vec![
            with_due(0, Some(50.0)),
            with_due(1, None),
            with_due(2, Some(500.0)),
            PropertyRecord {
                tax_due: Some(10_000.0),
                ..paid(3)
            },
            with_due(4, Some(50.0)),
            with_due(5, Some(120.0)),
        ]);
        let report = collection(&PropertyView::all(&table), &AnalysisConfig::default()).unwrap();
        let rows: Vec<usize> = report.priority.iter().map(|p| p.row).collect();
        assert_eq!(rows, vec![2, 5, 0, 4, 1]);
        assert_eq!(report.delinquent_count, 5);
        assert!((report.total_outstanding - 720.0).abs() < 1e-9);
        assert_eq!(report.map.markers.len(), 5);
        assert!(report.map.markers.iter().all(|m| m.color == MarkerColor::Purple));
    }

    #[test]
    fn priority_list_is_truncated() {
        let records = (0..20).map(property).collect();
        let table = table(records);
        let config = AnalysisConfig {
            priority_list_size: 3,
            ..AnalysisConfig::default()
        };
        let report = collection(&PropertyView::all(&table), &config).unwrap();
        assert_eq!(report.priority.len(), 3);
        assert_eq!(report.delinquent_count, 20);
        assert_eq!(report.map.markers.len(), 20);
    }

    #[test]
    fn zero_delinquents() {
        let table = table(vec![paid(0)]);
        let report = collection(&PropertyView::all(&table), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.delinquent_count, 0);
        assert!(report.priority.is_empty());
        assert!(report.total_outstanding.abs() < f64::EPSILON);
        assert!(report.map.markers.is_empty());
    }
}
