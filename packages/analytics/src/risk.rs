//! Composite tax risk.
//!
//! Each property gets three ranks on a 1-5 scale:
//!
//! * **fiscal**: tax-due quintile, or 1 when the tax is paid;
//! * **cadastral**: 5 for zero built area with an above-median assessed
//!   value, 3 for a small built area (below the 20th percentile) with an
//!   assessed value above the 60th percentile, 1 otherwise;
//! * **behavioral**: 5 when unpaid and not financed, 3 when unpaid but
//!   financed, 1 otherwise.
//!
//! The weighted sum of the ranks is binned into quintiles over the view and
//! labeled from [`RiskLevel::VeryLow`] upward.

use predial_analytics_models::{
    Analysis, LevelCount, MarkerColor, RiskLevel, RiskRecord, RiskReport,
};
use predial_property_models::{Column, PropertyRecord};

use crate::AnalyticsError;
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats::{self, QUINTILES, QuantileBins};

/// Weight of the fiscal rank in the composite score.
pub const FISCAL_WEIGHT: f64 = 0.5;
/// Weight of the cadastral rank in the composite score.
pub const CADASTRAL_WEIGHT: f64 = 0.3;
/// Weight of the behavioral rank in the composite score.
pub const BEHAVIORAL_WEIGHT: f64 = 0.2;

/// Columns the risk analysis reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::TaxDue,
    Column::PaymentFlag,
    Column::FinancingFlag,
    Column::BuiltArea,
    Column::AssessedValue,
    Column::Latitude,
    Column::Longitude,
];

/// View-wide thresholds the cadastral rank compares against.
#[derive(Debug, Clone, Copy)]
struct CadastralThresholds {
    median_assessed_value: Option<f64>,
    built_area_p20: Option<f64>,
    assessed_value_p60: Option<f64>,
}

impl CadastralThresholds {
    fn from_view(view: &PropertyView<'_>) -> Self {
        let assessed = view.numbers(Column::AssessedValue);
        let area = view.numbers(Column::BuiltArea);
        Self {
            median_assessed_value: stats::median(&assessed),
            built_area_p20: stats::quantile(&area, 0.2),
            assessed_value_p60: stats::quantile(&assessed, 0.6),
        }
    }
}

/// Fiscal rank: the tax-due bin, overridden to 1 for paid records and for
/// records without a tax due.
#[must_use]
pub fn fiscal_rank(record: &PropertyRecord, tax_due_bin: Option<u8>) -> u8 {
    if record.is_paid() {
        1
    } else {
        tax_due_bin.unwrap_or(1)
    }
}

fn cadastral_rank(record: &PropertyRecord, thresholds: CadastralThresholds) -> u8 {
    if record.has_zero_built_area()
        && stats::exceeds(record.assessed_value, thresholds.median_assessed_value)
    {
        5
    } else if stats::falls_below(record.built_area, thresholds.built_area_p20)
        && stats::exceeds(record.assessed_value, thresholds.assessed_value_p60)
    {
        3
    } else {
        1
    }
}

/// Behavioral rank from the payment and financing flags.
#[must_use]
pub fn behavioral_rank(record: &PropertyRecord) -> u8 {
    match (record.is_paid(), record.is_financed()) {
        (true, _) => 1,
        (false, false) => 5,
        (false, true) => 3,
    }
}

/// Weighted composite of the three ranks.
#[must_use]
pub fn composite_score(fiscal: u8, cadastral: u8, behavioral: u8) -> f64 {
    BEHAVIORAL_WEIGHT.mul_add(
        f64::from(behavioral),
        FISCAL_WEIGHT.mul_add(f64::from(fiscal), CADASTRAL_WEIGHT * f64::from(cadastral)),
    )
}

/// Marker color for a risk level.
#[must_use]
pub const fn level_color(level: RiskLevel) -> MarkerColor {
    match level {
        RiskLevel::VeryLow => MarkerColor::Green,
        RiskLevel::Low => MarkerColor::LightGreen,
        RiskLevel::Medium => MarkerColor::Orange,
        RiskLevel::High => MarkerColor::Red,
        RiskLevel::VeryHigh => MarkerColor::DarkRed,
    }
}

/// Scores every property of the view.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn risk(view: &PropertyView<'_>) -> Result<RiskReport, AnalyticsError> {
    view.require(Analysis::Risk, REQUIRED_COLUMNS)?;

    let records = view.records();
    let thresholds = CadastralThresholds::from_view(view);

    let due: Vec<Option<f64>> = records.iter().map(|record| record.tax_due).collect();
    let (due_bins, _) = stats::quintile_bins(&due);

    let ranks: Vec<(u8, u8, u8, f64)> = records
        .iter()
        .zip(due_bins)
        .map(|(record, due_bin)| {
            let fiscal = fiscal_rank(record, due_bin);
            let cadastral = cadastral_rank(record, thresholds);
            let behavioral = behavioral_rank(record);
            (
                fiscal,
                cadastral,
                behavioral,
                composite_score(fiscal, cadastral, behavioral),
            )
        })
        .collect();

    let composites: Vec<f64> = ranks.iter().map(|(.., composite)| *composite).collect();
    let level_bins = QuantileBins::fit(&composites, QUINTILES);

    let mut layer = LayerBuilder::new("Tax risk");
    let mut scored = Vec::with_capacity(records.len());

    for (record, (fiscal, cadastral, behavioral, composite)) in records.iter().zip(ranks) {
        let level = level_bins
            .assign(composite)
            .and_then(RiskLevel::from_bin)
            .unwrap_or(RiskLevel::VeryLow);

        layer.add(record.coordinates(), level_color(level), || {
            format!(
                "<b>Risk: {level}</b><br>District: {}<br>Score: {composite:.2}<br>Tax due: {}<br>Assessed value: {}",
                markers::text(record.district.as_deref()),
                markers::money(record.tax_due),
                markers::money(record.assessed_value),
            )
        });

        scored.push(RiskRecord {
            row: record.row,
            district: record.district.clone(),
            fiscal,
            cadastral,
            behavioral,
            composite,
            level,
        });
    }

    let level_counts = RiskLevel::all()
        .iter()
        .map(|level| LevelCount {
            level: *level,
            count: scored.iter().filter(|record| record.level == *level).count() as u64,
        })
        .collect();

    log::debug!(
        "Risk: {} properties in {} level bin(s)",
        scored.len(),
        level_bins.bin_count()
    );

    Ok(RiskReport {
        records: scored,
        level_bins: level_bins.bin_count(),
        level_counts,
        median_assessed_value: thresholds.median_assessed_value,
        built_area_p20: thresholds.built_area_p20,
        assessed_value_p60: thresholds.assessed_value_p60,
        map: layer.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{paid, property, table};
    use predial_table::PropertyTable;

    fn run(table: &PropertyTable) -> RiskReport {
        risk(&PropertyView::all(table)).unwrap()
    }

    fn financed(row: usize) -> PropertyRecord {
        PropertyRecord {
            financing_flag: Some("Si".to_owned()),
            ..property(row)
        }
    }

    #[test]
    fn paid_records_have_fiscal_rank_one() {
        let records: Vec<PropertyRecord> = (0..10_u32)
            .map(|i| PropertyRecord {
                tax_due: Some(f64::from(i) * 1_000.0),
                ..if i % 2 == 0 { paid(i as usize) } else { property(i as usize) }
            })
            .collect();
        let report = run(&table(records));
        for record in &report.records {
            if record.row % 2 == 0 {
                assert_eq!(record.fiscal, 1);
                assert_eq!(record.behavioral, 1);
            }
        }
        assert_eq!(report.records[9].fiscal, 5);
    }

    #[test]
    fn composite_uses_fixed_weights() {
        for fiscal in 1..=5 {
            for cadastral in [1, 3, 5] {
                for behavioral in [1, 3, 5] {
                    let expected = 0.5 * f64::from(fiscal)
                        + 0.3 * f64::from(cadastral)
                        + 0.2 * f64::from(behavioral);
                    let actual = composite_score(fiscal, cadastral, behavioral);
                    assert!((actual - expected).abs() < 1e-9);
                }
            }
        }
        assert!((composite_score(5, 5, 5) - 5.0).abs() < 1e-9);
        assert!((composite_score(1, 1, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn behavioral_rank_reads_both_flags() {
        assert_eq!(behavioral_rank(&paid(0)), 1);
        assert_eq!(behavioral_rank(&property(0)), 5);
        assert_eq!(behavioral_rank(&financed(0)), 3);
        let blank = PropertyRecord {
            payment_flag: None,
            financing_flag: None,
            ..property(0)
        };
        assert_eq!(behavioral_rank(&blank), 5);
    }

    #[test]
    fn missing_tax_due_ranks_lowest() {
        let record = PropertyRecord {
            tax_due: None,
            ..property(0)
        };
        assert_eq!(fiscal_rank(&record, None), 1);
    }

    #[test]
    fn zero_area_high_value_unpaid_record_is_top_risk() {
        let mut records: Vec<PropertyRecord> = (0..9_u32)
            .map(|i| PropertyRecord {
                tax_due: Some(f64::from(100 + i)),
                assessed_value: Some(f64::from(1_000 + i)),
                built_area: Some(f64::from(50 + i)),
                ..paid(i as usize)
            })
            .collect();
        records.push(PropertyRecord {
            tax_due: Some(1_000.0),
            built_area: Some(0.0),
            assessed_value: Some(500_000.0),
            ..property(9)
        });

        let report = run(&table(records));
        let target = &report.records[9];
        assert_eq!(target.behavioral, 5);
        assert_eq!(target.cadastral, 5);
        assert_eq!(target.fiscal, 5);
        assert!((target.composite - 5.0).abs() < 1e-9);
        assert!(
            report.records[..9]
                .iter()
                .all(|record| record.composite < target.composite)
        );
    }

    #[test]
    fn small_built_area_with_high_value_ranks_three() {
        let mut records: Vec<PropertyRecord> = (0..10_u32)
            .map(|i| PropertyRecord {
                assessed_value: Some(f64::from(i) * 100.0),
                built_area: Some(f64::from(100 + i * 10)),
                ..paid(i as usize)
            })
            .collect();
        records[9].built_area = Some(1.0);
        let report = run(&table(records));
        assert_eq!(report.records[9].cadastral, 3);
        assert_eq!(report.records[0].cadastral, 1);
    }

    #[test]
    fn rank_five_takes_precedence_over_three() {
        // Zero area sits below the 20th percentile too.
        let mut records: Vec<PropertyRecord> = (0..10_u32)
            .map(|i| PropertyRecord {
                assessed_value: Some(f64::from(i) * 100.0),
                built_area: Some(f64::from(100 + i)),
                ..paid(i as usize)
            })
            .collect();
        records[9].built_area = Some(0.0);
        let report = run(&table(records));
        assert_eq!(report.records[9].cadastral, 5);
    }

    #[test]
    fn spread_scores_fill_every_level_in_order() {
        // Unpaid and unfinanced with equal area and value, so only the
        // tax-due bin moves the score: fiscal ranks 1,1,2,2,..,5,5.
        let records: Vec<PropertyRecord> = (0..10_u32)
            .map(|i| PropertyRecord {
                tax_due: Some(f64::from(100 * (i + 1))),
                ..property(i as usize)
            })
            .collect();
        let report = run(&table(records));

        let fiscal: Vec<u8> = report.records.iter().map(|r| r.fiscal).collect();
        assert_eq!(fiscal, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
        assert!(report.records.iter().all(|r| r.cadastral == 1 && r.behavioral == 5));

        assert_eq!(report.level_bins, 5);
        let levels: Vec<RiskLevel> = report.records.iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            vec![
                RiskLevel::VeryLow,
                RiskLevel::VeryLow,
                RiskLevel::Low,
                RiskLevel::Low,
                RiskLevel::Medium,
                RiskLevel::Medium,
                RiskLevel::High,
                RiskLevel::High,
                RiskLevel::VeryHigh,
                RiskLevel::VeryHigh,
            ]
        );
        assert!(levels.windows(2).all(|pair| pair[0] <= pair[1]));

        let top = &report.records[9];
        assert!((top.composite - 3.8).abs() < 1e-9);
        assert_eq!(top.level, RiskLevel::VeryHigh);
        assert_eq!(report.map.markers[9].color, MarkerColor::DarkRed);
        assert_eq!(report.map.markers[0].color, MarkerColor::Green);

        let counts: Vec<(RiskLevel, u64)> = report
            .level_counts
            .iter()
            .map(|c| (c.level, c.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (RiskLevel::VeryLow, 2),
                (RiskLevel::Low, 2),
                (RiskLevel::Medium, 2),
                (RiskLevel::High, 2),
                (RiskLevel::VeryHigh, 2),
            ]
        );
    }

    #[test]
    fn degenerate_composite_gets_lowest_label() {
        let report = run(&table(vec![paid(0), paid(1), paid(2)]));
        assert_eq!(report.level_bins, 1);
        assert!(
            report
                .records
                .iter()
                .all(|record| record.level == RiskLevel::VeryLow)
        );
        assert_eq!(report.level_counts.len(), 5);
        assert_eq!(report.level_counts[0].count, 3);
        assert!(report.level_counts[1..].iter().all(|c| c.count == 0));
    }

    #[test]
    fn few_distinct_scores_never_reach_top_labels() {
        let report = run(&table(vec![paid(0), paid(1), property(2), property(3)]));
        assert!(report.level_bins < 5);
        let levels: Vec<RiskLevel> = report.records.iter().map(|r| r.level).collect();
        assert!(levels.iter().all(|level| *level <= RiskLevel::Medium));
        assert_eq!(levels[0], RiskLevel::VeryLow);
        assert!(levels[3] > levels[0]);
    }

    #[test]
    fn empty_view_scores_nothing() {
        let report = run(&table(Vec::new()));
        assert!(report.records.is_empty());
        assert_eq!(report.level_bins, 0);
        assert!(report.level_counts.iter().all(|c| c.count == 0));
        assert_eq!(report.median_assessed_value, None);
    }

    #[test]
    fn risk_does_not_need_a_district() {
        let columns = Column::all()
            .iter()
            .copied()
            .filter(|column| *column != Column::District);
        let table = PropertyTable::from_records(columns, vec![property(0)]);
        assert!(risk(&PropertyView::all(&table)).is_ok());
    }

    #[test]
    fn level_colors_follow_palette() {
        let colors: Vec<MarkerColor> = RiskLevel::all().iter().map(|l| level_color(*l)).collect();
        assert_eq!(
            colors,
            vec![
                MarkerColor::Green,
                MarkerColor::LightGreen,
                MarkerColor::Orange,
                MarkerColor::Red,
                MarkerColor::DarkRed,
            ]
        );
    }
}
