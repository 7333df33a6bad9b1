//! Collection coverage scenarios.
//!
//! For each coverage level the simulator projects how much of the
//! outstanding tax would be collected and which delinquents, largest debt
//! first, a campaign of that reach would target.

use predial_analytics_models::{Analysis, MarkerColor, Scenario, ScenarioReport};
use predial_property_models::{Column, PropertyRecord};

use crate::AnalyticsError;
use crate::collection::sorted_delinquents;
use crate::config::AnalysisConfig;
use crate::filter::PropertyView;
use crate::markers::{self, LayerBuilder};
use crate::stats;

/// Columns the scenario simulator reads.
pub const REQUIRED_COLUMNS: &[Column] = &[
    Column::PaymentFlag,
    Column::TaxDue,
    Column::Latitude,
    Column::Longitude,
];

/// Layer colors by position in the configured level list. Levels past the
/// end reuse the last color.
const SCENARIO_COLORS: &[MarkerColor] = &[
    MarkerColor::LightBlue,
    MarkerColor::Blue,
    MarkerColor::DarkBlue,
    MarkerColor::Navy,
];

/// Simulates every configured coverage level.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingColumns`] if the table lacks a column in
/// [`REQUIRED_COLUMNS`].
pub fn scenarios(
    view: &PropertyView<'_>,
    config: &AnalysisConfig,
) -> Result<ScenarioReport, AnalyticsError> {
    view.require(Analysis::Scenarios, REQUIRED_COLUMNS)?;

    let delinquents = sorted_delinquents(view);
    let total_outstanding = stats::sum(delinquents.iter().map(|record| record.tax_due));

    let scenarios = config
        .coverage_levels
        .iter()
        .enumerate()
        .map(|(position, level)| {
            let color = SCENARIO_COLORS[position.min(SCENARIO_COLORS.len() - 1)];
            simulate(&delinquents, total_outstanding, *level, color)
        })
        .collect();

    Ok(ScenarioReport {
        delinquent_count: delinquents.len() as u64,
        total_outstanding,
        scenarios,
    })
}

/// Number of delinquents a campaign reaching `level` percent targets.
#[must_use]
pub const fn target_count(delinquents: usize, level: u32) -> usize {
    delinquents * level as usize / 100
}

fn simulate(
    delinquents: &[&PropertyRecord],
    total_outstanding: f64,
    level: u32,
    color: MarkerColor,
) -> Scenario {
    let targets = &delinquents[..target_count(delinquents.len(), level).min(delinquents.len())];

    let mut layer = LayerBuilder::new(format!("Coverage {level}%"));
    for record in targets {
        layer.add(record.coordinates(), color, || {
            format!(
                "<b>Scenario {level}%</b><br>District: {}<br>Tax due: {}",
                markers::text(record.district.as_deref()),
                markers::money(record.tax_due)
            )
        });
    }

    let projected_collection = total_outstanding * (f64::from(level) / 100.0);
    log::debug!(
        "Scenario {level}%: {} targets, {projected_collection:.2} projected",
        targets.len()
    );

    Scenario {
        coverage_pct: level,
        projected_collection,
        targets: targets.iter().map(|record| record.row).collect(),
        layer: layer.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{paid, property, table};

    fn dues(values: &[f64]) -> Vec<PropertyRecord> {
        values
            .iter()
            .enumerate()
            .map(|(row, due)| PropertyRecord {
                tax_due: Some(*due),
                ..property(row)
            })
            .collect()
    }

    #[test]
    fn full_coverage_collects_everything() {
        let table = table(dues(&[10.5, 20.25, 33.0, 0.1, 7.7, 1_000.0, 3.3]));
        let report = scenarios(&PropertyView::all(&table), &AnalysisConfig::default()).unwrap();
        let full = report.scenarios.last().unwrap();
        assert_eq!(full.coverage_pct, 100);
        assert!((full.projected_collection - report.total_outstanding).abs() < f64::EPSILON);
        assert_eq!(full.targets.len(), 7);
    }

    #[test]
    fn targets_are_the_largest_debts() {
        let table = table(dues(&[5.0, 50.0, 10.0, 40.0, 20.0, 30.0, 1.0, 2.0, 3.0, 4.0]));
        let report = scenarios(&PropertyView::all(&table), &AnalysisConfig::default()).unwrap();
        let targets: Vec<Vec<usize>> = report.scenarios.iter().map(|s| s.targets.clone()).collect();
        assert_eq!(targets[0], vec![1]);
        assert_eq!(targets[1], vec![1, 3, 5]);
        assert_eq!(targets[2], vec![1, 3, 5, 4, 2]);
        assert_eq!(targets[3].len(), 10);
        assert!((report.scenarios[1].projected_collection - 165.0 * 0.3).abs() < 1e-9);
    }

    #[test]
    fn target_count_floors() {
        assert_eq!(target_count(7, 10), 0);
        assert_eq!(target_count(7, 30), 2);
        assert_eq!(target_count(7, 50), 3);
        assert_eq!(target_count(7, 100), 7);
        assert_eq!(target_count(0, 50), 0);
    }

    #[test]
    fn layers_are_named_and_colored_by_position() {
        let table = table(dues(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let config = AnalysisConfig {
            coverage_levels: vec![20, 40, 60, 80, 100],
            ..AnalysisConfig::default()
        };
        let report = scenarios(&PropertyView::all(&table), &config).unwrap();
        let names: Vec<&str> = report.scenarios.iter().map(|s| s.layer.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Coverage 20%", "Coverage 40%", "Coverage 60%", "Coverage 80%", "Coverage 100%"]
        );
        let colors: Vec<MarkerColor> = report
            .scenarios
            .iter()
            .map(|s| s.layer.markers[0].color)
            .collect();
        assert_eq!(
            colors,
            vec![
                MarkerColor::LightBlue,
                MarkerColor::Blue,
                MarkerColor::DarkBlue,
                MarkerColor::Navy,
                MarkerColor::Navy,
            ]
        );
        assert_eq!(report.scenarios[1].layer.markers.len(), 2);
        assert_eq!(
            report.scenarios[0].layer.markers[0].popup,
            "<b>Scenario 20%</b><br>District: A<br>Tax due: $5"
        );
    }

    #[test]
    fn zero_delinquents_projects_nothing() {
        let table = table(vec![paid(0), paid(1)]);
        let report = scenarios(&PropertyView::all(&table), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.delinquent_count, 0);
        assert_eq!(report.scenarios.len(), 4);
        for scenario in &report.scenarios {
            assert!(scenario.projected_collection.abs() < f64::EPSILON);
            assert!(scenario.targets.is_empty());
            assert!(scenario.layer.markers.is_empty());
        }
    }
}
