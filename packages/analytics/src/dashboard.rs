//! Dashboard orchestration.
//!
//! [`run_dashboard`] filters the table once and runs each requested
//! analysis against the same view. An analysis whose columns are missing
//! is recorded as [`AnalysisOutcome::Unavailable`] while the others still
//! run.

use predial_analytics_models::{Analysis, AnalysisOutcome, Dashboard, FilterSelection};
use predial_property_models::Column;
use predial_table::PropertyTable;
use predial_table::progress::ProgressCallback;

use crate::config::AnalysisConfig;
use crate::filter::{self, PropertyView};
use crate::{AnalyticsError, cadastral, collection, compliance, delinquency, risk, scenario};

/// Columns each analysis needs.
#[must_use]
pub const fn required_columns(analysis: Analysis) -> &'static [Column] {
    match analysis {
        Analysis::Compliance => compliance::REQUIRED_COLUMNS,
        Analysis::Delinquency => delinquency::REQUIRED_COLUMNS,
        Analysis::Cadastral => cadastral::REQUIRED_COLUMNS,
        Analysis::Collection => collection::REQUIRED_COLUMNS,
        Analysis::Scenarios => scenario::REQUIRED_COLUMNS,
        Analysis::Risk => risk::REQUIRED_COLUMNS,
    }
}

/// For every analysis, the required columns `table` does not provide.
#[must_use]
pub fn missing_columns(table: &PropertyTable) -> Vec<(Analysis, Vec<Column>)> {
    Analysis::all()
        .iter()
        .map(|analysis| (*analysis, table.missing_columns(required_columns(*analysis))))
        .collect()
}

/// Runs `analyses` over the records of `table` that pass `filters`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingFilterColumn`] if a filter targets a
/// column the table lacks. Missing analysis columns are not errors; they
/// mark the analysis unavailable.
pub fn run_dashboard(
    table: &PropertyTable,
    filters: &FilterSelection,
    analyses: &[Analysis],
    config: &AnalysisConfig,
    progress: &dyn ProgressCallback,
) -> Result<Dashboard, AnalyticsError> {
    let view = filter::apply_filters(table, filters)?;

    let mut dashboard = Dashboard {
        filters: filters.clone(),
        total_records: table.len() as u64,
        filtered_records: view.len() as u64,
        compliance: None,
        delinquency: None,
        cadastral: None,
        collection: None,
        scenarios: None,
        risk: None,
    };

    progress.set_total(analyses.len() as u64);

    for analysis in analyses {
        progress.set_message(analysis.label().to_owned());
        run_one(&mut dashboard, *analysis, &view, config)?;
        progress.inc(1);
    }

    progress.finish(format!(
        "{} analyses over {} of {} records",
        analyses.len(),
        dashboard.filtered_records,
        dashboard.total_records
    ));

    Ok(dashboard)
}

fn run_one(
    dashboard: &mut Dashboard,
    analysis: Analysis,
    view: &PropertyView<'_>,
    config: &AnalysisConfig,
) -> Result<(), AnalyticsError> {
    match analysis {
        Analysis::Compliance => {
            dashboard.compliance = Some(outcome(compliance::compliance(view, config))?);
        }
        Analysis::Delinquency => {
            dashboard.delinquency = Some(outcome(delinquency::delinquency(view))?);
        }
        Analysis::Cadastral => {
            dashboard.cadastral = Some(outcome(cadastral::cadastral(view))?);
        }
        Analysis::Collection => {
            dashboard.collection = Some(outcome(collection::collection(view, config))?);
        }
        Analysis::Scenarios => {
            dashboard.scenarios = Some(outcome(scenario::scenarios(view, config))?);
        }
        Analysis::Risk => {
            dashboard.risk = Some(outcome(risk::risk(view))?);
        }
    }
    Ok(())
}

/// Turns a missing-column failure into an unavailable slot. Any other error
/// is propagated.
fn outcome<T>(result: Result<T, AnalyticsError>) -> Result<AnalysisOutcome<T>, AnalyticsError> {
    match result {
        Ok(report) => Ok(AnalysisOutcome::Ready { report }),
        Err(AnalyticsError::MissingColumns { analysis, columns }) => {
            log::warn!(
                "{} unavailable: missing column(s) {}",
                analysis.label(),
                crate::join_columns(&columns)
            );
            Ok(AnalysisOutcome::Unavailable {
                missing_columns: columns.iter().map(ToString::to_string).collect(),
            })
        }
        Err(e) => Err(e),
    }
}
