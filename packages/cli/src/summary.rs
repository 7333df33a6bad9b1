//! Plain-text rendering of dashboard results for the terminal.

use std::fmt::Write;

use predial_analytics::money;
use predial_analytics_models::{
    Analysis, AnalysisOutcome, CadastralReport, CollectionReport, ComplianceReport, Dashboard,
    DelinquencyReport, FilterOptions, MapLayer, RiskReport, ScenarioReport,
};
use predial_property_models::Column;

/// Rows of per-district and per-record tables shown before truncating.
const MAX_TABLE_ROWS: usize = 15;

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{:.2}%", v * 100.0))
}

fn number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:.2}"))
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn layer_line(out: &mut String, layer: &MapLayer) {
    write!(out, "  Map '{}': {} marker(s)", layer.name, layer.markers.len()).unwrap();
    if layer.skipped_without_coordinates > 0 {
        write!(
            out,
            ", {} without coordinates",
            layer.skipped_without_coordinates
        )
        .unwrap();
    }
    out.push('\n');
}

fn section<T>(
    out: &mut String,
    analysis: Analysis,
    outcome: Option<&AnalysisOutcome<T>>,
    render: impl FnOnce(&mut String, &T),
) {
    let Some(outcome) = outcome else {
        return;
    };
    writeln!(out, "\n== {} ==", analysis.label()).unwrap();
    match outcome {
        AnalysisOutcome::Ready { report } => render(out, report),
        AnalysisOutcome::Unavailable { missing_columns } => {
            writeln!(
                out,
                "  Unavailable: missing column(s) {}",
                missing_columns.join(", ")
            )
            .unwrap();
        }
    }
}

/// Renders every analysis present in `dashboard`.
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "Records: {} loaded, {} after filters",
        dashboard.total_records, dashboard.filtered_records
    )
    .unwrap();
    let filters = &dashboard.filters;
    writeln!(
        out,
        "Filters: vereda={} sector_urbano={} propiedad_horizontal={}",
        filters.district.as_deref().unwrap_or("All"),
        filters.urban_sector.as_deref().unwrap_or("All"),
        filters.horizontal_property.as_deref().unwrap_or("All"),
    )
    .unwrap();

    section(
        &mut out,
        Analysis::Compliance,
        dashboard.compliance.as_ref(),
        compliance,
    );
    section(
        &mut out,
        Analysis::Delinquency,
        dashboard.delinquency.as_ref(),
        delinquency,
    );
    section(
        &mut out,
        Analysis::Cadastral,
        dashboard.cadastral.as_ref(),
        cadastral,
    );
    section(
        &mut out,
        Analysis::Collection,
        dashboard.collection.as_ref(),
        collection,
    );
    section(
        &mut out,
        Analysis::Scenarios,
        dashboard.scenarios.as_ref(),
        scenarios,
    );
    section(&mut out, Analysis::Risk, dashboard.risk.as_ref(), risk);

    out
}

fn compliance(out: &mut String, report: &ComplianceReport) {
    writeln!(out, "  Properties:       {}", report.total_properties).unwrap();
    writeln!(out, "  Compliance rate:  {}", percent(report.compliance_rate)).unwrap();
    writeln!(out, "  Total billed:     {}", money(Some(report.total_due))).unwrap();
    writeln!(
        out,
        "  Total collected:  {}",
        money(Some(report.total_collected))
    )
    .unwrap();
    writeln!(
        out,
        "  Collection ratio: {}",
        percent(Some(report.collection_ratio))
    )
    .unwrap();
    writeln!(
        out,
        "  Districts: {} in {} quintile bin(s)",
        report.districts.len(),
        report.district_bins
    )
    .unwrap();
    for group in report.districts.iter().take(MAX_TABLE_ROWS) {
        writeln!(
            out,
            "    {:<24} {:>6} props  {:>8}  Q{}  {}",
            group.district,
            group.property_count,
            percent(Some(group.compliance_rate)),
            group.compliance_quintile,
            money(Some(group.total_collected)),
        )
        .unwrap();
    }
    if report.districts.len() > MAX_TABLE_ROWS {
        writeln!(
            out,
            "    ... {} more",
            report.districts.len() - MAX_TABLE_ROWS
        )
        .unwrap();
    }
    layer_line(out, &report.map);
}

fn delinquency(out: &mut String, report: &DelinquencyReport) {
    writeln!(out, "  Delinquent properties: {}", report.delinquent_count).unwrap();
    writeln!(out, "  Critical delinquents:  {}", report.critical_count).unwrap();
    writeln!(
        out,
        "  Median assessed value: {}",
        money(report.median_assessed_value)
    )
    .unwrap();
    writeln!(
        out,
        "  Median built area:     {}",
        number(report.median_built_area)
    )
    .unwrap();
    writeln!(
        out,
        "  Bins: assessed value {}, tax due {}, built area {}",
        report.assessed_value_bins, report.tax_due_bins, report.built_area_bins
    )
    .unwrap();
    if !report.by_economic_use.is_empty() {
        writeln!(out, "  By economic use:").unwrap();
        for category in &report.by_economic_use {
            writeln!(out, "    {:<24} {}", category.category, category.count).unwrap();
        }
    }
    layer_line(out, &report.map);
}

fn cadastral(out: &mut String, report: &CadastralReport) {
    writeln!(
        out,
        "  Zero built area:            {} (median assessed value {})",
        report.zero_built_area_count,
        money(report.zero_area_median_assessed_value)
    )
    .unwrap();
    writeln!(
        out,
        "  Zero area, high value:      {}",
        report.zero_area_high_value_count
    )
    .unwrap();
    writeln!(
        out,
        "  Unpaid above median due:    {} (median tax due {})",
        report.unpaid_high_due_count,
        money(report.median_tax_due)
    )
    .unwrap();
    layer_line(out, &report.zero_area_layer);
    layer_line(out, &report.unpaid_layer);
}

fn collection(out: &mut String, report: &CollectionReport) {
    writeln!(out, "  Delinquent properties: {}", report.delinquent_count).unwrap();
    writeln!(
        out,
        "  Total outstanding:     {}",
        money(Some(report.total_outstanding))
    )
    .unwrap();
    if !report.priority.is_empty() {
        writeln!(out, "  Priority list:").unwrap();
        for (rank, property) in report.priority.iter().enumerate() {
            writeln!(
                out,
                "    {:>2}. row {:<6} {:<20} sector {:<8} {:<16} {}",
                rank + 1,
                property.row,
                text(property.district.as_deref()),
                text(property.sector.as_deref()),
                text(property.economic_use.as_deref()),
                money(property.tax_due),
            )
            .unwrap();
        }
    }
    layer_line(out, &report.map);
}

fn scenarios(out: &mut String, report: &ScenarioReport) {
    writeln!(
        out,
        "  Delinquent properties: {}, outstanding {}",
        report.delinquent_count,
        money(Some(report.total_outstanding))
    )
    .unwrap();
    for scenario in &report.scenarios {
        writeln!(
            out,
            "    {:>3}% coverage: {} projected, {} target(s)",
            scenario.coverage_pct,
            money(Some(scenario.projected_collection)),
            scenario.targets.len()
        )
        .unwrap();
    }
}

fn risk(out: &mut String, report: &RiskReport) {
    writeln!(
        out,
        "  Properties scored: {} in {} level bin(s)",
        report.records.len(),
        report.level_bins
    )
    .unwrap();
    for count in &report.level_counts {
        writeln!(out, "    {:<10} {}", count.level.to_string(), count.count).unwrap();
    }
    layer_line(out, &report.map);
}

/// Renders the values each filter selector offers.
pub fn render_options(options: &FilterOptions) -> String {
    let mut out = String::new();
    for (column, values) in [
        (Column::District, &options.districts),
        (Column::UrbanSector, &options.urban_sectors),
        (Column::HorizontalProperty, &options.horizontal_property),
    ] {
        writeln!(out, "{column} ({}):", values.len()).unwrap();
        for value in values {
            writeln!(out, "  {value}").unwrap();
        }
    }
    out
}

/// Renders the normalized header row and, per analysis, the required
/// columns the table lacks.
pub fn render_columns(headers: &[String], missing: &[(Analysis, Vec<Column>)]) -> String {
    let mut out = String::new();
    writeln!(out, "Columns ({}):", headers.len()).unwrap();
    for header in headers {
        writeln!(out, "  {header}").unwrap();
    }
    writeln!(out, "\nAnalyses:").unwrap();
    for (analysis, columns) in missing {
        if columns.is_empty() {
            writeln!(out, "  {:<12} ready", analysis.as_ref()).unwrap();
        } else {
            let names: Vec<&str> = columns.iter().map(Column::as_ref).collect();
            writeln!(
                out,
                "  {:<12} missing {}",
                analysis.as_ref(),
                names.join(", ")
            )
            .unwrap();
        }
    }
    out
}
