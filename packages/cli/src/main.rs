#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line dashboard for municipal property-tax indicators.
//!
//! Loads a property table from CSV, applies the district / urban sector /
//! horizontal-property filters, runs the requested analyses and prints a
//! text summary, the full JSON dashboard, or the map layers as `GeoJSON`.
//! Without a subcommand it walks the user through the same steps
//! interactively.
//!
//! Uses `indicatif-log-bridge` (via [`predial_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod interactive;
mod summary;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use predial_analytics::config::AnalysisConfig;
use predial_analytics::dashboard::{self, run_dashboard};
use predial_analytics::{export, filter};
use predial_analytics_models::{Analysis, Dashboard, FilterSelection};
use predial_cli_utils::{IndicatifProgress, MultiProgress};
use predial_table::PropertyTable;
use predial_table::loader::CsvTableReader;

#[derive(Parser)]
#[command(name = "predial_cli", about = "Property-tax indicator dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run analyses over a property table
    Analyze {
        /// CSV export of the property table
        file: PathBuf,
        /// Keep only this district (`vereda`)
        #[arg(long)]
        vereda: Option<String>,
        /// Keep only this urban sector
        #[arg(long)]
        sector_urbano: Option<String>,
        /// Keep only this horizontal-property value
        #[arg(long)]
        propiedad_horizontal: Option<String>,
        /// Analysis to run (`all`, `compliance`, `delinquency`, `cadastral`,
        /// `collection`, `scenarios` or `risk`)
        #[arg(long, default_value = "all")]
        analysis: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
        /// Write the output to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// TOML analysis configuration (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Field delimiter of the CSV file
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// List the distinct values offered by each filter
    Values {
        /// CSV export of the property table
        file: PathBuf,
        /// Field delimiter of the CSV file
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
    /// Show the normalized headers and the columns each analysis is missing
    Columns {
        /// CSV export of the property table
        file: PathBuf,
        /// Field delimiter of the CSV file
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text summary
    Summary,
    /// Full dashboard as JSON
    Json,
    /// Map layers as a `GeoJSON` feature collection
    Geojson,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = predial_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Analyze {
            file,
            vereda,
            sector_urbano,
            propiedad_horizontal,
            analysis,
            format,
            output,
            config,
            delimiter,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::load(&path)?,
                None => AnalysisConfig::default(),
            };
            let analyses = parse_analyses(&analysis)?;
            let filters = FilterSelection {
                district: vereda,
                urban_sector: sector_urbano,
                horizontal_property: propiedad_horizontal,
            };

            let table = load_table(&file, delimiter, &multi)?;
            let dashboard = analyze(&table, &filters, &analyses, &config, &multi)?;

            let rendered = match format {
                OutputFormat::Summary => summary::render(&dashboard),
                OutputFormat::Json => export::to_json(&dashboard)?,
                OutputFormat::Geojson => export::to_geojson(&dashboard),
            };
            emit(&rendered, output.as_deref())?;
        }
        Commands::Values { file, delimiter } => {
            let table = load_table(&file, delimiter, &multi)?;
            print!("{}", summary::render_options(&filter::filter_options(&table)));
        }
        Commands::Columns { file, delimiter } => {
            let table = load_table(&file, delimiter, &multi)?;
            print!(
                "{}",
                summary::render_columns(table.headers(), &dashboard::missing_columns(&table))
            );
        }
    }

    Ok(())
}

/// Parses the `--analysis` argument: `all` or a single analysis name.
fn parse_analyses(value: &str) -> Result<Vec<Analysis>, Box<dyn std::error::Error>> {
    if value.trim().eq_ignore_ascii_case("all") {
        return Ok(Analysis::all().to_vec());
    }
    let analysis = value
        .trim()
        .parse::<Analysis>()
        .map_err(|_| format!("Unknown analysis '{value}'"))?;
    Ok(vec![analysis])
}

/// Reads the property table at `path` with a progress spinner.
fn load_table(
    path: &Path,
    delimiter: char,
    multi: &MultiProgress,
) -> Result<PropertyTable, Box<dyn std::error::Error>> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| format!("Delimiter '{delimiter}' is not a single-byte character"))?;

    let progress = IndicatifProgress::records_bar(multi, "Reading property records");
    let table = CsvTableReader::new()
        .with_delimiter(delimiter)
        .read_path(path, &progress)?;

    Ok(table)
}

/// Runs the dashboard with a step bar over the selected analyses.
fn analyze(
    table: &PropertyTable,
    filters: &FilterSelection,
    analyses: &[Analysis],
    config: &AnalysisConfig,
    multi: &MultiProgress,
) -> Result<Dashboard, Box<dyn std::error::Error>> {
    let progress = IndicatifProgress::steps_bar(multi, "Running analyses");
    Ok(run_dashboard(table, filters, analyses, config, &progress)?)
}

/// Prints `rendered` or writes it to `output`.
fn emit(rendered: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            log::info!("Wrote {} bytes to {}", rendered.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selects_every_analysis() {
        assert_eq!(parse_analyses("all").unwrap(), Analysis::all());
        assert_eq!(parse_analyses(" ALL ").unwrap().len(), 6);
    }

    #[test]
    fn single_analysis_by_name() {
        assert_eq!(parse_analyses("risk").unwrap(), vec![Analysis::Risk]);
        assert_eq!(
            parse_analyses("Scenarios").unwrap(),
            vec![Analysis::Scenarios]
        );
        assert!(parse_analyses("charts").is_err());
    }

    #[test]
    fn cli_parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "predial_cli",
            "analyze",
            "predios.csv",
            "--vereda",
            "El Salitre",
            "--analysis",
            "collection",
            "--format",
            "geojson",
            "--delimiter",
            ";",
        ])
        .unwrap();
        let Some(Commands::Analyze {
            file,
            vereda,
            analysis,
            format,
            delimiter,
            sector_urbano,
            ..
        }) = cli.command
        else {
            panic!("expected analyze");
        };
        assert_eq!(file, PathBuf::from("predios.csv"));
        assert_eq!(vereda.as_deref(), Some("El Salitre"));
        assert_eq!(sector_urbano, None);
        assert_eq!(analysis, "collection");
        assert!(matches!(format, OutputFormat::Geojson));
        assert_eq!(delimiter, ';');
    }
}
