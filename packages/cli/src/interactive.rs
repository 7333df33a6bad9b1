//! Interactive mode.
//!
//! Prompts for the property table, one selector per filter (with "All"
//! first), and the analysis to run, then prints the text summary.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use predial_analytics::config::AnalysisConfig;
use predial_analytics::filter::filter_options;
use predial_analytics_models::{Analysis, FilterSelection};
use predial_cli_utils::MultiProgress;

/// Label of the catch-all entry in every selector.
const ALL: &str = "All";

/// Runs one interactive dashboard session.
///
/// # Errors
///
/// Returns an error if a prompt fails, the table cannot be loaded, or a
/// configuration file is invalid.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Property Tax Dashboard");
    println!();

    let file: String = Input::new()
        .with_prompt("Property table (CSV)")
        .interact_text()?;
    let table = crate::load_table(&PathBuf::from(file.trim()), ',', multi)?;

    let config_path: String = Input::new()
        .with_prompt("Analysis configuration (TOML, blank for defaults)")
        .allow_empty(true)
        .interact_text()?;
    let config = if config_path.trim().is_empty() {
        AnalysisConfig::default()
    } else {
        AnalysisConfig::load(&PathBuf::from(config_path.trim()))?
    };

    let options = filter_options(&table);
    let filters = FilterSelection {
        district: select_value("Vereda", &options.districts)?,
        urban_sector: select_value("Sector urbano", &options.urban_sectors)?,
        horizontal_property: select_value("Propiedad horizontal", &options.horizontal_property)?,
    };

    let analyses = select_analyses()?;
    let dashboard = crate::analyze(&table, &filters, &analyses, &config, multi)?;

    print!("{}", crate::summary::render(&dashboard));

    Ok(())
}

/// Prompts for one filter value. Columns without values are not offered
/// and leave the filter inactive.
fn select_value(
    prompt: &str,
    values: &[String],
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if values.is_empty() {
        log::debug!("No values for '{prompt}', skipping filter");
        return Ok(None);
    }

    let items: Vec<&str> = std::iter::once(ALL)
        .chain(values.iter().map(String::as_str))
        .collect();

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;

    Ok(idx.checked_sub(1).map(|i| values[i].clone()))
}

fn select_analyses() -> Result<Vec<Analysis>, Box<dyn std::error::Error>> {
    let items: Vec<&str> = std::iter::once("All analyses")
        .chain(Analysis::all().iter().map(|analysis| analysis.label()))
        .collect();

    let idx = Select::new()
        .with_prompt("Which analysis?")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(idx
        .checked_sub(1)
        .map_or_else(|| Analysis::all().to_vec(), |i| vec![Analysis::all()[i]]))
}
