//! Analysis configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the standard dashboard:
//!
//! ```toml
//! priority_list_size = 10
//! coverage_levels = [10, 30, 50, 100]
//!
//! [compliance_colors]
//! high = 75.0
//! medium = 50.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::AnalyticsError;

/// Tunable parameters of a dashboard run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rows in the collection priority table.
    pub priority_list_size: usize,
    /// Coverage levels (percent) simulated by the scenario view.
    pub coverage_levels: Vec<u32>,
    /// Compliance percentages that select district marker colors.
    pub compliance_colors: ComplianceColorThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            priority_list_size: 10,
            coverage_levels: vec![10, 30, 50, 100],
            compliance_colors: ComplianceColorThresholds::default(),
        }
    }
}

/// Compliance-percentage cut points for district markers: above `high` is
/// green, above `medium` is orange, anything else is red.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceColorThresholds {
    /// Compliance percentage above which a district is green.
    pub high: f64,
    /// Compliance percentage above which a district is orange.
    pub medium: f64,
}

impl Default for ComplianceColorThresholds {
    fn default() -> Self {
        Self {
            high: 75.0,
            medium: 50.0,
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Toml`] for malformed TOML and
    /// [`AnalyticsError::Config`] for out-of-range values.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, AnalyticsError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, AnalyticsError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Config`] if a coverage level is outside
    /// 1-100 or the color thresholds are not ordered percentages.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if let Some(level) = self
            .coverage_levels
            .iter()
            .find(|level| !(1..=100).contains(*level))
        {
            return Err(AnalyticsError::Config {
                message: format!("coverage level {level} is outside 1-100"),
            });
        }

        let ComplianceColorThresholds { high, medium } = self.compliance_colors;
        if !(0.0..=100.0).contains(&medium) || !(0.0..=100.0).contains(&high) || medium > high {
            return Err(AnalyticsError::Config {
                message: format!(
                    "compliance color thresholds must satisfy 0 <= medium ({medium}) <= high ({high}) <= 100"
                ),
            });
        }

        Ok(())
    }
}
