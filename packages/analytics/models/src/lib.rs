#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for the predial indicator engine.
//!
//! Every analysis returns plain serializable structs: scalar metrics,
//! grouped tables, and [`MapLayer`]s of colored markers. The presentation
//! side (JSON export, `GeoJSON` export, terminal summary, or any external
//! map/chart front-end) consumes these types without touching the engine.

use predial_property_models::{Coordinates, PropertyRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the six analytical views of the dashboard.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Analysis {
    /// Tax compliance rates and per-district aggregates.
    Compliance,
    /// Segmentation of the delinquent portfolio.
    Delinquency,
    /// Cadastral update opportunities.
    Cadastral,
    /// Prioritized collection list.
    Collection,
    /// Collection coverage scenarios.
    Scenarios,
    /// Composite tax risk.
    Risk,
}

impl Analysis {
    /// Returns all variants in dashboard order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Compliance,
            Self::Delinquency,
            Self::Cadastral,
            Self::Collection,
            Self::Scenarios,
            Self::Risk,
        ]
    }

    /// Human-readable title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliance => "Tax compliance",
            Self::Delinquency => "Delinquent portfolio segmentation",
            Self::Cadastral => "Cadastral opportunities",
            Self::Collection => "Collection strategies",
            Self::Scenarios => "Collection scenarios",
            Self::Risk => "Geospatial tax risk",
        }
    }
}

/// Equality filters applied before any analysis. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSelection {
    /// District (`vereda`) to keep.
    pub district: Option<String>,
    /// Urban sector to keep.
    pub urban_sector: Option<String>,
    /// Horizontal-property value to keep.
    pub horizontal_property: Option<String>,
}

impl FilterSelection {
    /// Whether no filter is active.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.district.is_none() && self.urban_sector.is_none() && self.horizontal_property.is_none()
    }
}

/// Distinct values offered by each filter selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Sorted district names.
    pub districts: Vec<String>,
    /// Sorted urban sector values.
    pub urban_sectors: Vec<String>,
    /// Sorted horizontal-property values.
    pub horizontal_property: Vec<String>,
}

/// Marker color category, named after the web colors the map front-end
/// understands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    Green,
    LightGreen,
    Orange,
    Red,
    DarkRed,
    Crimson,
    Purple,
    LightBlue,
    Blue,
    DarkBlue,
    Navy,
}

/// A single point on a map layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Color category.
    pub color: MarkerColor,
    /// Popup text (HTML line breaks).
    pub popup: String,
}

/// A named list of markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Layer name.
    pub name: String,
    /// Markers with valid coordinates.
    pub markers: Vec<MapMarker>,
    /// Records left off the layer because they lack coordinates.
    pub skipped_without_coordinates: u64,
}

/// Identifying and fiscal fields of one property, as shown in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    /// Source row index.
    pub row: usize,
    /// District.
    pub district: Option<String>,
    /// Cadastral sector.
    pub sector: Option<String>,
    /// Economic-use category.
    pub economic_use: Option<String>,
    /// Assessed value.
    pub assessed_value: Option<f64>,
    /// Tax due.
    pub tax_due: Option<f64>,
    /// Amount collected.
    pub collected: Option<f64>,
    /// Built area.
    pub built_area: Option<f64>,
}

impl From<&PropertyRecord> for PropertySummary {
    fn from(record: &PropertyRecord) -> Self {
        Self {
            row: record.row,
            district: record.district.clone(),
            sector: record.sector.clone(),
            economic_use: record.economic_use.clone(),
            assessed_value: record.assessed_value,
            tax_due: record.tax_due,
            collected: record.collected,
            built_area: record.built_area,
        }
    }
}

/// Count of records in a single category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Number of records.
    pub count: u64,
}

/// Per-district compliance aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictGroup {
    /// District name.
    pub district: String,
    /// Number of properties in the district.
    pub property_count: u64,
    /// Share of properties that paid, in `[0, 1]`.
    pub compliance_rate: f64,
    /// Summed tax due.
    pub total_due: f64,
    /// Summed amount collected.
    pub total_collected: f64,
    /// `total_collected / total_due`, or 0 when nothing is due.
    pub collection_ratio: f64,
    /// Mean coordinates of the district's properties.
    pub centroid: Option<Coordinates>,
    /// Compliance quintile across the current districts (1 = lowest).
    pub compliance_quintile: u8,
}

/// Output of the compliance analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// Number of properties in the filtered view.
    pub total_properties: u64,
    /// Summed tax due.
    pub total_due: f64,
    /// Summed amount collected.
    pub total_collected: f64,
    /// Share of properties that paid; `None` for an empty view.
    pub compliance_rate: Option<f64>,
    /// `total_collected / total_due`, or 0 when nothing is due.
    pub collection_ratio: f64,
    /// Per-district aggregates, sorted by district name.
    pub districts: Vec<DistrictGroup>,
    /// Number of quintile bins the district rates produced.
    pub district_bins: usize,
    /// One marker per district centroid.
    pub map: MapLayer,
}

/// One delinquent property with its segment bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelinquentSegment {
    /// The property.
    pub property: PropertySummary,
    /// Assessed-value quintile within the delinquent subset.
    pub assessed_value_quintile: Option<u8>,
    /// Tax-due quintile within the delinquent subset.
    pub tax_due_quintile: Option<u8>,
    /// Built-area quintile within the delinquent subset.
    pub built_area_quintile: Option<u8>,
    /// Assessed value or built area above the delinquent median.
    pub critical: bool,
}

/// Output of the delinquency segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelinquencyReport {
    /// Number of properties that have not paid.
    pub delinquent_count: u64,
    /// Number of critical delinquents.
    pub critical_count: u64,
    /// Median assessed value over the delinquent subset.
    pub median_assessed_value: Option<f64>,
    /// Median built area over the delinquent subset.
    pub median_built_area: Option<f64>,
    /// Bins produced for assessed value.
    pub assessed_value_bins: usize,
    /// Bins produced for tax due.
    pub tax_due_bins: usize,
    /// Bins produced for built area.
    pub built_area_bins: usize,
    /// Every delinquent property in source order.
    pub segments: Vec<DelinquentSegment>,
    /// Delinquent counts by economic use, largest first.
    pub by_economic_use: Vec<CategoryCount>,
    /// All delinquent properties.
    pub map: MapLayer,
}

/// Output of the cadastral-opportunity detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastralReport {
    /// Properties reporting zero built area.
    pub zero_built_area_count: u64,
    /// Median assessed value among zero-built-area properties.
    pub zero_area_median_assessed_value: Option<f64>,
    /// Median tax due over the whole filtered view.
    pub median_tax_due: Option<f64>,
    /// Number of zero-built-area properties valued above their median.
    pub zero_area_high_value_count: u64,
    /// Zero-built-area properties valued above their median.
    pub zero_area_high_value: Vec<PropertySummary>,
    /// Number of unpaid properties with above-median tax due.
    pub unpaid_high_due_count: u64,
    /// Unpaid properties with above-median tax due.
    pub unpaid_high_due: Vec<PropertySummary>,
    /// Map layer for the zero-built-area flag.
    pub zero_area_layer: MapLayer,
    /// Map layer for the unpaid high-due flag.
    pub unpaid_layer: MapLayer,
}

/// Output of the collection prioritization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    /// Number of delinquent properties.
    pub delinquent_count: u64,
    /// Summed tax due over delinquents.
    pub total_outstanding: f64,
    /// Highest-debt delinquents, largest first.
    pub priority: Vec<PropertySummary>,
    /// Every delinquent property.
    pub map: MapLayer,
}

/// One coverage scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Coverage level in percent.
    pub coverage_pct: u32,
    /// Additional collection if this share of the outstanding tax is paid.
    pub projected_collection: f64,
    /// Source rows of the targeted delinquents, largest debt first.
    pub targets: Vec<usize>,
    /// Targeted delinquents.
    pub layer: MapLayer,
}

/// Output of the scenario simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Number of delinquent properties.
    pub delinquent_count: u64,
    /// Summed tax due over delinquents.
    pub total_outstanding: f64,
    /// One entry per coverage level, in configured order.
    pub scenarios: Vec<Scenario>,
}

/// Ordered composite risk level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[strum(serialize = "Very low")]
    VeryLow,
    #[strum(serialize = "Low")]
    Low,
    #[strum(serialize = "Medium")]
    Medium,
    #[strum(serialize = "High")]
    High,
    #[strum(serialize = "Very high")]
    VeryHigh,
}

impl RiskLevel {
    /// Returns all levels from lowest to highest.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::VeryLow,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::VeryHigh,
        ]
    }

    /// Maps a 1-based bin index onto a level. Bins are labeled from
    /// [`Self::VeryLow`] upward, so fewer than five bins never reach the
    /// top labels.
    #[must_use]
    pub const fn from_bin(bin: u8) -> Option<Self> {
        match bin {
            1 => Some(Self::VeryLow),
            2 => Some(Self::Low),
            3 => Some(Self::Medium),
            4 => Some(Self::High),
            5 => Some(Self::VeryHigh),
            _ => None,
        }
    }
}

/// Composite risk for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecord {
    /// Source row index.
    pub row: usize,
    /// District.
    pub district: Option<String>,
    /// Fiscal rank (1-5).
    pub fiscal: u8,
    /// Cadastral rank (1, 3 or 5).
    pub cadastral: u8,
    /// Behavioral rank (1, 3 or 5).
    pub behavioral: u8,
    /// Weighted composite score.
    pub composite: f64,
    /// Final level.
    pub level: RiskLevel,
}

/// Number of properties at one risk level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelCount {
    /// Level.
    pub level: RiskLevel,
    /// Number of properties.
    pub count: u64,
}

/// Output of the composite risk analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    /// Per-property risk in source order.
    pub records: Vec<RiskRecord>,
    /// Number of composite bins produced (at most 5).
    pub level_bins: usize,
    /// Counts for every level, lowest first.
    pub level_counts: Vec<LevelCount>,
    /// Median assessed value over the view.
    pub median_assessed_value: Option<f64>,
    /// 20th percentile of built area over the view.
    pub built_area_p20: Option<f64>,
    /// 60th percentile of assessed value over the view.
    pub assessed_value_p60: Option<f64>,
    /// One marker per property, colored by level.
    pub map: MapLayer,
}

/// Result slot for one analysis of a dashboard run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AnalysisOutcome<T> {
    /// The analysis ran.
    Ready {
        /// The report.
        report: T,
    },
    /// The table lacks columns the analysis needs.
    Unavailable {
        /// Normalized names of the missing columns.
        missing_columns: Vec<String>,
    },
}

impl<T> AnalysisOutcome<T> {
    /// Returns the report if the analysis ran.
    #[must_use]
    pub const fn report(&self) -> Option<&T> {
        match self {
            Self::Ready { report } => Some(report),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Everything one dashboard run produced.
///
/// Analyses that were not requested are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Filters that were applied.
    pub filters: FilterSelection,
    /// Records in the loaded table.
    pub total_records: u64,
    /// Records left after filtering.
    pub filtered_records: u64,
    /// Compliance analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<AnalysisOutcome<ComplianceReport>>,
    /// Delinquency segmentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delinquency: Option<AnalysisOutcome<DelinquencyReport>>,
    /// Cadastral opportunities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadastral: Option<AnalysisOutcome<CadastralReport>>,
    /// Collection prioritization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<AnalysisOutcome<CollectionReport>>,
    /// Coverage scenarios.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<AnalysisOutcome<ScenarioReport>>,
    /// Composite risk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<AnalysisOutcome<RiskReport>>,
}

impl Dashboard {
    /// Every map layer of every analysis that ran, in dashboard order.
    #[must_use]
    pub fn layers(&self) -> Vec<&MapLayer> {
        let mut layers = Vec::new();
        if let Some(report) = self.compliance.as_ref().and_then(AnalysisOutcome::report) {
            layers.push(&report.map);
        }
        if let Some(report) = self.delinquency.as_ref().and_then(AnalysisOutcome::report) {
            layers.push(&report.map);
        }
        if let Some(report) = self.cadastral.as_ref().and_then(AnalysisOutcome::report) {
            layers.push(&report.zero_area_layer);
            layers.push(&report.unpaid_layer);
        }
        if let Some(report) = self.collection.as_ref().and_then(AnalysisOutcome::report) {
            layers.push(&report.map);
        }
        if let Some(report) = self.scenarios.as_ref().and_then(AnalysisOutcome::report) {
            layers.extend(report.scenarios.iter().map(|scenario| &scenario.layer));
        }
        if let Some(report) = self.risk.as_ref().and_then(AnalysisOutcome::report) {
            layers.push(&report.map);
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_levels_from_bins_ascend() {
        let levels: Vec<RiskLevel> = (1..=5).filter_map(RiskLevel::from_bin).collect();
        assert_eq!(levels, RiskLevel::all());
        assert!(RiskLevel::from_bin(0).is_none());
        assert!(RiskLevel::from_bin(6).is_none());
        assert_eq!(RiskLevel::VeryHigh.to_string(), "Very high");
    }

    #[test]
    fn analysis_parses_case_insensitively() {
        assert_eq!("Risk".parse::<Analysis>().unwrap(), Analysis::Risk);
        assert_eq!("scenarios".parse::<Analysis>().unwrap(), Analysis::Scenarios);
        assert!("charts".parse::<Analysis>().is_err());
    }

    #[test]
    fn marker_colors_use_web_names() {
        assert_eq!(MarkerColor::LightGreen.to_string(), "lightgreen");
        assert_eq!(MarkerColor::DarkRed.as_ref(), "darkred");
        assert_eq!(
            serde_json::to_string(&MarkerColor::DarkBlue).unwrap(),
            "\"darkblue\""
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let outcome: AnalysisOutcome<u32> = AnalysisOutcome::Unavailable {
            missing_columns: vec!["latitud".to_owned()],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["missingColumns"][0], "latitud");

        let ready = AnalysisOutcome::Ready { report: 7_u32 };
        assert_eq!(ready.report(), Some(&7));
        assert_eq!(serde_json::to_value(&ready).unwrap()["report"], 7);
    }

    #[test]
    fn empty_filter_selection() {
        assert!(FilterSelection::default().is_empty());
        let selection = FilterSelection {
            district: Some("El Salitre".to_owned()),
            ..FilterSelection::default()
        };
        assert!(!selection.is_empty());
    }
}
