#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Property record types and canonical column names.
//!
//! This crate defines the per-property record that every analysis in the
//! predial toolchain reads, plus the fixed set of normalized column keys
//! that a source table is expected to provide.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Tokens accepted as an affirmative answer in yes/no columns.
const AFFIRMATIVE_TOKENS: &[&str] = &["si", "sí", "yes"];

/// A canonical, post-normalization column of the source table.
///
/// The serialized form is the normalized header key (lowercase, underscores,
/// no accents), which is also what [`std::str::FromStr`] accepts.
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
pub enum Column {
    /// Rural district (`vereda`).
    #[serde(rename = "vereda")]
    #[strum(serialize = "vereda")]
    District,
    /// Urban sector code.
    #[serde(rename = "sector_urbano")]
    #[strum(serialize = "sector_urbano")]
    UrbanSector,
    /// Horizontal-property (condominium) flag.
    #[serde(rename = "propiedad_horizontal")]
    #[strum(serialize = "propiedad_horizontal")]
    HorizontalProperty,
    /// Cadastral sector.
    #[serde(rename = "sector")]
    #[strum(serialize = "sector")]
    Sector,
    /// Whether the property tax was paid ("si"/"no").
    #[serde(rename = "pago_impuesto_predial")]
    #[strum(serialize = "pago_impuesto_predial")]
    PaymentFlag,
    /// Whether the tax is under a financing agreement ("si"/"no").
    #[serde(rename = "financiacion_impuesto_predial")]
    #[strum(serialize = "financiacion_impuesto_predial")]
    FinancingFlag,
    /// Tax amount billed.
    #[serde(rename = "valor_impuesto_a_pagar")]
    #[strum(serialize = "valor_impuesto_a_pagar")]
    TaxDue,
    /// Amount collected.
    #[serde(rename = "recaudo_predial")]
    #[strum(serialize = "recaudo_predial")]
    Collected,
    /// Cadastral assessed value.
    #[serde(rename = "avaluo_catastral")]
    #[strum(serialize = "avaluo_catastral")]
    AssessedValue,
    /// Built area in square meters.
    #[serde(rename = "area_construida")]
    #[strum(serialize = "area_construida")]
    BuiltArea,
    /// Economic-use category of the lot.
    #[serde(rename = "destino_economico_predio")]
    #[strum(serialize = "destino_economico_predio")]
    EconomicUse,
    /// Latitude in decimal degrees.
    #[serde(rename = "latitud")]
    #[strum(serialize = "latitud")]
    Latitude,
    /// Longitude in decimal degrees.
    #[serde(rename = "longitud")]
    #[strum(serialize = "longitud")]
    Longitude,
}

impl Column {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::District,
            Self::UrbanSector,
            Self::HorizontalProperty,
            Self::Sector,
            Self::PaymentFlag,
            Self::FinancingFlag,
            Self::TaxDue,
            Self::Collected,
            Self::AssessedValue,
            Self::BuiltArea,
            Self::EconomicUse,
            Self::Latitude,
            Self::Longitude,
        ]
    }

    /// Whether the column holds numeric values.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TaxDue
                | Self::Collected
                | Self::AssessedValue
                | Self::BuiltArea
                | Self::Latitude
                | Self::Longitude
        )
    }
}

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// One row of the source table after column normalization.
///
/// Text cells that are blank and numeric cells that are blank or
/// unparseable are `None`. Missing numerics are skipped by aggregates and
/// never satisfy a threshold comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    /// Zero-based index of the data row in the source table.
    pub row: usize,
    /// Rural district name.
    pub district: Option<String>,
    /// Urban sector code.
    pub urban_sector: Option<String>,
    /// Horizontal-property flag as written in the source.
    pub horizontal_property: Option<String>,
    /// Cadastral sector.
    pub sector: Option<String>,
    /// Raw payment flag.
    pub payment_flag: Option<String>,
    /// Raw financing flag.
    pub financing_flag: Option<String>,
    /// Tax amount billed.
    pub tax_due: Option<f64>,
    /// Amount collected.
    pub collected: Option<f64>,
    /// Cadastral assessed value.
    pub assessed_value: Option<f64>,
    /// Built area.
    pub built_area: Option<f64>,
    /// Economic-use category.
    pub economic_use: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
}

impl PropertyRecord {
    /// Whether the tax for this property has been paid.
    ///
    /// Anything other than an affirmative token, including a blank cell,
    /// counts as not paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_flag.as_deref().is_some_and(is_affirmative)
    }

    /// Whether the outstanding tax is under a financing agreement.
    #[must_use]
    pub fn is_financed(&self) -> bool {
        self.financing_flag.as_deref().is_some_and(is_affirmative)
    }

    /// Returns the location if both coordinates are present and finite.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Some(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }

    /// Whether the record reports exactly zero built area.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn has_zero_built_area(&self) -> bool {
        self.built_area.is_some_and(|area| area == 0.0)
    }

    /// Returns the value of a text column, or `None` for numeric columns
    /// and blank cells.
    #[must_use]
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::District => self.district.as_deref(),
            Column::UrbanSector => self.urban_sector.as_deref(),
            Column::HorizontalProperty => self.horizontal_property.as_deref(),
            Column::Sector => self.sector.as_deref(),
            Column::PaymentFlag => self.payment_flag.as_deref(),
            Column::FinancingFlag => self.financing_flag.as_deref(),
            Column::EconomicUse => self.economic_use.as_deref(),
            Column::TaxDue
            | Column::Collected
            | Column::AssessedValue
            | Column::BuiltArea
            | Column::Latitude
            | Column::Longitude => None,
        }
    }

    /// Returns the value of a numeric column, or `None` for text columns
    /// and missing cells.
    #[must_use]
    pub const fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::TaxDue => self.tax_due,
            Column::Collected => self.collected,
            Column::AssessedValue => self.assessed_value,
            Column::BuiltArea => self.built_area,
            Column::Latitude => self.latitude,
            Column::Longitude => self.longitude,
            Column::District
            | Column::UrbanSector
            | Column::HorizontalProperty
            | Column::Sector
            | Column::PaymentFlag
            | Column::FinancingFlag
            | Column::EconomicUse => None,
        }
    }
}

/// Case-insensitive check for a yes/no cell holding "yes".
#[must_use]
pub fn is_affirmative(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&lower.as_str())
}
