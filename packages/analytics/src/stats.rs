//! Summary statistics and equal-frequency binning.
//!
//! All functions take the *present* values of a column; missing cells are
//! dropped by the caller (see [`present`]) and therefore never influence a
//! median, a percentile or a bin edge. Empty input yields `None` or zero
//! bins instead of an error.

use std::cmp::Ordering;

/// Number of bins for quintile segmentation.
pub const QUINTILES: usize = 5;

/// Collects the present values of an optional column.
#[must_use]
pub fn present(values: impl IntoIterator<Item = Option<f64>>) -> Vec<f64> {
    values.into_iter().flatten().collect()
}

/// Sums the present values. An empty or all-missing column sums to 0.
#[must_use]
pub fn sum(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    values.into_iter().flatten().sum()
}

/// Arithmetic mean, `None` for empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// The `q`-quantile (`0.0..=1.0`) with linear interpolation between the
/// two nearest ranks.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// The median (0.5-quantile).
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = (position.ceil() as usize).min(last);
    let fraction = position - position.floor();
    Some((sorted[upper] - sorted[lower]).mul_add(fraction, sorted[lower]))
}

/// Whether `value` is strictly greater than `threshold`. Missing on either
/// side compares false.
#[must_use]
pub fn exceeds(value: Option<f64>, threshold: Option<f64>) -> bool {
    matches!((value, threshold), (Some(v), Some(t)) if v > t)
}

/// Whether `value` is strictly less than `threshold`. Missing on either
/// side compares false.
#[must_use]
pub fn falls_below(value: Option<f64>, threshold: Option<f64>) -> bool {
    matches!((value, threshold), (Some(v), Some(t)) if v < t)
}

/// Orders two optional amounts largest first, with missing amounts last.
#[must_use]
pub fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Equal-frequency bin edges fitted to a column.
///
/// Edges sit at evenly spaced quantiles. Duplicate edges are dropped, so a
/// column with few distinct values yields fewer bins; a constant column
/// yields a single bin and an empty column yields none.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBins {
    edges: Vec<f64>,
}

impl QuantileBins {
    /// Fits up to `bins` equal-frequency bins to `values`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(values: &[f64], bins: usize) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let bins = bins.max(1);
        let mut edges: Vec<f64> = (0..=bins)
            .filter_map(|i| quantile_sorted(&sorted, i as f64 / bins as f64))
            .collect();
        edges.dedup();

        Self { edges }
    }

    /// The fitted edges, ascending and distinct.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins the edges define.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        match self.edges.len() {
            0 => 0,
            1 => 1,
            n => n - 1,
        }
    }

    /// Returns the 1-based bin of `value`, with right-closed bins and the
    /// lowest edge included in bin 1. Values outside the fitted range get
    /// `None`.
    #[must_use]
    pub fn assign(&self, value: f64) -> Option<u8> {
        let (first, last) = (*self.edges.first()?, *self.edges.last()?);
        if value < first || value > last {
            return None;
        }
        let index = self.edges.partition_point(|edge| *edge < value).max(1);
        u8::try_from(index).ok()
    }
}

/// Assigns quintile bins to an optional column. Missing cells get `None`.
///
/// Returns the per-value bins and the number of bins actually produced.
#[must_use]
pub fn quintile_bins(values: &[Option<f64>]) -> (Vec<Option<u8>>, usize) {
    let bins = QuantileBins::fit(&present(values.iter().copied()), QUINTILES);
    let assigned = values
        .iter()
        .map(|value| value.and_then(|v| bins.assign(v)))
        .collect();
    (assigned, bins.bin_count())
}
