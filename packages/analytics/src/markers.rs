//! Map-layer assembly and popup formatting.

use predial_analytics_models::{MapLayer, MapMarker, MarkerColor};
use predial_property_models::Coordinates;

/// Accumulates markers for one layer, counting records that cannot be
/// placed because they lack coordinates.
pub struct LayerBuilder {
    layer: MapLayer,
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            layer: MapLayer {
                name: name.into(),
                ..MapLayer::default()
            },
        }
    }

    /// Adds a marker at `location`. The popup is only rendered for records
    /// that end up on the map.
    pub fn add(
        &mut self,
        location: Option<Coordinates>,
        color: MarkerColor,
        popup: impl FnOnce() -> String,
    ) {
        let Some(location) = location else {
            self.layer.skipped_without_coordinates += 1;
            return;
        };
        self.layer.markers.push(MapMarker {
            latitude: location.latitude,
            longitude: location.longitude,
            color,
            popup: popup(),
        });
    }

    pub fn finish(self) -> MapLayer {
        if self.layer.skipped_without_coordinates > 0 {
            log::debug!(
                "Layer '{}': {} record(s) without coordinates left off the map",
                self.layer.name,
                self.layer.skipped_without_coordinates
            );
        }
        self.layer
    }
}

/// Formats a currency amount rounded to whole units with thousands
/// separators, e.g. `$1,234,567`.
#[must_use]
pub fn money(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "n/a".to_owned();
    };
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits))
}

/// Formats a plain measurement, or `n/a` when missing.
pub fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v}"))
}

/// Formats a text cell, or `n/a` when blank.
pub fn text(value: Option<&str>) -> &str {
    value.unwrap_or("n/a")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
