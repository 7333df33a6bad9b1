//! Serialized forms of a [`Dashboard`].
//!
//! JSON carries every report in full. `GeoJSON` flattens the map layers
//! into one feature collection for external map viewers.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use predial_analytics_models::{Dashboard, MapLayer};

use crate::AnalyticsError;

/// Pretty-printed JSON of the whole dashboard.
///
/// # Errors
///
/// Returns [`AnalyticsError::Json`] if serialization fails.
pub fn to_json(dashboard: &Dashboard) -> Result<String, AnalyticsError> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

/// One point feature per marker of every layer in the dashboard, with the
/// layer name, color and popup as properties.
#[must_use]
pub fn to_feature_collection(dashboard: &Dashboard) -> FeatureCollection {
    let features = dashboard
        .layers()
        .into_iter()
        .flat_map(layer_features)
        .collect::<Vec<_>>();

    log::debug!("Exporting {} map features", features.len());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// The dashboard's map layers as a `GeoJSON` string.
#[must_use]
pub fn to_geojson(dashboard: &Dashboard) -> String {
    GeoJson::FeatureCollection(to_feature_collection(dashboard)).to_string()
}

fn layer_features(layer: &MapLayer) -> impl Iterator<Item = Feature> + '_ {
    layer.markers.iter().map(move |marker| {
        let mut properties = JsonObject::new();
        properties.insert("layer".to_owned(), layer.name.clone().into());
        properties.insert("color".to_owned(), marker.color.to_string().into());
        properties.insert("popup".to_owned(), marker.popup.clone().into());

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                marker.longitude,
                marker.latitude,
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::dashboard::run_dashboard;
    use crate::fixtures::{paid, property, table};
    use predial_analytics_models::{Analysis, FilterSelection};
    use predial_table::progress::NullProgress;

    fn dashboard(analyses: &[Analysis]) -> Dashboard {
        let table = table(vec![paid(0), property(1), property(2)]);
        run_dashboard(
            &table,
            &FilterSelection::default(),
            analyses,
            &AnalysisConfig::default(),
            &NullProgress,
        )
        .unwrap()
    }

    #[test]
    fn features_are_lon_lat_points() {
        let collection = to_feature_collection(&dashboard(&[Analysis::Collection]));
        assert_eq!(collection.features.len(), 2);

        let feature = &collection.features[0];
        let Some(Geometry {
            value: Value::Point(position),
            ..
        }) = &feature.geometry
        else {
            panic!("expected a point geometry");
        };
        assert!((position[0] - -74.0).abs() < 1e-9);
        assert!((position[1] - 4.001).abs() < 1e-9);

        let properties = feature.properties.as_ref().unwrap();
        assert_eq!(properties["layer"], "Collection targets");
        assert_eq!(properties["color"], "purple");
        assert!(properties["popup"].as_str().unwrap().contains("Tax due"));
    }

    #[test]
    fn geojson_string_parses_back() {
        let geojson = to_geojson(&dashboard(Analysis::all()));
        let parsed: GeoJson = geojson.parse().unwrap();
        assert!(matches!(parsed, GeoJson::FeatureCollection(_)));
    }

    #[test]
    fn json_includes_requested_reports() {
        let json = to_json(&dashboard(&[Analysis::Compliance, Analysis::Scenarios])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["totalRecords"], 3);
        assert_eq!(value["compliance"]["status"], "ready");
        assert_eq!(value["compliance"]["report"]["totalProperties"], 3);
        assert_eq!(
            value["scenarios"]["report"]["scenarios"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert!(value.get("risk").is_none());
    }
}
