//! Geometry projection
//!
//! Builds the GeoJSON point layer from the canonical table. Only rows with
//! both coordinates present survive; coordinates move into the feature
//! geometry and are never duplicated into properties. Absent property
//! values serialize as explicit `null` so every feature carries the same
//! property key set.

use crate::normalize::{
    CanonicalRow, FIELD_DIRECCION, FIELD_FECHA_DESCARGA, FIELD_GASOLEO_A, FIELD_GASOLINA_95,
    FIELD_HORARIO, FIELD_MUNICIPIO, FIELD_PROVINCIA, FIELD_ROTULO,
};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde_json::Value;

fn text_value(field: &Option<String>) -> Value {
    match field {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

fn number_value(field: Option<f64>) -> Value {
    field
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Feature properties: every canonical field except the coordinate pair.
fn properties(row: &CanonicalRow) -> JsonObject {
    let mut props = JsonObject::new();
    props.insert(FIELD_ROTULO.to_string(), text_value(&row.rotulo));
    props.insert(FIELD_HORARIO.to_string(), text_value(&row.horario));
    props.insert(FIELD_DIRECCION.to_string(), text_value(&row.direccion));
    props.insert(FIELD_MUNICIPIO.to_string(), text_value(&row.municipio));
    props.insert(FIELD_PROVINCIA.to_string(), text_value(&row.provincia));
    props.insert(
        FIELD_GASOLEO_A.to_string(),
        number_value(row.precio_gasoleo_a),
    );
    props.insert(
        FIELD_GASOLINA_95.to_string(),
        number_value(row.precio_gasolina_95),
    );
    props.insert(
        FIELD_FECHA_DESCARGA.to_string(),
        Value::String(row.fecha_descarga.clone()),
    );
    props
}

/// Project canonical rows into a GeoJSON feature collection.
///
/// Retains only rows where both latitude and longitude parsed; output
/// ordering matches input row ordering.
pub fn project(rows: &[CanonicalRow]) -> FeatureCollection {
    let features = rows
        .iter()
        .filter_map(|row| {
            let (lat, lon) = (row.latitud?, row.longitud?);
            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeoValue::Point(vec![lon, lat]))),
                id: None,
                properties: Some(properties(row)),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, RawRecord, FIELD_LATITUD, FIELD_LONGITUD};
    use chrono::NaiveDate;

    fn row(lat: Option<f64>, lon: Option<f64>) -> CanonicalRow {
        CanonicalRow {
            rotulo: Some("REPSOL".to_string()),
            horario: None,
            direccion: Some("CALLE MAYOR 1".to_string()),
            municipio: Some("Madrid".to_string()),
            provincia: Some("MADRID".to_string()),
            precio_gasoleo_a: Some(1.399),
            precio_gasolina_95: None,
            fecha_descarga: "09/03/2026".to_string(),
            latitud: lat,
            longitud: lon,
        }
    }

    #[test]
    fn test_project_retains_only_rows_with_both_coordinates() {
        let rows = vec![
            row(Some(40.41), Some(-3.70)),
            row(None, Some(-3.70)),
            row(Some(40.41), None),
            row(None, None),
        ];

        let collection = project(&rows);

        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_project_coordinates_are_lon_lat() {
        let collection = project(&[row(Some(40.41), Some(-3.70))]);

        let geometry = collection.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            GeoValue::Point(coords) => assert_eq!(coords, &vec![-3.70, 40.41]),
            other => panic!("expected point geometry, got {other:?}"),
        }
    }

    #[test]
    fn test_project_properties_exclude_coordinate_fields() {
        let collection = project(&[row(Some(40.41), Some(-3.70))]);

        let props = collection.features[0].properties.as_ref().unwrap();
        assert!(!props.contains_key(FIELD_LATITUD));
        assert!(!props.contains_key(FIELD_LONGITUD));
        assert_eq!(props.len(), 8);
    }

    #[test]
    fn test_project_absent_values_are_explicit_null() {
        let collection = project(&[row(Some(40.41), Some(-3.70))]);

        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props.get("Horario"), Some(&Value::Null));
        assert_eq!(props.get("Precio Gasolina 95 E5"), Some(&Value::Null));
        assert_eq!(
            props.get("Precio Gasoleo A"),
            Some(&Value::Number(serde_json::Number::from_f64(1.399).unwrap()))
        );
    }

    #[test]
    fn test_feature_collection_round_trips_through_json() {
        let rows = vec![row(Some(40.41), Some(-3.70)), row(Some(43.36), Some(-8.41))];
        let collection = project(&rows);

        let serialized = serde_json::to_string(&collection).unwrap();
        let reparsed: FeatureCollection = serialized.parse::<geojson::GeoJson>().unwrap().try_into().unwrap();

        assert_eq!(reparsed.features.len(), 2);
        let geometry = reparsed.features[1].geometry.as_ref().unwrap();
        match &geometry.value {
            GeoValue::Point(coords) => {
                assert!((coords[0] - -8.41).abs() < 1e-9);
                assert!((coords[1] - 43.36).abs() < 1e-9);
            },
            other => panic!("expected point geometry, got {other:?}"),
        }
        // Absent properties survive as explicit null, not as missing keys.
        let props = reparsed.features[0].properties.as_ref().unwrap();
        assert_eq!(props.get("Horario"), Some(&Value::Null));
    }

    #[test]
    fn test_project_from_normalized_spanish_records() {
        let mut rec = RawRecord::new();
        rec.insert(
            "Precio Gasolina 95 E5".to_string(),
            Value::String("1,459".to_string()),
        );
        rec.insert(FIELD_LATITUD.to_string(), Value::String("40,41".to_string()));
        rec.insert(FIELD_LONGITUD.to_string(), Value::String("-3,70".to_string()));

        let rows = normalize(&[rec], NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
        let collection = project(&rows);

        assert_eq!(collection.features.len(), 1);
        let geometry = collection.features[0].geometry.as_ref().unwrap();
        match &geometry.value {
            GeoValue::Point(coords) => assert_eq!(coords, &vec![-3.70, 40.41]),
            other => panic!("expected point geometry, got {other:?}"),
        }
    }
}
