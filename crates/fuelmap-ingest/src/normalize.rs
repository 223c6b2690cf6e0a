//! Record normalization
//!
//! Converts the raw, heterogeneous station records returned by the upstream
//! API into a canonical typed table. The upstream publishes prices and
//! coordinates as Spanish-locale text ("1,459", "40,41"), sometimes padded
//! with non-breaking spaces; those fields are coerced to decimal numbers or
//! become absent when they do not parse. Rows are never dropped here and
//! never deduplicated: identity is positional, matching API response order.

use chrono::NaiveDate;
use serde_json::Value;

// ============================================================================
// Upstream Field Names
// ============================================================================

pub const FIELD_ROTULO: &str = "Rótulo";
pub const FIELD_HORARIO: &str = "Horario";
pub const FIELD_DIRECCION: &str = "Dirección";
pub const FIELD_MUNICIPIO: &str = "Municipio";
pub const FIELD_PROVINCIA: &str = "Provincia";
pub const FIELD_GASOLEO_A: &str = "Precio Gasoleo A";
pub const FIELD_GASOLINA_95: &str = "Precio Gasolina 95 E5";
pub const FIELD_FECHA_DESCARGA: &str = "FechaDescarga";
pub const FIELD_LATITUD: &str = "Latitud";
pub const FIELD_LONGITUD: &str = "Longitud (WGS84)";

/// The fixed, ordered set of recognized fields. This is the column order of
/// the spreadsheet export and the property key set of the GeoJSON layer
/// (minus the two coordinate fields).
pub const RECOGNIZED_FIELDS: [&str; 10] = [
    FIELD_ROTULO,
    FIELD_HORARIO,
    FIELD_DIRECCION,
    FIELD_MUNICIPIO,
    FIELD_PROVINCIA,
    FIELD_GASOLEO_A,
    FIELD_GASOLINA_95,
    FIELD_FECHA_DESCARGA,
    FIELD_LATITUD,
    FIELD_LONGITUD,
];

/// One raw record as received upstream: an unordered field-name → value map.
/// Duplicates across records are preserved as distinct rows.
pub type RawRecord = serde_json::Map<String, Value>;

/// A typed projection of one raw record onto the recognized field set.
///
/// Every field is either decimal-number-or-absent or text-or-absent; the
/// download date is attached constant across the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub rotulo: Option<String>,
    pub horario: Option<String>,
    pub direccion: Option<String>,
    pub municipio: Option<String>,
    pub provincia: Option<String>,
    pub precio_gasoleo_a: Option<f64>,
    pub precio_gasolina_95: Option<f64>,
    pub fecha_descarga: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
}

impl CanonicalRow {
    /// A row is mappable only when both coordinates parsed successfully.
    pub fn has_geometry(&self) -> bool {
        self.latitud.is_some() && self.longitud.is_some()
    }
}

/// Parse Spanish-locale decimal text into a finite number.
///
/// Strips non-breaking spaces and surrounding whitespace, replaces the
/// decimal comma with a decimal point, then parses. A value that fails to
/// parse (or is non-finite) becomes `None` rather than raising; malformed
/// input must never default to zero.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('\u{a0}', "");
    let cleaned = cleaned.trim().replace(',', ".");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce one raw field value into decimal-or-absent.
fn numeric_field(record: &RawRecord, field: &str) -> Option<f64> {
    match record.get(field) {
        Some(Value::String(s)) => parse_decimal(s),
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Coerce one raw field value into text-or-absent.
fn text_field(record: &RawRecord, field: &str) -> Option<String> {
    match record.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// Project raw records onto the canonical field set.
///
/// Unrecognized fields are dropped and missing ones are represented as
/// absent. `downloaded` is the run's download date, attached to every row.
pub fn normalize(records: &[RawRecord], downloaded: NaiveDate) -> Vec<CanonicalRow> {
    let fecha_descarga = downloaded.format("%d/%m/%Y").to_string();

    records
        .iter()
        .map(|record| CanonicalRow {
            rotulo: text_field(record, FIELD_ROTULO),
            horario: text_field(record, FIELD_HORARIO),
            direccion: text_field(record, FIELD_DIRECCION),
            municipio: text_field(record, FIELD_MUNICIPIO),
            provincia: text_field(record, FIELD_PROVINCIA),
            precio_gasoleo_a: numeric_field(record, FIELD_GASOLEO_A),
            precio_gasolina_95: numeric_field(record, FIELD_GASOLINA_95),
            fecha_descarga: fecha_descarga.clone(),
            latitud: numeric_field(record, FIELD_LATITUD),
            longitud: numeric_field(record, FIELD_LONGITUD),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    fn download_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_parse_decimal_comma_variants() {
        assert_eq!(parse_decimal("1,459"), Some(1.459));
        assert_eq!(parse_decimal("40,41"), Some(40.41));
        assert_eq!(parse_decimal("-3,70"), Some(-3.70));
        assert_eq!(parse_decimal(" 1,5 "), Some(1.5));
        assert_eq!(parse_decimal("1\u{a0}459,5"), Some(1459.5));
        assert_eq!(parse_decimal("2.15"), Some(2.15));
    }

    #[test]
    fn test_parse_decimal_malformed_is_absent_never_zero() {
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("1,4,5"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn test_normalize_spanish_locale_scenario() {
        let raw = vec![record(&[
            (FIELD_GASOLINA_95, "1,459"),
            (FIELD_LATITUD, "40,41"),
            (FIELD_LONGITUD, "-3,70"),
        ])];

        let rows = normalize(&raw, download_date());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].precio_gasolina_95, Some(1.459));
        assert_eq!(rows[0].latitud, Some(40.41));
        assert_eq!(rows[0].longitud, Some(-3.70));
        assert_eq!(rows[0].fecha_descarga, "09/03/2026");
    }

    #[test]
    fn test_normalize_drops_unrecognized_and_tolerates_missing() {
        let mut rec = record(&[(FIELD_ROTULO, "REPSOL")]);
        rec.insert("IDEESS".to_string(), Value::String("4375".to_string()));

        let rows = normalize(&[rec], download_date());

        assert_eq!(rows[0].rotulo.as_deref(), Some("REPSOL"));
        assert_eq!(rows[0].horario, None);
        assert_eq!(rows[0].precio_gasoleo_a, None);
    }

    #[test]
    fn test_normalize_malformed_price_survives_as_absent_row() {
        let raw = vec![record(&[
            (FIELD_ROTULO, "CEPSA"),
            (FIELD_GASOLEO_A, ""),
            (FIELD_GASOLINA_95, "no disponible"),
        ])];

        let rows = normalize(&raw, download_date());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].precio_gasoleo_a, None);
        assert_eq!(rows[0].precio_gasolina_95, None);
    }

    #[test]
    fn test_normalize_accepts_json_numbers() {
        let mut rec = RawRecord::new();
        rec.insert(
            FIELD_LATITUD.to_string(),
            Value::Number(serde_json::Number::from_f64(43.36).unwrap()),
        );

        let rows = normalize(&[rec], download_date());

        assert_eq!(rows[0].latitud, Some(43.36));
    }

    #[test]
    fn test_normalize_preserves_duplicates_and_order() {
        let rec = record(&[(FIELD_ROTULO, "GALP")]);
        let raw = vec![rec.clone(), rec];

        let rows = normalize(&raw, download_date());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], rows[1]);
    }
}
