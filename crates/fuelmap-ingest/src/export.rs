//! Spreadsheet export
//!
//! Writes the full canonical table (before geometry filtering) as a
//! date-stamped CSV with the canonical column order. Absent values become
//! empty cells.

use crate::normalize::{CanonicalRow, RECOGNIZED_FIELDS};
use fuelmap_common::{fs::write_atomic, Result};
use std::path::Path;
use tracing::info;

fn number_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Write the canonical table to `path` as CSV, atomically.
pub fn export_csv(rows: &[CanonicalRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(RECOGNIZED_FIELDS)?;

    for row in rows {
        writer.write_record([
            text_cell(&row.rotulo),
            text_cell(&row.horario),
            text_cell(&row.direccion),
            text_cell(&row.municipio),
            text_cell(&row.provincia),
            number_cell(row.precio_gasoleo_a),
            number_cell(row.precio_gasolina_95),
            row.fecha_descarga.clone(),
            number_cell(row.latitud),
            number_cell(row.longitud),
        ])?;
    }

    let body = writer.into_inner().map_err(|e| e.into_error())?;
    write_atomic(path, &body)?;

    info!(rows = rows.len(), path = %path.display(), "spreadsheet exported");
    Ok(())
}
