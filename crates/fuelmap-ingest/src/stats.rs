//! Quantile break statistics
//!
//! Computes the distribution breakpoints used by the map's choropleth
//! classification. Breaks must be strictly increasing even when the raw
//! quantiles tie (fuel prices cluster heavily on round values), so ties are
//! repaired with a small epsilon. Downstream bins would overlap otherwise.

use crate::normalize::CanonicalRow;
use serde::Serialize;

/// Separation applied when a quantile ties with or falls below the previous
/// accepted breakpoint. Known limitation: for values of very large magnitude
/// the epsilon can vanish in floating-point rounding; fuel prices are far
/// from that range.
pub const BREAK_EPSILON: f64 = 1e-6;

/// Breakpoints for one numeric field: k−1 strictly increasing quantile cut
/// points plus the exact min and max of the numeric subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakSet {
    pub min: f64,
    pub max: f64,
    pub breaks: Vec<f64>,
}

/// Per-field break statistics, serialized to `stats.json`. A field with no
/// numeric data serializes as `null`, which consumers must treat as a valid
/// "no data" outcome. Keys match the canonical column names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsDocument {
    #[serde(rename = "Precio Gasolina 95 E5")]
    pub gasolina_95: Option<BreakSet>,
    #[serde(rename = "Precio Gasoleo A")]
    pub gasoleo_a: Option<BreakSet>,
}

/// Linear interpolation between order statistics on a sorted slice
/// (the conventional quantile estimator).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let fraction = position - lower as f64;
        sorted[lower] + fraction * (sorted[upper] - sorted[lower])
    }
}

/// Compute quantile breakpoints for one numeric column.
///
/// Missing entries are discarded first; an empty numeric subset yields
/// `None`, not an error. Otherwise the i/classes quantiles for
/// i = 1..classes−1 are computed in ascending order and repaired into a
/// strictly increasing sequence: each candidate must exceed the previous
/// accepted value (seeded with the column minimum, so the first bin is never
/// empty); a tie or decrease is replaced by previous + [`BREAK_EPSILON`].
pub fn quantile_breaks(values: &[Option<f64>], classes: usize) -> Option<BreakSet> {
    let mut numeric: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.sort_by(|a, b| a.total_cmp(b));

    let min = numeric[0];
    let max = numeric[numeric.len() - 1];

    let mut breaks = Vec::with_capacity(classes.saturating_sub(1));
    let mut last = min;
    for i in 1..classes {
        let candidate = quantile(&numeric, i as f64 / classes as f64);
        let accepted = if candidate > last {
            candidate
        } else {
            last + BREAK_EPSILON
        };
        breaks.push(accepted);
        last = accepted;
    }

    Some(BreakSet { min, max, breaks })
}

/// Compute the stats document for the two price fields over the mapped rows.
pub fn compute_stats(rows: &[CanonicalRow], classes: usize) -> StatsDocument {
    let gasolina: Vec<Option<f64>> = rows.iter().map(|r| r.precio_gasolina_95).collect();
    let gasoleo: Vec<Option<f64>> = rows.iter().map(|r| r.precio_gasoleo_a).collect();

    StatsDocument {
        gasolina_95: quantile_breaks(&gasolina, classes),
        gasoleo_a: quantile_breaks(&gasoleo, classes),
    }
}
