//! Pipeline orchestration
//!
//! Runs the stages strictly in sequence: fetch → normalize → project →
//! {stats, tiles} → publish. The run is designed to be re-triggered on a
//! schedule, so "no data this cycle" is a normal short-circuit, not a
//! failure, and no downstream artifact is written once an upstream stage
//! has failed.

use crate::config::PipelineConfig;
use crate::export::export_csv;
use crate::fetch::Fetcher;
use crate::geometry::project;
use crate::normalize::{normalize, CanonicalRow};
use crate::publish::Publisher;
use crate::stats::compute_stats;
use crate::tiles::build_tiles;
use fuelmap_common::{fs::write_atomic, FuelmapError, Result};
use tracing::{info, warn};

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All stages ran; artifacts were produced (and published, if
    /// configured)
    Completed,
    /// The upstream document carried no station collection this cycle
    NoData,
    /// No row had a valid coordinate pair; nothing to tile
    NoGeometry,
}

/// Execute one full pipeline run.
pub async fn run(config: &PipelineConfig) -> Result<RunOutcome> {
    let today = chrono::Local::now().date_naive();

    let fetcher = Fetcher::new(config.fetch.clone())?;
    let raw = match fetcher.fetch_stations().await {
        Ok(records) => records,
        Err(FuelmapError::Schema(msg)) => {
            warn!(%msg, "no data available this cycle");
            return Ok(RunOutcome::NoData);
        },
        Err(e) => return Err(e),
    };
    info!(records = raw.len(), "fetched upstream records");

    let rows = normalize(&raw, today);
    export_csv(&rows, &config.spreadsheet_path(today))?;

    let mapped: Vec<CanonicalRow> = rows.iter().filter(|r| r.has_geometry()).cloned().collect();
    if mapped.is_empty() {
        info!("no rows with valid coordinates; skipping tiles and stats");
        return Ok(RunOutcome::NoGeometry);
    }
    info!(
        mapped = mapped.len(),
        dropped = rows.len() - mapped.len(),
        "projected geometries"
    );

    let collection = project(&mapped);
    let geojson_path = config.geojson_path();
    write_atomic(&geojson_path, serde_json::to_string(&collection)?.as_bytes())?;

    let mbtiles_path = config.mbtiles_path();
    build_tiles(&geojson_path, &mbtiles_path, &config.tiles)?;

    let stats = compute_stats(&mapped, config.classes);
    write_atomic(&config.stats_path(), &serde_json::to_vec(&stats)?)?;
    info!(path = %config.stats_path().display(), "break statistics written");

    if let Some(publish_config) = &config.publish {
        let publisher = Publisher::new(publish_config.clone())?;
        publisher.publish(&mbtiles_path).await?;
    } else {
        info!("publish target not configured; skipping upload");
    }

    Ok(RunOutcome::Completed)
}
