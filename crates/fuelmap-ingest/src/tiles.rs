//! Tile archive construction
//!
//! Invokes the external tiling tool (tippecanoe) over the GeoJSON layer to
//! produce the MBTiles archive. The tool is an opaque collaborator: the
//! contract is its argument list and exit-code convention. The archive is
//! only treated as valid when the tool exits zero.

use crate::config::TileConfig;
use fuelmap_common::{FuelmapError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Build the tile archive from `geojson_path` into `mbtiles_path`.
///
/// The executable is resolved from the runtime search path; its absence is
/// [`FuelmapError::ToolNotFound`]. A nonzero exit is [`FuelmapError::Build`]
/// carrying the tool's diagnostic output.
pub fn build_tiles(geojson_path: &Path, mbtiles_path: &Path, config: &TileConfig) -> Result<()> {
    let executable = which::which(&config.executable)
        .map_err(|_| FuelmapError::ToolNotFound(config.executable.clone()))?;

    debug!(tool = %executable.display(), layer = %config.layer, "invoking tiling tool");

    let output = Command::new(executable)
        .arg("-o")
        .arg(mbtiles_path)
        .arg(format!("-r{}", config.drop_rate))
        .arg(format!("-z{}", config.max_zoom))
        .arg(format!("-Z{}", config.min_zoom))
        .arg("-l")
        .arg(&config.layer)
        .arg(geojson_path)
        .arg("--force")
        .output()?;

    if !output.status.success() {
        return Err(FuelmapError::Build {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    info!(archive = %mbtiles_path.display(), "tile archive built");
    Ok(())
}
