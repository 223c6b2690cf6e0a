//! Configuration for the fuelmap pipeline
//!
//! All configuration is explicit and passed into constructors; there is no
//! global mutable state. Publish credentials come from the environment
//! (optionally via a `.env` file loaded by the binary).

use fuelmap_common::{FuelmapError, Result};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Pipeline Configuration Constants
// ============================================================================

/// Upstream MINETUR endpoint for the national fuel-price dataset.
pub const DEFAULT_SOURCE_URL: &str =
    "https://sedeaplicaciones.minetur.gob.es/ServiciosRESTCarburantes/PreciosCarburantes/EstacionesTerrestres/";

/// Request timeout for the initial fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Retry budget for the fetcher, per run.
pub const DEFAULT_FETCH_RETRIES: u32 = 5;

/// Base factor for exponential retry backoff, in seconds.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.6;

/// Number of quantile classes for the break statistics.
pub const DEFAULT_CLASSES: usize = 8;

/// Fixed interval between publish status polls, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Maximum number of publish status polls (~20 minutes at 5s).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 240;

/// Fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upstream URL to retrieve
    pub url: String,

    /// Bounded request timeout
    pub timeout: Duration,

    /// Retry budget per failure category
    pub max_retries: u32,

    /// Exponential backoff base factor in seconds
    pub backoff_factor: f64,

    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_retries: DEFAULT_FETCH_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Tiling tool configuration
#[derive(Debug, Clone)]
pub struct TileConfig {
    /// Name of the tiling executable, resolved from PATH
    pub executable: String,

    /// Layer name inside the tile archive
    pub layer: String,

    /// Minimum zoom level
    pub min_zoom: u8,

    /// Maximum zoom level
    pub max_zoom: u8,

    /// Point retention rate (`-r1` keeps every point at every zoom)
    pub drop_rate: u8,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            executable: "tippecanoe".to_string(),
            layer: "estaciones".to_string(),
            min_zoom: 3,
            max_zoom: 12,
            drop_rate: 1,
        }
    }
}

/// Publish target configuration
///
/// Malformed values short-circuit the coordinator to its error state before
/// any network call is made; see [`PublishConfig::validate`].
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Base URL of the tile-hosting upload API
    pub api_base: String,

    /// Target tileset identifier (`account.tileset`)
    pub tileset: String,

    /// Access credential; secret tokens carry the `sk.` prefix
    pub token: String,

    /// Fixed interval between status polls
    pub poll_interval: Duration,

    /// Maximum number of status polls before giving up
    pub max_poll_attempts: u32,
}

impl PublishConfig {
    /// Load publish configuration from environment variables.
    ///
    /// Returns `Ok(None)` when `FUELMAP_TILESET` or `FUELMAP_UPLOAD_TOKEN`
    /// is unset, which means publishing is skipped for this run.
    ///
    /// Environment variables:
    /// - `FUELMAP_TILESET`: target tileset identifier
    /// - `FUELMAP_UPLOAD_TOKEN`: access credential
    /// - `FUELMAP_UPLOAD_API`: upload API base URL (optional)
    pub fn from_env() -> Result<Option<Self>> {
        let (Ok(tileset), Ok(token)) = (
            std::env::var("FUELMAP_TILESET"),
            std::env::var("FUELMAP_UPLOAD_TOKEN"),
        ) else {
            return Ok(None);
        };

        let api_base = std::env::var("FUELMAP_UPLOAD_API")
            .unwrap_or_else(|_| "https://tiles.fuelmap.es/v1".to_string());

        Ok(Some(Self {
            api_base,
            tileset,
            token,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }))
    }

    /// Check the target identifier and credential shape.
    ///
    /// The tileset identifier must carry the `account.tileset` separator and
    /// the token must be a secret (`sk.`-prefixed) credential.
    pub fn validate(&self) -> Result<()> {
        if !self.tileset.contains('.') {
            return Err(FuelmapError::config(format!(
                "tileset identifier '{}' is missing the 'account.tileset' separator",
                self.tileset
            )));
        }

        if !self.token.starts_with("sk.") {
            return Err(FuelmapError::config(
                "upload token is not a secret token (expected 'sk.' prefix)",
            ));
        }

        Ok(())
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory for all output artifacts
    pub data_dir: PathBuf,

    /// Fetcher settings
    pub fetch: FetchConfig,

    /// Tiling settings
    pub tiles: TileConfig,

    /// Number of quantile classes for break statistics
    pub classes: usize,

    /// Publish target; `None` skips publishing
    pub publish: Option<PublishConfig>,
}

impl PipelineConfig {
    /// Create a configuration with default settings rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            fetch: FetchConfig::default(),
            tiles: TileConfig::default(),
            classes: DEFAULT_CLASSES,
            publish: None,
        }
    }

    /// Date-stamped spreadsheet export path
    pub fn spreadsheet_path(&self, date: chrono::NaiveDate) -> PathBuf {
        self.data_dir.join(format!(
            "estaciones_carburantes_{}.csv",
            date.format("%d_%m_%Y")
        ))
    }

    /// GeoJSON layer path
    pub fn geojson_path(&self) -> PathBuf {
        self.data_dir.join("estaciones.geojson")
    }

    /// Tile archive path
    pub fn mbtiles_path(&self) -> PathBuf {
        self.data_dir.join("estaciones.mbtiles")
    }

    /// Break statistics document path
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.json")
    }
}
