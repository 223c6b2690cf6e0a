//! Fuelmap Ingest Library
//!
//! The ingestion-to-tileset pipeline for the Spanish national fuel-price
//! dataset.
//!
//! # Stages
//!
//! - **fetch**: resilient retrieval from the MINETUR REST endpoint
//! - **normalize**: raw records into the canonical typed table
//! - **geometry**: the GeoJSON point layer
//! - **stats**: quantile break statistics for map classification
//! - **tiles**: MBTiles archive via tippecanoe
//! - **publish**: upload-and-poll against the tile-hosting service
//!
//! # Example
//!
//! ```no_run
//! use fuelmap_ingest::{config::PipelineConfig, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::new("./data");
//!     pipeline::run(&config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod fetch;
pub mod geometry;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod stats;
pub mod tiles;
