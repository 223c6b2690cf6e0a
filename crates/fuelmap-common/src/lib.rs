//! Fuelmap Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the fuelmap pipeline.
//!
//! # Overview
//!
//! This crate provides common functionality used across all fuelmap workspace
//! members:
//!
//! - **Error Handling**: The pipeline-wide error taxonomy and result type
//! - **Logging**: Tracing subscriber configuration and initialization
//! - **Filesystem**: Atomic artifact writes
//!
//! # Example
//!
//! ```no_run
//! use fuelmap_common::{Result, fs::write_atomic};
//!
//! fn save_stats(path: &std::path::Path, body: &[u8]) -> Result<()> {
//!     write_atomic(path, body)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod fs;
pub mod logging;

// Re-export commonly used types
pub use error::{FuelmapError, Result};
