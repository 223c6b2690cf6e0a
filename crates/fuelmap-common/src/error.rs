//! Error types for the fuelmap pipeline
//!
//! One taxonomy covers every stage. Per-field parse failures are never
//! represented here: the normalizer coerces them to absent values locally,
//! so only structural failures reach this type.

use thiserror::Error;

/// Result type alias for fuelmap operations
pub type Result<T> = std::result::Result<T, FuelmapError>;

/// Main error type for the fuelmap pipeline
#[derive(Error, Debug)]
pub enum FuelmapError {
    /// Network retrieval failed after the retry budget was spent, or the
    /// response body was not parseable as JSON
    #[error("Fetch error: {0}. The upstream API may be down; the run can be safely re-triggered.")]
    Fetch(String),

    /// The response parsed as JSON but the expected top-level collection key
    /// is absent
    #[error("Schema error: {0}. Treating this cycle as 'no data available'.")]
    Schema(String),

    /// The tiling executable was not found on the search path
    #[error("Tiling tool not found: {0}. Install tippecanoe and ensure it is on PATH.")]
    ToolNotFound(String),

    /// The tiling subprocess exited with a nonzero status
    #[error("Tile build failed (exit status {status}): {stderr}")]
    Build { status: i32, stderr: String },

    /// Upload or status polling failed, or the hosting job reported an error
    #[error("Publish error: {0}")]
    Publish(String),

    /// The publish poll loop exhausted its attempt budget without the job
    /// reaching a terminal state
    #[error("Publish timed out after {attempts} status polls. The hosting job may still complete; check it manually.")]
    PublishTimeout { attempts: u32 },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON serialization or parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FuelmapError {
    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a publish error
    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_stage() {
        let err = FuelmapError::fetch("connection reset");
        assert!(err.to_string().contains("connection reset"));

        let err = FuelmapError::Build {
            status: 1,
            stderr: "unable to open input".to_string(),
        };
        assert!(err.to_string().contains("exit status 1"));

        let err = FuelmapError::PublishTimeout { attempts: 240 };
        assert!(err.to_string().contains("240"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: FuelmapError = io.into();
        assert!(matches!(err, FuelmapError::Io(_)));
    }

    #[test]
    fn test_csv_error_keeps_its_identity() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["a", "b"]).unwrap();
        let csv_err = writer.write_record(["only-one"]).unwrap_err();

        let err: FuelmapError = csv_err.into();
        match err {
            FuelmapError::Csv(inner) => {
                assert!(matches!(inner.kind(), csv::ErrorKind::UnequalLengths { .. }));
            },
            other => panic!("expected CSV error, got {other:?}"),
        }
    }
}
