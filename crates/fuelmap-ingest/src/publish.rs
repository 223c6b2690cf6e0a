//! Publish coordination
//!
//! Uploads the tile archive to the hosting service and polls the resulting
//! job until it reaches a terminal state. The state machine is
//! `NotStarted → Uploading → {Complete, Error, TimedOut}`; configuration or
//! credential problems short-circuit to the error state before any network
//! call is made.
//!
//! Polling blocks the run with plain sleeps. Publishing is the pipeline's
//! final, non-parallelizable step, so nothing else is waiting. The poll
//! interval and attempt budget live in [`PublishConfig`] so tests can walk
//! the full timeout without real elapsed time.

use crate::config::PublishConfig;
use fuelmap_common::{FuelmapError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, error, info};

/// States of one publish job. `Complete`, `Error`, and `TimedOut` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    NotStarted,
    Uploading,
    Complete,
    Error,
    TimedOut,
}

#[derive(Debug, Deserialize)]
struct UploadAccepted {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobStatus {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    complete: bool,
}

/// Coordinates one upload job against the tile-hosting API
pub struct Publisher {
    client: reqwest::Client,
    config: PublishConfig,
}

impl Publisher {
    /// Create a publisher, validating the target and credential first.
    ///
    /// A malformed tileset identifier or token fails here, before any
    /// network traffic.
    pub fn new(config: PublishConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| FuelmapError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Upload the tile archive and poll the job to a terminal state.
    ///
    /// Returns `Complete` on success; the `Error` and `TimedOut` terminal
    /// states are surfaced as errors so the caller treats the run as failed.
    pub async fn publish(&self, archive: &Path) -> Result<PublishState> {
        let mut state = PublishState::NotStarted;
        debug!(?state, tileset = %self.config.tileset, "publish starting");

        state = PublishState::Uploading;
        info!(?state, tileset = %self.config.tileset, "uploading tile archive");

        let outcome = async {
            let job_id = self.upload(archive).await?;
            info!(job_id = %job_id, "upload accepted, polling job status");
            self.poll(&job_id).await
        }
        .await;

        match outcome {
            Ok(terminal) => Ok(terminal),
            Err(e) => {
                let terminal = match &e {
                    FuelmapError::PublishTimeout { .. } => PublishState::TimedOut,
                    _ => PublishState::Error,
                };
                error!(state = ?terminal, "publish failed");
                Err(e)
            },
        }
    }

    async fn upload(&self, archive: &Path) -> Result<String> {
        // Stream the archive off disk; a national-scale tileset is too big
        // to buffer whole.
        let file = tokio::fs::File::open(archive).await?;
        let length = file.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(file));

        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tiles.mbtiles".to_string());

        let part = reqwest::multipart::Part::stream_with_length(body, length)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| FuelmapError::publish(format!("invalid upload part: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!(
            "{}/uploads/{}?access_token={}",
            self.config.api_base, self.config.tileset, self.config.token
        );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FuelmapError::publish(format!("upload request failed: {e}")))?;

        if response.status() != reqwest::StatusCode::CREATED {
            return Err(FuelmapError::publish(format!(
                "upload rejected with status {}",
                response.status()
            )));
        }

        let accepted: UploadAccepted = response
            .json()
            .await
            .map_err(|e| FuelmapError::publish(format!("unreadable upload response: {e}")))?;

        Ok(accepted.id)
    }

    async fn poll(&self, job_id: &str) -> Result<PublishState> {
        let url = format!(
            "{}/uploads/{}?access_token={}",
            self.config.api_base, job_id, self.config.token
        );

        for attempt in 1..=self.config.max_poll_attempts {
            let status: JobStatus = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FuelmapError::publish(format!("status poll failed: {e}")))?
                .json()
                .await
                .map_err(|e| FuelmapError::publish(format!("unreadable status response: {e}")))?;

            if let Some(error) = status.error {
                return Err(FuelmapError::publish(format!("hosting job failed: {error}")));
            }

            if status.complete {
                info!(job_id = %job_id, attempt, "publish complete");
                return Ok(PublishState::Complete);
            }

            debug!(job_id = %job_id, attempt, "job still processing");
            tokio::time::sleep(self.config.poll_interval).await;
        }

        Err(FuelmapError::PublishTimeout {
            attempts: self.config.max_poll_attempts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(tileset: &str, token: &str) -> PublishConfig {
        PublishConfig {
            api_base: "https://tiles.fuelmap.es/v1".to_string(),
            tileset: tileset.to_string(),
            token: token.to_string(),
            poll_interval: Duration::ZERO,
            max_poll_attempts: 240,
        }
    }

    #[test]
    fn test_new_rejects_token_without_secret_prefix() {
        let result = Publisher::new(config("newtral.estaciones", "pk.not-secret"));
        assert!(matches!(result, Err(FuelmapError::Config(_))));
    }

    #[test]
    fn test_new_rejects_tileset_without_separator() {
        let result = Publisher::new(config("estaciones", "sk.secret"));
        assert!(matches!(result, Err(FuelmapError::Config(_))));
    }

    #[test]
    fn test_new_accepts_well_formed_config() {
        assert!(Publisher::new(config("newtral.estaciones", "sk.secret")).is_ok());
    }
}
