//! Resilient upstream retrieval
//!
//! The MINETUR endpoint sits behind an aging TLS stack: negotiation only
//! succeeds with TLS 1.2 pinned on both ends, a legacy-compatible cipher
//! list, and HTTP/1.1 as the sole ALPN protocol. Trust anchors are supplied
//! explicitly (webpki roots) instead of the ambient store, and ambient proxy
//! configuration is ignored.
//!
//! Idempotent GETs are retried on connection failure, read failure, and the
//! retryable status codes (429, 502, 503, 504) with exponential backoff.

use crate::config::FetchConfig;
use crate::normalize::RawRecord;
use fuelmap_common::{FuelmapError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Top-level array key the upstream document must carry. Its absence means
/// "no data available this cycle", not a transport failure.
pub const COLLECTION_KEY: &str = "ListaEESSPrecio";

/// HTTP statuses that are retried with backoff.
const RETRY_STATUSES: [u16; 4] = [429, 502, 503, 504];

/// TLS 1.2 cipher suites the upstream's legacy stack accepts.
const LEGACY_SUITES: [rustls::CipherSuite; 4] = [
    rustls::CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    rustls::CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    rustls::CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    rustls::CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
];

/// Build the constrained TLS client configuration.
///
/// Falls back to the provider's full cipher list when the restricted list
/// leaves nothing usable on the local TLS stack.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = rustls::crypto::ring::default_provider();

    let mut cipher_suites: Vec<_> = provider
        .cipher_suites
        .iter()
        .filter(|s| LEGACY_SUITES.contains(&s.suite()))
        .copied()
        .collect();
    if cipher_suites.is_empty() {
        warn!("legacy cipher list rejected by local TLS stack, falling back to defaults");
        cipher_suites = provider.cipher_suites.clone();
    }

    let provider = rustls::crypto::CryptoProvider {
        cipher_suites,
        ..provider
    };

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let mut config = rustls::ClientConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(&[&rustls::version::TLS12])
        .map_err(|e| FuelmapError::config(format!("unusable TLS configuration: {e}")))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(config)
}

/// Resilient fetcher for the upstream fuel-price document
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Create a fetcher with the constrained transport described above.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let tls = build_tls_config()?;

        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .no_proxy()
            .build()
            .map_err(|e| FuelmapError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Retrieve the station records for this cycle.
    ///
    /// Fails with [`FuelmapError::Fetch`] when the retry budget is exhausted
    /// or the body is not JSON, and with [`FuelmapError::Schema`] when the
    /// top-level collection key is absent.
    pub async fn fetch_stations(&self) -> Result<Vec<RawRecord>> {
        let document = self.fetch_json().await?;

        let Some(list) = document.get(COLLECTION_KEY).and_then(|v| v.as_array()) else {
            return Err(FuelmapError::schema(format!(
                "response is missing the '{COLLECTION_KEY}' collection"
            )));
        };

        Ok(list
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect())
    }

    async fn fetch_json(&self) -> Result<serde_json::Value> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.client.get(&self.config.url).send().await {
                Ok(response) => {
                    let status = response.status();

                    if RETRY_STATUSES.contains(&status.as_u16()) {
                        if attempt > self.config.max_retries {
                            return Err(FuelmapError::fetch(format!(
                                "retry budget exhausted after {attempt} attempts, last status {status}"
                            )));
                        }
                        self.backoff(attempt, &format!("status {status}")).await;
                        continue;
                    }

                    if !status.is_success() {
                        return Err(FuelmapError::fetch(format!(
                            "upstream returned non-retryable status {status}"
                        )));
                    }

                    match response.json::<serde_json::Value>().await {
                        Ok(document) => return Ok(document),
                        Err(e) if e.is_decode() => {
                            return Err(FuelmapError::fetch(format!(
                                "response body is not parseable as JSON: {e}"
                            )));
                        },
                        Err(e) => {
                            // Read failure mid-body is retryable.
                            if attempt > self.config.max_retries {
                                return Err(FuelmapError::fetch(format!(
                                    "retry budget exhausted after {attempt} attempts: {e}"
                                )));
                            }
                            self.backoff(attempt, "read failure").await;
                        },
                    }
                },
                Err(e) if e.is_connect() || e.is_timeout() => {
                    if attempt > self.config.max_retries {
                        return Err(FuelmapError::fetch(format!(
                            "retry budget exhausted after {attempt} attempts: {e}"
                        )));
                    }
                    self.backoff(attempt, "connection failure").await;
                },
                Err(e) => return Err(FuelmapError::fetch(format!("request failed: {e}"))),
            }
        }
    }

    /// Exponential backoff: factor * 2^(attempt-1) seconds.
    async fn backoff(&self, attempt: u32, reason: &str) {
        let delay = Duration::from_secs_f64(
            self.config.backoff_factor * 2f64.powi(attempt.saturating_sub(1) as i32),
        );
        debug!(attempt, ?delay, reason, "retrying fetch");
        tokio::time::sleep(delay).await;
    }
}
