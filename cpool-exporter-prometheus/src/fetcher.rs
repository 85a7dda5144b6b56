//! Fetching and decoding of upstream stats payloads.

use std::io::Read;
use std::time::Duration;

use flate2::read::DeflateDecoder;
use reqwest::header::ACCEPT_ENCODING;
use thiserror::Error;
use tracing::debug;

use crate::config::PoolConfig;
use crate::stats::CpoolStatsResponse;

/// Error type for fetch operations against one upstream.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Decompression failed: {0}")]
    Decompression(#[from] std::io::Error),
    #[error("Malformed stats payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Fetches the `/stats` document of pool daemons and decodes it.
pub struct StatsFetcher {
    client: reqwest::Client,
}

impl StatsFetcher {
    /// Create a fetcher.
    ///
    /// The client's automatic decompression is disabled: the daemon
    /// answers with a raw deflate stream regardless of the advertised
    /// codings, so the transport layer must hand the body over untouched.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .no_gzip()
            .no_deflate()
            .no_brotli()
            .build()
            .expect("HTTP client");

        Self { client }
    }

    /// Fetch and decode the stats payload from one upstream address.
    ///
    /// The wire path is fixed to `/stats`; the configured method label is
    /// informational only. Each request carries the configured deadline, so
    /// a hung upstream cannot stall the scrape indefinitely.
    pub async fn fetch(
        &self,
        addr: &str,
        config: &PoolConfig,
    ) -> Result<CpoolStatsResponse, FetchError> {
        let url = format!("http://{}:{}/stats", addr, config.port);
        debug!(%url, "Fetching pool stats");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT_ENCODING, "deflate, gzip")
            .timeout(Duration::from_secs(config.timeout_secs))
            .send()
            .await?;

        // The advertised Content-Length covers the compressed body only, so
        // it is not consulted past this read.
        let body = response.bytes().await?;

        decode(&body)
    }
}

impl Default for StatsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Inflate a raw deflate body and deserialize the stats document.
fn decode(body: &[u8]) -> Result<CpoolStatsResponse, FetchError> {
    let mut decoder = DeflateDecoder::new(body);
    let mut inflated = Vec::with_capacity(body.len().saturating_mul(4));
    decoder.read_to_end(&mut inflated)?;

    let response = serde_json::from_slice(&inflated)?;
    Ok(response)
}
