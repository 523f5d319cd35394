//! HTTP fetcher implementation
//!
//! This module handles single-document fetching for the pipeline:
//! - Building the HTTP client with a proper user agent string
//! - Presence check before any network call (the idempotence guarantee)
//! - Politeness jitter before each request
//! - Classifying non-success statuses into reportable failures
//!
//! Only HTTP-status failures are soft: they come back as a [`FetchFailure`]
//! value for the recovery controller to retry. Transport faults (connection
//! errors, timeouts) propagate as `Err` and are the caller's problem.

use crate::config::HttpConfig;
use crate::storage::Layout;
use crate::HarvestError;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;

/// Descriptor of one fetch that did not complete with a success status
///
/// Carries everything needed to re-dispatch the same fetch on a later pass.
/// Ephemeral by design: consumed within the same run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// 1-based position of the target in the full ordered target list
    pub seq: usize,

    /// Storage partition of the target
    pub partition: u32,

    /// Absolute URL of the detail page
    pub address: String,
}

/// Builds the HTTP client shared by all fetch workers
///
/// # Arguments
///
/// * `config` - The HTTP client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", config.agent_name, config.agent_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one target's raw document into storage
///
/// # Behavior
///
/// 1. If the destination file already exists, returns `Ok(None)` with no
///    network call. This makes the whole pipeline safely re-runnable.
/// 2. Sleeps a uniform random duration in `[0, jitter_max)` to avoid
///    tripping the server's rate limiting.
/// 3. Issues one GET to `address`. A non-success status returns
///    `Ok(Some(FetchFailure))` and writes nothing.
/// 4. On success, writes the full response body verbatim. The body is read
///    completely before the file is created, so the failure path never
///    leaves a partial file behind.
///
/// Transport faults propagate as `Err`; this worker does not catch them.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `layout` - Storage layout for computing the destination path
/// * `seq` - 1-based sequence index of the target (must be >= 1)
/// * `partition` - Storage partition of the target
/// * `address` - Absolute URL of the detail page
/// * `jitter_max` - Upper bound of the politeness sleep
pub async fn fetch_document(
    client: &Client,
    layout: &Layout,
    seq: usize,
    partition: u32,
    address: &str,
    jitter_max: Duration,
) -> Result<Option<FetchFailure>, HarvestError> {
    debug_assert!(seq >= 1, "sequence indices are 1-based");

    let path = layout.raw_document_path(partition, seq);
    if path.exists() {
        tracing::trace!("Skipping {}, already on disk", path.display());
        return Ok(None);
    }

    if !jitter_max.is_zero() {
        // Draw before sleeping: the RNG handle must not live across an await.
        let jitter = jitter_max.mul_f64(rand::rng().random_range(0.0..1.0));
        tokio::time::sleep(jitter).await;
    }

    let response = client.get(address).send().await?;
    let status = response.status();

    if !status.is_success() {
        tracing::debug!("HTTP {} for {}", status.as_u16(), address);
        return Ok(Some(FetchFailure {
            seq,
            partition,
            address: address.to_string(),
        }));
    }

    let body = response.text().await?;
    tokio::fs::write(&path, body).await?;
    tracing::trace!("Saved {}", path.display());

    Ok(None)
}
