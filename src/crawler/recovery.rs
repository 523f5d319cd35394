//! Recovery controller - fetch orchestration and retry logic
//!
//! The controller sweeps the full target list with a bounded worker pool,
//! collects the failures of each pass, and re-dispatches only the failing
//! subset with a smaller pool until the pass comes back clean or the retry
//! budget is spent. Exhausting the budget is a soft failure: the run
//! completes with a logged count of unresolved targets, and a later
//! invocation can close the gap because fetching is idempotent.

use crate::catalog::Target;
use crate::config::FetchConfig;
use crate::crawler::fetcher::{fetch_document, FetchFailure};
use crate::progress::Progress;
use crate::storage::Layout;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Orchestrates fetch workers over the target list with bounded retries
pub struct RecoveryController {
    client: Client,
    layout: Layout,
    config: FetchConfig,
}

impl RecoveryController {
    /// Creates a new recovery controller
    ///
    /// # Arguments
    ///
    /// * `client` - The shared HTTP client
    /// * `layout` - Storage layout for destination paths
    /// * `config` - Fetch and retry configuration
    pub fn new(client: Client, layout: Layout, config: FetchConfig) -> Self {
        Self {
            client,
            layout,
            config,
        }
    }

    /// Returns the targets that have no persisted raw document
    ///
    /// Compares the full ordered target list against storage and returns a
    /// re-dispatchable job for every absent document, in list order.
    pub fn find_missing(&self, targets: &[Target]) -> Vec<FetchFailure> {
        targets
            .iter()
            .enumerate()
            .filter_map(|(i, target)| {
                let seq = i + 1;
                let path = self.layout.raw_document_path(target.partition, seq);
                if path.is_file() {
                    None
                } else {
                    Some(FetchFailure {
                        seq,
                        partition: target.partition,
                        address: target.address.clone(),
                    })
                }
            })
            .collect()
    }

    /// Runs the fetch-and-recover loop over the full target list
    ///
    /// # Algorithm
    ///
    /// 1. Dispatch one fetch per target with the first-pass worker pool.
    /// 2. If every fetch succeeded (or was already on disk), stop.
    /// 3. Otherwise log the failure count and re-dispatch only the failing
    ///    subset with the smaller retry pool.
    /// 4. Repeat until clean or `max_retries` retry passes have run.
    ///
    /// # Returns
    ///
    /// The targets still unresolved after the retry budget. Empty means the
    /// run converged. A non-empty result is a documented gap in storage, not
    /// an error: the caller can re-invoke later to close it.
    pub async fn run(&self, targets: &[Target], progress: Arc<dyn Progress>) -> Vec<FetchFailure> {
        let jobs: Vec<FetchFailure> = targets
            .iter()
            .enumerate()
            .map(|(i, target)| FetchFailure {
                seq: i + 1,
                partition: target.partition,
                address: target.address.clone(),
            })
            .collect();

        progress.begin("Fetching documents", jobs.len());

        let mut failures = self
            .pass(jobs, self.config.first_pass_workers as usize, &progress)
            .await;

        let mut retry = 0;
        while !failures.is_empty() && retry < self.config.max_retries {
            retry += 1;
            tracing::info!(
                "Still missing {} documents, retry pass {}/{}",
                failures.len(),
                retry,
                self.config.max_retries
            );
            progress.log(&format!("Retry pass {}: {} targets", retry, failures.len()));

            failures = self
                .pass(failures, self.config.retry_workers as usize, &progress)
                .await;
        }

        if failures.is_empty() {
            tracing::info!("All targets fetched");
        } else {
            tracing::warn!(
                "Retry budget exhausted, {} documents still missing",
                failures.len()
            );
        }

        progress.finish();
        failures
    }

    /// Runs one concurrent pass over a set of jobs
    ///
    /// Each job runs as its own task, gated by a semaphore of `workers`
    /// permits. Transport faults are caught here, logged, and demoted to
    /// pass failures so one flaky connection cannot abort the sweep; the
    /// outer retry loop picks them up like any status failure.
    async fn pass(
        &self,
        jobs: Vec<FetchFailure>,
        workers: usize,
        progress: &Arc<dyn Progress>,
    ) -> Vec<FetchFailure> {
        let semaphore = Arc::new(Semaphore::new(workers.max(1)));
        let jitter_max = Duration::from_millis(self.config.jitter_max_ms);
        let mut tasks = JoinSet::new();

        for job in jobs {
            let client = self.client.clone();
            let layout = self.layout.clone();
            let semaphore = Arc::clone(&semaphore);
            let progress = Arc::clone(progress);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Some(job),
                };

                let result = fetch_document(
                    &client,
                    &layout,
                    job.seq,
                    job.partition,
                    &job.address,
                    jitter_max,
                )
                .await;
                progress.item_done();

                match result {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::warn!("Transport fault for {}: {}", job.address, e);
                        Some(job)
                    }
                }
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(failure)) => failures.push(failure),
                Ok(None) => {}
                // A panicked task leaves its document missing; find_missing
                // will surface it on the next invocation.
                Err(e) => tracing::error!("Fetch task failed: {}", e),
            }
        }

        failures
    }
}
