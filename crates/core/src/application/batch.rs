// Batch Coordinator - concurrent submission and queue purge

use crate::application::cancel::CancelToken;
use crate::application::lifecycle::{routes, validate_id, JobLifecycleClient};
use crate::domain::{JobRecord, JobRequest};
use crate::error::{ClientError, Result};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

/// Per-input outcome of a batch submission, in input order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    results: Vec<Result<JobRecord>>,
}

impl BatchOutcome {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Outcome for the input at `index`
    pub fn get(&self, index: usize) -> Option<&Result<JobRecord>> {
        self.results.get(index)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &JobRecord> {
        self.results.iter().filter_map(|r| r.as_ref().ok())
    }

    /// `(input index, error)` for every failed submission
    pub fn failures(&self) -> impl Iterator<Item = (usize, &ClientError)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    }

    pub fn into_results(self) -> Vec<Result<JobRecord>> {
        self.results
    }
}

/// Fans submissions out over a `JobLifecycleClient`
#[derive(Clone)]
pub struct BatchCoordinator {
    client: JobLifecycleClient,
}

impl BatchCoordinator {
    pub fn new(client: JobLifecycleClient) -> Self {
        Self { client }
    }

    /// Submit every input asynchronously and concurrently.
    ///
    /// One submission failing never affects the others: each slot of the
    /// outcome holds its own `Ok`/`Err`. The call as a whole only fails when
    /// nothing could be attempted (invalid endpoint id, already-cancelled token).
    ///
    /// In-flight submissions are capped by `LifecycleConfig::batch_concurrency`
    /// (one per input when unset).
    pub async fn submit_multiple<I>(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        inputs: I,
    ) -> Result<BatchOutcome>
    where
        I: IntoIterator,
        I::Item: Into<JobRequest>,
    {
        validate_id("endpoint_id", endpoint_id)?;
        if ctx.is_cancelled() {
            return Err(ClientError::Cancelled {
                operation: "submit_multiple",
            });
        }

        let requests: Vec<JobRequest> = inputs.into_iter().map(Into::into).collect();
        if requests.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let total = requests.len();
        let limit = self.client.config().batch_concurrency.unwrap_or(total).max(1);
        info!(endpoint_id = %endpoint_id, total, limit, "Submitting job batch");

        // `buffered` yields in input order, so slot i always belongs to input i
        let results: Vec<Result<JobRecord>> = stream::iter(requests)
            .map(|request| self.client.submit_async(ctx, endpoint_id, request))
            .buffered(limit)
            .collect()
            .await;

        let outcome = BatchOutcome { results };
        let failed = outcome.failures().count();
        if failed > 0 {
            for (index, err) in outcome.failures() {
                warn!(endpoint_id = %endpoint_id, index, error = %err, "Batch submission failed");
            }
        }
        info!(
            endpoint_id = %endpoint_id,
            total,
            failed,
            "Job batch submitted"
        );
        Ok(outcome)
    }

    /// Drop every queued (not yet started) job of an endpoint.
    ///
    /// Running jobs are untouched. Purging an empty queue succeeds.
    pub async fn purge_queue(&self, ctx: &CancelToken, endpoint_id: &str) -> Result<()> {
        validate_id("endpoint_id", endpoint_id)?;

        let value = self
            .client
            .post_endpoint(ctx, "purge_queue", &routes::purge_queue(endpoint_id))
            .await?;

        match value.get("removed").and_then(Value::as_u64) {
            Some(removed) => info!(endpoint_id = %endpoint_id, removed, "Queue purged"),
            None => info!(endpoint_id = %endpoint_id, "Queue purged"),
        }
        Ok(())
    }
}
