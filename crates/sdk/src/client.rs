//! Runpod Client Implementation

use runpod_core::application::{BatchCoordinator, BatchOutcome, CancelToken};
use runpod_core::application::{JobLifecycleClient, LifecycleConfig};
use runpod_core::domain::{EndpointHealth, JobRecord, JobRequest};
use runpod_core::port::Transport;
use runpod_core::Result;
use runpod_infra_http::{HttpTransport, HttpTransportConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Runpod serverless client
///
/// Wires the HTTP transport into the job lifecycle client and batch
/// coordinator. Cheap to clone; clones share one connection pool.
///
/// # Example
///
/// ```no_run
/// use runpod_sdk::{CancelToken, RunpodClient};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RunpodClient::from_env()?;
/// let job = client
///     .quick_run(&CancelToken::none(), "my-endpoint", json!({"prompt": "hello"}))
///     .await?;
/// println!("{} finished as {}", job.id, job.status);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RunpodClient {
    lifecycle: JobLifecycleClient,
    batch: BatchCoordinator,
}

impl RunpodClient {
    /// Build a client over HTTP
    ///
    /// # Errors
    /// `ClientError::Config` if either config is invalid
    pub fn connect(http: HttpTransportConfig, config: LifecycleConfig) -> Result<Self> {
        let transport = HttpTransport::new(http)?;
        info!(base_url = %transport.base_url(), "Runpod client ready");
        Self::with_transport(Arc::new(transport), config)
    }

    /// Build a client from `RUNPOD_*` environment variables with default lifecycle settings
    pub fn from_env() -> Result<Self> {
        Self::connect(HttpTransportConfig::from_env()?, LifecycleConfig::default())
    }

    /// Build a client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>, config: LifecycleConfig) -> Result<Self> {
        let lifecycle = JobLifecycleClient::new(transport, config)?;
        let batch = lifecycle.batch();
        Ok(Self { lifecycle, batch })
    }

    pub fn lifecycle(&self) -> &JobLifecycleClient {
        &self.lifecycle
    }

    pub fn batch(&self) -> &BatchCoordinator {
        &self.batch
    }

    /// Submit a job and block until it finishes remotely
    pub async fn run_sync(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        self.lifecycle.submit_sync(ctx, endpoint_id, request).await
    }

    /// Submit a job for asynchronous execution
    pub async fn run_async(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        self.lifecycle.submit_async(ctx, endpoint_id, request).await
    }

    pub async fn get_job_status(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
    ) -> Result<JobRecord> {
        self.lifecycle.get_status(ctx, endpoint_id, job_id).await
    }

    pub async fn cancel_job(&self, ctx: &CancelToken, endpoint_id: &str, job_id: &str) -> Result<()> {
        self.lifecycle.cancel(ctx, endpoint_id, job_id).await
    }

    pub async fn retry_job(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
    ) -> Result<JobRecord> {
        self.lifecycle.retry(ctx, endpoint_id, job_id).await
    }

    pub async fn get_health(&self, ctx: &CancelToken, endpoint_id: &str) -> Result<EndpointHealth> {
        self.lifecycle.get_health(ctx, endpoint_id).await
    }

    pub async fn wait_for_job_completion(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
        timeout: Duration,
    ) -> Result<JobRecord> {
        self.lifecycle
            .wait_for_job_completion(ctx, endpoint_id, job_id, timeout)
            .await
    }

    /// Submit and wait with the configured quick-run timeout
    pub async fn quick_run(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        self.lifecycle.quick_run(ctx, endpoint_id, request).await
    }

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
        self.batch.submit_multiple(ctx, endpoint_id, inputs).await
    }

    pub async fn purge_queue(&self, ctx: &CancelToken, endpoint_id: &str) -> Result<()> {
        self.batch.purge_queue(ctx, endpoint_id).await
    }

    pub fn is_job_terminal(&self, status: &str) -> bool {
        self.lifecycle.is_job_terminal(status)
    }
}
