// Job Lifecycle Client - submit, inspect, cancel and retry serverless jobs

pub mod routes;
mod wait;

use crate::application::batch::BatchCoordinator;
use crate::application::cancel::CancelToken;
use crate::application::constants::{DEFAULT_POLL_INTERVAL, DEFAULT_QUICK_RUN_TIMEOUT};
use crate::domain::job::JobRecordWire;
use crate::domain::{status, EndpointHealth, JobRecord, JobRequest};
use crate::error::{ClientError, Result};
use crate::port::{HttpMethod, Transport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Immutable client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// Delay between status polls while waiting for a job
    pub poll_interval: Duration,
    /// Wait budget used by `quick_run`
    pub quick_run_timeout: Duration,
    /// Maximum in-flight submissions for a batch (`None` = one per input)
    pub batch_concurrency: Option<usize>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            quick_run_timeout: DEFAULT_QUICK_RUN_TIMEOUT,
            batch_concurrency: None,
        }
    }
}

impl LifecycleConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_quick_run_timeout(mut self, timeout: Duration) -> Self {
        self.quick_run_timeout = timeout;
        self
    }

    pub fn with_batch_concurrency(mut self, limit: usize) -> Self {
        self.batch_concurrency = Some(limit);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ClientError::Config("poll_interval must be > 0".to_string()));
        }
        if self.batch_concurrency == Some(0) {
            return Err(ClientError::Config(
                "batch_concurrency must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Client for the asynchronous job lifecycle of serverless endpoints.
///
/// Holds only the injected transport and an immutable config, so one instance
/// can be cloned and shared freely across tasks.
#[derive(Clone)]
pub struct JobLifecycleClient {
    transport: Arc<dyn Transport>,
    config: LifecycleConfig,
}

impl JobLifecycleClient {
    /// Create a new client
    ///
    /// # Errors
    /// `ClientError::Config` if the poll interval or batch concurrency is zero
    pub fn new(transport: Arc<dyn Transport>, config: LifecycleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Batch operations sharing this client's transport and config
    pub fn batch(&self) -> BatchCoordinator {
        BatchCoordinator::new(self.clone())
    }

    /// Terminal classification of a raw status string
    pub fn is_job_terminal(&self, status: &str) -> bool {
        status::is_terminal(status)
    }

    /// Submit a job and block until the remote service returns its result
    pub async fn submit_sync(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        validate_id("endpoint_id", endpoint_id)?;
        let body = serde_json::to_value(request.into())?;

        info!(endpoint_id = %endpoint_id, "Submitting synchronous job");
        let value = ctx
            .run(
                "submit_sync",
                self.transport
                    .call(HttpMethod::Post, &routes::run_sync(endpoint_id), Some(&body)),
            )
            .await?;
        let job = decode_record(value)?;

        if !job.is_terminal() {
            warn!(
                job_id = %job.id,
                status = %job.status,
                "Synchronous submission returned a non-terminal job"
            );
        }
        Ok(job)
    }

    /// Submit a job for asynchronous execution; returns the acceptance snapshot
    pub async fn submit_async(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        validate_id("endpoint_id", endpoint_id)?;
        let body = serde_json::to_value(request.into())?;

        let value = ctx
            .run(
                "submit_async",
                self.transport
                    .call(HttpMethod::Post, &routes::run(endpoint_id), Some(&body)),
            )
            .await?;
        let job = decode_record(value)?;

        info!(
            endpoint_id = %endpoint_id,
            job_id = %job.id,
            status = %job.status,
            "Job submitted"
        );
        Ok(job)
    }

    /// Fetch the current snapshot of a job
    ///
    /// # Errors
    /// `ClientError::NotFound` if the remote service does not know the job
    pub async fn get_status(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
    ) -> Result<JobRecord> {
        validate_id("endpoint_id", endpoint_id)?;
        validate_id("job_id", job_id)?;
        ctx.run("get_status", self.fetch_status(endpoint_id, job_id))
            .await
    }

    /// Single status call; ids already validated
    async fn fetch_status(&self, endpoint_id: &str, job_id: &str) -> Result<JobRecord> {
        let value = self
            .transport
            .call(HttpMethod::Get, &routes::status(endpoint_id, job_id), None)
            .await
            .map_err(|e| match e {
                ClientError::NotFound(_) => ClientError::NotFound(format!(
                    "job {job_id} on endpoint {endpoint_id}"
                )),
                other => other,
            })?;
        let job = decode_record(value)?;
        debug!(job_id = %job_id, status = %job.status, "Fetched job status");
        Ok(job)
    }

    /// Request cancellation of a job.
    ///
    /// A job that already finished is not an error here; whatever the remote
    /// reports is logged and any non-success response is propagated as is.
    pub async fn cancel(&self, ctx: &CancelToken, endpoint_id: &str, job_id: &str) -> Result<()> {
        validate_id("endpoint_id", endpoint_id)?;
        validate_id("job_id", job_id)?;

        let value = ctx
            .run(
                "cancel",
                self.transport
                    .call(HttpMethod::Post, &routes::cancel(endpoint_id, job_id), None),
            )
            .await?;

        let reported = value
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unreported");
        info!(
            job_id = %job_id,
            reported_status = %reported,
            "Cancellation requested"
        );
        Ok(())
    }

    /// Resubmit a finished job; returns the new job's record
    ///
    /// # Errors
    /// `ClientError::InvalidState` if the job is still IN_QUEUE / IN_PROGRESS
    pub async fn retry(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
    ) -> Result<JobRecord> {
        let current = self.get_status(ctx, endpoint_id, job_id).await?;
        if !current.is_terminal() {
            return Err(ClientError::InvalidState {
                job_id: job_id.to_string(),
                status: current.status,
                operation: "retry",
            });
        }

        let value = ctx
            .run(
                "retry",
                self.transport
                    .call(HttpMethod::Post, &routes::retry(endpoint_id, job_id), None),
            )
            .await?;
        let mut retried = decode_record(value)?;

        // Seed from the original when the remote does not echo the input back
        if retried.input.is_null() {
            retried.input = current.input;
        }
        if retried.id == current.id {
            warn!(job_id = %job_id, "Retry returned the original job identifier");
        }

        info!(
            job_id = %job_id,
            new_job_id = %retried.id,
            previous_status = %current.status,
            "Job retried"
        );
        Ok(retried)
    }

    /// Queue and worker counters for an endpoint
    pub async fn get_health(&self, ctx: &CancelToken, endpoint_id: &str) -> Result<EndpointHealth> {
        validate_id("endpoint_id", endpoint_id)?;

        let value = ctx
            .run(
                "get_health",
                self.transport
                    .call(HttpMethod::Get, &routes::health(endpoint_id), None),
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// `submit_async` followed by `wait_for_job_completion` with the configured
    /// quick-run timeout
    pub async fn quick_run(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        request: impl Into<JobRequest>,
    ) -> Result<JobRecord> {
        let job = self.submit_async(ctx, endpoint_id, request).await?;
        self.wait_for_job_completion(ctx, endpoint_id, &job.id, self.config.quick_run_timeout)
            .await
    }

    pub(crate) async fn post_endpoint(
        &self,
        ctx: &CancelToken,
        operation: &'static str,
        path: &str,
    ) -> Result<Value> {
        ctx.run(operation, self.transport.call(HttpMethod::Post, path, None))
            .await
    }
}

/// Decode a JSON body into a record, keeping timestamp failures typed
pub(crate) fn decode_record(value: Value) -> Result<JobRecord> {
    let wire: JobRecordWire = serde_json::from_value(value)?;
    let job = JobRecord::try_from(wire)?;

    if !job.status.is_recognized() {
        warn!(
            job_id = %job.id,
            status = %job.status,
            "Unrecognized job status, treating as non-terminal"
        );
    }
    Ok(job)
}

/// Identifiers are interpolated into paths
pub(crate) fn validate_id(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{field} cannot be empty")));
    }
    if value.contains(['/', '?', '#']) || value.chars().any(char::is_whitespace) {
        return Err(ClientError::Validation(format!(
            "{field} contains invalid characters: {value:?}"
        )));
    }
    Ok(())
}
