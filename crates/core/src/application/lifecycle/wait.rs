// Bounded wait for a job to reach a terminal status

use super::{validate_id, JobLifecycleClient};
use crate::application::cancel::CancelToken;
use crate::domain::JobRecord;
use crate::error::{ClientError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, warn};

const OPERATION: &str = "wait_for_job_completion";

impl JobLifecycleClient {
    /// Poll a job until it reaches a terminal status.
    ///
    /// Exits on exactly one of:
    /// - a terminal status was observed: `Ok(record)`
    /// - `timeout` elapsed: `ClientError::Timeout` with the last non-terminal snapshot
    /// - `ctx` was cancelled: `ClientError::Cancelled`
    ///
    /// Transient failures (see `ClientError::is_transient`) are logged and polled
    /// through; the time they take still counts against `timeout`. Any other
    /// failure ends the wait immediately.
    pub async fn wait_for_job_completion(
        &self,
        ctx: &CancelToken,
        endpoint_id: &str,
        job_id: &str,
        timeout: Duration,
    ) -> Result<JobRecord> {
        validate_id("endpoint_id", endpoint_id)?;
        validate_id("job_id", job_id)?;

        let started = Instant::now();
        // `None` when `timeout` is too large to represent: wait without a deadline
        let deadline = started.checked_add(timeout);
        let poll_interval = self.config.poll_interval;
        let mut last_observed: Option<JobRecord> = None;
        let mut attempt: u32 = 0;

        info!(
            job_id = %job_id,
            timeout_ms = millis(timeout),
            poll_interval_ms = millis(poll_interval),
            "Waiting for job completion"
        );

        loop {
            if ctx.is_cancelled() {
                return Err(ClientError::Cancelled {
                    operation: OPERATION,
                });
            }
            attempt = attempt.saturating_add(1);

            let polled = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    return Err(ClientError::Cancelled { operation: OPERATION });
                }
                res = poll_before(deadline, self.fetch_status(endpoint_id, job_id)) => res,
            };

            match polled {
                // Deadline hit while the poll was in flight
                None => break,
                Some(Ok(job)) if job.is_terminal() => {
                    info!(
                        job_id = %job_id,
                        status = %job.status,
                        attempts = attempt,
                        elapsed_ms = millis(started.elapsed()),
                        "Job reached terminal status"
                    );
                    return Ok(job);
                }
                Some(Ok(job)) => {
                    debug!(job_id = %job_id, status = %job.status, attempt, "Job not finished yet");
                    last_observed = Some(job);
                }
                Some(Err(e)) if e.is_transient() => {
                    warn!(
                        job_id = %job_id,
                        attempt,
                        error = %e,
                        "Status poll failed, will retry until deadline"
                    );
                }
                Some(Err(e)) => return Err(e),
            }

            let now = Instant::now();
            if is_past(deadline, now) {
                break;
            }

            let wake = match (now.checked_add(poll_interval), deadline) {
                (Some(next), Some(deadline)) => Some(next.min(deadline)),
                (Some(next), None) => Some(next),
                (None, deadline) => deadline,
            };
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    return Err(ClientError::Cancelled { operation: OPERATION });
                }
                _ = sleep_until_opt(wake) => {}
            }

            if is_past(deadline, Instant::now()) {
                break;
            }
        }

        let waited = started.elapsed();
        warn!(
            job_id = %job_id,
            attempts = attempt,
            waited_ms = millis(waited),
            last_status = last_observed.as_ref().map(|j| j.status.as_str()).unwrap_or("none"),
            "Gave up waiting for job"
        );
        Err(ClientError::Timeout {
            job_id: job_id.to_string(),
            waited,
            last_observed: last_observed.map(Box::new),
        })
    }
}

/// Drive `fut` unless `deadline` passes first (`None` if it did)
async fn poll_before<F>(deadline: Option<Instant>, fut: F) -> Option<Result<JobRecord>>
where
    F: Future<Output = Result<JobRecord>>,
{
    match deadline {
        Some(deadline) => timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Sleep until `wake`; with no wake-up time only cancellation ends the sleep
async fn sleep_until_opt(wake: Option<Instant>) {
    match wake {
        Some(wake) => sleep_until(wake).await,
        None => std::future::pending().await,
    }
}

fn is_past(deadline: Option<Instant>, now: Instant) -> bool {
    deadline.is_some_and(|deadline| now >= deadline)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use crate::application::cancel::{cancel_channel, CancelToken};
    use crate::application::lifecycle::{JobLifecycleClient, LifecycleConfig};
    use crate::domain::JobStatus;
    use crate::error::ClientError;
    use crate::port::transport::mocks::{MockReply, ScriptedTransport};
    use crate::port::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    const STATUS_PATH: &str = "/ep-1/status/job-1";

    fn client_with(transport: Arc<ScriptedTransport>, poll_ms: u64) -> JobLifecycleClient {
        let config = LifecycleConfig::default().with_poll_interval(Duration::from_millis(poll_ms));
        JobLifecycleClient::new(transport, config).unwrap()
    }

    fn status_reply(status: &str) -> MockReply {
        MockReply::Json(json!({"id": "job-1", "status": status}))
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_completed_record() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on(HttpMethod::Get, STATUS_PATH, status_reply("IN_QUEUE"))
            .on(HttpMethod::Get, STATUS_PATH, status_reply("IN_PROGRESS"))
            .on(
                HttpMethod::Get,
                STATUS_PATH,
                MockReply::Json(json!({
                    "id": "job-1",
                    "status": "COMPLETED",
                    "output": {"answer": 42}
                })),
            );
        let client = client_with(transport.clone(), 500);

        let job = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.output, Some(json!({"answer": 42})));
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_with_last_observed_record() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(HttpMethod::Get, STATUS_PATH, status_reply("IN_QUEUE"));
        let client = client_with(transport.clone(), 100);

        let started = Instant::now();
        let err = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert_eq!(err.last_observed().unwrap().status, JobStatus::InQueue);
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        // Polls at 0, 100, ..., 900 ms
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_absorbed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on(
                HttpMethod::Get,
                STATUS_PATH,
                MockReply::TransportFailure("connection refused".into()),
            )
            .on(
                HttpMethod::Get,
                STATUS_PATH,
                MockReply::Remote {
                    status: 503,
                    message: "unavailable".into(),
                },
            )
            .on(HttpMethod::Get, STATUS_PATH, status_reply("FAILED"));
        let client = client_with(transport, 100);

        let job = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_polls_consume_the_budget() {
        let transport = Arc::new(
            ScriptedTransport::new().with_latency(Duration::from_millis(400)),
        );
        transport.on(
            HttpMethod::Get,
            STATUS_PATH,
            MockReply::TransportFailure("timeout".into()),
        );
        let client = client_with(transport.clone(), 100);

        let started = Instant::now();
        let err = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert!(err.last_observed().is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        // 0-400 fail, 500-900 fail, third poll starts at 1000 and hits the deadline
        assert!(transport.call_count(HttpMethod::Get, STATUS_PATH) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_transient_error_ends_wait() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(HttpMethod::Get, STATUS_PATH, MockReply::NotFound);
        let client = client_with(transport.clone(), 100);

        let err = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(10))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NotFound(_)));
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_distinct_from_timeout() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(HttpMethod::Get, STATUS_PATH, status_reply("IN_PROGRESS"));
        let client = client_with(transport, 100);
        let (handle, token) = cancel_channel();

        let waiter = tokio::spawn(async move {
            client
                .wait_for_job_completion(&token, "ep-1", "job-1", Duration::from_secs(60))
                .await
        });

        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrecognized_status_keeps_polling() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on(HttpMethod::Get, STATUS_PATH, status_reply("WARMING_UP"))
            .on(HttpMethod::Get, STATUS_PATH, status_reply("CANCELLED"));
        let client = client_with(transport, 100);

        let job = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_waits_until_terminal() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on(HttpMethod::Get, STATUS_PATH, status_reply("IN_QUEUE"))
            .on(HttpMethod::Get, STATUS_PATH, status_reply("IN_PROGRESS"))
            .on(HttpMethod::Get, STATUS_PATH, status_reply("COMPLETED"));
        let client = client_with(transport.clone(), 100);

        let job = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::MAX)
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_poll_interval_is_capped_by_deadline() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(HttpMethod::Get, STATUS_PATH, status_reply("IN_QUEUE"));
        let config = LifecycleConfig::default().with_poll_interval(Duration::MAX);
        let client = JobLifecycleClient::new(transport.clone(), config).unwrap();

        let started = Instant::now();
        let err = client
            .wait_for_job_completion(&CancelToken::none(), "ep-1", "job-1", Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Timeout { .. }));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_wait_still_honours_cancel() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(HttpMethod::Get, STATUS_PATH, status_reply("IN_PROGRESS"));
        let config = LifecycleConfig::default().with_poll_interval(Duration::MAX);
        let client = JobLifecycleClient::new(transport.clone(), config).unwrap();
        let (handle, token) = cancel_channel();

        let waiter = tokio::spawn(async move {
            client
                .wait_for_job_completion(&token, "ep-1", "job-1", Duration::MAX)
                .await
        });

        tokio::time::sleep(Duration::from_secs(3600)).await;
        handle.cancel();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, ClientError::Cancelled { .. }));
        assert_eq!(transport.call_count(HttpMethod::Get, STATUS_PATH), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_run_with_unbounded_timeout() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .on(
                HttpMethod::Post,
                "/ep-1/run",
                MockReply::Json(json!({"id": "job-1", "status": "IN_QUEUE"})),
            )
            .on(HttpMethod::Get, STATUS_PATH, status_reply("FAILED"));
        let config = LifecycleConfig::default().with_quick_run_timeout(Duration::MAX);
        let client = JobLifecycleClient::new(transport, config).unwrap();

        let job = client
            .quick_run(&CancelToken::none(), "ep-1", json!({}))
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Failed);
    }

    #[test]
    fn test_millis_saturates() {
        assert_eq!(super::millis(Duration::from_millis(1500)), 1500);
        assert_eq!(super::millis(Duration::MAX), u64::MAX);
    }
}
