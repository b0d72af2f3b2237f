//! Quick Run Example
//!
//! Submits one job, waits for it, then prints endpoint health.
//!
//! # Usage
//!
//! ```bash
//! RUNPOD_API_KEY=rp_xxx RUNPOD_ENDPOINT_ID=my-endpoint \
//!     cargo run --example quick_run -- '{"prompt": "hello"}'
//! ```
//!
//! `RUNPOD_LOG_FORMAT=json` switches to structured JSON logs.
//! Ctrl-C aborts the wait locally; the remote job keeps running.

use anyhow::{Context, Result};
use runpod_sdk::{cancel_channel, ClientError, RunpodClient};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() -> Result<()> {
    let log_format = std::env::var("RUNPOD_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("runpod=info,quick_run=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let endpoint_id =
        std::env::var("RUNPOD_ENDPOINT_ID").context("RUNPOD_ENDPOINT_ID is not set")?;
    let input: Value = match std::env::args().nth(1) {
        Some(raw) => serde_json::from_str(&raw).context("Input must be a JSON document")?,
        None => serde_json::json!({}),
    };

    let client = RunpodClient::from_env()?;

    let (handle, ctx) = cancel_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, abandoning wait");
            handle.cancel();
        }
    });

    match client.quick_run(&ctx, &endpoint_id, input).await {
        Ok(job) => {
            info!(job_id = %job.id, status = %job.status, "Job finished");
            if let Some(output) = &job.output {
                println!("{}", serde_json::to_string_pretty(output)?);
            }
            if let Some(message) = &job.error {
                error!(job_id = %job.id, error = %message, "Job reported an error");
            }
        }
        Err(ClientError::Timeout {
            job_id,
            last_observed,
            ..
        }) => {
            let status = last_observed.map(|j| j.status.to_string());
            warn!(job_id = %job_id, last_status = ?status, "Job still running, giving up");
        }
        Err(e) => return Err(e.into()),
    }

    let health = client.get_health(&ctx, &endpoint_id).await?;
    info!(
        status = %health.status,
        jobs_in_queue = health.jobs_in_queue,
        workers_idle = health.workers_idle,
        workers_active = health.workers_active,
        "Endpoint health"
    );

    Ok(())
}
