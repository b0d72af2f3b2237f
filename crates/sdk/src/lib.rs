//! Runpod SDK - Rust Client Library
//!
//! Submits jobs to Runpod serverless endpoints and follows them to completion.
//!
//! # Example
//!
//! ```no_run
//! use runpod_sdk::{CancelToken, HttpTransportConfig, LifecycleConfig, RunpodClient};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RunpodClient::connect(
//!         HttpTransportConfig::new("rp_xxx"),
//!         LifecycleConfig::default().with_poll_interval(Duration::from_millis(500)),
//!     )?;
//!     let ctx = CancelToken::none();
//!
//!     // Fire off a job, then follow it
//!     let job = client.run_async(&ctx, "my-endpoint", json!({"prompt": "hello"})).await?;
//!     let done = client
//!         .wait_for_job_completion(&ctx, "my-endpoint", &job.id, Duration::from_secs(120))
//!         .await?;
//!
//!     println!("Job {} finished as {}: {:?}", done.id, done.status, done.output);
//!     Ok(())
//! }
//! ```

mod client;

pub use client::RunpodClient;

pub use runpod_core::application::{
    cancel_channel, BatchCoordinator, BatchOutcome, CancelHandle, CancelToken, JobLifecycleClient,
    LifecycleConfig,
};
pub use runpod_core::domain::{
    is_terminal, EndpointHealth, JobRecord, JobRequest, JobStatus, Timestamp, WebhookConfig,
};
pub use runpod_core::{ClientError, Result};
pub use runpod_infra_http::{HttpTransport, HttpTransportConfig};
