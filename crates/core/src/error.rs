// Central Error Type for the Job Client

use std::time::Duration;
use thiserror::Error;

use crate::application::constants::TRANSIENT_REMOTE_STATUSES;
use crate::domain::{DomainError, JobRecord, JobStatus};

/// Client-level error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Network/connection failure; the call may succeed if repeated
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success response from the remote service
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: job {job_id} is {status}, cannot {operation}")]
    InvalidState {
        job_id: String,
        status: JobStatus,
        operation: &'static str,
    },

    /// Poll deadline elapsed; carries the last non-terminal snapshot, if any poll succeeded
    #[error(
        "Timed out after {waited:?} waiting for job {job_id} (last status: {})",
        describe_last(.last_observed)
    )]
    Timeout {
        job_id: String,
        waited: Duration,
        last_observed: Option<Box<JobRecord>>,
    },

    /// Caller aborted through its cancel token
    #[error("Cancelled: {operation}")]
    Cancelled { operation: &'static str },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

fn describe_last(last: &Option<Box<JobRecord>>) -> &str {
    last.as_ref().map_or("none observed", |job| job.status.as_str())
}

impl ClientError {
    /// Failures the wait loop absorbs and polls through
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Remote { status, .. } => TRANSIENT_REMOTE_STATUSES.contains(status),
            _ => false,
        }
    }

    pub fn is_malformed_timestamp(&self) -> bool {
        matches!(
            self,
            ClientError::Domain(DomainError::MalformedTimestamp { .. })
        )
    }

    /// Last job snapshot carried by a `Timeout`
    pub fn last_observed(&self) -> Option<&JobRecord> {
        match self {
            ClientError::Timeout { last_observed, .. } => last_observed.as_deref(),
            _ => None,
        }
    }
}

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
