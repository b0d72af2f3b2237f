// Job Domain Model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::domain::error::DomainError;
use crate::domain::status::JobStatus;
use crate::domain::timestamp::{self, Timestamp};

/// Job ID (assigned by the remote service)
pub type JobId = String;

/// Serverless endpoint identifier
pub type EndpointId = String;

/// Snapshot of one submitted unit of work.
///
/// Every fetch yields a fresh value; the client never mutates a record it has
/// handed out. Serializes with canonical timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "JobRecordWire")]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,

    /// Caller-supplied payload (`null` when the remote does not echo it)
    pub input: Value,
    /// Present once the job has COMPLETED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
    /// Present when the job has FAILED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(with = "timestamp::optional")]
    pub created_at: Option<Timestamp>,
    #[serde(with = "timestamp::optional")]
    pub started_at: Option<Timestamp>,
    #[serde(with = "timestamp::optional")]
    pub completed_at: Option<Timestamp>,

    #[serde(rename = "executionTimeMs")]
    pub execution_time_ms: u64,
    pub retry_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<EndpointId>,
}

impl JobRecord {
    /// Create a bare record (for tests and fixtures)
    pub fn new(id: impl Into<String>, status: JobStatus, input: Value) -> Self {
        Self {
            id: id.into(),
            status,
            input,
            output: None,
            stream: None,
            error: None,
            created_at: None,
            started_at: None,
            completed_at: None,
            execution_time_ms: 0,
            retry_count: 0,
            endpoint_id: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Raw wire shape of a job record. Timestamps are still strings here so a
/// malformed one surfaces as `DomainError::MalformedTimestamp`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[doc(hidden)]
pub struct JobRecordWire {
    id: String,
    status: JobStatus,
    #[serde(default)]
    input: Value,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    stream: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    started_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
    #[serde(default, rename = "executionTimeMs", alias = "executionTime")]
    execution_time_ms: u64,
    #[serde(default)]
    retry_count: u32,
    #[serde(default)]
    endpoint_id: Option<String>,
}

fn decode_opt(raw: Option<String>) -> Result<Option<Timestamp>, DomainError> {
    match raw {
        Some(raw) => timestamp::decode(&raw),
        None => Ok(None),
    }
}

impl TryFrom<JobRecordWire> for JobRecord {
    type Error = DomainError;

    fn try_from(wire: JobRecordWire) -> Result<Self, Self::Error> {
        // Error payloads are usually strings; anything else is kept as compact JSON
        let error = match wire.error {
            None | Some(Value::Null) => None,
            Some(Value::String(msg)) => Some(msg),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            id: wire.id,
            status: wire.status,
            input: wire.input,
            output: wire.output.filter(|v| !v.is_null()),
            stream: wire.stream.filter(|v| !v.is_null()),
            error,
            created_at: decode_opt(wire.created_at)?,
            started_at: decode_opt(wire.started_at)?,
            completed_at: decode_opt(wire.completed_at)?,
            execution_time_ms: wire.execution_time_ms,
            retry_count: wire.retry_count,
            endpoint_id: wire.endpoint_id.filter(|id| !id.is_empty()),
        })
    }
}

/// Webhook the remote service calls when a job finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Submission envelope: `{"input": ..., "webhook": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookConfig>,
}

impl JobRequest {
    pub fn new(input: Value) -> Self {
        Self {
            input,
            webhook: None,
        }
    }

    pub fn with_webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhook = Some(webhook);
        self
    }
}

impl From<Value> for JobRequest {
    fn from(input: Value) -> Self {
        Self::new(input)
    }
}
