// Domain Layer - Job records, statuses and the timestamp codec

pub mod error;
pub mod health;
pub mod job;
pub mod status;
pub mod timestamp;

// Re-exports
pub use error::DomainError;
pub use health::EndpointHealth;
pub use job::{EndpointId, JobId, JobRecord, JobRequest, WebhookConfig};
pub use status::{is_terminal, JobStatus};
pub use timestamp::Timestamp;
