// Job Status and Terminal Classification
//
// The terminal/non-terminal partition below is the only place terminality is decided.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Job status as reported by the remote service.
///
/// Statuses outside the documented set are kept verbatim in `Unrecognized`
/// rather than rejected; they classify as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    InQueue,
    InProgress,
    Completed,
    Failed,
    Cancelled,
    TimedOut,
    Unrecognized(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::InQueue => "IN_QUEUE",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Cancelled => "CANCELLED",
            JobStatus::TimedOut => "TIMED_OUT",
            JobStatus::Unrecognized(raw) => raw.as_str(),
        }
    }

    /// True for COMPLETED, FAILED, CANCELLED and TIMED_OUT.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled | JobStatus::TimedOut
        )
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, JobStatus::Unrecognized(_))
    }
}

impl From<&str> for JobStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "IN_QUEUE" => JobStatus::InQueue,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            "TIMED_OUT" => JobStatus::TimedOut,
            other => JobStatus::Unrecognized(other.to_string()),
        }
    }
}

impl FromStr for JobStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(JobStatus::from(s))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for JobStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from(raw.as_str()))
    }
}

/// Classify a raw status string. Unknown strings are non-terminal.
pub fn is_terminal(status: &str) -> bool {
    JobStatus::from(status).is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_partition() {
        for status in ["COMPLETED", "FAILED", "CANCELLED", "TIMED_OUT"] {
            assert!(is_terminal(status), "{status} should be terminal");
        }
        for status in ["IN_QUEUE", "IN_PROGRESS"] {
            assert!(!is_terminal(status), "{status} should not be terminal");
        }
    }

    #[test]
    fn test_unrecognized_is_not_terminal() {
        assert!(!is_terminal("THROTTLED"));
        assert!(!is_terminal(""));
        assert!(!is_terminal("completed"));

        let status = JobStatus::from("THROTTLED");
        assert!(!status.is_recognized());
        assert_eq!(status.to_string(), "THROTTLED");
    }

    #[test]
    fn test_status_serde_keeps_raw_value() {
        let status: JobStatus = serde_json::from_str(r#""IN_PROGRESS""#).unwrap();
        assert_eq!(status, JobStatus::InProgress);

        let status: JobStatus = serde_json::from_str(r#""PAUSED""#).unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""PAUSED""#);
    }
}
