// Endpoint Health Model

use serde::{Deserialize, Serialize};

/// Aggregate queue/worker counters for a serverless endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub jobs_in_queue: u32,
    #[serde(default)]
    pub workers_idle: u32,
    #[serde(default)]
    pub workers_active: u32,
    #[serde(default)]
    pub workers_total: u32,
}

impl EndpointHealth {
    /// True when jobs are waiting but no worker is up to take them
    pub fn is_starved(&self) -> bool {
        self.jobs_in_queue > 0 && self.workers_idle == 0 && self.workers_active == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_default_to_zero() {
        let health: EndpointHealth =
            serde_json::from_str(r#"{"status": "READY", "jobsInQueue": 3}"#).unwrap();

        assert_eq!(health.status, "READY");
        assert_eq!(health.jobs_in_queue, 3);
        assert_eq!(health.workers_total, 0);
        assert!(health.is_starved());
    }
}
