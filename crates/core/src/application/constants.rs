// Client constants (No magic values)
use std::time::Duration;

/// Delay between status polls inside `wait_for_job_completion` (1s)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Wait budget used by `quick_run` (5 minutes)
pub const DEFAULT_QUICK_RUN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Gateway statuses the wait loop treats like a dropped connection
pub const TRANSIENT_REMOTE_STATUSES: [u16; 3] = [502, 503, 504];
