// Remote routes for the job lifecycle, relative to the transport base URL

pub fn run_sync(endpoint_id: &str) -> String {
    format!("/{endpoint_id}/runsync")
}

pub fn run(endpoint_id: &str) -> String {
    format!("/{endpoint_id}/run")
}

pub fn status(endpoint_id: &str, job_id: &str) -> String {
    format!("/{endpoint_id}/status/{job_id}")
}

pub fn cancel(endpoint_id: &str, job_id: &str) -> String {
    format!("/{endpoint_id}/cancel/{job_id}")
}

pub fn retry(endpoint_id: &str, job_id: &str) -> String {
    format!("/{endpoint_id}/retry/{job_id}")
}

pub fn health(endpoint_id: &str) -> String {
    format!("/{endpoint_id}/health")
}

pub fn purge_queue(endpoint_id: &str) -> String {
    format!("/{endpoint_id}/purge-queue")
}
