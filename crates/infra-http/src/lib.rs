// Runpod Infrastructure - HTTP Adapter
// Implements: Transport (reqwest, bearer credential)

mod config;
mod transport;

pub use config::{
    HttpTransportConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, ENV_API_KEY, ENV_BASE_URL,
    ENV_REQUEST_TIMEOUT_SECS,
};
pub use transport::HttpTransport;
