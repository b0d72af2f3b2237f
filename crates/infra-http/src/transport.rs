// reqwest-backed Transport

use crate::config::HttpTransportConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use runpod_core::port::{HttpMethod, Transport};
use runpod_core::{ClientError, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Cap on how much of an unparseable body ends up in logs
const MAX_LOGGED_BODY_CHARS: usize = 256;

/// Authenticated HTTP + JSON transport for the serverless API
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Create a new transport
    ///
    /// # Errors
    /// `ClientError::Config` if the config is invalid or the HTTP client cannot be built
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read response body: {e}")))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| {
                warn!(
                    error = %e,
                    body_len = text.len(),
                    body = %body_preview(&text),
                    "Failed to parse response"
                );
                ClientError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound(text))
        } else {
            Err(ClientError::Remote {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

/// Leading slice of a response body, marked when cut short
fn body_preview(text: &str) -> String {
    match text.char_indices().nth(MAX_LOGGED_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "Request");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };
        let request = request.bearer_auth(&self.api_key);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Request failed");
            ClientError::Transport(e.to_string())
        })?;

        self.handle_response(response).await
    }
}
