// HTTP Transport Configuration

use runpod_core::{ClientError, Result};
use std::fmt;
use std::time::Duration;

/// Default API root for serverless endpoints
pub const DEFAULT_BASE_URL: &str = "https://api.runpod.ai/v2";

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable names
pub const ENV_API_KEY: &str = "RUNPOD_API_KEY";
pub const ENV_BASE_URL: &str = "RUNPOD_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "RUNPOD_REQUEST_TIMEOUT_SECS";

/// Connection settings for `HttpTransport`
#[derive(Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

// Keep the credential out of logs
impl fmt::Debug for HttpTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransportConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl HttpTransportConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `RUNPOD_API_KEY`: bearer credential (required)
    /// - `RUNPOD_BASE_URL`: API root (default: https://api.runpod.ai/v2)
    /// - `RUNPOD_REQUEST_TIMEOUT_SECS`: per-request timeout (default: 30)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| ClientError::Config(format!("{ENV_API_KEY} is not set")))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{ENV_REQUEST_TIMEOUT_SECS} must be a number of seconds, got {raw:?}"
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config("api_key cannot be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url cannot be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Config(
                "request_timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_key_is_set() {
        let config = HttpTransportConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "rp_key")]))
            .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.api_key, "rp_key");
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = HttpTransportConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "rp_key"),
            (ENV_BASE_URL, "http://localhost:8080/v2"),
            (ENV_REQUEST_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v2");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_or_empty_key_is_config_error() {
        let err = HttpTransportConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let err =
            HttpTransportConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "  ")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let err = HttpTransportConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "rp_key"),
            (ENV_REQUEST_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", HttpTransportConfig::new("rp_secret"));
        assert!(!rendered.contains("rp_secret"));
    }
}
