// Transport Port (Interface)
// Abstraction over the authenticated HTTP + JSON call to the remote service

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP method used by the job lifecycle routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

/// Transport trait
///
/// Implementations:
/// - HttpTransport (infra-http): reqwest with bearer credential
/// - ScriptedTransport (mocks): in-memory replies for tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one call and return the decoded JSON body (`Null` for an empty body)
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - Path relative to the configured base URL (e.g. `/ep-1/status/job-1`)
    /// * `body` - Optional JSON request body
    ///
    /// # Errors
    /// - ClientError::Transport if the connection fails or times out
    /// - ClientError::NotFound if the remote answers 404
    /// - ClientError::Remote for any other non-success status
    async fn call(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::ClientError;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// One scripted reply
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Succeed with this JSON body
        Json(Value),
        /// Fail at the connection level
        TransportFailure(String),
        /// Non-success HTTP status
        Remote { status: u16, message: String },
        /// 404
        NotFound,
    }

    impl MockReply {
        fn into_result(self, path: &str) -> Result<Value> {
            match self {
                MockReply::Json(value) => Ok(value),
                MockReply::TransportFailure(msg) => Err(ClientError::Transport(msg)),
                MockReply::Remote { status, message } => {
                    Err(ClientError::Remote { status, message })
                }
                MockReply::NotFound => Err(ClientError::NotFound(path.to_string())),
            }
        }
    }

    type Responder = Box<dyn Fn(Option<&Value>) -> MockReply + Send + Sync>;

    enum Route {
        /// Replies consumed in order; the last one repeats
        Script(VecDeque<MockReply>),
        /// Reply computed from the request body
        Dynamic(Responder),
    }

    /// A call seen by the mock
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: HttpMethod,
        pub path: String,
        pub body: Option<Value>,
    }

    /// Mock Transport for testing
    ///
    /// Unrouted calls answer `NotFound`.
    #[derive(Default)]
    pub struct ScriptedTransport {
        routes: Mutex<HashMap<(HttpMethod, String), Route>>,
        calls: Mutex<Vec<RecordedCall>>,
        latency: Option<Duration>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every reply by `latency` (tokio time, so it honours paused clocks)
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Append a scripted reply for `method path`
        pub fn on(&self, method: HttpMethod, path: impl Into<String>, reply: MockReply) -> &Self {
            let mut routes = self.routes.lock().unwrap();
            let route = routes
                .entry((method, path.into()))
                .or_insert_with(|| Route::Script(VecDeque::new()));
            if let Route::Script(queue) = route {
                queue.push_back(reply);
            } else {
                *route = Route::Script(VecDeque::from([reply]));
            }
            self
        }

        /// Answer `method path` from the request body
        pub fn on_fn<F>(&self, method: HttpMethod, path: impl Into<String>, responder: F) -> &Self
        where
            F: Fn(Option<&Value>) -> MockReply + Send + Sync + 'static,
        {
            self.routes
                .lock()
                .unwrap()
                .insert((method, path.into()), Route::Dynamic(Box::new(responder)));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, method: HttpMethod, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.method == method && c.path == path)
                .count()
        }

        fn next_reply(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> MockReply {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(&(method, path.to_string())) {
                Some(Route::Script(queue)) if queue.len() > 1 => {
                    queue.pop_front().unwrap_or(MockReply::NotFound)
                }
                Some(Route::Script(queue)) => {
                    queue.front().cloned().unwrap_or(MockReply::NotFound)
                }
                Some(Route::Dynamic(responder)) => responder(body),
                None => MockReply::NotFound,
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn call(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
            self.calls.lock().unwrap().push(RecordedCall {
                method,
                path: path.to_string(),
                body: body.cloned(),
            });

            let reply = self.next_reply(method, path, body);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            reply.into_result(path)
        }
    }
}
