use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Value};

use crate::clients::dashscope::models::CompletionRequest;
use crate::core::{CompletionTransport, TransportResponse};
use crate::error::ApiError;

/// A scripted reply for the mock transport
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Any status with a raw body
    Raw { status: u16, body: String },
    /// The call fails before any HTTP response exists
    Failure(ApiError),
}

impl MockResponse {
    /// A 200 with `{"output": {"text": .., "session_id": ..}}`
    pub fn success(text: impl Into<String>, session_id: Option<&str>) -> Self {
        let mut output = json!({ "text": text.into() });
        if let Some(id) = session_id {
            output["session_id"] = Value::String(id.to_string());
        }
        Self::json(200, json!({ "output": output }))
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::Raw { status, body: body.to_string() }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self::Raw { status, body: body.into() }
    }
}

/// A request as seen by the mock transport
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: Url,
    pub api_key: String,
    /// The serialized body, so tests can check for absent keys
    pub body: Value,
}

impl RecordedRequest {
    pub fn session_id(&self) -> Option<&str> {
        self.body["input"]["session_id"].as_str()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.body["input"]["prompt"].as_str()
    }
}

#[derive(Debug, Default)]
struct MockState {
    queue: VecDeque<MockResponse>,
    fallback: Option<MockResponse>,
    requests: Vec<RecordedRequest>,
}

/// Handle for scripting responses and inspecting what was sent
#[derive(Debug, Default)]
pub struct MockHandle {
    state: Mutex<MockState>,
}

impl MockHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_response(&self, response: MockResponse) {
        self.state().queue.push_back(response);
    }

    /// Reply used once the queue is empty
    pub fn set_fallback(&self, response: MockResponse) {
        self.state().fallback = Some(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state().requests.last().cloned()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }
}

/// In-memory transport that replays scripted responses in order
#[derive(Debug, Clone)]
pub struct MockTransport {
    handle: Arc<MockHandle>,
}

impl MockTransport {
    pub fn new() -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        (Self { handle: handle.clone() }, handle)
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (transport, handle) = Self::new();
        for response in responses {
            handle.add_response(response);
        }
        (transport, handle)
    }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    async fn post(&self, url: &Url, api_key: &str, body: &CompletionRequest) -> Result<TransportResponse, ApiError> {
        let body = serde_json::to_value(body).map_err(|_| ApiError::Parsing)?;
        let mut state = self.handle.state();
        state.requests.push(RecordedRequest {
            url: url.clone(),
            api_key: api_key.to_string(),
            body,
        });

        let next = state.queue.pop_front().or_else(|| state.fallback.clone());
        match next {
            Some(MockResponse::Raw { status, body }) => Ok(TransportResponse { status, body }),
            Some(MockResponse::Failure(err)) => Err(err),
            None => Err(ApiError::Network("mock transport has no scripted response".to_string())),
        }
    }
}
