//! Request orchestration: one executor that talks to the completion API and
//! keeps the conversation session token, and the client operations built on it.
//!
//! - `TutorClient::send_message` continues the chat session and returns the reply verbatim
//! - `TutorClient::generate_quiz` is stateless and decodes question records from the reply
//! - `TutorClient::reset_session` forgets the chat session
//!
//! Calls are not serialized against each other. Two overlapping session-bearing
//! calls each read the token when they start and each overwrite it when they
//! finish, so the last response to arrive wins.

use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::dashscope::models::{CompletionRequest, CompletionResponse, ErrorBody};
use crate::clients::dashscope::DashScopeTransport;
use crate::config::TutorConfig;
use crate::error::ApiError;
use crate::json_utils::extract_all;
use crate::quiz::{QuizQuestion, QuizRequest};

/// Status and body of an HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one completion request. Implementations do no retrying and no
/// interpretation of the body.
#[async_trait]
pub trait CompletionTransport: Send + Sync + Debug {
    async fn post(&self, url: &Url, api_key: &str, body: &CompletionRequest) -> Result<TransportResponse, ApiError>;
}

#[async_trait]
impl CompletionTransport for Box<dyn CompletionTransport> {
    async fn post(&self, url: &Url, api_key: &str, body: &CompletionRequest) -> Result<TransportResponse, ApiError> {
        self.as_ref().post(url, api_key, body).await
    }
}

/// Builds, sends and validates completion requests and owns the session slot.
#[derive(Debug)]
pub struct RequestExecutor<T: CompletionTransport> {
    transport: T,
    config: TutorConfig,
    session: Mutex<Option<String>>,
}

impl<T: CompletionTransport> RequestExecutor<T> {
    pub fn new(config: TutorConfig, transport: T) -> Self {
        Self {
            transport,
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // The guard is never held across an await.
    fn session_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The token that the next session-bearing call will send.
    pub fn session_id(&self) -> Option<String> {
        self.session_slot().clone()
    }

    pub fn reset_session(&self) {
        if self.session_slot().take().is_some() {
            info!("Chat session reset");
        }
    }

    /// Run one completion call against `app_id` and return the output text.
    #[instrument(target = "vocab_tutor::executor", skip(self, message), fields(prompt_len = message.len()))]
    pub async fn execute(&self, message: &str, app_id: &str, use_session: bool) -> Result<String, ApiError> {
        let url = self.config.endpoint(app_id)?;

        let session_id = if use_session { self.session_slot().clone() } else { None };
        debug!(has_session = session_id.is_some(), "Preparing completion request");
        let request = CompletionRequest::new(message, session_id);

        let response = self.transport.post(&url, &self.config.api_key, &request).await?;

        if response.status != 200 {
            return Err(match serde_json::from_str::<ErrorBody>(&response.body) {
                Ok(body) => {
                    error!(status = response.status, provider_message = %body.message, "Completion API returned an error");
                    ApiError::Api(body.message)
                }
                Err(_) => {
                    error!(status = response.status, "Completion API returned a non-200 status");
                    ApiError::Http(response.status)
                }
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&response.body).map_err(|e| {
            warn!(error = %e, "Completion response did not contain output.text");
            ApiError::Parsing
        })?;

        if use_session {
            if let Some(new_id) = parsed.output.session_id() {
                *self.session_slot() = Some(new_id.to_string());
                debug!("Stored session token from response");
            }
        }

        info!(response_len = parsed.output.text.len(), "Completion succeeded");
        Ok(parsed.output.text)
    }
}

/// Chat and quiz operations over one executor.
#[derive(Debug)]
pub struct TutorClient<T: CompletionTransport = DashScopeTransport> {
    executor: RequestExecutor<T>,
}

impl TutorClient<DashScopeTransport> {
    pub fn new(config: TutorConfig) -> Self {
        Self::with_transport(config, DashScopeTransport::new())
    }
}

impl<T: CompletionTransport> TutorClient<T> {
    pub fn with_transport(config: TutorConfig, transport: T) -> Self {
        info!(chat_app = %config.chat_app_id, quiz_app = %config.quiz_app_id, "Creating tutor client");
        Self {
            executor: RequestExecutor::new(config, transport),
        }
    }

    pub fn executor(&self) -> &RequestExecutor<T> {
        &self.executor
    }

    /// Send one chat utterance, continuing the current session.
    ///
    /// The reply is returned exactly as the model produced it, markup included.
    #[instrument(target = "vocab_tutor::chat", skip(self, text), fields(prompt_len = text.len()))]
    pub async fn send_message(&self, text: &str) -> Result<String, ApiError> {
        let app_id = &self.executor.config().chat_app_id;
        self.executor.execute(text, app_id, true).await
    }

    /// Ask the quiz application for questions. Never uses or updates the session.
    #[instrument(target = "vocab_tutor::quiz", skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate_quiz(&self, prompt: &str) -> Result<Vec<QuizQuestion>, ApiError> {
        let app_id = &self.executor.config().quiz_app_id;
        let raw = self.executor.execute(prompt, app_id, false).await?;

        let questions = extract_all::<QuizQuestion>(&raw).map_err(|e| {
            warn!(target: "vocab_tutor::quiz", error = %e, raw_len = raw.len(), "Quiz text is neither a question array nor a single question");
            ApiError::Parsing
        })?;
        info!(target: "vocab_tutor::quiz", count = questions.len(), "Quiz generated");
        Ok(questions)
    }

    pub async fn generate_quiz_for(&self, request: &QuizRequest) -> Result<Vec<QuizQuestion>, ApiError> {
        self.generate_quiz(&request.render_prompt()).await
    }

    pub fn reset_session(&self) {
        self.executor.reset_session();
    }
}
