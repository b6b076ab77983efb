use std::env;

use reqwest::Url;
use tracing::{debug, info};

use crate::error::{ApiError, ConfigError};

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1";

/// Trait for values that can be looked up from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this value
    const KEY_NAME: &'static str;

    /// Find the value by loading `.env` (if present) and then reading the environment
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|v| !v.trim().is_empty())
    }

    /// Like `find_key`, but absence is an error
    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingVar(Self::KEY_NAME))
    }
}

pub struct ApiKey;
impl KeyFromEnv for ApiKey {
    const KEY_NAME: &'static str = "DASHSCOPE_API_KEY";
}

pub struct ChatAppId;
impl KeyFromEnv for ChatAppId {
    const KEY_NAME: &'static str = "DASHSCOPE_CHAT_APP_ID";
}

pub struct QuizAppId;
impl KeyFromEnv for QuizAppId {
    const KEY_NAME: &'static str = "DASHSCOPE_QUIZ_APP_ID";
}

pub struct BaseUrl;
impl KeyFromEnv for BaseUrl {
    const KEY_NAME: &'static str = "DASHSCOPE_BASE_URL";
}

/// Credentials and application identifiers for the completion API.
#[derive(Clone)]
pub struct TutorConfig {
    pub api_key: String,
    /// Application that handles the chat tutor conversation
    pub chat_app_id: String,
    /// Application that generates quiz questions
    pub quiz_app_id: String,
    pub base_url: String,
}

// Keeps the key out of logs and panic messages.
impl std::fmt::Debug for TutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorConfig")
            .field("api_key", &"<redacted>")
            .field("chat_app_id", &self.chat_app_id)
            .field("quiz_app_id", &self.quiz_app_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TutorConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>, chat_app_id: impl Into<String>, quiz_app_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            chat_app_id: chat_app_id.into(),
            quiz_app_id: quiz_app_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load configuration from the environment and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new(ApiKey::require_key()?, ChatAppId::require_key()?, QuizAppId::require_key()?);
        if let Some(base_url) = BaseUrl::find_key() {
            config = config.with_base_url(base_url)?;
        }
        info!(base_url = %config.base_url, "Loaded tutor configuration");
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        let parsed = Url::parse(&base_url).map_err(|_| ConfigError::InvalidBaseUrl(base_url.clone()))?;
        if parsed.cannot_be_a_base() || parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(ConfigError::InvalidBaseUrl(base_url));
        }
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// `<base>/apps/<app_id>/completion`, with `app_id` encoded as a single path segment.
    pub fn endpoint(&self, app_id: &str) -> Result<Url, ApiError> {
        if matches!(app_id, "" | "." | "..") {
            return Err(ApiError::InvalidEndpoint(format!("application id {:?}", app_id)));
        }
        let invalid_base = || ApiError::InvalidEndpoint(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .extend(["apps", app_id, "completion"]);
        debug!(app_id, "Composed completion endpoint");
        Ok(url)
    }
}
