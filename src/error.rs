use thiserror::Error;

/// Failure of a single completion call. None of these are retried by the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid API URL: {0}")]
    InvalidEndpoint(String),
    #[error("Invalid response from server")]
    InvalidResponseShape,
    #[error("HTTP Error: {0}")]
    Http(u16),
    #[error("Failed to parse response")]
    Parsing,
    #[error("API Error: {0}")]
    Api(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// Whether offering the user a manual retry makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http(status) => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}
