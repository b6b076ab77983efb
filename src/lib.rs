pub mod chat;
pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod json_utils;
pub mod quiz;

// Convenient re-exports
pub use chat::{ChatTurn, Conversation, Role};
pub use config::TutorConfig;
pub use crate::core::{CompletionTransport, RequestExecutor, TutorClient};
pub use error::{ApiError, ConfigError};
pub use quiz::{AnswerLabel, Difficulty, QuizPreset, QuizQuestion, QuizRequest};
