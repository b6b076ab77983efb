use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::core::{CompletionTransport, TutorClient};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// In-memory transcript kept by the caller. Only the latest user turn is ever
/// sent; history lives server-side behind the session token.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Send `text` and record both sides of the exchange.
    ///
    /// Blank input is ignored and yields `Ok(None)`. On failure the user turn
    /// stays in the transcript.
    pub async fn ask<T: CompletionTransport>(
        &mut self,
        client: &TutorClient<T>,
        text: &str,
    ) -> Result<Option<&ChatTurn>, ApiError> {
        if text.trim().is_empty() {
            debug!("Ignoring blank chat input");
            return Ok(None);
        }

        self.turns.push(ChatTurn::user(text));
        let reply = client.send_message(text).await?;
        self.turns.push(ChatTurn::assistant(reply));
        Ok(self.turns.last())
    }

    /// Start over: drop the transcript and the server-side session.
    pub fn clear<T: CompletionTransport>(&mut self, client: &TutorClient<T>) {
        self.turns.clear();
        client.reset_session();
    }
}
