//! Conversation message type

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// One turn in the conversation
///
/// Messages are append-only: once pushed onto a session they are never
/// mutated (admin edits are journaled out-of-band, not applied in place).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message with a fresh id
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            id: Uuid::now_v7().to_string(),
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message with a fresh id
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self {
            id: Uuid::now_v7().to_string(),
            role: Role::Assistant,
            content: text.into(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

impl From<&Message> for coachlog::LoggedMessage {
    fn from(msg: &Message) -> Self {
        coachlog::LoggedMessage {
            id: msg.id.clone(),
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}
