//! Completion request/response types
//!
//! Modeled on the OpenAI Chat Completions API but kept provider-neutral:
//! the request carries the conversation plus the fixed system instruction
//! and the optional quality-rules document.

use crate::domain::Message;

/// Everything needed for one reply-generation call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fixed system instruction
    pub system_prompt: String,

    /// Optional quality-rules document, sent as a second system message
    pub rules: Option<String>,

    /// Full ordered conversation
    pub messages: Vec<Message>,

    /// Max tokens for the response (capped by client config)
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text; `None` when the provider returned no content
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Create a response with text content (test and mock convenience)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}
