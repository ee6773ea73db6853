//! LLM error types

use thiserror::Error;

/// Errors that can occur during a reply-generation call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found: {0}")]
    MissingApiKey(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// User-visible rendering of the failure
    ///
    /// The session never surfaces raw errors; it appends this text as a
    /// synthetic assistant message instead. Wording matches what users of
    /// the original widget saw.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Api { status, message } => format!("❌ OpenAI {}: {}", status, message),
            LlmError::Network(e) => format!("❌ Erreur réseau : {}", e),
            LlmError::MissingApiKey(_) => "❌ Clé OpenAI manquante côté serveur.".to_string(),
            LlmError::Json(_) | LlmError::InvalidResponse(_) => "❌ Erreur serveur interne.".to_string(),
        }
    }
}
