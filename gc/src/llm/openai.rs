//! OpenAI API client implementation
//!
//! Implements the LlmClient trait for OpenAI's Chat Completions API. One
//! request, one response: retries, rate-limit handling and streaming are
//! deliberately out of scope for this relay.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::config::LlmConfig;

/// How much of an error body is kept for the user-visible message
const ERROR_BODY_PREVIEW_CHARS: usize = 300;

/// OpenAI API client
pub struct OpenAiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client from configuration
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "OpenAiClient::from_config: called");
        let api_key = config
            .api_key()
            .map_err(|_| LlmError::MissingApiKey(config.api_key_env.clone()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the Chat Completions endpoint
    ///
    /// Message order matters: system instruction first, then the optional
    /// quality-rules document, then the conversation.
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, message_count = request.messages.len(), "build_request_body: called");

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system_prompt,
        })];

        if let Some(rules) = &request.rules {
            messages.push(serde_json::json!({
                "role": "system",
                "content": format!("{}\n{}", crate::prompts::RULES_HEADER, rules),
            }));
        }

        for msg in &request.messages {
            messages.push(serde_json::json!({
                "role": msg.role.as_str(),
                "content": msg.content,
            }));
        }

        serde_json::json!({
            "model": self.model,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "messages": messages,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, "complete: called");
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(status, "complete: API error");
            return Err(LlmError::Api {
                status,
                message: text.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        debug!("complete: success");
        let api_response: OpenAiResponse = response.json().await?;
        let content = api_response.choices.into_iter().next().and_then(|c| c.message.content);

        Ok(CompletionResponse { content })
    }
}

// OpenAI API response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;

    fn test_client() -> OpenAiClient {
        OpenAiClient {
            model: "gpt-4o-mini".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com".to_string(),
            http: Client::new(),
            max_tokens: 1024,
        }
    }

    fn test_request(rules: Option<String>) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "Tu es Docteur Gazon".to_string(),
            rules,
            messages: vec![
                Message::user("Ma pelouse jaunit"),
                Message::assistant("Depuis quand ?"),
                Message::user("Deux semaines"),
            ],
            max_tokens: 512,
            temperature: 0.2,
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let body = test_client().build_request_body(&test_request(None));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["max_tokens"], 512);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "Tu es Docteur Gazon");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["content"], "Deux semaines");
    }

    #[test]
    fn test_build_request_body_with_rules() {
        let body = test_client().build_request_body(&test_request(Some("- Doses en g/m²".to_string())));

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1]["role"], "system");
        let rules_content = messages[1]["content"].as_str().unwrap();
        assert!(rules_content.starts_with("### REGLES_QUALITE\n"));
        assert!(rules_content.contains("g/m²"));
        // Conversation follows the rules message
        assert_eq!(messages[2]["role"], "user");
    }

    #[test]
    fn test_max_tokens_capped() {
        let mut request = test_request(None);
        request.max_tokens = 99_999;

        let body = test_client().build_request_body(&request);
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn test_parse_response_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Tonds moins court."}}]}"#;
        let parsed: OpenAiResponse = serde_json::from_str(json).unwrap();
        let content = parsed.choices.into_iter().next().and_then(|c| c.message.content);
        assert_eq!(content.as_deref(), Some("Tonds moins court."));
    }

    #[test]
    fn test_parse_response_no_choices() {
        let json = r#"{"choices":[]}"#;
        let parsed: OpenAiResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
