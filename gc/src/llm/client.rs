//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Reply-generation collaborator
///
/// One request in, one response out. The session manager treats this as a
/// plain request/response seam: no retries, no streaming, no rate-limit
/// bookkeeping happen behind it.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// Scripted reply for the mock client
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Text(String),
        Empty,
        Error { status: u16, message: String },
    }

    /// Mock LLM client for unit tests
    ///
    /// Plays back a fixed script of replies and records every request it
    /// received so tests can assert on the payload.
    pub struct MockLlmClient {
        replies: Vec<MockReply>,
        call_count: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(replies: Vec<MockReply>) -> Self {
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Convenience: a client that answers with the given texts in order
        pub fn with_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| MockReply::Text(t.to_string())).collect())
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// The most recent request, if any call was made
        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);

            match self.replies.get(idx) {
                Some(MockReply::Text(text)) => Ok(CompletionResponse::text(text.clone())),
                Some(MockReply::Empty) => Ok(CompletionResponse { content: None }),
                Some(MockReply::Error { status, message }) => Err(LlmError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                None => Err(LlmError::InvalidResponse("No more mock responses".to_string())),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::domain::Message;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_prompt: "Test".to_string(),
                rules: None,
                messages: vec![Message::user("Bonjour")],
                max_tokens: 100,
                temperature: 0.2,
            }
        }

        #[tokio::test]
        async fn test_mock_plays_back_replies() {
            let client = MockLlmClient::with_texts(&["un", "deux"]);

            let first = client.complete(request()).await.unwrap();
            assert_eq!(first.content.as_deref(), Some("un"));

            let second = client.complete(request()).await.unwrap();
            assert_eq!(second.content.as_deref(), Some("deux"));

            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            assert!(client.complete(request()).await.is_err());
        }

        #[tokio::test]
        async fn test_mock_records_requests() {
            let client = MockLlmClient::with_texts(&["ok"]);
            client.complete(request()).await.unwrap();

            let seen = client.last_request().unwrap();
            assert_eq!(seen.messages.len(), 1);
            assert_eq!(seen.system_prompt, "Test");
        }

        #[tokio::test]
        async fn test_mock_error_reply() {
            let client = MockLlmClient::new(vec![MockReply::Error {
                status: 500,
                message: "boom".to_string(),
            }]);

            let err = client.complete(request()).await.unwrap_err();
            assert!(matches!(err, LlmError::Api { status: 500, .. }));
        }
    }
}
