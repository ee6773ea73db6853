//! Session manager: the one stateful coordinator
//!
//! Owns the session, relays turns to the reply generator, and applies the
//! follow-up policies. `submit_user_text` never fails from the caller's
//! point of view: reply-generation errors become visible synthetic
//! messages, persistence errors become log warnings.

use std::sync::Arc;

use chrono::Utc;
use coachlog::{JsonlLog, TranscriptRecord};
use tracing::{debug, warn};

use super::policy::{maybe_ask_profile, maybe_nurture_for_lawn};
use super::store::SessionStore;
use super::Session;
use crate::config::Config;
use crate::domain::{infer_profile_delta, Message, Profile};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts;

/// Tunables the manager needs from configuration
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    pub max_tokens: u32,
    pub temperature: f64,

    /// Quality-rules document loaded at startup, sent with every request
    pub rules: Option<String>,
}

impl SessionManagerConfig {
    /// Derive manager settings from the application config
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
            rules: prompts::load_rules(&config.storage.rules_file),
        }
    }
}

/// Conversation session manager
pub struct SessionManager {
    session: Session,
    store: Box<dyn SessionStore>,
    llm: Arc<dyn LlmClient>,

    /// Transcript sink; appends are fire-and-forget
    transcript: Option<JsonlLog<TranscriptRecord>>,

    config: SessionManagerConfig,
    busy: bool,
}

impl SessionManager {
    /// Create a manager, loading the persisted session (or defaults)
    pub fn new(
        store: Box<dyn SessionStore>,
        llm: Arc<dyn LlmClient>,
        transcript: Option<JsonlLog<TranscriptRecord>>,
        config: SessionManagerConfig,
    ) -> Self {
        debug!("SessionManager::new: called");
        let session = store.load();
        debug!(message_count = session.messages.len(), "SessionManager::new: session loaded");
        Self {
            session,
            store,
            llm,
            transcript,
            config,
            busy: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        &self.session.messages
    }

    pub fn profile(&self) -> &Profile {
        &self.session.profile
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// The last assistant message and the user message that preceded it
    ///
    /// Used to attach feedback to the most recent exchange.
    pub fn last_exchange(&self) -> Option<(Option<&Message>, &Message)> {
        let assistant_idx = self.session.messages.iter().rposition(|m| m.is_assistant())?;
        let user = self.session.messages[..assistant_idx].iter().rev().find(|m| !m.is_assistant());
        Some((user, &self.session.messages[assistant_idx]))
    }

    /// Reset the message sequence to the seed greeting
    ///
    /// The profile is kept: what we learned about the user outlives a
    /// cleared conversation.
    pub fn reset_messages(&mut self) {
        debug!("SessionManager::reset_messages: called");
        self.session.messages = Session::new().messages;
        self.persist();
    }

    /// Submit one user turn
    ///
    /// Returns the messages appended after the user message (the reply plus
    /// any synthetic follow-ups), for display. Empty input and re-entrant
    /// calls while a request is in flight are ignored and return nothing.
    /// This never surfaces an error: failures become a visible synthetic
    /// assistant message and the session stays usable.
    pub async fn submit_user_text(&mut self, text: &str) -> Vec<Message> {
        debug!(text_len = text.len(), "submit_user_text: called");
        let text = text.trim();
        if text.is_empty() {
            debug!("submit_user_text: empty input, ignoring");
            return Vec::new();
        }
        if self.busy {
            debug!("submit_user_text: request already in flight, ignoring");
            return Vec::new();
        }
        self.busy = true;

        self.session.messages.push(Message::user(text));

        let delta = infer_profile_delta(text, &self.session.profile);
        if self.session.profile.apply_delta(&delta) {
            debug!(profile = ?self.session.profile, "submit_user_text: profile updated from text");
        }
        self.persist();

        let request = CompletionRequest {
            system_prompt: prompts::SYSTEM_PROMPT.to_string(),
            rules: self.config.rules.clone(),
            messages: self.session.messages.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut appended = Vec::new();

        match self.llm.complete(request).await {
            Ok(response) => {
                let reply = response
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| prompts::REPLY_FALLBACK.to_string());

                self.log_transcript(text, &reply);

                let reply_msg = Message::assistant(reply.clone());
                self.session.messages.push(reply_msg.clone());
                appended.push(reply_msg);

                // Policy order matters: the clarifying question must see the
                // reply just produced, the nurture check runs after it.
                if let Some(msg) = maybe_ask_profile(&mut self.session, &reply) {
                    appended.push(msg);
                }
                if let Some(msg) = maybe_nurture_for_lawn(&mut self.session, text) {
                    appended.push(msg);
                }
            }
            Err(e) => {
                warn!(error = %e, "submit_user_text: reply generation failed");
                let error_msg = Message::assistant(e.user_message());
                self.session.messages.push(error_msg.clone());
                appended.push(error_msg);
            }
        }

        self.persist();
        self.busy = false;
        appended
    }

    /// Append the answered turn to the transcript log
    ///
    /// The snapshot is the sequence as sent to the generator (up to and
    /// including the user message); the reply rides alongside.
    fn log_transcript(&self, user_text: &str, assistant_text: &str) {
        let Some(transcript) = &self.transcript else {
            return;
        };

        let record = TranscriptRecord {
            ts: Utc::now(),
            messages: self.session.messages.iter().map(Into::into).collect(),
            user_text: user_text.to_string(),
            assistant_text: assistant_text.to_string(),
        };

        if let Err(e) = transcript.append(&record) {
            warn!(error = %e, "log_transcript: failed to append transcript record");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.session) {
            warn!(error = %e, "persist: failed to save session");
        }
    }
}
