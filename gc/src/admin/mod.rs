//! Admin console: transcript review, assisted improvement, manual edits
//!
//! Administrative workflows layered on top of the same message shapes the
//! chat writes. Everything is token-gated: the expected token comes from the
//! environment variable named in config, and an unset token refuses all
//! access rather than allowing it.

mod report;

pub use report::generate_report;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use coachlog::{CorrectionRecord, JsonlLog, TranscriptRecord};
use eyre::{Context, Result, bail};
use tracing::{debug, warn};

use crate::config::{AdminConfig, LlmConfig};
use crate::domain::{Message, Role};
use crate::llm::{CompletionRequest, LlmClient};
use crate::prompts;

/// Token gate for admin commands
pub struct AdminGate {
    token_env: String,
    expected: Option<String>,
}

impl AdminGate {
    /// Read the expected token from the configured environment variable
    pub fn from_config(config: &AdminConfig) -> Self {
        let expected = std::env::var(&config.token_env).ok().filter(|t| !t.is_empty());
        debug!(token_env = %config.token_env, configured = expected.is_some(), "AdminGate::from_config: called");
        Self {
            token_env: config.token_env.clone(),
            expected,
        }
    }

    /// Check a provided token against the expected one
    ///
    /// Refuses when no token is configured: an empty expected token must
    /// never mean open access.
    pub fn authorize(&self, provided: Option<&str>) -> Result<()> {
        debug!(provided = provided.is_some(), "AdminGate::authorize: called");
        let Some(expected) = &self.expected else {
            bail!(
                "Admin access not configured. Set the {} environment variable.",
                self.token_env
            );
        };

        match provided {
            Some(token) if token == expected => Ok(()),
            _ => bail!("Unauthorized"),
        }
    }
}

/// Load the most recent transcript entries, newest first
pub fn review(data_dir: impl AsRef<Path>, limit: usize) -> Result<Vec<TranscriptRecord>> {
    debug!(limit, "review: called");
    let mut entries = coachlog::transcript_log(data_dir).tail(limit)?;
    entries.reverse();
    Ok(entries)
}

/// Fetch the nth transcript entry, 0 being the most recent
pub fn nth_entry(data_dir: impl AsRef<Path>, n: usize) -> Result<TranscriptRecord> {
    debug!(n, "nth_entry: called");
    let mut entries = coachlog::transcript_log(data_dir).read_all()?;
    entries.reverse();
    let total = entries.len();
    entries
        .into_iter()
        .nth(n)
        .ok_or_else(|| eyre::eyre!("No transcript entry #{} ({} available)", n, total))
}

/// Rebuild domain messages from a logged snapshot
///
/// Unknown roles (from hand-edited files) are skipped with a warning.
fn messages_from_logged(entry: &TranscriptRecord) -> Vec<Message> {
    entry
        .messages
        .iter()
        .filter_map(|m| match m.role.parse::<Role>() {
            Ok(role) => Some(Message {
                id: m.id.clone(),
                role,
                content: m.content.clone(),
            }),
            Err(_) => {
                warn!(role = %m.role, "messages_from_logged: skipping message with unknown role");
                None
            }
        })
        .collect()
}

/// Relay a past conversation through the model with an improvement critique
///
/// Appends an `improve` correction record and returns the improved reply.
pub async fn improve_reply(
    llm: &Arc<dyn LlmClient>,
    llm_config: &LlmConfig,
    entry: &TranscriptRecord,
    critique: &str,
    corrections: &JsonlLog<CorrectionRecord>,
) -> Result<String> {
    debug!(critique_len = critique.len(), "improve_reply: called");
    let critique = critique.trim();
    if critique.is_empty() {
        bail!("Critique manquante");
    }

    let request = CompletionRequest {
        system_prompt: prompts::improvement_booster(critique),
        rules: None,
        messages: messages_from_logged(entry),
        max_tokens: llm_config.max_tokens,
        temperature: llm_config.temperature,
    };

    let response = llm.complete(request).await.context("Improvement call failed")?;
    let improved = response.content.unwrap_or_default();

    let record = CorrectionRecord::Improve {
        ts: Utc::now(),
        critique: critique.to_string(),
        original: Some(entry.assistant_text.clone()),
        improved: improved.clone(),
    };
    corrections.append(&record).context("Failed to journal correction")?;

    Ok(improved)
}

/// Journal a manual overwrite of a stored assistant reply
///
/// The stored transcript is never rewritten; the edit is an append-only
/// record consumers apply out-of-band.
pub fn edit_reply(
    entry: &TranscriptRecord,
    edited: &str,
    note: &str,
    corrections: &JsonlLog<CorrectionRecord>,
) -> Result<()> {
    debug!(edited_len = edited.len(), "edit_reply: called");
    if edited.trim().is_empty() {
        bail!("Texte édité manquant");
    }

    let record = CorrectionRecord::Edit {
        ts: Utc::now(),
        entry_id: Some(entry.ts.to_rfc3339()),
        original: Some(entry.assistant_text.clone()),
        edited: edited.to_string(),
        note: note.to_string(),
        messages: entry.messages.clone(),
    };
    corrections.append(&record).context("Failed to journal edit")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use coachlog::LoggedMessage;
    use serial_test::serial;
    use tempfile::tempdir;

    fn sample_entry(user: &str, assistant: &str) -> TranscriptRecord {
        TranscriptRecord {
            ts: Utc::now(),
            messages: vec![
                LoggedMessage {
                    id: "m1".to_string(),
                    role: "user".to_string(),
                    content: user.to_string(),
                },
                LoggedMessage {
                    id: "m2".to_string(),
                    role: "assistant".to_string(),
                    content: assistant.to_string(),
                },
            ],
            user_text: user.to_string(),
            assistant_text: assistant.to_string(),
        }
    }

    // --- gate ---

    #[test]
    #[serial]
    fn test_gate_refuses_when_unconfigured() {
        unsafe { std::env::remove_var("GC_TEST_ADMIN_TOKEN") };
        let gate = AdminGate::from_config(&AdminConfig {
            token_env: "GC_TEST_ADMIN_TOKEN".to_string(),
            review_limit: 200,
        });

        assert!(gate.authorize(Some("anything")).is_err());
        assert!(gate.authorize(None).is_err());
    }

    #[test]
    #[serial]
    fn test_gate_token_compare() {
        unsafe { std::env::set_var("GC_TEST_ADMIN_TOKEN", "s3cret") };
        let gate = AdminGate::from_config(&AdminConfig {
            token_env: "GC_TEST_ADMIN_TOKEN".to_string(),
            review_limit: 200,
        });

        assert!(gate.authorize(Some("s3cret")).is_ok());
        assert!(gate.authorize(Some("wrong")).is_err());
        assert!(gate.authorize(None).is_err());
        unsafe { std::env::remove_var("GC_TEST_ADMIN_TOKEN") };
    }

    // --- review ---

    #[test]
    fn test_review_newest_first() {
        let temp = tempdir().unwrap();
        let log = coachlog::transcript_log(temp.path());
        log.append(&sample_entry("q1", "a1")).unwrap();
        log.append(&sample_entry("q2", "a2")).unwrap();
        log.append(&sample_entry("q3", "a3")).unwrap();

        let entries = review(temp.path(), 2).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user_text, "q3");
        assert_eq!(entries[1].user_text, "q2");
    }

    #[test]
    fn test_nth_entry() {
        let temp = tempdir().unwrap();
        let log = coachlog::transcript_log(temp.path());
        log.append(&sample_entry("q1", "a1")).unwrap();
        log.append(&sample_entry("q2", "a2")).unwrap();

        assert_eq!(nth_entry(temp.path(), 0).unwrap().user_text, "q2");
        assert_eq!(nth_entry(temp.path(), 1).unwrap().user_text, "q1");
        assert!(nth_entry(temp.path(), 5).is_err());
    }

    // --- improve ---

    #[tokio::test]
    async fn test_improve_reply_journals_and_returns() {
        let temp = tempdir().unwrap();
        let corrections = coachlog::corrections_log(temp.path());
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(&["Version améliorée."]));

        let entry = sample_entry("Ma pelouse jaunit", "Arrose plus.");
        let improved = improve_reply(&llm, &LlmConfig::default(), &entry, "Ajoute les doses", &corrections)
            .await
            .unwrap();

        assert_eq!(improved, "Version améliorée.");

        let records = coachlog::corrections_log(temp.path()).read_all().unwrap();
        assert_eq!(records.len(), 1);
        match &records[0] {
            CorrectionRecord::Improve {
                critique,
                original,
                improved,
                ..
            } => {
                assert_eq!(critique, "Ajoute les doses");
                assert_eq!(original.as_deref(), Some("Arrose plus."));
                assert_eq!(improved, "Version améliorée.");
            }
            _ => panic!("Expected Improve record"),
        }
    }

    #[tokio::test]
    async fn test_improve_reply_requires_critique() {
        let temp = tempdir().unwrap();
        let corrections = coachlog::corrections_log(temp.path());
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(&["jamais appelé"]));

        let entry = sample_entry("q", "a");
        let result = improve_reply(&llm, &LlmConfig::default(), &entry, "  ", &corrections).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_improve_reply_sends_booster_prompt() {
        let temp = tempdir().unwrap();
        let corrections = coachlog::corrections_log(temp.path());
        let mock = Arc::new(MockLlmClient::with_texts(&["ok"]));
        let llm: Arc<dyn LlmClient> = mock.clone();

        let entry = sample_entry("q", "a");
        improve_reply(&llm, &LlmConfig::default(), &entry, "Sois plus précis", &corrections)
            .await
            .unwrap();

        let request = mock.last_request().unwrap();
        assert!(request.system_prompt.contains("Sois plus précis"));
        assert!(request.rules.is_none());
        assert_eq!(request.messages.len(), 2);
    }

    // --- edit ---

    #[test]
    fn test_edit_reply_journals() {
        let temp = tempdir().unwrap();
        let corrections = coachlog::corrections_log(temp.path());

        let entry = sample_entry("q", "réponse douteuse");
        edit_reply(&entry, "réponse corrigée", "ton incorrect", &corrections).unwrap();

        let records = coachlog::corrections_log(temp.path()).read_all().unwrap();
        match &records[0] {
            CorrectionRecord::Edit {
                original,
                edited,
                note,
                messages,
                entry_id,
                ..
            } => {
                assert_eq!(original.as_deref(), Some("réponse douteuse"));
                assert_eq!(edited, "réponse corrigée");
                assert_eq!(note, "ton incorrect");
                assert_eq!(messages.len(), 2);
                assert!(entry_id.is_some());
            }
            _ => panic!("Expected Edit record"),
        }
    }

    #[test]
    fn test_edit_reply_requires_text() {
        let temp = tempdir().unwrap();
        let corrections = coachlog::corrections_log(temp.path());
        let entry = sample_entry("q", "a");

        assert!(edit_reply(&entry, "  ", "note", &corrections).is_err());
    }
}
