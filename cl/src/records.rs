//! Record shapes written by the coaching chat
//!
//! These mirror what the application appends: one transcript record per
//! answered turn, one feedback record per rating, one correction record per
//! admin action. Timestamps are RFC3339 strings so the files stay greppable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message as stored in log records
///
/// Decoupled from the application's in-memory message type so the log format
/// stays stable even if the app evolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedMessage {
    pub id: String,
    pub role: String,
    pub content: String,
}

/// One answered conversation turn, appended after every successful reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptRecord {
    pub ts: DateTime<Utc>,

    /// Full message sequence as sent to the reply generator
    pub messages: Vec<LoggedMessage>,

    /// Last user message text at the time of the call
    #[serde(rename = "userText")]
    pub user_text: String,

    /// The generated reply
    #[serde(rename = "assistantText")]
    pub assistant_text: String,
}

/// Thumbs up/down rating on an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Up,
    Down,
}

impl std::str::FromStr for Rating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" | "+" => Ok(Rating::Up),
            "down" | "-" => Ok(Rating::Down),
            _ => Err(format!("Unknown rating: {}. Use: up or down", s)),
        }
    }
}

/// User feedback on one assistant reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub ts: DateTime<Utc>,

    /// Id of the rated assistant message
    #[serde(rename = "msgId")]
    pub msg_id: String,

    pub rating: Rating,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub comment: String,

    /// The user message the reply answered
    #[serde(rename = "userText", default)]
    pub user_text: String,

    /// The rated reply text
    #[serde(rename = "assistantText", default)]
    pub assistant_text: String,
}

/// Admin correction journal entry
///
/// Two shapes share one file, discriminated by the `action` field exactly as
/// the consumers expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum CorrectionRecord {
    /// An LLM-assisted rewrite of a past reply
    #[serde(rename = "improve")]
    Improve {
        ts: DateTime<Utc>,

        /// The critique the rewrite had to apply
        critique: String,

        /// The reply before improvement, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        original: Option<String>,

        /// The improved reply
        improved: String,
    },

    /// A manual overwrite of a stored assistant reply
    #[serde(rename = "edit_assistant_reply")]
    Edit {
        ts: DateTime<Utc>,

        /// Transcript entry the edit applies to, when known
        #[serde(rename = "entryId", skip_serializing_if = "Option::is_none")]
        entry_id: Option<String>,

        /// The reply text before the edit, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        original: Option<String>,

        /// The new reply text
        edited: String,

        /// Audit note explaining the edit
        #[serde(default)]
        note: String,

        /// Conversation context at edit time
        #[serde(default)]
        messages: Vec<LoggedMessage>,
    },
}
