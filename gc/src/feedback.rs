//! User feedback capture
//!
//! Ratings target the most recent exchange and are appended fire-and-forget
//! to the feedback log; aggregation happens in the admin report.

use chrono::Utc;
use coachlog::{FeedbackRecord, JsonlLog, Rating};
use eyre::Result;
use tracing::debug;

use crate::domain::Message;

/// Record a rating for an assistant reply
///
/// `user_text` is the user message the reply answered, when there is one.
pub fn record_feedback(
    log: &JsonlLog<FeedbackRecord>,
    reply: &Message,
    user_text: Option<&str>,
    rating: Rating,
    tags: Vec<String>,
    comment: Option<String>,
) -> Result<FeedbackRecord> {
    debug!(msg_id = %reply.id, ?rating, "record_feedback: called");

    let record = FeedbackRecord {
        ts: Utc::now(),
        msg_id: reply.id.clone(),
        rating,
        tags,
        comment: comment.unwrap_or_default(),
        user_text: user_text.unwrap_or_default().to_string(),
        assistant_text: reply.content.clone(),
    };

    log.append(&record)?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_feedback_appends() {
        let temp = tempdir().unwrap();
        let log = coachlog::feedback_log(temp.path());

        let reply = Message::assistant("Tonds à 6 cm.");
        let record = record_feedback(
            &log,
            &reply,
            Some("Quelle hauteur ?"),
            Rating::Up,
            vec!["hauteur".to_string()],
            Some("précis".to_string()),
        )
        .unwrap();

        assert_eq!(record.msg_id, reply.id);

        let stored = coachlog::feedback_log(temp.path()).read_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].rating, Rating::Up);
        assert_eq!(stored[0].user_text, "Quelle hauteur ?");
        assert_eq!(stored[0].assistant_text, "Tonds à 6 cm.");
        assert_eq!(stored[0].comment, "précis");
    }

    #[test]
    fn test_record_feedback_defaults() {
        let temp = tempdir().unwrap();
        let log = coachlog::feedback_log(temp.path());

        let reply = Message::assistant("Réponse.");
        let record = record_feedback(&log, &reply, None, Rating::Down, vec![], None).unwrap();

        assert_eq!(record.user_text, "");
        assert_eq!(record.comment, "");
        assert!(record.tags.is_empty());
    }
}
