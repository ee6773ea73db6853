//! CoachLog - append-only JSONL persistence for the coaching chat
//!
//! CoachLog owns the flat-file side of the system: every conversation turn,
//! every piece of user feedback and every admin correction is one JSON line
//! appended to a per-kind file under a data directory. Files are never
//! rewritten; readers tolerate torn or hand-edited lines by skipping them.
//!
//! # Modules
//!
//! - [`log`] - Generic typed JSONL file with locked appends
//! - [`records`] - The record shapes written by the chat application

pub mod log;
pub mod records;

pub use log::{JsonlLog, LogError};
pub use records::{CorrectionRecord, FeedbackRecord, LoggedMessage, Rating, TranscriptRecord};

use std::path::{Path, PathBuf};

/// File name for conversation transcript records
pub const TRANSCRIPT_FILE: &str = "debug.jsonl";

/// File name for user feedback records
pub const FEEDBACK_FILE: &str = "feedback.jsonl";

/// File name for admin correction records
pub const CORRECTIONS_FILE: &str = "corrections.jsonl";

/// Open the transcript log under a data directory
pub fn transcript_log(data_dir: impl AsRef<Path>) -> JsonlLog<TranscriptRecord> {
    JsonlLog::new(data_dir.as_ref().join(TRANSCRIPT_FILE))
}

/// Open the feedback log under a data directory
pub fn feedback_log(data_dir: impl AsRef<Path>) -> JsonlLog<FeedbackRecord> {
    JsonlLog::new(data_dir.as_ref().join(FEEDBACK_FILE))
}

/// Open the corrections log under a data directory
pub fn corrections_log(data_dir: impl AsRef<Path>) -> JsonlLog<CorrectionRecord> {
    JsonlLog::new(data_dir.as_ref().join(CORRECTIONS_FILE))
}

/// Resolve a log file path by its short name (transcript, feedback, corrections)
pub fn log_path_by_name(data_dir: impl AsRef<Path>, name: &str) -> Option<PathBuf> {
    let file = match name {
        "transcript" | "debug" => TRANSCRIPT_FILE,
        "feedback" => FEEDBACK_FILE,
        "corrections" => CORRECTIONS_FILE,
        _ => return None,
    };
    Some(data_dir.as_ref().join(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_by_name() {
        let dir = PathBuf::from("/tmp/data");
        assert_eq!(
            log_path_by_name(&dir, "feedback"),
            Some(dir.join("feedback.jsonl"))
        );
        assert_eq!(log_path_by_name(&dir, "debug"), Some(dir.join("debug.jsonl")));
        assert_eq!(
            log_path_by_name(&dir, "transcript"),
            Some(dir.join("debug.jsonl"))
        );
        assert_eq!(log_path_by_name(&dir, "nope"), None);
    }
}
