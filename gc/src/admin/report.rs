//! Feedback aggregation report
//!
//! Rolls `feedback.jsonl` up into a small markdown report: totals, rating
//! split, most frequent tags, recent examples. Written next to the logs.

use std::collections::HashMap;
use std::fs;
use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::debug;

use coachlog::Rating;

/// Output file name, under the data directory
const REPORT_FILE: &str = "feedback_report.md";

/// How many top tags the report lists
const TOP_TAGS: usize = 10;

/// How many recent examples the report quotes
const RECENT_EXAMPLES: usize = 5;

/// Longest quoted excerpt of an assistant reply
const EXCERPT_CHARS: usize = 140;

/// Generate the feedback report
///
/// Returns the written path, or `None` when no feedback was ever recorded.
pub fn generate_report(data_dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let data_dir = data_dir.as_ref();
    debug!(?data_dir, "generate_report: called");

    let log = coachlog::feedback_log(data_dir);
    if !log.exists() {
        debug!("generate_report: no feedback file");
        return Ok(None);
    }

    let records = log.read_all()?;
    let total = records.len();
    let up = records.iter().filter(|r| r.rating == Rating::Up).count();
    let down = total - up;

    let mut tag_counts: HashMap<&str, usize> = HashMap::new();
    for record in &records {
        for tag in &record.tags {
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut top_tags: Vec<_> = tag_counts.into_iter().collect();
    top_tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    top_tags.truncate(TOP_TAGS);

    let mut md = String::new();
    writeln!(md, "# Rapport Feedback")?;
    writeln!(md, "Total: {} | 👍 {} | 👎 {}", total, up, down)?;
    writeln!(md)?;
    writeln!(md, "## Tags les plus fréquents")?;
    for (tag, count) in &top_tags {
        writeln!(md, "- {}: {}", tag, count)?;
    }
    writeln!(md)?;
    writeln!(md, "## Exemples récents ({})", RECENT_EXAMPLES)?;
    let start = records.len().saturating_sub(RECENT_EXAMPLES);
    for record in &records[start..] {
        let rating = match record.rating {
            Rating::Up => "up",
            Rating::Down => "down",
        };
        let comment = if record.comment.is_empty() { "-" } else { &record.comment };
        let excerpt: String = record.assistant_text.chars().take(EXCERPT_CHARS).collect();
        writeln!(md, "- {} — {} — {}", record.ts.to_rfc3339(), rating, record.tags.join(", "))?;
        writeln!(md, "  - Commentaire: {}", comment)?;
        writeln!(md, "  - Extrait (assistant): {}…", excerpt)?;
    }

    let path = data_dir.join(REPORT_FILE);
    fs::write(&path, md).context("Failed to write feedback report")?;
    debug!(?path, "generate_report: report written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coachlog::FeedbackRecord;
    use tempfile::tempdir;

    fn record(rating: Rating, tags: &[&str], comment: &str) -> FeedbackRecord {
        FeedbackRecord {
            ts: Utc::now(),
            msg_id: "m1".to_string(),
            rating,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            comment: comment.to_string(),
            user_text: "question".to_string(),
            assistant_text: "une réponse assez longue pour être tronquée dans le rapport".to_string(),
        }
    }

    #[test]
    fn test_no_feedback_yields_none() {
        let temp = tempdir().unwrap();
        assert_eq!(generate_report(temp.path()).unwrap(), None);
    }

    #[test]
    fn test_report_totals_and_tags() {
        let temp = tempdir().unwrap();
        let log = coachlog::feedback_log(temp.path());
        log.append(&record(Rating::Up, &["doses", "météo"], "top")).unwrap();
        log.append(&record(Rating::Up, &["doses"], "")).unwrap();
        log.append(&record(Rating::Down, &["ton"], "trop sec")).unwrap();

        let path = generate_report(temp.path()).unwrap().expect("report written");
        let content = fs::read_to_string(path).unwrap();

        assert!(content.starts_with("# Rapport Feedback"));
        assert!(content.contains("Total: 3 | 👍 2 | 👎 1"));
        // Most frequent tag first
        assert!(content.contains("- doses: 2"));
        assert!(content.contains("- Commentaire: trop sec"));
        // Empty comment renders as a dash
        assert!(content.contains("- Commentaire: -"));
    }

    #[test]
    fn test_report_limits_examples() {
        let temp = tempdir().unwrap();
        let log = coachlog::feedback_log(temp.path());
        for _ in 0..8 {
            log.append(&record(Rating::Up, &[], "")).unwrap();
        }

        let path = generate_report(temp.path()).unwrap().unwrap();
        let content = fs::read_to_string(path).unwrap();

        let examples = content.matches("- Extrait (assistant):").count();
        assert_eq!(examples, 5);
    }
}
