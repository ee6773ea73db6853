//! WhatsApp export ingestion
//!
//! Turns a `timestamp,author,role,message` CSV export into Q/A markdown
//! files the team uses as a coaching corpus. The parsing is deliberately
//! naive (plain comma split, message is everything from the fourth column);
//! exports with quoted commas in the first three columns are not supported.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, bail};
use tracing::{debug, info};

/// Outcome of one ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    /// Conversations detected in the export
    pub conversations: usize,

    /// Markdown files actually written (conversations with at least one Q/A pair)
    pub files_written: usize,
}

#[derive(Debug)]
struct ExportRow {
    timestamp: String,
    role: String,
    message: String,
}

/// Ingest a WhatsApp CSV export into Q/A markdown files
///
/// Rows are grouped into conversations by calendar day; within each
/// conversation every user message is paired with the next assistant
/// message. Files land in `out_dir` as `conv_{n}.md`.
pub fn ingest_whatsapp(csv_path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Result<IngestSummary> {
    let csv_path = csv_path.as_ref();
    let out_dir = out_dir.as_ref();
    debug!(?csv_path, ?out_dir, "ingest_whatsapp: called");

    let csv = fs::read_to_string(csv_path).context(format!("Failed to read {}", csv_path.display()))?;
    let mut lines = csv.lines().filter(|l| !l.trim().is_empty());

    let header = lines.next().ok_or_else(|| eyre::eyre!("Empty CSV file"))?;
    let columns: Vec<&str> = header.split(',').collect();
    let idx = |name: &str| columns.iter().position(|c| c.trim() == name);
    let (Some(ts_idx), Some(role_idx)) = (idx("timestamp"), idx("role")) else {
        bail!("CSV header must contain timestamp,author,role,message columns");
    };

    let rows: Vec<ExportRow> = lines
        .map(|line| {
            let cols: Vec<&str> = line.split(',').collect();
            ExportRow {
                timestamp: cols.get(ts_idx).unwrap_or(&"").to_string(),
                role: cols.get(role_idx).map(|r| r.to_lowercase()).unwrap_or_default(),
                message: cols.get(3..).map(|rest| rest.join(",")).unwrap_or_default().replace("\\n", "\n"),
            }
        })
        .collect();

    // Group by calendar day (naive conversation boundary)
    let mut conversations: Vec<Vec<&ExportRow>> = Vec::new();
    let mut current: Vec<&ExportRow> = Vec::new();
    let mut last_day: Option<&str> = None;

    for row in &rows {
        let day = row.timestamp.get(..10).unwrap_or(&row.timestamp);
        if let Some(prev) = last_day
            && prev != day
            && !current.is_empty()
        {
            conversations.push(std::mem::take(&mut current));
        }
        current.push(row);
        last_day = Some(day);
    }
    if !current.is_empty() {
        conversations.push(current);
    }

    fs::create_dir_all(out_dir).context("Failed to create corpus directory")?;

    let mut files_written = 0;
    for (i, conv) in conversations.iter().enumerate() {
        let mut blocks = Vec::new();
        for (k, row) in conv.iter().enumerate() {
            if row.role == "user" {
                let question = row.message.trim();
                let answer = conv[k + 1..]
                    .iter()
                    .find(|r| r.role == "assistant")
                    .map(|r| r.message.as_str())
                    .unwrap_or("");
                if !question.is_empty() && !answer.is_empty() {
                    blocks.push(format!("### Q\n{}\n\n### A\n{}\n", question, answer));
                }
            }
        }

        if !blocks.is_empty() {
            let md = format!("# WhatsApp Conversation {}\n\n{}", i + 1, blocks.join("\n"));
            let path = out_dir.join(format!("conv_{}.md", i + 1));
            fs::write(&path, md).context(format!("Failed to write {}", path.display()))?;
            files_written += 1;
        }
    }

    info!(
        conversations = conversations.len(),
        files_written, "ingest_whatsapp: done"
    );
    Ok(IngestSummary {
        conversations: conversations.len(),
        files_written,
    })
}

/// Default corpus output directory under the data dir
pub fn default_corpus_dir(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join("corpus").join("whatsapp")
}
