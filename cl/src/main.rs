//! CoachLog inspection CLI
//!
//! Small maintenance tool for the chat's JSONL files: tail recent records,
//! show per-file stats. The chat application itself writes through the
//! library; this binary only reads.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;

use coachlog::{FEEDBACK_FILE, FeedbackRecord, JsonlLog, Rating, log_path_by_name};

#[derive(Parser, Debug)]
#[command(name = "cl")]
#[command(author, version, about = "Inspect coaching chat JSONL logs", long_about = None)]
struct Cli {
    /// Data directory holding the log files
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the last records of a log (transcript, feedback, corrections)
    Tail {
        /// Log name
        #[arg(required = true)]
        log: String,

        /// Number of records to show
        #[arg(short = 'n', long, default_value = "10")]
        lines: usize,
    },

    /// Show record counts, and rating/tag breakdown for the feedback log
    Stats {
        /// Log name
        #[arg(required = true)]
        log: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Tail { log, lines } => cmd_tail(&cli.data_dir, &log, lines),
        Command::Stats { log } => cmd_stats(&cli.data_dir, &log),
    }
}

fn resolve(data_dir: &PathBuf, name: &str) -> Result<PathBuf> {
    log_path_by_name(data_dir, name)
        .ok_or_else(|| eyre::eyre!("Unknown log '{}'. Use: transcript, feedback, or corrections", name))
}

fn cmd_tail(data_dir: &PathBuf, name: &str, lines: usize) -> Result<()> {
    let path = resolve(data_dir, name)?;
    let log: JsonlLog<serde_json::Value> = JsonlLog::new(&path);

    let records = log.tail(lines)?;
    if records.is_empty() {
        println!("{} is empty", path.display());
        return Ok(());
    }

    for record in records {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}

fn cmd_stats(data_dir: &PathBuf, name: &str) -> Result<()> {
    let path = resolve(data_dir, name)?;

    // Feedback gets a richer breakdown; other logs just get a count
    if path.file_name().and_then(|f| f.to_str()) == Some(FEEDBACK_FILE) {
        let log: JsonlLog<FeedbackRecord> = JsonlLog::new(&path);
        let records = log.read_all()?;

        let up = records.iter().filter(|r| r.rating == Rating::Up).count();
        let down = records.len() - up;

        println!("{}", path.display().to_string().bold());
        println!("  records: {}", records.len());
        println!("  {} {}   {} {}", "👍".green(), up, "👎".red(), down);

        let mut tags: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for record in &records {
            for tag in &record.tags {
                *tags.entry(tag.as_str()).or_default() += 1;
            }
        }
        let mut tags: Vec<_> = tags.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        if !tags.is_empty() {
            println!("  top tags:");
            for (tag, count) in tags.iter().take(10) {
                println!("    {:<20} {}", tag, count);
            }
        }
    } else {
        let log: JsonlLog<serde_json::Value> = JsonlLog::new(&path);
        println!("{}", path.display().to_string().bold());
        println!("  records: {}", log.count()?);
    }

    Ok(())
}
