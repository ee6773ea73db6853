//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use coachlog::Rating;

/// Docteur Gazon coaching chat
#[derive(Parser)]
#[command(
    name = "gc",
    version,
    about = "Docteur Gazon - lawn-care coaching chat (Bleen)",
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (none: interactive chat)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit one question and print the replies (batch mode)
    Ask {
        /// The question text
        text: String,
    },

    /// Rate the last assistant reply of the stored session
    Feedback {
        /// Rating (up or down)
        rating: Rating,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Free-text comment
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Token-gated review and correction console
    Admin {
        /// Admin token (falls back to the GC_ADMIN_TOKEN environment variable)
        #[arg(long, global = true)]
        token: Option<String>,

        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Ingest a WhatsApp CSV export into the Q/A corpus
    Ingest {
        /// CSV file (timestamp,author,role,message)
        csv: PathBuf,

        /// Output directory (default: <data-dir>/corpus/whatsapp)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Show application logs
    Logs {
        /// Follow log output (like tail -f)
        #[arg(short, long)]
        follow: bool,

        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },
}

/// Admin console subcommands
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show recent transcript entries, newest first
    Review {
        /// Number of entries to show (default: config review-limit)
        #[arg(short = 'n', long)]
        lines: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Rework a past reply through the model with a critique
    Improve {
        /// What to fix in the reply
        #[arg(long)]
        critique: String,

        /// Transcript entry index, 0 = most recent
        #[arg(short, long, default_value = "0")]
        entry: usize,
    },

    /// Journal a manual overwrite of a past reply
    Edit {
        /// Transcript entry index, 0 = most recent
        #[arg(short, long, default_value = "0")]
        entry: usize,

        /// Replacement reply text
        #[arg(long)]
        text: String,

        /// Audit note explaining the edit
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Aggregate feedback into a markdown report
    Report,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gazoncoach")
        .join("logs")
        .join("gazoncoach.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Check whether an environment variable is set and non-empty
fn env_present(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}

/// Generate the after_help text with environment readiness
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let log_path = get_log_path();

    let mut help = String::new();

    help.push_str("Environment:\n");
    for (name, purpose) in [
        ("OPENAI_API_KEY", "reply generation"),
        ("ADMIN_TOKEN", "admin console"),
    ] {
        let icon = if env_present(name) { "\u{2705}" } else { "\u{274C}" };
        help.push_str(&format!("  {} {:<16} {}\n", icon, name, purpose));
    }

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", log_path.display()));

    help
}

/// Output format for admin review
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_command() {
        let cli = Cli::parse_from(["gc"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_ask() {
        let cli = Cli::parse_from(["gc", "ask", "Ma pelouse jaunit"]);
        if let Some(Command::Ask { text }) = cli.command {
            assert_eq!(text, "Ma pelouse jaunit");
        } else {
            panic!("Expected Ask command");
        }
    }

    #[test]
    fn test_cli_parse_feedback() {
        let cli = Cli::parse_from(["gc", "feedback", "up", "--tags", "doses,météo", "-m", "précis"]);
        if let Some(Command::Feedback { rating, tags, comment }) = cli.command {
            assert_eq!(rating, Rating::Up);
            assert_eq!(tags, vec!["doses".to_string(), "météo".to_string()]);
            assert_eq!(comment.as_deref(), Some("précis"));
        } else {
            panic!("Expected Feedback command");
        }
    }

    #[test]
    fn test_cli_parse_admin_review() {
        let cli = Cli::parse_from(["gc", "admin", "--token", "t0k3n", "review", "-n", "10"]);
        if let Some(Command::Admin { token, command }) = cli.command {
            assert_eq!(token.as_deref(), Some("t0k3n"));
            assert!(matches!(
                command,
                AdminCommand::Review {
                    lines: Some(10),
                    format: OutputFormat::Text
                }
            ));
        } else {
            panic!("Expected Admin command");
        }
    }

    #[test]
    fn test_cli_parse_admin_improve() {
        let cli = Cli::parse_from(["gc", "admin", "improve", "--critique", "Ajoute les doses", "-e", "2"]);
        if let Some(Command::Admin {
            command: AdminCommand::Improve { critique, entry },
            ..
        }) = cli.command
        {
            assert_eq!(critique, "Ajoute les doses");
            assert_eq!(entry, 2);
        } else {
            panic!("Expected Improve command");
        }
    }

    #[test]
    fn test_cli_parse_logs() {
        let cli = Cli::parse_from(["gc", "logs", "--follow", "-n", "100"]);
        assert!(matches!(
            cli.command,
            Some(Command::Logs { follow: true, lines: 100 })
        ));
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["gc", "-c", "/path/to/config.yml", "logs"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
    }

    #[test]
    fn test_output_format_from_str() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("invalid".parse::<OutputFormat>().is_err());
    }
}
