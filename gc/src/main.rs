//! GazonCoach - Docteur Gazon coaching chat
//!
//! CLI entry point: interactive chat by default, plus batch ask, feedback,
//! the token-gated admin console, corpus ingestion and log viewing.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use gazoncoach::cli::{AdminCommand, Cli, Command, OutputFormat, generate_after_help, get_log_path};
use gazoncoach::config::Config;
use gazoncoach::session::{FileSessionStore, SessionManager, SessionManagerConfig, SessionStore};
use gazoncoach::{admin, feedback, ingest, llm, repl};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gazoncoach")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = if let Some(s) = level_str {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(log_dir.join("gazoncoach.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Build command with dynamic after_help showing environment readiness
    let cmd = Cli::command().after_help(generate_after_help());

    // Parse CLI arguments using the modified command
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("GazonCoach loaded config: model={}", config.llm.model);

    // Dispatch command
    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => {
            debug!("main: no command specified, launching chat");
            cmd_chat(&config).await
        }
        Some(Command::Ask { text }) => {
            debug!("main: matched Ask command");
            cmd_ask(&config, &text).await
        }
        Some(Command::Feedback { rating, tags, comment }) => {
            debug!(?rating, "main: matched Feedback command");
            cmd_feedback(&config, rating, tags, comment)
        }
        Some(Command::Admin { token, command }) => {
            debug!(?command, "main: matched Admin command");
            cmd_admin(&config, token, command).await
        }
        Some(Command::Ingest { csv, out_dir }) => {
            debug!(?csv, "main: matched Ingest command");
            cmd_ingest(&config, &csv, out_dir)
        }
        Some(Command::Logs { follow, lines }) => {
            debug!(follow, lines, "main: matched Logs command");
            cmd_logs(follow, lines).await
        }
    }
}

/// Build the session manager from configuration
fn build_manager(config: &Config) -> Result<SessionManager> {
    debug!("build_manager: called");
    config.validate()?;

    let llm = llm::create_client(&config.llm).context("Failed to create LLM client")?;
    let store = FileSessionStore::new(config.session.resolved_dir());
    let transcript = coachlog::transcript_log(&config.storage.data_dir);

    Ok(SessionManager::new(
        Box::new(store),
        llm,
        Some(transcript),
        SessionManagerConfig::from_config(config),
    ))
}

/// Launch the interactive chat
async fn cmd_chat(config: &Config) -> Result<()> {
    debug!("cmd_chat: called");
    let manager = build_manager(config)?;
    let feedback_log = coachlog::feedback_log(&config.storage.data_dir);

    repl::ChatRepl::new(manager, feedback_log).run().await
}

/// Submit one question and print the replies (batch mode)
async fn cmd_ask(config: &Config, text: &str) -> Result<()> {
    debug!("cmd_ask: called");
    let mut manager = build_manager(config)?;

    let appended = manager.submit_user_text(text).await;
    if appended.is_empty() {
        warn!("cmd_ask: nothing submitted");
        eprintln!("Rien à envoyer.");
        return Ok(());
    }

    for msg in &appended {
        println!("{}", msg.content);
        println!();
    }
    Ok(())
}

/// Rate the last assistant reply of the stored session
fn cmd_feedback(
    config: &Config,
    rating: coachlog::Rating,
    tags: Vec<String>,
    comment: Option<String>,
) -> Result<()> {
    debug!("cmd_feedback: called");

    // No LLM needed: read the stored session directly
    let store = FileSessionStore::new(config.session.resolved_dir());
    let session = store.load();

    let Some(assistant_idx) = session.messages.iter().rposition(|m| m.is_assistant()) else {
        eprintln!("Pas encore de réponse à noter.");
        return Ok(());
    };
    let reply = session.messages[assistant_idx].clone();
    let user_text = session.messages[..assistant_idx]
        .iter()
        .rev()
        .find(|m| !m.is_assistant())
        .map(|m| m.content.clone());

    let log = coachlog::feedback_log(&config.storage.data_dir);
    feedback::record_feedback(&log, &reply, user_text.as_deref(), rating, tags, comment)?;
    println!("Merci pour ton retour !");
    Ok(())
}

/// Token-gated admin console
async fn cmd_admin(config: &Config, token: Option<String>, command: AdminCommand) -> Result<()> {
    debug!("cmd_admin: called");

    let gate = admin::AdminGate::from_config(&config.admin);
    let token = token.or_else(|| std::env::var("GC_ADMIN_TOKEN").ok());
    gate.authorize(token.as_deref())?;
    debug!("cmd_admin: authorized");

    let data_dir = &config.storage.data_dir;

    match command {
        AdminCommand::Review { lines, format } => {
            let limit = lines.unwrap_or(config.admin.review_limit);
            let entries = admin::review(data_dir, limit)?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                OutputFormat::Text => {
                    if entries.is_empty() {
                        println!("Aucune conversation enregistrée.");
                        return Ok(());
                    }
                    for (i, entry) in entries.iter().enumerate() {
                        println!("{}", format!("#{} — {}", i, entry.ts.to_rfc3339()).dimmed());
                        println!("{} {}", "Question :".bold(), entry.user_text);
                        println!("{} {}", "Réponse  :".bold(), entry.assistant_text);
                        println!();
                    }
                }
            }
            Ok(())
        }
        AdminCommand::Improve { critique, entry } => {
            config.validate()?;
            let llm: Arc<dyn llm::LlmClient> =
                llm::create_client(&config.llm).context("Failed to create LLM client")?;

            let record = admin::nth_entry(data_dir, entry)?;
            let corrections = coachlog::corrections_log(data_dir);

            let improved = admin::improve_reply(&llm, &config.llm, &record, &critique, &corrections).await?;
            println!("{}", "Réponse améliorée :".bold());
            println!();
            println!("{}", improved);
            Ok(())
        }
        AdminCommand::Edit { entry, text, note } => {
            let record = admin::nth_entry(data_dir, entry)?;
            let corrections = coachlog::corrections_log(data_dir);

            admin::edit_reply(&record, &text, &note, &corrections)?;
            println!("Édition journalisée pour l'entrée #{}.", entry);
            Ok(())
        }
        AdminCommand::Report => match admin::generate_report(data_dir)? {
            Some(path) => {
                println!("OK: {}", path.display());
                Ok(())
            }
            None => {
                println!("Aucun feedback pour l’instant.");
                Ok(())
            }
        },
    }
}

/// Ingest a WhatsApp CSV export into the Q/A corpus
fn cmd_ingest(config: &Config, csv: &PathBuf, out_dir: Option<PathBuf>) -> Result<()> {
    debug!(?csv, "cmd_ingest: called");
    let out_dir = out_dir.unwrap_or_else(|| ingest::default_corpus_dir(&config.storage.data_dir));

    let summary = ingest::ingest_whatsapp(csv, &out_dir)?;
    println!(
        "OK: {} conversations traitées ({} fichiers) -> {}",
        summary.conversations,
        summary.files_written,
        out_dir.display()
    );
    Ok(())
}

/// Show logs
async fn cmd_logs(follow: bool, lines: usize) -> Result<()> {
    debug!(follow, lines, "cmd_logs: called");
    let log_path = get_log_path();

    if !log_path.exists() {
        debug!(?log_path, "cmd_logs: log file does not exist");
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    if follow {
        debug!(?log_path, "cmd_logs: following log file");
        println!("Following log file: {} (Ctrl+C to stop)", log_path.display());
        println!();

        // Use tail -f for following
        let mut child = std::process::Command::new("tail")
            .args(["-f", "-n", &lines.to_string()])
            .arg(&log_path)
            .spawn()
            .context("Failed to run tail -f")?;

        child.wait()?;
    } else {
        debug!(?log_path, lines, "cmd_logs: reading last N lines");
        let file = fs::File::open(&log_path).context("Failed to open log file")?;
        let reader = BufReader::new(file);
        let all_lines: Vec<String> = reader.lines().map_while(Result::ok).collect();

        let start = if all_lines.len() > lines { all_lines.len() - lines } else { 0 };

        for line in &all_lines[start..] {
            println!("{}", line);
        }
    }

    Ok(())
}
