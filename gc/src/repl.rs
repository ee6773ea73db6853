//! Interactive chat REPL
//!
//! The terminal rendition of the chat widget: a rustyline loop that feeds
//! turns to the session manager and prints whatever messages come back,
//! model-generated and synthetic alike. Slash commands cover history,
//! profile inspection and feedback.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use coachlog::{FeedbackRecord, JsonlLog, Rating};

use crate::domain::{Message, Role};
use crate::feedback::record_feedback;
use crate::session::SessionManager;

/// Interactive chat session
pub struct ChatRepl {
    manager: SessionManager,
    feedback: JsonlLog<FeedbackRecord>,
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

impl ChatRepl {
    pub fn new(manager: SessionManager, feedback: JsonlLog<FeedbackRecord>) -> Self {
        Self { manager, feedback }
    }

    /// Run the chat main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.process_user_input(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("À bientôt !");
        Ok(())
    }

    /// Print welcome banner and where the conversation stands
    fn print_welcome(&self) {
        println!();
        println!("{}", "Docteur Gazon".bright_green().bold());
        let count = self.manager.messages().len();
        if count > 1 {
            println!("{}", format!("(conversation reprise — {} messages)", count).dimmed());
        }
        if let Some(last) = self.manager.session().last_assistant() {
            print_assistant(&last.content);
        }
        println!(
            "Tape {} pour l'aide, {} pour quitter",
            "/help".yellow(),
            "/quit".yellow()
        );
        println!();
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/clear" | "/c" => {
                self.manager.reset_messages();
                println!("{}", "Conversation réinitialisée.".dimmed());
                SlashResult::Continue
            }
            "/history" => {
                self.print_history();
                SlashResult::Continue
            }
            "/profile" => {
                self.print_profile();
                SlashResult::Continue
            }
            "/feedback" => {
                self.handle_feedback(&parts[1..]);
                SlashResult::Continue
            }
            _ => {
                println!("{} Commande inconnue : {}", "?".yellow(), cmd);
                println!("Tape {} pour les commandes disponibles", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Commandes disponibles :".bright_green());
        println!("  {:24} Affiche cette aide", "/help".yellow());
        println!("  {:24} Quitte le chat", "/quit".yellow());
        println!("  {:24} Réinitialise la conversation", "/clear".yellow());
        println!("  {:24} Affiche l'historique", "/history".yellow());
        println!("  {:24} Affiche le profil déduit", "/profile".yellow());
        println!(
            "  {:24} Note la dernière réponse",
            "/feedback up|down [texte]".yellow()
        );
        println!();
    }

    fn print_history(&self) {
        let messages = self.manager.messages();
        if messages.len() <= 1 {
            println!("{}", "Pas encore d'historique.".dimmed());
            return;
        }

        println!();
        println!("{}", "Historique :".bright_green());
        for (i, msg) in messages.iter().enumerate() {
            let role = match msg.role {
                Role::User => "Toi".bright_cyan(),
                Role::Assistant => "Docteur Gazon".bright_green(),
            };
            let preview: String = msg.content.chars().take(60).collect();
            let suffix = if msg.content.chars().count() > 60 { "…" } else { "" };
            println!("  {}. {}: {}{}", i + 1, role, preview, suffix);
        }
        println!();
    }

    fn print_profile(&self) {
        let profile = self.manager.profile();
        println!();
        println!("{}", "Profil déduit :".bright_green());
        let status = match profile.is_client {
            Some(true) => "client",
            Some(false) => "pas encore client",
            None => "inconnu",
        };
        println!("  statut : {}", status);
        let city = if profile.city.is_empty() { "inconnue" } else { &profile.city };
        println!("  ville  : {}", city);
        println!("  question posée : {}", if profile.asked_profile { "oui" } else { "non" });
        println!();
    }

    /// Record feedback on the last assistant reply
    fn handle_feedback(&mut self, args: &[&str]) {
        let Some(rating) = args.first().and_then(|r| r.parse::<Rating>().ok()) else {
            println!("Usage : /feedback up|down [commentaire]");
            return;
        };
        let comment = if args.len() > 1 { Some(args[1..].join(" ")) } else { None };

        let Some((user, assistant)) = self.manager.last_exchange() else {
            println!("{}", "Pas encore de réponse à noter.".dimmed());
            return;
        };
        let reply: Message = assistant.clone();
        let user_text = user.map(|m| m.content.clone());

        match record_feedback(
            &self.feedback,
            &reply,
            user_text.as_deref(),
            rating,
            Vec::new(),
            comment,
        ) {
            Ok(_) => println!("{}", "Merci pour ton retour !".dimmed()),
            Err(e) => println!("{} {}", "Impossible d'enregistrer le retour :".red(), e),
        }
    }

    /// Submit a turn and print everything that came back
    async fn process_user_input(&mut self, input: &str) {
        println!("{}", "Docteur Gazon écrit…".dimmed());

        let appended = self.manager.submit_user_text(input).await;
        for msg in &appended {
            print_assistant(&msg.content);
        }
        println!();
    }
}

fn print_assistant(content: &str) {
    println!();
    println!("{}", "Docteur Gazon —".bright_green());
    println!("{}", content);
}
