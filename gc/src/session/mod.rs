//! Conversation session: message history, profile, policies, persistence
//!
//! The session is the one stateful piece of the system. It owns the ordered
//! message sequence and the inferred profile, decides which synthetic
//! follow-up messages to inject after a reply, and round-trips through a
//! pluggable [`SessionStore`].

mod manager;
mod policy;
mod store;

pub use manager::{SessionManager, SessionManagerConfig};
pub use policy::{maybe_ask_profile, maybe_nurture_for_lawn};
pub use store::{FileSessionStore, SessionStore};

#[cfg(test)]
pub use store::MemorySessionStore;

use crate::domain::{Message, Profile};
use crate::prompts;

/// Full client-side state for one conversation
#[derive(Debug, Clone)]
pub struct Session {
    /// Ordered, append-only message sequence
    pub messages: Vec<Message>,

    /// Profile inferred from what the user typed
    pub profile: Profile,
}

impl Session {
    /// Fresh session: one seed greeting, default profile
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(prompts::GREETING)],
            profile: Profile::default(),
        }
    }

    /// The most recent assistant message, if any
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// The most recent user message, if any
    pub fn last_user(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| !m.is_assistant())
    }

    /// The last `n` assistant messages, newest first
    pub fn recent_assistant(&self, n: usize) -> impl Iterator<Item = &Message> {
        self.messages.iter().rev().filter(|m| m.is_assistant()).take(n)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_new_session_has_seed_greeting() {
        let session = Session::new();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, Role::Assistant);
        assert_eq!(session.messages[0].content, prompts::GREETING);
        assert_eq!(session.profile, Profile::default());
    }

    #[test]
    fn test_last_assistant_and_user() {
        let mut session = Session::new();
        session.messages.push(Message::user("q1"));
        session.messages.push(Message::assistant("a1"));
        session.messages.push(Message::user("q2"));

        assert_eq!(session.last_assistant().unwrap().content, "a1");
        assert_eq!(session.last_user().unwrap().content, "q2");
    }

    #[test]
    fn test_recent_assistant_window() {
        let mut session = Session::new();
        for i in 0..10 {
            session.messages.push(Message::user(format!("q{}", i)));
            session.messages.push(Message::assistant(format!("a{}", i)));
        }

        let recent: Vec<_> = session.recent_assistant(3).map(|m| m.content.clone()).collect();
        assert_eq!(recent, vec!["a9", "a8", "a7"]);
    }
}
