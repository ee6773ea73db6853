//! Session persistence port and file-backed implementation
//!
//! Two JSON slots, one for the message sequence and one for the profile,
//! written on every change and read once at startup. Loading never fails:
//! a missing or malformed slot falls back to the fresh-session defaults so
//! a corrupt file can never block the chat.

use std::fs;
use std::path::PathBuf;

use eyre::{Context, Result};
use tracing::{debug, warn};

use super::Session;
use crate::domain::{Message, Profile};

/// Slot file for the message sequence
const MESSAGES_FILE: &str = "messages.json";

/// Slot file for the profile
const PROFILE_FILE: &str = "profile.json";

/// Persistence port for the session
pub trait SessionStore: Send {
    /// Load the stored session, falling back to defaults on any problem
    fn load(&self) -> Session;

    /// Persist the session
    fn save(&self, session: &Session) -> Result<()>;
}

/// File-backed store with one JSON file per slot
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(?dir, "FileSessionStore::new: called");
        Self { dir }
    }

    fn messages_path(&self) -> PathBuf {
        self.dir.join(MESSAGES_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }

    fn load_messages(&self) -> Option<Vec<Message>> {
        let path = self.messages_path();
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<Vec<Message>>(&raw) {
            Ok(messages) if !messages.is_empty() => Some(messages),
            Ok(_) => {
                debug!(?path, "FileSessionStore: stored message list empty, using defaults");
                None
            }
            Err(e) => {
                warn!(?path, error = %e, "FileSessionStore: malformed messages slot, using defaults");
                None
            }
        }
    }

    fn load_profile(&self) -> Option<Profile> {
        let path = self.profile_path();
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(?path, error = %e, "FileSessionStore: malformed profile slot, using defaults");
                None
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Session {
        debug!(dir = ?self.dir, "FileSessionStore::load: called");
        let default = Session::new();

        Session {
            messages: self.load_messages().unwrap_or(default.messages),
            profile: self.load_profile().unwrap_or(default.profile),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        debug!(dir = ?self.dir, message_count = session.messages.len(), "FileSessionStore::save: called");
        fs::create_dir_all(&self.dir).context("Failed to create session directory")?;

        let messages = serde_json::to_string(&session.messages)?;
        fs::write(self.messages_path(), messages).context("Failed to write messages slot")?;

        let profile = serde_json::to_string(&session.profile)?;
        fs::write(self.profile_path(), profile).context("Failed to write profile slot")?;

        Ok(())
    }
}

/// In-memory store for tests
#[cfg(test)]
pub struct MemorySessionStore {
    state: std::sync::Mutex<Option<Session>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            state: std::sync::Mutex::new(None),
        }
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn load(&self) -> Session {
        self.state.lock().unwrap().clone().unwrap_or_default()
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.state.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}
