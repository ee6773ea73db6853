//! GazonCoach - Docteur Gazon coaching chat
//!
//! A lawn-care coaching chat for the Bleen brand: an interactive terminal
//! chat that relays conversation turns to a hosted language model, infers a
//! lightweight customer profile from free text, injects proactive follow-up
//! prompts, and journals transcripts, feedback and admin corrections to
//! append-only JSONL files.
//!
//! # Core Concepts
//!
//! - **One stateful piece**: the session (messages + profile) lives in the
//!   [`session`] module; everything else is request/response plumbing
//! - **Failures stay in the conversation**: a failed reply becomes a visible
//!   synthetic assistant message, never an error to the caller
//! - **Append-only records**: transcripts and corrections are journaled,
//!   never rewritten
//!
//! # Modules
//!
//! - [`session`] - Conversation session manager, policies, persistence
//! - [`domain`] - Message and profile types, profile inference
//! - [`llm`] - Reply-generation client trait and OpenAI implementation
//! - [`admin`] - Token-gated review/improve/edit console
//! - [`prompts`] - Fixed prompt and message texts
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod admin;
pub mod cli;
pub mod config;
pub mod domain;
pub mod feedback;
pub mod ingest;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{AdminConfig, Config, LlmConfig, SessionConfig, StorageConfig};
pub use domain::{Message, Profile, ProfileDelta, Role, infer_profile_delta};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAiClient, create_client};
pub use session::{
    FileSessionStore, Session, SessionManager, SessionManagerConfig, SessionStore, maybe_ask_profile,
    maybe_nurture_for_lawn,
};
