//! Core domain types for the coaching chat
//!
//! Messages and the inferred user profile. Everything here is plain data
//! plus pure functions; persistence and policy live elsewhere.

mod message;
mod profile;

pub use message::{Message, Role};
pub use profile::{Profile, ProfileDelta, infer_profile_delta};
