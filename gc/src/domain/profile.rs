//! Inferred user profile and text inference heuristics
//!
//! The profile is guessed from free text with literal regex matches. The
//! heuristic is deliberately naive: it can mis-read ("pas cliente" looks
//! affirmative because the word boundary after "client" fails) and a wrong
//! guess is permanent for the session, since set values are never
//! overwritten. That trade-off is accepted; the patterns must not be
//! "improved" without changing the product behavior.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Negative customer-status phrasing, checked before the affirmative
/// patterns so "pas client" reads as a refusal rather than a match on the
/// embedded word "client".
static RE_NOT_CLIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(pas client|non je ne suis pas|pas encore)\b").unwrap());

/// Affirmative customer-status phrasing
static RE_CLIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(client(e)?|déjà client(e)?|oui je suis client)\b").unwrap());

/// Capitalized token following "à" or "sur"
static RE_CITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:à|sur)\s+([A-ZÀÂÄÇÉÈÊËÎÏÔÖÙÛÜŸ][\wÀ-ÿ'-]+)").unwrap());

/// What we believe about the user
///
/// Serialized with the storage field names used since the first release
/// (`isClient` / `city` / `askedProfile`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    /// Known customer status; `None` until volunteered or asked
    pub is_client: Option<bool>,

    /// City, empty until known; once set it is never overwritten
    pub city: String,

    /// The clarifying question was issued (or made redundant); monotonic
    pub asked_profile: bool,
}

impl Profile {
    /// Apply an inference delta, enforcing the profile invariants
    ///
    /// Returns whether any field changed. As soon as one piece of
    /// information arrives unprompted, the clarifying question is retired.
    pub fn apply_delta(&mut self, delta: &ProfileDelta) -> bool {
        debug!(?delta, "Profile::apply_delta: called");
        let mut changed = false;

        if let Some(is_client) = delta.is_client
            && self.is_client != Some(is_client)
        {
            self.is_client = Some(is_client);
            changed = true;
        }

        if let Some(city) = &delta.city
            && self.city.is_empty()
        {
            self.city = city.clone();
            changed = true;
        }

        if changed && !self.asked_profile {
            self.asked_profile = true;
        }

        changed
    }
}

/// Field updates produced by one inference pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDelta {
    pub is_client: Option<bool>,
    pub city: Option<String>,
}

impl ProfileDelta {
    pub fn is_empty(&self) -> bool {
        self.is_client.is_none() && self.city.is_none()
    }
}

/// Infer profile updates from one user message
///
/// Pure function: the current profile only gates which fields are still
/// open. Status phrasing is matched on the lowercased text, the city
/// capture on the original text (it needs the capital letter).
pub fn infer_profile_delta(text: &str, profile: &Profile) -> ProfileDelta {
    debug!(text_len = text.len(), "infer_profile_delta: called");
    let lower = text.to_lowercase();
    let mut delta = ProfileDelta::default();

    if RE_NOT_CLIENT.is_match(&lower) {
        if profile.is_client != Some(false) {
            debug!("infer_profile_delta: negative status phrasing matched");
            delta.is_client = Some(false);
        }
    } else if RE_CLIENT.is_match(&lower) && profile.is_client != Some(true) {
        debug!("infer_profile_delta: affirmative status phrasing matched");
        delta.is_client = Some(true);
    }

    if profile.city.is_empty()
        && let Some(caps) = RE_CITY.captures(text)
    {
        debug!(city = &caps[1], "infer_profile_delta: city matched");
        delta.city = Some(caps[1].to_string());
    }

    delta
}
