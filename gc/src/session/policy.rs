//! Proactive follow-up policies
//!
//! After each successful reply the session may inject synthetic assistant
//! messages: one clarifying question about customer status and city (asked
//! at most once per session), and a lawn-topic nurture prompt. Both scan a
//! window of recent assistant messages so the user is never asked the same
//! thing twice in a row, including when the model itself already asked.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::Session;
use crate::domain::Message;
use crate::prompts;

/// How many recent assistant messages are scanned for duplicates
const SUPPRESSION_WINDOW: usize = 6;

/// Customer-status cue in an assistant message
static RE_CUE_CLIENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)client\s+bleen").unwrap());

/// City/region cue in an assistant message
static RE_CUE_CITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(ville|région)").unwrap());

/// Lawn/turf keywords in a user message
static RE_LAWN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(pelouse|gazon)").unwrap());

/// Nurture marker phrases (diagnostic / season progress / remaining stock)
static RE_NURTURE_MARKERS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)diagnostic personnalisé").unwrap(),
        Regex::new(r"(?i)qu'as-tu fait.*cette saison").unwrap(),
        Regex::new(r"(?i)quels produits.*reste").unwrap(),
    ]
});

fn has_both_profile_cues(text: &str) -> bool {
    RE_CUE_CLIENT.is_match(text) && RE_CUE_CITY.is_match(text)
}

fn is_nurture_marker(text: &str) -> bool {
    RE_NURTURE_MARKERS.iter().any(|re| re.is_match(text))
}

/// Ask for customer status and city, at most once per session
///
/// `last_assistant_text` is the reply just produced; if the model already
/// asked the question itself, the flag is set without appending so the user
/// is not asked twice. Returns the appended message, if any.
pub fn maybe_ask_profile(session: &mut Session, last_assistant_text: &str) -> Option<Message> {
    debug!("maybe_ask_profile: called");

    if session.profile.asked_profile {
        debug!("maybe_ask_profile: already asked, skipping");
        return None;
    }
    if session.profile.is_client.is_some() || !session.profile.city.is_empty() {
        debug!("maybe_ask_profile: profile already has info, skipping");
        return None;
    }

    if has_both_profile_cues(last_assistant_text) {
        debug!("maybe_ask_profile: model just asked, marking asked");
        session.profile.asked_profile = true;
        return None;
    }

    let recently_asked = session
        .recent_assistant(SUPPRESSION_WINDOW)
        .any(|m| has_both_profile_cues(&m.content));
    if recently_asked {
        debug!("maybe_ask_profile: asked within suppression window, marking asked");
        session.profile.asked_profile = true;
        return None;
    }

    debug!("maybe_ask_profile: appending clarifying question");
    let msg = Message::assistant(prompts::ASK_PROFILE_MESSAGE);
    session.messages.push(msg.clone());
    session.profile.asked_profile = true;
    Some(msg)
}

/// Nudge lawn-topic conversations toward the diagnostic or a stock check
///
/// Fires only when the user mentioned the lawn, the status is known, and no
/// nurture message sits in the suppression window. Returns the appended
/// message, if any.
pub fn maybe_nurture_for_lawn(session: &mut Session, user_text: &str) -> Option<Message> {
    debug!("maybe_nurture_for_lawn: called");

    if !RE_LAWN.is_match(user_text) {
        debug!("maybe_nurture_for_lawn: no lawn keyword, skipping");
        return None;
    }

    let recent_nurture = session
        .recent_assistant(SUPPRESSION_WINDOW)
        .any(|m| is_nurture_marker(&m.content));
    if recent_nurture {
        debug!("maybe_nurture_for_lawn: nurture within suppression window, skipping");
        return None;
    }

    let text = match session.profile.is_client {
        Some(false) => prompts::NURTURE_PROSPECT_MESSAGE,
        Some(true) => prompts::NURTURE_CLIENT_MESSAGE,
        None => {
            debug!("maybe_nurture_for_lawn: customer status unknown, skipping");
            return None;
        }
    };

    debug!("maybe_nurture_for_lawn: appending nurture message");
    let msg = Message::assistant(text);
    session.messages.push(msg.clone());
    Some(msg)
}
