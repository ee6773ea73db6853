//! Fixed prompt and message texts
//!
//! Everything the assistant says that does not come from the model lives
//! here: the system instruction, the seed greeting, the synthetic follow-up
//! messages and the admin improvement booster. The wording is part of the
//! product; changing it changes behavior (the follow-up policies match on
//! these texts to suppress duplicates).

use std::fs;
use std::path::Path;

use tracing::debug;

/// System instruction sent with every completion request
pub const SYSTEM_PROMPT: &str = "\
Tu es **Docteur Gazon**, conseiller pelouse/jardin (marque Bleen) pour particuliers en France.
- Ton: bienveillant, direct, en \"tu\".
- Priorité: sécurité enfants/animaux + conformité FR.
- Donne des étapes concrètes, doses (m²/m³), fenêtres météo, contre-indications.
- Respecte STRICTEMENT les règles de qualité si fournies.
- Ne mentionne jamais OpenAI/ChatGPT/prompts/IA.";

/// Seed assistant greeting for a fresh session
pub const GREETING: &str = "Hello 🧑‍🌾, Enchanté ! Je me présente, je suis ton coach jardin et je vais t’accompagner tout au long de la saison. Comment puis-je t’aider ?";

/// Clarifying question issued at most once per session
pub const ASK_PROFILE_MESSAGE: &str = "Petite question pour affiner 👇\n\n1) Es-tu **déjà client Bleen** ?\n2) Tu es **dans quelle ville** ?\n\nÇa m’aide à ajuster les doses, le timing et les conseils météo.";

/// Nurture message for prospects (not yet customers)
pub const NURTURE_PROSPECT_MESSAGE: &str = "Tu peux faire ton **diagnostic personnalisé** en 2 minutes ici 👉 [mybleen.com/pages/mon-gazon](https://mybleen.com/pages/mon-gazon). Ça me donnera tes conditions exactes et je pourrai te guider avec des doses précises.";

/// Nurture message for existing customers
pub const NURTURE_CLIENT_MESSAGE: &str = "Top 👌 Comme tu es déjà client, dis-moi **ce que tu as fait depuis le début de la saison** (scarification, engrais, semis, arrosage…) et **quels produits il te reste en stock**. Je t’organise les prochaines étapes.";

/// Shown when the model returns an empty reply
pub const REPLY_FALLBACK: &str = "Désolé, je n’ai pas pu répondre.";

/// Header prepended to the quality-rules document in the request
pub const RULES_HEADER: &str = "### REGLES_QUALITE";

/// System prompt for the admin "improve this reply" relay
pub fn improvement_booster(critique: &str) -> String {
    format!(
        "Améliore la dernière réponse du conseiller en appliquant STRICTEMENT cette critique:\n{}\n\n\
         Exige: doses (g/m², m³) si pertinentes, sécurité enfants/animaux, étapes numérotées, fenêtres météo.\n\n\
         Si info manquante, poser 1–3 questions maximum.",
        critique
    )
}

/// Load the optional quality-rules document
///
/// A missing or empty file simply means no rules; that is not an error.
pub fn load_rules(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    debug!(?path, "load_rules: called");
    match fs::read_to_string(path) {
        Ok(content) if !content.trim().is_empty() => {
            debug!(len = content.len(), "load_rules: rules loaded");
            Some(content)
        }
        Ok(_) => {
            debug!("load_rules: rules file empty, ignoring");
            None
        }
        Err(_) => {
            debug!("load_rules: no rules file");
            None
        }
    }
}
