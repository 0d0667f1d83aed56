//! Classification prompt construction.

use linden_guard_types::{AgeBand, SafetyCategory};

/// Build the deterministic classification prompt: fixed preamble, the
/// closed category list, the band's allowlisted topics, and the
/// de-obfuscated text. The raw text is never sent: leet and separator
/// obfuscation must not change what the classifier sees.
pub fn build_classification_prompt(band: AgeBand, deobfuscated_text: &str) -> String {
    let categories = SafetyCategory::ALL
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ");
    let topics = band.allowlisted_topics().join(", ");

    format!(
        "System: You are a strict safety classifier for a children's companion \
         device. Classify the TEXT for a user in the '{band}' age band.\n\
         Allowed topics for this age band: {topics}.\n\
         Safety categories (use only these names): {categories}.\n\
         Respond with exactly one JSON object of the form \
         {{\"allowed\": true|false, \"categories\": [..], \"rationale\": \"..\"}} \
         and nothing else.\n\
         TEXT: {deobfuscated_text}"
    )
}
