//! Lexical pattern groups for the PG filter.

use regex::Regex;

/// A named denylist group compiled to one case-insensitive, word-bounded
/// alternation.
pub(crate) struct PatternGroup {
    pub name: &'static str,
    pub regex: Regex,
}

const GROUPS: [(&str, &[&str]); 5] = [
    (
        "violence",
        &[
            "kill", "murder", "blood", "gun", "knife", "stab", "shoot", "weapon", "punch",
            "attack",
        ],
    ),
    (
        "horror",
        &[
            "ghost", "zombie", "demon", "haunted", "nightmare", "terrifying", "scream",
            "corpse",
        ],
    ),
    (
        "profanity",
        &["damn", "hell", "crap", "stupid", "idiot", "dumb"],
    ),
    (
        "adult_themes",
        &["dating", "kissing", "romance", "drunk", "cigarette", "gambling"],
    ),
    (
        "controversial",
        &["politics", "religion", "election", "protest", "scandal"],
    ),
];

/// Positive-resolution markers looked for near the end of a story.
pub(crate) const POSITIVE_ENDINGS: [&str; 11] = [
    "happily",
    "happy",
    "smiled",
    "friends",
    "together",
    "learned",
    "safe",
    "home",
    "wonderful",
    "hugged",
    "the end",
];

pub(crate) fn compile_groups() -> Vec<PatternGroup> {
    GROUPS
        .iter()
        .map(|(name, words)| {
            let alternation = words.join("|");
            let regex = Regex::new(&format!(r"(?i)\b({alternation})\b"))
                .expect("filter patterns are fixed and must compile");
            PatternGroup { name, regex }
        })
        .collect()
}

/// Themes the system itself curates as known-good.
pub(crate) const POSITIVE_THEMES: [&str; 10] = [
    "adventure",
    "friendship",
    "animals",
    "space",
    "ocean",
    "magic garden",
    "kindness",
    "seasons",
    "dinosaurs",
    "robots",
];

/// Theme fragments that are never acceptable, whatever the phrasing.
pub(crate) fn prohibited_theme_pattern() -> Regex {
    Regex::new(r"(?i)(scary|horror|violen|weapon|death|ghost|zombie|war|gun|revenge)")
        .expect("theme pattern is fixed and must compile")
}
