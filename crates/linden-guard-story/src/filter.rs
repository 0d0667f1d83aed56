//! The content filter.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patterns::{
    compile_groups, prohibited_theme_pattern, PatternGroup, POSITIVE_ENDINGS, POSITIVE_THEMES,
};

/// Word-count bounds for a generated story.
pub const STORY_MIN_WORDS: usize = 100;
pub const STORY_MAX_WORDS: usize = 2000;

/// Confidence lost per recorded violation.
const CONFIDENCE_STEP: f64 = 0.2;

/// How much story tail the ending heuristic examines when the final
/// paragraph is longer than this.
const ENDING_WINDOW_CHARS: usize = 500;

/// Outcome of a filter pass.
///
/// `violations` entries are `group: 'match'` strings for logs and the
/// parent dashboard; they are never shown to the child.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub is_safe: bool,
    pub violations: Vec<String>,
    pub confidence: f64,
}

/// Lexical and structural PG filter.
///
/// `strict_mode` (default) treats any violation as unsafe; non-strict
/// tolerates up to two, for content that will get human review anyway.
pub struct ContentFilter {
    groups: Vec<PatternGroup>,
    strict_mode: bool,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self {
            groups: compile_groups(),
            strict_mode: true,
        }
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Scan text against the denylist groups.
    pub fn filter_content(&self, text: &str) -> FilterResult {
        let mut violations = Vec::new();
        for group in &self.groups {
            for found in group.regex.find_iter(text) {
                violations.push(format!("{}: '{}'", group.name, found.as_str().to_lowercase()));
            }
        }
        self.finish(violations)
    }

    /// Scan a generated story: lexical groups plus structural checks
    /// (length bounds and a positive-resolution ending).
    pub fn filter_story(&self, text: &str) -> FilterResult {
        let mut violations = self.filter_content(text).violations;

        let word_count = text.split_whitespace().count();
        if word_count < STORY_MIN_WORDS {
            violations.push(format!(
                "structure: story too short ({word_count} words, minimum {STORY_MIN_WORDS})"
            ));
        } else if word_count > STORY_MAX_WORDS {
            violations.push(format!(
                "structure: story too long ({word_count} words, maximum {STORY_MAX_WORDS})"
            ));
        }

        if !has_positive_ending(text) {
            violations.push("structure: ending lacks a positive resolution".to_string());
        }

        self.finish(violations)
    }

    /// Deterministic advice per violation group. Advisory only: nothing in
    /// the moderation decision consumes it.
    pub fn suggest_improvements(&self, result: &FilterResult) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        for violation in &result.violations {
            let advice = if violation.starts_with("violence") {
                "Replace conflict with cooperative problem-solving."
            } else if violation.starts_with("horror") {
                "Swap scary elements for gentle surprises."
            } else if violation.starts_with("profanity") {
                "Use kind, encouraging words throughout."
            } else if violation.starts_with("adult_themes") {
                "Keep relationships friendship-focused."
            } else if violation.starts_with("controversial") {
                "Steer toward everyday topics children share."
            } else if violation.contains("too short") {
                "Develop the middle of the story with more detail."
            } else if violation.contains("too long") {
                "Trim the story to keep a young listener engaged."
            } else if violation.contains("positive resolution") {
                "End on a warm, reassuring note."
            } else {
                continue;
            };
            if !suggestions.iter().any(|s| s == advice) {
                suggestions.push(advice.to_string());
            }
        }
        suggestions
    }

    /// Validate a short, system-curated theme string. Open by default:
    /// known-good themes pass, prohibited fragments fail, and anything
    /// else is accepted. Themes are chosen by the system, not by the
    /// model or the child, so the posture is looser than `filter_content`.
    pub fn validate_theme(&self, theme: &str) -> bool {
        let lowered = theme.trim().to_lowercase();
        if POSITIVE_THEMES.iter().any(|t| *t == lowered) {
            return true;
        }
        !prohibited_theme_pattern().is_match(&lowered)
    }

    fn finish(&self, violations: Vec<String>) -> FilterResult {
        let confidence = (1.0 - CONFIDENCE_STEP * violations.len() as f64).max(0.0);
        let is_safe = if self.strict_mode {
            violations.is_empty()
        } else {
            violations.len() <= 2
        };
        if !is_safe {
            debug!(violations = violations.len(), "content filter flagged text");
        }
        FilterResult {
            is_safe,
            violations,
            confidence,
        }
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// The final paragraph (or last ~500 characters, whichever is shorter)
/// must contain one of the fixed positive-resolution markers.
fn has_positive_ending(text: &str) -> bool {
    let trimmed = text.trim_end();
    let paragraph = trimmed
        .rsplit("\n\n")
        .next()
        .unwrap_or(trimmed);
    let window = if paragraph.len() > ENDING_WINDOW_CHARS {
        tail_chars(paragraph, ENDING_WINDOW_CHARS)
    } else {
        paragraph
    };
    let lowered = window.to_lowercase();
    POSITIVE_ENDINGS.iter().any(|marker| lowered.contains(marker))
}

/// Last `n` characters of `s`, on a char boundary.
fn tail_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize, ending: &str) -> String {
        let body = std::iter::repeat("the curious fox explored the meadow and")
            .flat_map(|s| s.split_whitespace())
            .take(n.saturating_sub(ending.split_whitespace().count()))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{body} {ending}")
    }

    #[test]
    fn clean_text_passes_with_full_confidence() {
        let filter = ContentFilter::new();
        let result = filter.filter_content("The bunny shared carrots with a new friend.");
        assert!(result.is_safe);
        assert!(result.violations.is_empty());
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn strict_mode_blocks_on_any_violation() {
        let filter = ContentFilter::new();
        let result = filter.filter_content("The knight drew his gun.");
        assert!(!result.is_safe);
        assert_eq!(result.violations.len(), 1);
        assert!((result.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn non_strict_tolerates_two_violations() {
        let filter = ContentFilter::new().with_strict_mode(false);
        let two = filter.filter_content("A ghost with a knife.");
        assert_eq!(two.violations.len(), 2);
        assert!(two.is_safe);

        let three = filter.filter_content("A ghost with a knife and a gun.");
        assert_eq!(three.violations.len(), 3);
        assert!(!three.is_safe);
    }

    #[test]
    fn word_boundaries_respected() {
        let filter = ContentFilter::new();
        // "hello" contains "hell" but is not a profanity match.
        assert!(filter.filter_content("hello there, shellfish!").is_safe);
    }

    #[test]
    fn confidence_floors_at_zero() {
        let filter = ContentFilter::new();
        let result =
            filter.filter_content("gun knife blood ghost zombie damn stupid politics drunk");
        assert!(result.violations.len() >= 6);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn short_story_flagged() {
        let filter = ContentFilter::new();
        let story = words(50, "and they lived happily together");
        let result = filter.filter_story(&story);
        assert!(result.violations.iter().any(|v| v.contains("too short")));
    }

    #[test]
    fn long_story_flagged() {
        let filter = ContentFilter::new();
        let story = words(2500, "and they lived happily together");
        let result = filter.filter_story(&story);
        assert!(result.violations.iter().any(|v| v.contains("too long")));
    }

    #[test]
    fn well_formed_story_has_no_structural_violations() {
        let filter = ContentFilter::new();
        let story = words(500, "and they lived happily together");
        let result = filter.filter_story(&story);
        assert!(
            result.violations.is_empty(),
            "unexpected violations: {:?}",
            result.violations
        );
        assert!(result.is_safe);
    }

    #[test]
    fn missing_positive_ending_reported() {
        let filter = ContentFilter::new();
        let story = words(500, "and then it started to rain heavily on everyone");
        let result = filter.filter_story(&story);
        assert!(result
            .violations
            .iter()
            .any(|v| v.contains("positive resolution")));
    }

    #[test]
    fn suggestions_map_violations_deterministically() {
        let filter = ContentFilter::new();
        let result = filter.filter_content("A ghost with a gun.");
        let suggestions = filter.suggest_improvements(&result);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().any(|s| s.contains("cooperative")));
        assert!(suggestions.iter().any(|s| s.contains("gentle surprises")));

        // Advisory only, and deduplicated.
        let noisy = filter.filter_content("gun gun gun");
        assert_eq!(filter.suggest_improvements(&noisy).len(), 1);
    }

    #[test]
    fn theme_validation_is_open_by_default() {
        let filter = ContentFilter::new();
        assert!(filter.validate_theme("friendship"));
        assert!(filter.validate_theme("a day at the bakery"));
        assert!(!filter.validate_theme("haunted ghost house"));
        assert!(!filter.validate_theme("Scary Night"));
    }
}
