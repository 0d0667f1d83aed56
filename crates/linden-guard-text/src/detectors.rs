//! PII pattern set and language heuristic internals.

use regex::RegexSet;

/// Content-free summary of a text's shape. Loggable where the text itself
/// is not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LexicalScan {
    pub char_count: usize,
    pub ascii_ratio: f64,
    pub pii_detected: bool,
    pub non_target_language: bool,
}

/// Union of PII-shaped patterns: email, NANP phone, SSN, IPv4, street
/// address. Any single match flags the text.
pub(crate) fn pii_pattern_set() -> RegexSet {
    RegexSet::new([
        // Email
        r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
        // NANP phone, with or without country code and separators
        r"(?:\+?1[-. ]?)?\(?\d{3}\)?[-. ]\d{3}[-. ]\d{4}\b",
        // SSN
        r"\b\d{3}-\d{2}-\d{4}\b",
        // IPv4
        r"\b\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}\b",
        // Street address: number + name + street suffix
        r"(?i)\b\d{1,5}\s+[a-z]+(?:\s+[a-z]+)?\s+(?:street|st|avenue|ave|road|rd|boulevard|blvd|lane|ln|drive|dr|court|ct|place|pl|way)\b",
    ])
    .expect("PII patterns are fixed and must compile")
}

/// Ratio of ASCII code points to total code points. `None` for empty text.
pub(crate) fn ascii_ratio(text: &str) -> Option<f64> {
    let total = text.chars().count();
    if total == 0 {
        return None;
    }
    let ascii = text.chars().filter(char::is_ascii).count();
    Some(ascii as f64 / total as f64)
}
