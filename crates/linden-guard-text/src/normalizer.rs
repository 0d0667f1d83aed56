//! Canonicalization and de-obfuscation.

use regex::RegexSet;
use unicode_normalization::UnicodeNormalization;

use crate::detectors::{self, LexicalScan};

/// Zero-width code points stripped during normalization.
const ZERO_WIDTH: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{2060}'];

/// Separator characters stripped during de-obfuscation. Obfuscated text
/// like `s.e.x` or `d_r_u_g_s` collapses once these are removed.
const OBFUSCATION_SEPARATORS: [char; 3] = ['.', '_', '-'];

/// Pure text canonicalizer and detector set.
///
/// The detector regexes are compiled once at construction; all operations
/// are side-effect-free afterwards.
#[derive(Debug)]
pub struct TextNormalizer {
    pii_patterns: RegexSet,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            pii_patterns: detectors::pii_pattern_set(),
        }
    }

    /// Canonicalize raw text: NFKC normalization, lowercase, zero-width
    /// stripping, whitespace collapse.
    pub fn normalize(&self, text: &str) -> String {
        let canonical: String = text
            .nfkc()
            .filter(|c| !ZERO_WIDTH.contains(c))
            .collect::<String>()
            .to_lowercase();

        let mut out = String::with_capacity(canonical.len());
        let mut in_whitespace = false;
        for c in canonical.chars() {
            if c.is_whitespace() {
                in_whitespace = true;
                continue;
            }
            if in_whitespace && !out.is_empty() {
                out.push(' ');
            }
            in_whitespace = false;
            out.push(c);
        }
        out
    }

    /// Undo common character-substitution obfuscation (`s3x` → `sex`,
    /// `dr@gs` → `drags`) and strip separator characters.
    ///
    /// Applied to normalized text. The result feeds the classifier only.
    pub fn de_obfuscate(&self, text: &str) -> String {
        text.chars()
            .filter_map(|c| match c {
                '0' => Some('o'),
                '1' => Some('i'),
                '3' => Some('e'),
                '4' => Some('a'),
                '5' => Some('s'),
                '7' => Some('t'),
                '@' => Some('a'),
                '!' => Some('i'),
                '$' => Some('s'),
                '+' => Some('t'),
                c if OBFUSCATION_SEPARATORS.contains(&c) => None,
                c => Some(c),
            })
            .collect()
    }

    /// True if any PII-shaped substring (email, NANP phone, SSN, IPv4,
    /// street address) is present.
    pub fn detect_pii(&self, text: &str) -> bool {
        self.pii_patterns.is_match(text)
    }

    /// Heuristic flag for likely-non-English text: the ratio of ASCII code
    /// points to total length falls below 0.70. Not a language detector;
    /// flagged text is denied by default rather than translated.
    pub fn detect_non_target_language(&self, text: &str) -> bool {
        detectors::ascii_ratio(text)
            .map(|ratio| ratio < 0.70)
            .unwrap_or(false)
    }

    /// Content-free summary of a text's shape, safe to log.
    pub fn scan(&self, text: &str) -> LexicalScan {
        let normalized = self.normalize(text);
        LexicalScan {
            char_count: text.chars().count(),
            ascii_ratio: detectors::ascii_ratio(text).unwrap_or(1.0),
            pii_detected: self.detect_pii(text) || self.detect_pii(&normalized),
            non_target_language: self.detect_non_target_language(text),
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
