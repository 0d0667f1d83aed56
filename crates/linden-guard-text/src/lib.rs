//! # linden-guard-text
//!
//! Pure text analysis for the moderation pipeline: Unicode
//! canonicalization, leet-speak de-obfuscation, PII-shaped substring
//! detection, and a non-target-language heuristic.
//!
//! Nothing in this crate performs I/O or calls a service, so every
//! operation can be fuzzed in isolation. The de-obfuscated form is only
//! ever fed to the classifier; it is never surfaced to the user.

mod detectors;
mod normalizer;

pub use detectors::LexicalScan;
pub use normalizer::TextNormalizer;
