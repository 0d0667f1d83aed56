//! Decoding constraints for the guard classification call.
//!
//! The grammar forces the classifier's output to be exactly one JSON
//! object of the verdict shape, so the response is machine-parseable or
//! it is a protocol error; there is no in-between to interpret.

/// Sampling temperature for classification. Zero: the verdict must be
/// deterministic for identical input.
pub const GUARD_TEMPERATURE: f32 = 0.0;

/// Near-zero nucleus sampling for classification.
pub const GUARD_TOP_P: f32 = 0.1;

/// Token budget for a verdict. The JSON object is small; anything longer
/// is runaway output.
pub const GUARD_MAX_TOKENS: u32 = 100;

/// Stop sequences cutting off any continuation past the verdict.
pub const GUARD_STOP_SEQUENCES: [&str; 3] = ["\n\n", "USER:", "System:"];

/// GBNF grammar forcing `{"allowed": bool, "categories": [string...],
/// "rationale": string}` with no other tokens permitted.
pub const VERDICT_GRAMMAR: &str = r#"root ::= "{" ws "\"allowed\":" ws boolean "," ws "\"categories\":" ws categories "," ws "\"rationale\":" ws string ws "}"
boolean ::= "true" | "false"
categories ::= "[" ws (string (ws "," ws string)*)? ws "]"
string ::= "\"" ([^"\\] | "\\" .)* "\""
ws ::= [ \t\n]*"#;
