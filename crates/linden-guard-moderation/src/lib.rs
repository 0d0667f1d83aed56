//! # linden-guard-moderation
//!
//! The moderation pipeline: every piece of text flowing to or from the
//! language model passes through here before it reaches the child or the
//! model. The pipeline composes the pure text analysis, the
//! grammar-constrained guard classification, and the age-band allowlist
//! into one [`linden_guard_types::ModResult`] per call.
//!
//! The guard model is an untrusted, possibly-unavailable dependency, so
//! the pipeline degrades to maximally restrictive behavior: a language
//! mismatch, a PII hit, or any classification failure each force a
//! denial. There is no allow-on-error path.

mod pipeline;
mod prompt;

pub use pipeline::{Direction, ModerationPipeline};
pub use prompt::build_classification_prompt;
