//! # linden-guard-model
//!
//! Clients for the two external model endpoints the safety core talks to:
//! the guard classifier (grammar-constrained, strict JSON) and the
//! generation endpoint used for the single-attempt safe rewrite.
//!
//! Both sit behind [`CompletionTransport`] so the moderation pipeline can
//! be exercised without a server. The classifier response parser is
//! deliberately unforgiving: any deviation from the expected schema is a
//! protocol error, and the pipeline collapses every error from this crate
//! into a fail-closed denial.

mod classifier;
mod error;
mod grammar;
mod rewrite;
mod transport;

pub use classifier::{GuardModelClient, GuardVerdict};
pub use error::{GuardModelError, Result};
pub use grammar::{
    VERDICT_GRAMMAR, GUARD_MAX_TOKENS, GUARD_STOP_SEQUENCES, GUARD_TEMPERATURE, GUARD_TOP_P,
};
pub use rewrite::{RewriteClient, REWRITE_MAX_WORDS};
pub use transport::{CompletionRequest, CompletionResponse, CompletionTransport, HttpTransport};
