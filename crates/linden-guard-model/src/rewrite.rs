//! The single-attempt safe-rewrite client.

use std::sync::Arc;

use tracing::debug;

use crate::error::{GuardModelError, Result};
use crate::grammar::GUARD_STOP_SEQUENCES;
use crate::transport::{CompletionRequest, CompletionTransport};

/// Word cap instructed for a rewrite.
pub const REWRITE_MAX_WORDS: usize = 50;

const REWRITE_TEMPERATURE: f32 = 0.3;
const REWRITE_TOP_P: f32 = 0.9;
const REWRITE_MAX_TOKENS: u32 = 150;

/// Client for the generation endpoint, used only to produce one
/// allowlist-steered replacement for a disallowed output. The caller owns
/// the one-attempt rule and the re-moderation of whatever comes back.
pub struct RewriteClient {
    transport: Arc<dyn CompletionTransport>,
}

impl RewriteClient {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self { transport }
    }

    /// Request a short redirection toward the given allowlisted topics.
    pub async fn rewrite(&self, original: &str, topics: &[&str]) -> Result<String> {
        let steering = topics
            .iter()
            .take(3)
            .copied()
            .collect::<Vec<_>>()
            .join(", ");
        let prompt = format!(
            "System: You are a friendly companion for a child. The previous reply was \
             not appropriate. Write a gentle replacement that redirects the conversation \
             toward one of these topics: {steering}. Use at most {REWRITE_MAX_WORDS} \
             words. Do not mention rules or the original reply.\n\n\
             Original reply: {original}\n\nReplacement:"
        );

        let request = CompletionRequest {
            prompt,
            temperature: REWRITE_TEMPERATURE,
            top_p: REWRITE_TOP_P,
            n_predict: REWRITE_MAX_TOKENS,
            grammar: None,
            stop: GUARD_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        };

        let response = self.transport.complete(&request).await?;
        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Err(GuardModelError::Protocol("empty rewrite".into()));
        }
        debug!(words = text.split_whitespace().count(), "rewrite produced");
        Ok(text)
    }
}
