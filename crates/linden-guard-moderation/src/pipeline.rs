//! The moderation pipeline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use linden_guard_model::{
    CompletionTransport, GuardModelClient, GuardVerdict, RewriteClient,
};
use linden_guard_text::TextNormalizer;
use linden_guard_types::{AgeBand, ModResult, SafetyCategory};

use crate::prompt::build_classification_prompt;

/// Which way the text is flowing. Used for tracing only; the algorithm
/// is identical for both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// Orchestrates normalization, PII and language checks, and guard
/// classification into one `ModResult` per call.
pub struct ModerationPipeline {
    normalizer: TextNormalizer,
    guard: GuardModelClient,
    rewriter: RewriteClient,
    fail_closed_count: AtomicU64,
}

impl ModerationPipeline {
    /// Build a pipeline over the guard endpoint and the (separate)
    /// generation endpoint used for rewrites.
    pub fn new(
        guard_transport: Arc<dyn CompletionTransport>,
        rewrite_transport: Arc<dyn CompletionTransport>,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            guard: GuardModelClient::new(guard_transport),
            rewriter: RewriteClient::new(rewrite_transport),
            fail_closed_count: AtomicU64::new(0),
        }
    }

    /// Moderate text arriving from the user.
    pub async fn moderate_input(&self, text: &str, band: AgeBand) -> ModResult {
        self.moderate(text, band, Direction::Input).await
    }

    /// Moderate text produced by the model, before it is shown.
    pub async fn moderate_output(&self, text: &str, band: AgeBand) -> ModResult {
        self.moderate(text, band, Direction::Output).await
    }

    async fn moderate(&self, text: &str, band: AgeBand, direction: Direction) -> ModResult {
        // Likely-non-English text is denied outright rather than
        // classified: the guard prompt and allowlists are language-fixed.
        if self.normalizer.detect_non_target_language(text) {
            debug!(direction = direction.as_str(), "non-target language denied");
            return ModResult::deny(
                [SafetyCategory::OtherSensitive],
                "text not in the supported language",
            );
        }

        let normalized = self.normalizer.normalize(text);
        let pii =
            self.normalizer.detect_pii(text) || self.normalizer.detect_pii(&normalized);

        // The classifier sees the de-obfuscated form only.
        let deobfuscated = self.normalizer.de_obfuscate(&normalized);
        let prompt = build_classification_prompt(band, &deobfuscated);

        let verdict = match self.guard.classify(&prompt).await {
            Ok(verdict) => verdict,
            Err(e) => {
                self.fail_closed_count.fetch_add(1, Ordering::Relaxed);
                warn!(direction = direction.as_str(), error = %e,
                    "guard classification failed, failing closed");
                return ModResult::fail_closed();
            }
        };

        let result = merge_verdict(verdict, band, pii);
        debug!(
            direction = direction.as_str(),
            allowed = result.allowed,
            categories = result.categories.len(),
            "moderation decided"
        );
        result
    }

    /// Produce one allowlist-steered replacement for a disallowed output.
    ///
    /// The rewrite itself is re-moderated; if it fails too, the caller
    /// must fall back to the static block message. At most one rewrite
    /// attempt per turn; there is no retry loop here or below.
    pub async fn safe_rewrite_within_allowlist(
        &self,
        original_text: &str,
        band: AgeBand,
    ) -> Option<String> {
        let rewritten = match self
            .rewriter
            .rewrite(original_text, band.allowlisted_topics())
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "safe rewrite failed");
                return None;
            }
        };

        let check = self.moderate(&rewritten, band, Direction::Output).await;
        if check.allowed {
            Some(rewritten)
        } else {
            debug!("safe rewrite rejected by re-moderation");
            None
        }
    }

    /// How many calls have collapsed to the fail-closed denial. Feeds the
    /// parent dashboard; never resets.
    pub fn fail_closed_count(&self) -> u64 {
        self.fail_closed_count.load(Ordering::Relaxed)
    }
}

/// Merge the classifier verdict with the band allowlist and the PII flag.
/// Restriction only accumulates: no step here can turn a denial back
/// into an allow.
fn merge_verdict(verdict: GuardVerdict, band: AgeBand, pii: bool) -> ModResult {
    let mut allowed = verdict.allowed;
    let mut categories = verdict.categories;
    let mut rationale = verdict.rationale;

    if !categories.is_empty() {
        let tolerated = band.tolerated_categories();
        if categories.iter().any(|c| !tolerated.contains(c)) {
            allowed = false;
        }
    }

    if pii {
        allowed = false;
        categories.insert(SafetyCategory::PrivacyPersonalData);
        if rationale.is_empty() {
            rationale = "personal data detected".to_string();
        } else {
            rationale.push_str("; personal data detected");
        }
    }

    ModResult {
        allowed,
        categories,
        rationale,
    }
}
