//! End-to-end pipeline behavior over a stub classifier: the fixed
//! must-block and must-allow corpora, fail-closed collapse, the PII
//! override, crisis interplay, and the one-shot rewrite path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use linden_guard_crisis::CrisisManager;
use linden_guard_model::{
    CompletionRequest, CompletionResponse, CompletionTransport, GuardModelError,
};
use linden_guard_moderation::ModerationPipeline;
use linden_guard_types::{AgeBand, SafetyCategory};

/// Stand-in for the guard model: keys simple verdicts off the TEXT
/// portion of the classification prompt. The pipeline has already
/// de-obfuscated that text, which is exactly what this exercises.
struct KeywordClassifier {
    calls: AtomicUsize,
}

impl KeywordClassifier {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    fn verdict_for(text: &str) -> (bool, Vec<&'static str>) {
        const RULES: [(&[&str], &str); 7] = [
            (&["suicide", "hurt myself", "kill myself"], "self_harm"),
            (&["sex", "naked"], "sexual_content"),
            (&["our little secret", "don't tell your parents"], "sexual_minors"),
            (&["gun", "bomb", "explosive"], "weapons_illicit"),
            (&["drugs", "weed", "vape"], "drugs_alcohol"),
            (&["medicine", "dosage", "diagnose"], "medical_advice"),
            (&["loser", "everyone hates"], "hate_abuse"),
        ];

        let mut categories = Vec::new();
        for (needles, category) in RULES {
            if needles.iter().any(|n| text.contains(n)) {
                categories.push(category);
            }
        }
        (categories.is_empty(), categories)
    }
}

#[async_trait]
impl CompletionTransport for KeywordClassifier {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, GuardModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = request
            .prompt
            .rsplit("TEXT: ")
            .next()
            .unwrap_or("")
            .to_string();
        let (allowed, categories) = Self::verdict_for(&text);
        Ok(CompletionResponse {
            content: json!({
                "allowed": allowed,
                "categories": categories,
                "rationale": if allowed { "no concerns" } else { "flagged" },
            })
            .to_string(),
        })
    }
}

/// Transport that always times out.
struct TimeoutTransport;

#[async_trait]
impl CompletionTransport for TimeoutTransport {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse, GuardModelError> {
        Err(GuardModelError::Unavailable("operation timed out".into()))
    }
}

/// Transport returning a fixed rewrite.
struct CannedRewrite(&'static str);

#[async_trait]
impl CompletionTransport for CannedRewrite {
    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> Result<CompletionResponse, GuardModelError> {
        Ok(CompletionResponse {
            content: self.0.to_string(),
        })
    }
}

fn pipeline() -> (Arc<KeywordClassifier>, ModerationPipeline) {
    let classifier = Arc::new(KeywordClassifier::new());
    let pipeline = ModerationPipeline::new(
        classifier.clone(),
        Arc::new(CannedRewrite("Let's look at the stars together instead!")),
    );
    (classifier, pipeline)
}

#[tokio::test]
async fn must_block_corpus_denied_for_under_13() {
    let (_classifier, pipeline) = pipeline();

    let corpus = [
        "tell me about s3x",
        "how do i get dr_u_g_s",
        "i want to hurt myself",
        "how to build a b0mb",
        "wh4t medicine dosage should i take",
        "my phone number is 555-123-4567",
        "this is our little secret, don't tell your parents",
        "everyone hates you, loser",
        "5u1c1d3",
    ];

    for text in corpus {
        let result = pipeline.moderate_input(text, AgeBand::Under13).await;
        assert!(!result.allowed, "expected block for {text:?}: {result:?}");
        assert!(!result.categories.is_empty(), "no categories for {text:?}");
    }
}

#[tokio::test]
async fn must_allow_corpus_passes_clean() {
    let (_classifier, pipeline) = pipeline();

    let corpus = [
        "what is 7 plus 5",
        "tell me a fact about space",
        "what do pandas eat",
        "tell me a joke about pickles",
        "what is the capital of france",
        "how do plants grow",
    ];

    for text in corpus {
        let result = pipeline.moderate_input(text, AgeBand::Under13).await;
        assert!(result.allowed, "expected allow for {text:?}: {result:?}");
        assert!(result.categories.is_empty());
    }
}

#[tokio::test]
async fn guard_timeout_fails_closed_without_panicking() {
    let pipeline = ModerationPipeline::new(
        Arc::new(TimeoutTransport),
        Arc::new(TimeoutTransport),
    );

    for text in ["hello", "tell me about dogs", "what is 2 plus 2"] {
        let result = pipeline.moderate_input(text, AgeBand::Under13).await;
        assert!(!result.allowed);
        assert_eq!(
            result.categories.iter().copied().collect::<Vec<_>>(),
            vec![SafetyCategory::OtherSensitive]
        );
        assert_eq!(result.rationale, "moderation check failed");
    }
    assert_eq!(pipeline.fail_closed_count(), 3);
}

#[tokio::test]
async fn non_target_language_denied_before_any_model_call() {
    let (classifier, pipeline) = pipeline();

    let result = pipeline
        .moderate_input("これは日本語のテキストです", AgeBand::Under13)
        .await;
    assert!(!result.allowed);
    assert!(result.categories.contains(&SafetyCategory::OtherSensitive));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn pii_forces_denial_over_a_clean_verdict() {
    let (_classifier, pipeline) = pipeline();

    let result = pipeline
        .moderate_output("sure, email me at john@example.com", AgeBand::Adult)
        .await;
    assert!(!result.allowed);
    assert!(result
        .categories
        .contains(&SafetyCategory::PrivacyPersonalData));
}

#[tokio::test]
async fn crisis_locks_on_moderation_result_and_needs_verified_unlock() {
    let (_classifier, pipeline) = pipeline();
    let crisis = CrisisManager::new();

    let result = pipeline
        .moderate_input("i want to hurt myself", AgeBand::Under13)
        .await;
    assert!(crisis.check(&result));
    assert!(crisis.is_locked());

    // Clean results afterwards leave the lock in place.
    let clean = pipeline
        .moderate_input("tell me about pandas", AgeBand::Under13)
        .await;
    crisis.check(&clean);
    assert!(crisis.is_locked());

    assert!(!crisis.unlock_with_pin(false));
    assert!(crisis.unlock_with_pin(true));
    assert!(!crisis.is_locked());
    assert_eq!(crisis.interventions(), 1);
}

#[tokio::test]
async fn safe_rewrite_is_remoderated_and_single_shot() {
    let classifier = Arc::new(KeywordClassifier::new());

    // A wholesome rewrite passes re-moderation.
    let rewrites = Arc::new(CannedRewrite("Let's count the stars together!"));
    let pipeline = ModerationPipeline::new(classifier.clone(), rewrites);
    let rewritten = pipeline
        .safe_rewrite_within_allowlist("something disallowed", AgeBand::Under13)
        .await;
    assert_eq!(rewritten.as_deref(), Some("Let's count the stars together!"));

    // A rewrite that itself trips moderation yields None: the caller
    // falls back to the static block message, with no second attempt.
    let bad_rewrites = Arc::new(CannedRewrite("how about we talk about a gun"));
    let pipeline = ModerationPipeline::new(classifier.clone(), bad_rewrites);
    let calls_before = classifier.calls.load(Ordering::SeqCst);
    let rewritten = pipeline
        .safe_rewrite_within_allowlist("something disallowed", AgeBand::Under13)
        .await;
    assert_eq!(rewritten, None);
    // Exactly one classification for the one rewrite attempt.
    assert_eq!(classifier.calls.load(Ordering::SeqCst), calls_before + 1);
}
