//! The guard classification client.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use linden_guard_types::SafetyCategory;

use crate::error::{GuardModelError, Result};
use crate::grammar::{
    GUARD_MAX_TOKENS, GUARD_STOP_SEQUENCES, GUARD_TEMPERATURE, GUARD_TOP_P, VERDICT_GRAMMAR,
};
use crate::transport::{CompletionRequest, CompletionTransport};

/// A parsed classifier verdict.
///
/// Only produced when the response matched the schema exactly; partial or
/// malformed responses never become a verdict.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardVerdict {
    pub allowed: bool,
    pub categories: BTreeSet<SafetyCategory>,
    pub rationale: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVerdict {
    allowed: bool,
    categories: Vec<String>,
    rationale: String,
}

/// Client for the guard classification endpoint.
pub struct GuardModelClient {
    transport: Arc<dyn CompletionTransport>,
}

impl GuardModelClient {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self { transport }
    }

    /// Send a classification prompt and parse the strict-JSON verdict.
    ///
    /// Sampling is pinned (temperature 0, near-zero top-p, small token
    /// budget) and the output grammar forces the verdict schema, so the
    /// same prompt yields the same verdict.
    pub async fn classify(&self, prompt: &str) -> Result<GuardVerdict> {
        let request = CompletionRequest {
            prompt: prompt.to_string(),
            temperature: GUARD_TEMPERATURE,
            top_p: GUARD_TOP_P,
            n_predict: GUARD_MAX_TOKENS,
            grammar: Some(VERDICT_GRAMMAR.to_string()),
            stop: GUARD_STOP_SEQUENCES.iter().map(|s| s.to_string()).collect(),
        };

        let response = self.transport.complete(&request).await?;
        let verdict = parse_verdict(&response.content)?;
        debug!(
            allowed = verdict.allowed,
            categories = verdict.categories.len(),
            "guard verdict parsed"
        );
        Ok(verdict)
    }
}

/// Extract and validate the verdict JSON from the raw completion text.
///
/// The grammar should guarantee the content is exactly the object, but
/// the server is untrusted: locate the outermost braces, parse strictly,
/// and reject any category name outside the closed set.
fn parse_verdict(content: &str) -> Result<GuardVerdict> {
    let start = content
        .find('{')
        .ok_or_else(|| GuardModelError::Protocol("no JSON object in response".into()))?;
    let end = content
        .rfind('}')
        .ok_or_else(|| GuardModelError::Protocol("unterminated JSON object".into()))?;
    if end < start {
        return Err(GuardModelError::Protocol("malformed JSON object".into()));
    }

    let raw: RawVerdict = serde_json::from_str(&content[start..=end])
        .map_err(|e| GuardModelError::Protocol(format!("verdict schema: {e}")))?;

    let mut categories = BTreeSet::new();
    for name in &raw.categories {
        let category = SafetyCategory::from_name(name).ok_or_else(|| {
            GuardModelError::Protocol(format!("unknown category '{name}' in verdict"))
        })?;
        categories.insert(category);
    }

    Ok(GuardVerdict {
        allowed: raw.allowed,
        categories,
        rationale: raw.rationale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::transport::CompletionResponse;

    struct CannedTransport {
        content: String,
    }

    #[async_trait]
    impl CompletionTransport for CannedTransport {
        async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: self.content.clone(),
            })
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl CompletionTransport for FailingTransport {
        async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse> {
            Err(GuardModelError::Unavailable("timed out".into()))
        }
    }

    fn client_with(content: &str) -> GuardModelClient {
        GuardModelClient::new(Arc::new(CannedTransport {
            content: content.to_string(),
        }))
    }

    #[tokio::test]
    async fn parses_exact_verdict() {
        let client = client_with(
            r#"{"allowed": false, "categories": ["self_harm"], "rationale": "flagged"}"#,
        );
        let verdict = client.classify("prompt").await.unwrap();
        assert!(!verdict.allowed);
        assert!(verdict.categories.contains(&SafetyCategory::SelfHarm));
    }

    #[tokio::test]
    async fn tolerates_surrounding_noise_but_not_schema_drift() {
        let client =
            client_with("  {\"allowed\": true, \"categories\": [], \"rationale\": \"ok\"}\n");
        assert!(client.classify("prompt").await.unwrap().allowed);

        let missing_field = client_with(r#"{"allowed": true, "categories": []}"#);
        assert!(matches!(
            missing_field.classify("prompt").await,
            Err(GuardModelError::Protocol(_))
        ));

        let extra_field = client_with(
            r#"{"allowed": true, "categories": [], "rationale": "ok", "score": 1.0}"#,
        );
        assert!(matches!(
            extra_field.classify("prompt").await,
            Err(GuardModelError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn unknown_category_is_a_protocol_error() {
        let client = client_with(
            r#"{"allowed": false, "categories": ["gambling"], "rationale": "?"}"#,
        );
        assert!(matches!(
            client.classify("prompt").await,
            Err(GuardModelError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn garbage_is_a_protocol_error() {
        for garbage in ["", "not json", "{\"allowed\": maybe}", "]["] {
            let client = client_with(garbage);
            assert!(
                matches!(
                    client.classify("prompt").await,
                    Err(GuardModelError::Protocol(_))
                ),
                "expected protocol error for {garbage:?}"
            );
        }
    }

    #[tokio::test]
    async fn transport_failure_passes_through() {
        let client = GuardModelClient::new(Arc::new(FailingTransport));
        assert!(matches!(
            client.classify("prompt").await,
            Err(GuardModelError::Unavailable(_))
        ));
    }
}
