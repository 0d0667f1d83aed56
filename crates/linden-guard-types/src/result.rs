//! The moderation result type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::category::SafetyCategory;

/// Outcome of a single moderation pass.
///
/// Produced fresh per call and never mutated afterwards; the pipeline's
/// merge steps build new values instead of editing old ones. A `ModResult`
/// with a non-empty category set outside the active band's tolerance, or
/// one produced by a failed classification call, always carries
/// `allowed = false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModResult {
    pub allowed: bool,
    pub categories: BTreeSet<SafetyCategory>,
    pub rationale: String,
}

impl ModResult {
    /// A clean pass: no categories flagged.
    pub fn allow(rationale: impl Into<String>) -> Self {
        Self {
            allowed: true,
            categories: BTreeSet::new(),
            rationale: rationale.into(),
        }
    }

    /// A denial with the categories that drove it.
    pub fn deny(
        categories: impl IntoIterator<Item = SafetyCategory>,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            allowed: false,
            categories: categories.into_iter().collect(),
            rationale: rationale.into(),
        }
    }

    /// The fail-closed result every classification failure collapses to.
    /// There is no allow-on-error path anywhere in the pipeline.
    pub fn fail_closed() -> Self {
        Self::deny([SafetyCategory::OtherSensitive], "moderation check failed")
    }

    /// Whether any flagged category is in the given set.
    pub fn intersects(&self, set: &BTreeSet<SafetyCategory>) -> bool {
        self.categories.iter().any(|c| set.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_closed_is_denied_other_sensitive() {
        let result = ModResult::fail_closed();
        assert!(!result.allowed);
        assert!(result.categories.contains(&SafetyCategory::OtherSensitive));
        assert_eq!(result.rationale, "moderation check failed");
    }

    #[test]
    fn intersects_matches_any_member() {
        let result = ModResult::deny([SafetyCategory::SelfHarm], "flagged");
        let crisis = BTreeSet::from([SafetyCategory::SelfHarm, SafetyCategory::SexualMinors]);
        assert!(result.intersects(&crisis));

        let clean = ModResult::allow("ok");
        assert!(!clean.intersects(&crisis));
    }
}
