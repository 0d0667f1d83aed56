//! Age bands and their per-band allowlists.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::category::SafetyCategory;

/// The configured age band of the active child profile.
///
/// The band drives two allowlists: the topics generated content is steered
/// toward, and the safety categories the band tolerates when the
/// classifier flags them. Both are fixed data, not configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Under13,
    Teen13To17,
    Adult,
}

impl AgeBand {
    /// Topics permitted content is expected to stay within. The first few
    /// entries are the "top" topics the safe-rewrite path steers toward.
    pub fn allowlisted_topics(&self) -> &'static [&'static str] {
        match self {
            AgeBand::Under13 => &[
                "animals",
                "space",
                "math",
                "stories",
                "jokes",
                "nature",
                "school",
                "art",
                "music",
                "friendship",
            ],
            AgeBand::Teen13To17 => &[
                "science",
                "space",
                "technology",
                "history",
                "geography",
                "sports",
                "music",
                "creative writing",
                "math",
                "nature",
            ],
            AgeBand::Adult => &[
                "science",
                "technology",
                "history",
                "geography",
                "current events",
                "health",
                "cooking",
                "travel",
                "literature",
                "music",
            ],
        }
    }

    /// Safety categories this band tolerates in classified content.
    ///
    /// A flagged result stays allowed only if every flagged category is in
    /// this set. Minors tolerate nothing; adults tolerate the categories
    /// an ordinary factual conversation can brush against.
    pub fn tolerated_categories(&self) -> BTreeSet<SafetyCategory> {
        match self {
            AgeBand::Under13 | AgeBand::Teen13To17 => BTreeSet::new(),
            AgeBand::Adult => BTreeSet::from([
                SafetyCategory::Violence,
                SafetyCategory::DrugsAlcohol,
                SafetyCategory::MedicalAdvice,
            ]),
        }
    }
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AgeBand::Under13 => "under_13",
            AgeBand::Teen13To17 => "teen_13_17",
            AgeBand::Adult => "adult",
        };
        f.write_str(name)
    }
}
