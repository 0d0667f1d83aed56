//! The closed safety-category enumeration.

use serde::{Deserialize, Serialize};

/// A safety category the guard classifier can flag.
///
/// The set is closed: the classifier prompt enumerates exactly these
/// names, and the response parser rejects anything outside them. Matching
/// on this enum is exhaustive, so a new category is a compile-time-checked
/// change in every consumer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCategory {
    SexualContent,
    SexualMinors,
    SelfHarm,
    Violence,
    WeaponsIllicit,
    HateAbuse,
    DrugsAlcohol,
    MedicalAdvice,
    PrivacyPersonalData,
    OtherSensitive,
}

impl SafetyCategory {
    /// Every category, in canonical order. Used to enumerate the closed
    /// set in the classifier prompt.
    pub const ALL: [SafetyCategory; 10] = [
        SafetyCategory::SexualContent,
        SafetyCategory::SexualMinors,
        SafetyCategory::SelfHarm,
        SafetyCategory::Violence,
        SafetyCategory::WeaponsIllicit,
        SafetyCategory::HateAbuse,
        SafetyCategory::DrugsAlcohol,
        SafetyCategory::MedicalAdvice,
        SafetyCategory::PrivacyPersonalData,
        SafetyCategory::OtherSensitive,
    ];

    /// Canonical wire name (snake_case, matching the serde encoding).
    pub fn name(&self) -> &'static str {
        match self {
            SafetyCategory::SexualContent => "sexual_content",
            SafetyCategory::SexualMinors => "sexual_minors",
            SafetyCategory::SelfHarm => "self_harm",
            SafetyCategory::Violence => "violence",
            SafetyCategory::WeaponsIllicit => "weapons_illicit",
            SafetyCategory::HateAbuse => "hate_abuse",
            SafetyCategory::DrugsAlcohol => "drugs_alcohol",
            SafetyCategory::MedicalAdvice => "medical_advice",
            SafetyCategory::PrivacyPersonalData => "privacy_personal_data",
            SafetyCategory::OtherSensitive => "other_sensitive",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the closed
    /// set; callers treat that as a protocol violation, not a soft skip.
    pub fn from_name(name: &str) -> Option<SafetyCategory> {
        SafetyCategory::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for SafetyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for cat in SafetyCategory::ALL {
            assert_eq!(SafetyCategory::from_name(cat.name()), Some(cat));
        }
    }

    #[test]
    fn unknown_name_rejected() {
        assert_eq!(SafetyCategory::from_name("gambling"), None);
        assert_eq!(SafetyCategory::from_name(""), None);
        assert_eq!(SafetyCategory::from_name("Self_Harm"), None);
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&SafetyCategory::PrivacyPersonalData).unwrap();
        assert_eq!(json, "\"privacy_personal_data\"");
        let back: SafetyCategory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SafetyCategory::PrivacyPersonalData);
    }
}
