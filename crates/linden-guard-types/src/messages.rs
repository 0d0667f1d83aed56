//! Fixed user-facing messages.
//!
//! Every denial the device surfaces is one of the literals below. Raw
//! classifier rationales and filter pattern matches stay in logs and the
//! parent dashboard; they are never echoed to the child.

use serde::Serialize;

/// Shown when content is refused for any moderation reason.
pub const BLOCKED_MESSAGE: &str =
    "Hmm, that's not something I can help with. How about we talk about animals, \
     space, or a fun story instead?";

/// Shown when an action needs parental verification.
pub const PARENT_NEEDED_MESSAGE: &str =
    "A parent or guardian needs to help with this one. Please ask a grown-up to \
     enter the parent PIN.";

/// The crisis card shown while the session is locked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CrisisCard {
    pub title: &'static str,
    pub message: &'static str,
    pub resources: &'static [&'static str],
}

impl CrisisCard {
    /// The one fixed card. Literal data, never computed.
    pub fn standard() -> Self {
        Self {
            title: "You matter, and help is here",
            message: "It sounds like something really hard is going on. You deserve \
                      support from a caring adult. Please talk to a parent, a teacher, \
                      or one of the helpers below. They are there for you, any time.",
            resources: &[
                "988 Suicide & Crisis Lifeline: call or text 988",
                "Crisis Text Line: text HOME to 741741",
                "Childhelp National Hotline: 1-800-422-4453",
            ],
        }
    }
}
