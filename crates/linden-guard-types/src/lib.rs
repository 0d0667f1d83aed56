//! # linden-guard-types
//!
//! Shared vocabulary of the Linden safety core: the closed safety-category
//! enum, age bands and their allowlists, the moderation result type, and
//! the fixed user-facing messages.
//!
//! Everything here is plain data. The decision logic lives in the sibling
//! guard crates; this crate exists so that adding a safety category is a
//! compile-time-checked change everywhere it is matched.

pub mod band;
pub mod category;
pub mod messages;
pub mod result;

pub use band::AgeBand;
pub use category::SafetyCategory;
pub use messages::{CrisisCard, BLOCKED_MESSAGE, PARENT_NEEDED_MESSAGE};
pub use result::ModResult;
