//! # linden-policy-capability
//!
//! Authorization for sensitive device capabilities. Every attempted use
//! of a capability is checked fresh against its sensitivity class, the
//! originating task's provenance (local vs. network), and whether a
//! present human explicitly asked for it. Decisions are never cached.

mod engine;
mod types;

pub use engine::CapabilityPolicyEngine;
pub use types::{HardwareCapability, PolicyDecision, TaskEnvelope, LOCAL_CREATOR};
