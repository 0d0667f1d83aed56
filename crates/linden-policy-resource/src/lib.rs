//! # linden-policy-resource
//!
//! Soft gating for new work: system resource ceilings, a rolling
//! hourly API-call window, a daily project cap, and the session budget
//! from the parent profile. Everything is evaluated on demand by the
//! caller, with no background timers, and an exceeded budget only blocks
//! *starting* work, never aborts in-flight work.

mod limiter;
mod probe;

pub use limiter::{RateCaps, ResourceCeilings, ResourceLimiter, ResourceStatus};
pub use probe::{ProcProbe, ResourceProbe, ResourceSample};
