//! Error types for the parental gate.
//!
//! Only infrastructure faults are errors. A short PIN, a wrong PIN, or an
//! active lockout are ordinary boolean denials: they are expected
//! outcomes, not exceptional ones, and none of them is security-relevant
//! to distinguish at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParentalError {
    #[error("profile io: {0}")]
    Io(#[from] std::io::Error),

    #[error("profile encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParentalError>;
