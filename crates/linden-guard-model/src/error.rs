//! Error types for the model clients.

use thiserror::Error;

/// Errors from the guard or rewrite endpoints.
///
/// The distinction matters for logs only: the moderation pipeline maps
/// both variants to the same fail-closed denial.
#[derive(Debug, Error)]
pub enum GuardModelError {
    /// Network failure, timeout, or non-200 status.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// Response body that does not match the required schema.
    #[error("classifier protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, GuardModelError>;
